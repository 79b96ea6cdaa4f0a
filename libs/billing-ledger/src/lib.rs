// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! # Billing Ledger
//!
//! Convert a client's accumulated fractional balance ("periods owed" or
//! "periods prepaid ahead") into concrete calendar periods.
//!
//! [period::Period] is the calendar primitive: a totally-ordered year/month
//! token with total month arithmetic. [reconcile::reconcile] derives the
//! period through which a client is paid and the next period due, including
//! partial-period remainders, from an anchor period and a
//! [reconcile::BillingBalance].
//!
//! Pure functions over already-fetched figures; the backend's own invoicing
//! engine is authoritative, this is only the front end's local re-derivation.

pub mod period;
pub mod reconcile;
