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
//! # Address Allocator
//!
//! Partition a finite set of IPv4 suffixes into per-base, per-purpose pools
//! and track which addresses the client roster already claims.
//!
//! The pool layout is an immutable [pool::PoolTable], injected by the caller.
//! The [allocator::AddressAllocator] derives point-in-time snapshots from it:
//! an [allocator::AssignedIndex] of claimed addresses and an
//! [allocator::AvailableIndex] of free ones, and validates proposed
//! assignments against both.
//!
//! Everything here is a pure function over a snapshot of the roster. Between
//! validating a candidate and the backend persisting it, another actor may
//! claim the same address; at-most-one-claim is the backend's guarantee, and
//! callers must re-validate against the latest snapshot at submit time.

pub mod allocator;
pub mod pool;
