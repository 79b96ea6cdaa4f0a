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

//! Integration tests for the client administration core
//!
//! This crate composes the components the way the surrounding CRUD layer
//! does: pool configuration and roster in, indexes and billing statuses out.

use address_allocator::pool::{PoolTable, dto::PoolTableDto};
use client_model::ClientRecord;

/// The pool configuration used across the integration tests, loaded through
/// the DTO path like real configuration.
pub fn pool_table() -> PoolTable {
    let dto: PoolTableDto = serde_json::from_value(serde_json::json!({
        "residential": {
            "1": { "prefix": "192.168.3.", "start": 1, "end": 254 },
            "2": { "prefix": "192.168.4.", "start": 1, "end": 254 },
        },
        "token-antenna": {
            "1": { "prefix": "10.20.1.", "start": 2, "end": 60 },
            "2": { "prefix": "10.20.2.", "start": 2, "end": 60 },
        },
        "token-modem": {
            "1": { "prefix": "10.30.1.", "start": 2, "end": 60 },
            "2": { "prefix": "10.30.2.", "start": 2, "end": 60 },
        },
    }))
    .expect("fixture is valid JSON");
    dto.try_into().expect("fixture is a valid pool table")
}

/// A small roster as the backend would return it.
pub fn roster() -> Vec<ClientRecord> {
    serde_json::from_value(serde_json::json!([
        {
            "id": "c-1",
            "type": "residential",
            "base": 1,
            "ip": "192.168.3.20",
            "debtMonths": 2.5,
            "monthlyPrice": 300.0,
        },
        {
            "id": "c-2",
            "type": "residential",
            "base": 1,
            "ip": "192.168.3.21",
            "paidMonthsAhead": 2.0,
            "monthlyPrice": 300.0,
        },
        {
            "id": "c-3",
            "type": "token",
            "base": 2,
            "antennaIp": "10.20.2.7",
            "modemIp": "10.30.2.7",
            "monthlyPrice": 250.0,
        },
        {
            // Courtesy client: zero price, stale balances.
            "id": "c-4",
            "type": "residential",
            "base": 2,
            "ip": "192.168.4.9",
            "debtMonths": 4.0,
            "monthlyPrice": 0.0,
        },
        {
            // Not yet connected: no address assigned.
            "id": "c-5",
            "type": "token",
            "base": 1,
            "monthlyPrice": 250.0,
        },
    ]))
    .expect("fixture is a valid roster")
}
