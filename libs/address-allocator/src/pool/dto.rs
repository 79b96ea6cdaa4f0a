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
//! Data transfer objects (DTOs) for the pool configuration.

use std::collections::BTreeMap;

use anyhow::Context;
use client_model::{BaseId, RangeKey};
use serde::{Deserialize, Serialize};

use crate::pool::{AddressRange, PoolTable};

/// The pool configuration, keyed by range key then base id.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct PoolTableDto(pub BTreeMap<String, BTreeMap<String, AddressRangeDto>>);

/// A single address range.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AddressRangeDto {
    /// The dotted prefix shared by all addresses in the range.
    pub prefix: String,
    /// First host suffix.
    pub start: u32,
    /// Last host suffix (inclusive).
    pub end: u32,
}

impl TryFrom<PoolTableDto> for PoolTable {
    type Error = anyhow::Error;

    fn try_from(value: PoolTableDto) -> Result<Self, Self::Error> {
        let mut pools: BTreeMap<RangeKey, BTreeMap<BaseId, AddressRange>> = BTreeMap::new();
        for (key, bases) in value.0 {
            let key: RangeKey = key.parse().context("invalid range key")?;
            for (base, range) in bases {
                let base: BaseId = base
                    .parse()
                    .with_context(|| format!("invalid base id ({key}, base {base:?})"))?;
                let range = AddressRange::new(range.prefix, range.start, range.end)
                    .with_context(|| format!("invalid range ({key}, base {base})"))?;
                pools.entry(key).or_default().insert(base, range);
            }
        }
        PoolTable::new(pools).context("invalid pool table")
    }
}

impl From<&PoolTable> for PoolTableDto {
    fn from(table: &PoolTable) -> Self {
        let mut pools: BTreeMap<String, BTreeMap<String, AddressRangeDto>> = BTreeMap::new();
        for (key, base, range) in table.iter() {
            pools.entry(key.to_string()).or_default().insert(
                base.to_string(),
                AddressRangeDto {
                    prefix: range.prefix().to_string(),
                    start: range.start(),
                    end: range.end(),
                },
            );
        }
        PoolTableDto(pools)
    }
}
