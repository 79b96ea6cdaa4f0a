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
//! Static address pool configuration.

use std::collections::BTreeMap;

use client_model::{BaseId, RangeKey};
use thiserror::Error;

pub mod dto;

/// A contiguous block of IPv4 host suffixes sharing a dotted prefix.
///
/// `prefix` is the leading three octets including the trailing dot
/// (e.g. `192.168.3.`); `start..=end` are the host suffixes of the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    prefix: String,
    start: u32,
    end: u32,
}

/// Address range construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    /// Prefix is not three dotted octets followed by a dot.
    #[error("prefix {0:?} is not a dotted IPv4 prefix like \"192.168.3.\"")]
    MalformedPrefix(String),
    /// Suffix bounds out of order or outside the host suffix space.
    #[error("suffix bounds {start}..={end} must satisfy 1 <= start <= end <= 254")]
    InvalidBounds { start: u32, end: u32 },
}

impl AddressRange {
    /// Creates a new address range, validating prefix and bounds.
    pub fn new(prefix: impl Into<String>, start: u32, end: u32) -> Result<Self, RangeError> {
        let prefix = prefix.into();
        let octets = match prefix.strip_suffix('.') {
            Some(body) => body.split('.').collect::<Vec<_>>(),
            None => return Err(RangeError::MalformedPrefix(prefix)),
        };
        if octets.len() != 3 || octets.iter().any(|o| o.parse::<u8>().is_err()) {
            return Err(RangeError::MalformedPrefix(prefix));
        }
        if start < 1 || start > end || end > 254 {
            return Err(RangeError::InvalidBounds { start, end });
        }
        Ok(Self { prefix, start, end })
    }

    /// The dotted prefix, including the trailing dot.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// First host suffix of the range.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last host suffix of the range (inclusive).
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of addresses in the range.
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// Ranges are never empty; kept for interface completeness.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Materializes the range as address strings, ascending by suffix.
    ///
    /// Ranges are bounded by construction (at most 254 entries), so full
    /// materialization is cheap. The ordering is user-facing and stable.
    pub fn expand(&self) -> Vec<String> {
        (self.start..=self.end)
            .map(|suffix| format!("{}{suffix}", self.prefix))
            .collect()
    }

    fn overlaps(&self, other: &AddressRange) -> bool {
        self.prefix == other.prefix && self.start <= other.end && other.start <= self.end
    }
}

/// Pool table construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolTableError {
    /// Two pools cover overlapping address space.
    #[error(
        "pool ({key_a}, base {base_a}) overlaps pool ({key_b}, base {base_b}) on prefix {prefix:?}"
    )]
    OverlappingPools {
        key_a: RangeKey,
        base_a: BaseId,
        key_b: RangeKey,
        base_b: BaseId,
        prefix: String,
    },
}

/// The immutable table of address pools, keyed by range key and base.
///
/// Owned by process-wide configuration and injected into the allocator;
/// there is no global instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolTable {
    pools: BTreeMap<RangeKey, BTreeMap<BaseId, AddressRange>>,
}

impl PoolTable {
    /// Creates a pool table, validating that no two pools overlap.
    ///
    /// Pools sharing a prefix must have disjoint suffix ranges; each
    /// (range key, base) pair owns its address space exclusively.
    pub fn new(
        pools: BTreeMap<RangeKey, BTreeMap<BaseId, AddressRange>>,
    ) -> Result<Self, PoolTableError> {
        let table = Self { pools };
        let flat: Vec<_> = table.iter().collect();
        for (i, (key_a, base_a, range_a)) in flat.iter().enumerate() {
            for (key_b, base_b, range_b) in &flat[i + 1..] {
                if range_a.overlaps(range_b) {
                    return Err(PoolTableError::OverlappingPools {
                        key_a: *key_a,
                        base_a: *base_a,
                        key_b: *key_b,
                        base_b: *base_b,
                        prefix: range_a.prefix.clone(),
                    });
                }
            }
        }
        Ok(table)
    }

    /// The range of the given pool, if configured.
    pub fn range(&self, key: RangeKey, base: BaseId) -> Option<&AddressRange> {
        self.pools.get(&key)?.get(&base)
    }

    /// All configured pools, in (range key, base) order.
    pub fn iter(&self) -> impl Iterator<Item = (RangeKey, BaseId, &AddressRange)> {
        self.pools.iter().flat_map(|(key, bases)| {
            bases.iter().map(move |(base, range)| (*key, *base, range))
        })
    }
}
