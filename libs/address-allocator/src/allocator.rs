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
//! Roster indexing and assignment validation.

use std::collections::{BTreeMap, BTreeSet};

use client_model::{BaseId, ClientRecord, RangeKey};
use thiserror::Error;

use crate::pool::PoolTable;

/// Addresses currently claimed by the roster, keyed by pool.
///
/// A point-in-time snapshot; callers rebuild it after every roster mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignedIndex {
    claims: BTreeMap<RangeKey, BTreeMap<BaseId, BTreeSet<String>>>,
}

impl AssignedIndex {
    /// Builds the index by scanning the roster once.
    ///
    /// Every non-empty address field relevant to a client's kind is claimed
    /// under (field's range key, client's base). Clients missing a field are
    /// skipped for that field only.
    pub fn from_roster<'a>(clients: impl IntoIterator<Item = &'a ClientRecord>) -> Self {
        let mut claims: BTreeMap<RangeKey, BTreeMap<BaseId, BTreeSet<String>>> = BTreeMap::new();
        for client in clients {
            for (key, address) in client.address_claims() {
                let pool = claims.entry(key).or_default().entry(client.base).or_default();
                if !pool.insert(address.to_string()) {
                    // Write-time validation should make this impossible.
                    tracing::warn!(
                        client = %client.id,
                        pool = %key,
                        base = %client.base,
                        "address {address} is claimed by more than one client"
                    );
                }
            }
        }
        Self { claims }
    }

    /// Whether the address is claimed in the given pool.
    pub fn contains(&self, key: RangeKey, base: BaseId, address: &str) -> bool {
        self.claimed(key, base)
            .is_some_and(|pool| pool.contains(address))
    }

    /// The claimed addresses of the given pool, if any.
    pub fn claimed(&self, key: RangeKey, base: BaseId) -> Option<&BTreeSet<String>> {
        self.claims.get(&key)?.get(&base)
    }

    /// Total number of claimed addresses across all pools.
    pub fn len(&self) -> usize {
        self.claims
            .values()
            .flat_map(|bases| bases.values())
            .map(|pool| pool.len())
            .sum()
    }

    /// Whether no address is claimed at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Addresses still free per pool, ascending by suffix.
///
/// The ordering is user-facing (it populates selection lists) and matches
/// [crate::pool::AddressRange::expand].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvailableIndex {
    free: BTreeMap<RangeKey, BTreeMap<BaseId, Vec<String>>>,
}

impl AvailableIndex {
    /// The free addresses of the given pool. Unconfigured pools are empty.
    pub fn free(&self, key: RangeKey, base: BaseId) -> &[String] {
        self.free
            .get(&key)
            .and_then(|bases| bases.get(&base))
            .map_or(&[], Vec::as_slice)
    }

    /// All pools with their free addresses, in (range key, base) order.
    pub fn iter(&self) -> impl Iterator<Item = (RangeKey, BaseId, &[String])> {
        self.free.iter().flat_map(|(key, bases)| {
            bases
                .iter()
                .map(move |(base, free)| (*key, *base, free.as_slice()))
        })
    }
}

/// Assignment validation outcomes.
///
/// A closed set of recoverable form errors; none of these escalate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    /// The (range key, base) pair has no configured pool.
    #[error("no address pool configured for ({0}, base {1})")]
    UnknownPool(RangeKey, BaseId),
    /// The candidate does not share the pool's prefix.
    #[error("address {candidate:?} is outside prefix {prefix:?}")]
    OutOfPrefix { candidate: String, prefix: String },
    /// The candidate's suffix is not an integer in the pool's bounds.
    #[error("address {candidate:?} has no suffix in {start}..={end}")]
    OutOfBounds {
        candidate: String,
        start: u32,
        end: u32,
    },
    /// The candidate is already claimed by another client.
    #[error("address {0:?} is already assigned")]
    AlreadyAssigned(String),
}

/// Availability and validity checks over an injected pool table.
///
/// Stateless: all methods are pure functions of the table and the snapshot
/// passed in; nothing is reserved by validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressAllocator {
    table: PoolTable,
}

impl AddressAllocator {
    /// Creates an allocator over the given pool table.
    pub fn new(table: PoolTable) -> Self {
        Self { table }
    }

    /// The pool table this allocator serves.
    pub fn table(&self) -> &PoolTable {
        &self.table
    }

    /// Computes the free addresses of every configured pool.
    ///
    /// Pools with no assigned addresses yield their full range.
    pub fn available(&self, assigned: &AssignedIndex) -> AvailableIndex {
        let mut free: BTreeMap<RangeKey, BTreeMap<BaseId, Vec<String>>> = BTreeMap::new();
        for (key, base, range) in self.table.iter() {
            let remaining = range
                .expand()
                .into_iter()
                .filter(|address| !assigned.contains(key, base, address))
                .collect();
            free.entry(key).or_default().insert(base, remaining);
        }
        AvailableIndex { free }
    }

    /// Validates a proposed assignment against the pool and the snapshot.
    ///
    /// Purely a predicate: the address is not reserved. Callers must
    /// re-validate against the latest snapshot at submit time; the backend
    /// remains the authority on uniqueness.
    pub fn validate(
        &self,
        key: RangeKey,
        base: BaseId,
        candidate: &str,
        assigned: &AssignedIndex,
    ) -> Result<(), AssignmentError> {
        let range = self
            .table
            .range(key, base)
            .ok_or(AssignmentError::UnknownPool(key, base))?;

        let suffix = candidate
            .strip_prefix(range.prefix())
            .ok_or_else(|| AssignmentError::OutOfPrefix {
                candidate: candidate.to_string(),
                prefix: range.prefix().to_string(),
            })?;

        // Plain digits only, so "+7" or "1 " cannot sneak past parse().
        let out_of_bounds = || AssignmentError::OutOfBounds {
            candidate: candidate.to_string(),
            start: range.start(),
            end: range.end(),
        };
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(out_of_bounds());
        }
        let suffix: u32 = suffix.parse().map_err(|_| out_of_bounds())?;
        if suffix < range.start() || suffix > range.end() {
            return Err(out_of_bounds());
        }

        if assigned.contains(key, base, candidate) {
            return Err(AssignmentError::AlreadyAssigned(candidate.to_string()));
        }
        Ok(())
    }

    /// The lowest free address of the given pool, if any.
    ///
    /// Used to preselect a value in assignment forms.
    pub fn first_available(
        &self,
        key: RangeKey,
        base: BaseId,
        assigned: &AssignedIndex,
    ) -> Option<String> {
        self.table.range(key, base)?.expand().into_iter().find(|address| {
            !assigned.contains(key, base, address)
        })
    }
}

#[cfg(test)]
mod tests {
    use client_model::ClientKind;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::pool::AddressRange;

    fn table() -> PoolTable {
        let mut pools: BTreeMap<RangeKey, BTreeMap<BaseId, AddressRange>> = BTreeMap::new();
        pools.entry(RangeKey::Residential).or_default().insert(
            BaseId(1),
            AddressRange::new("192.168.3.", 1, 254).unwrap(),
        );
        pools.entry(RangeKey::Residential).or_default().insert(
            BaseId(2),
            AddressRange::new("192.168.4.", 1, 254).unwrap(),
        );
        pools.entry(RangeKey::TokenAntenna).or_default().insert(
            BaseId(1),
            AddressRange::new("10.20.1.", 2, 30).unwrap(),
        );
        pools.entry(RangeKey::TokenModem).or_default().insert(
            BaseId(1),
            AddressRange::new("10.30.1.", 2, 30).unwrap(),
        );
        PoolTable::new(pools).unwrap()
    }

    fn residential(id: &str, base: u16, ip: &str) -> ClientRecord {
        ClientRecord {
            id: id.to_string(),
            kind: ClientKind::Residential,
            base: BaseId(base),
            ip: (!ip.is_empty()).then(|| ip.to_string()),
            antenna_ip: None,
            modem_ip: None,
            debt_months: 0.0,
            paid_months_ahead: 0.0,
            monthly_price: 300.0,
        }
    }

    fn token(id: &str, base: u16, antenna: &str, modem: &str) -> ClientRecord {
        ClientRecord {
            antenna_ip: (!antenna.is_empty()).then(|| antenna.to_string()),
            modem_ip: (!modem.is_empty()).then(|| modem.to_string()),
            kind: ClientKind::Token,
            ip: None,
            ..residential(id, base, "")
        }
    }

    // Every pool must be partitioned: free + claimed == full range, with no
    // address in both.
    fn check_partition(allocator: &AddressAllocator, assigned: &AssignedIndex) {
        let available = allocator.available(assigned);
        for (key, base, range) in allocator.table().iter() {
            let full = range.expand();
            let free = available.free(key, base);
            let claimed: Vec<_> = assigned
                .claimed(key, base)
                .map(|pool| pool.iter().cloned().collect())
                .unwrap_or_default();
            assert_eq!(
                free.len() + claimed.len(),
                full.len(),
                "pool ({key}, base {base}) lost or duplicated addresses"
            );
            for address in &full {
                let in_free = free.contains(address);
                let in_claimed = claimed.contains(address);
                assert!(
                    in_free != in_claimed,
                    "address {address} must be in exactly one of free/claimed"
                );
            }
        }
    }

    #[test]
    fn index_covers_all_relevant_fields() {
        let roster = vec![
            residential("r-1", 1, "192.168.3.10"),
            residential("r-2", 2, "192.168.4.10"),
            residential("r-3", 1, ""),
            token("t-1", 1, "10.20.1.5", "10.30.1.5"),
            token("t-2", 1, "10.20.1.6", ""),
        ];
        let assigned = AssignedIndex::from_roster(&roster);
        assert_eq!(assigned.len(), 5);
        assert!(assigned.contains(RangeKey::Residential, BaseId(1), "192.168.3.10"));
        assert!(assigned.contains(RangeKey::TokenModem, BaseId(1), "10.30.1.5"));
        // Same suffix, different pool.
        assert!(!assigned.contains(RangeKey::TokenModem, BaseId(1), "10.30.1.6"));
        // Same address string, different base.
        assert!(!assigned.contains(RangeKey::Residential, BaseId(2), "192.168.3.10"));
    }

    #[test]
    fn duplicate_claims_are_indexed_once() {
        let roster = vec![
            residential("r-1", 1, "192.168.3.10"),
            residential("r-2", 1, "192.168.3.10"),
        ];
        let assigned = AssignedIndex::from_roster(&roster);
        assert_eq!(assigned.len(), 1);
    }

    #[test]
    fn untouched_pools_yield_the_full_range() {
        let allocator = AddressAllocator::new(table());
        let assigned = AssignedIndex::from_roster(&[residential("r-1", 1, "192.168.3.10")]);
        let available = allocator.available(&assigned);

        assert_eq!(available.free(RangeKey::Residential, BaseId(2)).len(), 254);
        assert_eq!(available.free(RangeKey::TokenAntenna, BaseId(1)).len(), 29);
        // The touched pool is short exactly the claimed address.
        let free = available.free(RangeKey::Residential, BaseId(1));
        assert_eq!(free.len(), 253);
        assert!(!free.contains(&"192.168.3.10".to_string()));
        // Ordering stays ascending by suffix.
        assert_eq!(free[8], "192.168.3.9");
        assert_eq!(free[9], "192.168.3.11");
    }

    #[test]
    fn validate_rejects_the_closed_error_set() {
        let allocator = AddressAllocator::new(table());
        let assigned = AssignedIndex::from_roster(&[residential("r-1", 1, "192.168.3.10")]);
        let key = RangeKey::Residential;
        let base = BaseId(1);

        assert_eq!(allocator.validate(key, base, "192.168.3.11", &assigned), Ok(()));
        // Boundary suffixes are valid.
        assert_eq!(allocator.validate(key, base, "192.168.3.1", &assigned), Ok(()));
        assert_eq!(allocator.validate(key, base, "192.168.3.254", &assigned), Ok(()));

        assert_eq!(
            allocator.validate(key, base, "192.168.9.11", &assigned),
            Err(AssignmentError::OutOfPrefix {
                candidate: "192.168.9.11".to_string(),
                prefix: "192.168.3.".to_string(),
            })
        );
        for candidate in ["192.168.3.0", "192.168.3.255", "192.168.3.abc", "192.168.3.+7"] {
            assert_eq!(
                allocator.validate(key, base, candidate, &assigned),
                Err(AssignmentError::OutOfBounds {
                    candidate: candidate.to_string(),
                    start: 1,
                    end: 254,
                }),
                "candidate {candidate:?}"
            );
        }
        assert_eq!(
            allocator.validate(key, base, "192.168.3.10", &assigned),
            Err(AssignmentError::AlreadyAssigned("192.168.3.10".to_string()))
        );
        assert_eq!(
            allocator.validate(key, BaseId(9), "192.168.3.11", &assigned),
            Err(AssignmentError::UnknownPool(key, BaseId(9)))
        );
    }

    #[test]
    fn validation_reserves_nothing() {
        let allocator = AddressAllocator::new(table());
        let assigned = AssignedIndex::default();
        for _ in 0..2 {
            assert_eq!(
                allocator.validate(RangeKey::Residential, BaseId(1), "192.168.3.1", &assigned),
                Ok(())
            );
        }
        assert!(assigned.is_empty());
    }

    #[test]
    fn first_available_skips_claimed_addresses() {
        let allocator = AddressAllocator::new(table());
        let roster = vec![
            token("t-1", 1, "10.20.1.2", "10.30.1.2"),
            token("t-2", 1, "10.20.1.3", ""),
        ];
        let assigned = AssignedIndex::from_roster(&roster);
        assert_eq!(
            allocator.first_available(RangeKey::TokenAntenna, BaseId(1), &assigned),
            Some("10.20.1.4".to_string())
        );
        assert_eq!(
            allocator.first_available(RangeKey::TokenModem, BaseId(1), &assigned),
            Some("10.30.1.3".to_string())
        );
        assert_eq!(
            allocator.first_available(RangeKey::TokenModem, BaseId(9), &assigned),
            None
        );
    }

    #[test]
    fn random_rosters_preserve_the_partition_property() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let allocator = AddressAllocator::new(table());

        for _ in 0..50 {
            let mut roster = Vec::new();
            for i in 0..rng.random_range(0..120) {
                let base = rng.random_range(1..=2u16);
                if rng.random_bool(0.5) {
                    let suffix = rng.random_range(1..=254u32);
                    let prefix = if base == 1 { "192.168.3." } else { "192.168.4." };
                    roster.push(residential(&format!("r-{i}"), base, &format!("{prefix}{suffix}")));
                } else {
                    let suffix = rng.random_range(2..=30u32);
                    roster.push(token(
                        &format!("t-{i}"),
                        1,
                        &format!("10.20.1.{suffix}"),
                        &format!("10.30.1.{suffix}"),
                    ));
                }
            }
            let assigned = AssignedIndex::from_roster(&roster);
            check_partition(&allocator, &assigned);

            // Everything the index claims validates as AlreadyAssigned, and
            // every free address validates clean.
            let available = allocator.available(&assigned);
            for (key, base, free) in available.iter() {
                for address in free {
                    assert_eq!(allocator.validate(key, base, address, &assigned), Ok(()));
                }
                if let Some(claimed) = assigned.claimed(key, base) {
                    for address in claimed {
                        assert_eq!(
                            allocator.validate(key, base, address, &assigned),
                            Err(AssignmentError::AlreadyAssigned(address.clone()))
                        );
                    }
                }
            }
        }
    }
}
