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
//! # Client Model
//!
//! Shared domain types for the client administration core.
//!
//! A [ClientRecord] is the subset of a client record (owned by the external
//! CRUD store) that the core components consume: identity, site, the address
//! fields relevant to the client kind, and the billing balance figures.

use std::{fmt, fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a physical base/site. Each base owns its own address
/// sub-pool per range key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct BaseId(pub u16);

impl Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BaseId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BaseId(s.parse()?))
    }
}

/// Semantic category of an address pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangeKey {
    /// Addresses handed out to residential clients.
    Residential,
    /// Antenna addresses of token clients.
    TokenAntenna,
    /// Modem addresses of token clients.
    TokenModem,
}

impl RangeKey {
    const ALL: [RangeKey; 3] = [
        RangeKey::Residential,
        RangeKey::TokenAntenna,
        RangeKey::TokenModem,
    ];

    /// All range keys, in index order.
    pub fn all() -> impl Iterator<Item = RangeKey> {
        Self::ALL.into_iter()
    }

    fn as_str(&self) -> &'static str {
        match self {
            RangeKey::Residential => "residential",
            RangeKey::TokenAntenna => "token-antenna",
            RangeKey::TokenModem => "token-modem",
        }
    }
}

impl Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range key parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeKeyParseError {
    /// Not one of the known range keys.
    #[error("unknown range key {0:?}")]
    UnknownRangeKey(String),
}

impl FromStr for RangeKey {
    type Err = RangeKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeKey::all()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| RangeKeyParseError::UnknownRangeKey(s.to_string()))
    }
}

/// The kind of a client, which determines the address fields it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// A residential client with a single IP.
    Residential,
    /// A token client with an antenna IP and a modem IP.
    Token,
}

/// The subset of a client record relevant to addressing and billing.
///
/// Field casing follows the backend wire format (camelCase). Missing address
/// fields deserialize to `None`; missing balance figures default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    /// Unique identifier of the client.
    pub id: String,
    /// The kind of the client.
    #[serde(rename = "type")]
    pub kind: ClientKind,
    /// The base the client is served from.
    pub base: BaseId,
    /// Residential IP. Only meaningful for [ClientKind::Residential].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Antenna IP. Only meaningful for [ClientKind::Token].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antenna_ip: Option<String>,
    /// Modem IP. Only meaningful for [ClientKind::Token].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modem_ip: Option<String>,
    /// Accumulated periods owed, as reported by the backend.
    #[serde(default)]
    pub debt_months: f64,
    /// Accumulated periods prepaid ahead, as reported by the backend.
    #[serde(default)]
    pub paid_months_ahead: f64,
    /// Resolved effective monthly price of the governing service. Zero marks
    /// a courtesy service.
    #[serde(default)]
    pub monthly_price: f64,
}

impl ClientRecord {
    /// The (range key, address) pairs this client currently claims.
    ///
    /// Only fields relevant to the client kind are considered; empty or
    /// missing fields are skipped without error.
    pub fn address_claims(&self) -> impl Iterator<Item = (RangeKey, &str)> {
        let fields = match self.kind {
            ClientKind::Residential => vec![(RangeKey::Residential, self.ip.as_deref())],
            ClientKind::Token => vec![
                (RangeKey::TokenAntenna, self.antenna_ip.as_deref()),
                (RangeKey::TokenModem, self.modem_ip.as_deref()),
            ],
        };
        fields.into_iter().filter_map(|(key, addr)| match addr {
            Some(addr) if !addr.is_empty() => Some((key, addr)),
            _ => None,
        })
    }
}
