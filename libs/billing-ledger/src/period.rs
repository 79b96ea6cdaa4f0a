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
//! Calendar periods.

use std::{fmt, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A calendar period (year and month), totally ordered.
///
/// Serializes as `"YYYY-MM"`, matching the backend wire format. The derived
/// ordering is chronological because `year` precedes `month`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    // Invariant: 1..=12.
    month: u8,
}

/// Period construction and parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// Month outside 1..=12.
    #[error("month {0} out of range 1..=12")]
    MonthOutOfRange(u8),
    /// Not of the form "YYYY-MM".
    #[error("period {0:?} is not of the form \"YYYY-MM\"")]
    Malformed(String),
}

impl Period {
    /// Creates a period, validating the month.
    pub fn new(year: i32, month: u8) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The year of the period.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the period (1..=12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Shifts the period by `delta` months, in either direction.
    ///
    /// Total over all deltas and inverse-consistent:
    /// `p.add_months(n).add_months(-n) == p`. Year boundaries roll over via
    /// euclidean arithmetic, so there is no failure mode.
    pub fn add_months(self, delta: i32) -> Self {
        let months = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        Self {
            year: months.div_euclid(12) as i32,
            month: (months.rem_euclid(12) + 1) as u8,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodError::Malformed(s.to_string());
        // rsplit so negative years ("-1-12") keep their sign with the year.
        let (year, month) = s.rsplit_once('-').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u8 = month.parse().map_err(|_| malformed())?;
        Period::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}
