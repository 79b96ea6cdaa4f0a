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
//! Billing-period reconciliation.

use crate::period::Period;

/// Tolerance for upstream floating-point drift. Balance figures within this
/// distance of an integer are treated as exactly that integer.
pub const BALANCE_EPSILON: f64 = 1e-4;

/// A client's accumulated balance, in fractional periods.
///
/// Debt and credit are not expected to coexist; when upstream drift produces
/// both, debt is treated as authoritative (see [ReconciledStatus::conflicting_balance]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BillingBalance {
    debt_months: f64,
    paid_months_ahead: f64,
}

impl BillingBalance {
    /// Creates a balance, normalizing ill-defined figures.
    ///
    /// Non-finite or negative inputs from upstream are normalized to zero,
    /// so the reconciler only ever sees well-defined non-negative reals.
    pub fn new(debt_months: f64, paid_months_ahead: f64) -> Self {
        Self {
            debt_months: sanitize(debt_months),
            paid_months_ahead: sanitize(paid_months_ahead),
        }
    }

    /// Periods owed.
    pub fn debt_months(&self) -> f64 {
        self.debt_months
    }

    /// Periods prepaid ahead.
    pub fn paid_months_ahead(&self) -> f64 {
        self.paid_months_ahead
    }
}

fn sanitize(months: f64) -> f64 {
    if months.is_finite() && months > 0.0 {
        months
    } else {
        0.0
    }
}

/// The reconciled billing status of one client, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciledStatus {
    /// The period the balance figures were fetched for.
    pub anchor: Period,
    /// Last period for which the balance is fully settled.
    pub paid_through: Period,
    /// Always exactly one period after [Self::paid_through].
    pub next_due: Period,
    /// The client owes more than [BALANCE_EPSILON] periods.
    pub has_debt: bool,
    /// The client is prepaid ahead. Never set together with `has_debt`;
    /// debt strictly dominates.
    pub has_ahead: bool,
    /// Fractional part of the debt, zero when not applicable.
    pub debt_fraction: f64,
    /// Fractional part of the prepaid credit, zero when not applicable.
    pub ahead_fraction: f64,
    /// Both debt and credit exceeded the tolerance. Debt still governs the
    /// derived periods; this only surfaces the upstream drift.
    pub conflicting_balance: bool,
}

impl ReconciledStatus {
    fn settled(anchor: Period) -> Self {
        Self {
            anchor,
            paid_through: anchor,
            next_due: anchor.add_months(1),
            has_debt: false,
            has_ahead: false,
            debt_fraction: 0.0,
            ahead_fraction: 0.0,
            conflicting_balance: false,
        }
    }
}

/// Derives the paid-through and next-due periods from a balance.
///
/// `monthly_price` is the resolved effective price of the client's governing
/// service. A courtesy service (price zero) suppresses the computation
/// entirely: no debt, no credit, anchored in place.
///
/// For debt, a partial period owed still consumes a full period of
/// not-paid-through status; for credit, a partial prepayment does not yet
/// cover the next full period.
pub fn reconcile(anchor: Period, balance: BillingBalance, monthly_price: f64) -> ReconciledStatus {
    if monthly_price.is_nan() || monthly_price <= BALANCE_EPSILON {
        // Courtesy service, no billing at all.
        return ReconciledStatus::settled(anchor);
    }

    let debt = balance.debt_months();
    let ahead = balance.paid_months_ahead();
    let conflicting_balance = debt > BALANCE_EPSILON && ahead > BALANCE_EPSILON;

    let has_debt = debt > BALANCE_EPSILON;
    let has_ahead = !has_debt && ahead > BALANCE_EPSILON;

    let (paid_through, debt_fraction, ahead_fraction) = if has_debt {
        let (whole, fraction) = split_whole_fraction(debt);
        // A partial period owed rolls back a full period.
        let months_back = whole + u32::from(fraction > BALANCE_EPSILON);
        (anchor.add_months(-(months_back as i32)), fraction, 0.0)
    } else if has_ahead {
        // The fractional prepayment does not advance paid-through.
        let (whole, fraction) = split_whole_fraction(ahead);
        (anchor.add_months(whole as i32), 0.0, fraction)
    } else {
        (anchor, 0.0, 0.0)
    };

    ReconciledStatus {
        anchor,
        paid_through,
        next_due: paid_through.add_months(1),
        has_debt,
        has_ahead,
        debt_fraction,
        ahead_fraction,
        conflicting_balance,
    }
}

/// Splits a non-negative figure into whole periods and remainder, snapping
/// values within [BALANCE_EPSILON] of an integer to that integer.
fn split_whole_fraction(months: f64) -> (u32, f64) {
    let nearest = months.round();
    if (months - nearest).abs() <= BALANCE_EPSILON {
        return (nearest as u32, 0.0);
    }
    let whole = months.floor();
    (whole as u32, months - whole)
}
