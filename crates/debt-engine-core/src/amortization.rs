//! Loan amortization primitives: minimum-payment formula, payoff-horizon
//! projection, and total-interest estimation.
//!
//! Every function here is total. Non-positive balances, payments, or terms
//! are clamped to a zero result instead of erroring; callers that need to
//! reject bad input must do so before calling in.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Loan, Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether and when a fixed-payment loan reaches zero balance.
///
/// `Never` means the payment does not cover the monthly interest accrual, so
/// the balance can only grow. Variant order gives `Never` an `Ord` position
/// above every finite horizon, which lets it dominate max-aggregations across
/// a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffHorizon {
    Months(u32),
    Never,
}

impl PayoffHorizon {
    /// Finite month count, `None` for `Never`.
    pub fn months(self) -> Option<u32> {
        match self {
            PayoffHorizon::Months(m) => Some(m),
            PayoffHorizon::Never => None,
        }
    }

    pub fn is_never(self) -> bool {
        matches!(self, PayoffHorizon::Never)
    }

    /// Calendar date this horizon lands on, counted from `as_of`.
    pub fn date_from(self, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.months().map(|m| {
            as_of
                .checked_add_months(chrono::Months::new(m))
                .unwrap_or(as_of)
        })
    }
}

impl std::fmt::Display for PayoffHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoffHorizon::Months(m) => write!(f, "{} months", m),
            PayoffHorizon::Never => write!(f, "never"),
        }
    }
}

/// Months and interest for a loan held at a given payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoanProjection {
    pub months: PayoffHorizon,
    pub total_interest: Option<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly compounding rate from an annual percentage rate (12 -> 0.01).
/// Negative rates clamp to zero.
pub fn monthly_rate(annual_pct: Percent) -> Decimal {
    (annual_pct / dec!(12) / dec!(100)).max(Decimal::ZERO)
}

/// Fixed monthly payment that amortizes `principal` over `term_months` at
/// `annual_pct`: `P * i * (1+i)^n / ((1+i)^n - 1)`. Zero-rate loans pay
/// straight principal; non-positive principal or zero term returns 0.
pub fn minimum_payment(principal: Money, annual_pct: Percent, term_months: u32) -> Money {
    if principal <= Decimal::ZERO || term_months == 0 {
        return Decimal::ZERO;
    }
    let i = monthly_rate(annual_pct);
    if i.is_zero() {
        return principal / Decimal::from(term_months);
    }
    let factor = compound(i, term_months);
    principal * i * factor / (factor - Decimal::ONE)
}

/// Number of monthly payments until `balance` reaches zero:
/// `ceil(-ln(1 - B*i/P) / ln(1+i))`.
///
/// Non-positive balance or payment returns `Months(0)`. A payment at or
/// below the monthly interest accrual returns `Never`; that guard runs
/// before any log, so the log argument is always in (0, 1).
pub fn payoff_horizon(balance: Money, annual_pct: Percent, payment: Money) -> PayoffHorizon {
    if balance <= Decimal::ZERO || payment <= Decimal::ZERO {
        return PayoffHorizon::Months(0);
    }
    let i = monthly_rate(annual_pct);
    if i.is_zero() {
        return PayoffHorizon::Months(ceil_to_u32(balance / payment));
    }
    let monthly_interest = balance * i;
    if payment <= monthly_interest {
        return PayoffHorizon::Never;
    }
    let months = -(Decimal::ONE - monthly_interest / payment).ln() / (Decimal::ONE + i).ln();
    PayoffHorizon::Months(ceil_to_u32(months))
}

/// Total interest paid over the life of the loan, estimated as
/// `months * payment - balance`. The final month is counted as a full
/// payment; the resulting overshoot is part of the estimate.
///
/// Returns `Some(0)` for degenerate input and `None` when the loan never
/// amortizes (interest accrues indefinitely).
pub fn total_interest(balance: Money, annual_pct: Percent, payment: Money) -> Option<Money> {
    if balance <= Decimal::ZERO || payment <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    match payoff_horizon(balance, annual_pct, payment) {
        PayoffHorizon::Months(m) => Some(Decimal::from(m) * payment - balance),
        PayoffHorizon::Never => None,
    }
}

/// Residual balance after `months` fixed payments:
/// `B*(1+i)^m - P*((1+i)^m - 1)/i`, floored at zero.
pub fn remaining_balance_after(
    balance: Money,
    annual_pct: Percent,
    payment: Money,
    months: u32,
) -> Money {
    if balance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let i = monthly_rate(annual_pct);
    let residual = if i.is_zero() {
        balance - payment * Decimal::from(months)
    } else {
        let factor = compound(i, months);
        balance * factor - payment * (factor - Decimal::ONE) / i
    };
    residual.max(Decimal::ZERO)
}

/// Horizon and interest for a loan held at its own minimum payment.
pub fn project_loan(loan: &Loan) -> LoanProjection {
    LoanProjection {
        months: payoff_horizon(
            loan.remaining_balance,
            loan.interest_rate,
            loan.monthly_payment,
        ),
        total_interest: total_interest(
            loan.remaining_balance,
            loan.interest_rate,
            loan.monthly_payment,
        ),
    }
}

/// Portfolio-wide horizon: the latest individual horizon, with `Never`
/// dominating. An empty portfolio is already paid off.
pub fn portfolio_horizon<I>(horizons: I) -> PayoffHorizon
where
    I: IntoIterator<Item = PayoffHorizon>,
{
    horizons
        .into_iter()
        .max()
        .unwrap_or(PayoffHorizon::Months(0))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub(crate) fn compound(rate: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Ceiling conversion for month counts; saturates rather than panicking.
pub(crate) fn ceil_to_u32(value: Decimal) -> u32 {
    value.ceil().to_u32().unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
