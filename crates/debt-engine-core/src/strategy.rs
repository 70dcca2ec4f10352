//! Payoff-strategy simulation: avalanche and snowball payment plans, a
//! recommendation heuristic between them, and a strategy-agnostic
//! interest-savings projection.
//!
//! Both named strategies put the whole extra budget on a single priority
//! loan and project every loan independently with the closed-form
//! amortizer. Freed-up minimum payments do not roll over into the next
//! loan after a payoff; the figures are conservative for the back half of
//! the schedule.
//!
//! The savings projection is a different policy on purpose: it spreads the
//! extra budget across all loans in proportion to balance. The two answer
//! different questions and are kept as separate operations.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::{
    ceil_to_u32, payoff_horizon, portfolio_horizon, project_loan, total_interest, LoanProjection,
    PayoffHorizon,
};
use crate::types::{with_metadata, ComputationOutput, FinanceSummary, Loan, Money, Percent};

/// Avalanche wins the recommendation when it saves this much more interest.
const AVALANCHE_INTEREST_THRESHOLD: Decimal = dec!(500);
/// Avalanche wins the recommendation when it clears the portfolio this many
/// months sooner.
const AVALANCHE_MONTHS_THRESHOLD: i64 = 6;
/// Above this debt-to-income ratio the heuristic always picks avalanche.
const HIGH_DTI_THRESHOLD: Decimal = dec!(0.50);
/// Suggested extra payment as a share of total minimum payments.
const SUGGESTED_EXTRA_SHARE: Decimal = dec!(0.125);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Extra-payment allocation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Highest interest rate first.
    Avalanche,
    /// Smallest remaining balance first.
    Snowball,
    /// Empty portfolio; nothing to allocate.
    NoDebt,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Avalanche => write!(f, "Avalanche"),
            StrategyKind::Snowball => write!(f, "Snowball"),
            StrategyKind::NoDebt => write!(f, "No Debt"),
        }
    }
}

/// Per-loan plan within a strategy, ordered by payoff priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPaymentPlan {
    pub loan_id: Uuid,
    pub lender: String,
    pub balance: Money,
    pub interest_rate: Percent,
    pub minimum_payment: Money,
    /// Minimum plus any allocated extra.
    pub recommended_payment: Money,
    /// 1-based position in the strategy's priority order.
    pub payoff_order: u32,
    pub months_to_payoff: PayoffHorizon,
    /// `None` when the loan never amortizes at the recommended payment.
    pub total_interest: Option<Money>,
    pub payoff_date: Option<DateTime<Utc>>,
}

/// A full payoff strategy for one portfolio snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStrategy {
    pub strategy_type: StrategyKind,
    pub extra_payment: Money,
    pub payment_plans: Vec<LoanPaymentPlan>,
    /// Interest saved vs. the zero-extra baseline; `None` when the extra
    /// payment rescues a loan that would never amortize (unbounded saving).
    pub total_interest_saved: Option<Money>,
    /// Months shaved off the portfolio horizon vs. the baseline; `None`
    /// when the baseline horizon was `Never` and the strategy is finite.
    pub months_saved: Option<u32>,
    /// Sum of all minimum payments plus the extra budget.
    pub total_monthly_payment: Money,
    pub debt_free_date: Option<DateTime<Utc>>,
    pub reason: String,
}

/// Strategy-agnostic projection of what an extra monthly budget buys,
/// spread across the portfolio in proportion to remaining balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestSavings {
    pub current_total_interest: Option<Money>,
    pub new_total_interest: Option<Money>,
    pub interest_saved: Option<Money>,
    pub current_debt_free_date: Option<DateTime<Utc>>,
    pub new_debt_free_date: Option<DateTime<Utc>>,
    pub months_saved: Option<u32>,
    /// Months of extra payments before they equal the interest saved.
    pub break_even_months: Option<u32>,
    pub suggested_extra_payment: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Avalanche payment plan: the whole extra budget goes to the
/// highest-rate loan, everything else pays its own minimum.
pub fn avalanche_strategy(
    loans: &[Loan],
    extra_payment: Money,
    as_of: DateTime<Utc>,
) -> ComputationOutput<PaymentStrategy> {
    let start = Instant::now();
    let (strategy, warnings) = build(loans, extra_payment, StrategyKind::Avalanche, as_of);
    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Avalanche payoff (rate-descending priority, per-loan closed-form amortization, no cascading rollover)",
        &serde_json::json!({
            "extra_payment": strategy.extra_payment.to_string(),
            "loan_count": loans.len(),
            "baseline": "each loan at its own minimum payment",
        }),
        warnings,
        elapsed,
        strategy,
    )
}

/// Snowball payment plan: the whole extra budget goes to the
/// smallest-balance loan, everything else pays its own minimum.
pub fn snowball_strategy(
    loans: &[Loan],
    extra_payment: Money,
    as_of: DateTime<Utc>,
) -> ComputationOutput<PaymentStrategy> {
    let start = Instant::now();
    let (strategy, warnings) = build(loans, extra_payment, StrategyKind::Snowball, as_of);
    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Snowball payoff (balance-ascending priority, per-loan closed-form amortization, no cascading rollover)",
        &serde_json::json!({
            "extra_payment": strategy.extra_payment.to_string(),
            "loan_count": loans.len(),
            "baseline": "each loan at its own minimum payment",
        }),
        warnings,
        elapsed,
        strategy,
    )
}

/// Recommend avalanche or snowball for this portfolio.
///
/// A debt-to-income ratio above 0.50 always picks avalanche (interest
/// minimization over momentum). Otherwise avalanche wins when it saves
/// more than 500 in interest or more than 6 months vs. snowball; anything
/// closer goes to snowball for the psychological payoff cadence.
pub fn suggest_payment_strategy(
    loans: &[Loan],
    summary: &FinanceSummary,
    extra_payment: Money,
    as_of: DateTime<Utc>,
) -> ComputationOutput<PaymentStrategy> {
    let start = Instant::now();
    let (avalanche, avalanche_warnings) = build(loans, extra_payment, StrategyKind::Avalanche, as_of);
    let (snowball, snowball_warnings) = build(loans, extra_payment, StrategyKind::Snowball, as_of);

    let (chosen, warnings) = if avalanche.strategy_type == StrategyKind::NoDebt {
        (avalanche, avalanche_warnings)
    } else if summary.debt_to_income > HIGH_DTI_THRESHOLD {
        let mut strategy = avalanche;
        strategy.reason = format!(
            "Debt-to-income ratio {} is above {}; minimizing interest takes priority over payoff momentum.",
            summary.debt_to_income.round_dp(2),
            HIGH_DTI_THRESHOLD
        );
        (strategy, avalanche_warnings)
    } else {
        match preferred_strategy(&avalanche, &snowball) {
            Preference::Avalanche(reason) => {
                let mut strategy = avalanche;
                strategy.reason = reason;
                (strategy, avalanche_warnings)
            }
            Preference::Snowball(reason) => {
                let mut strategy = snowball;
                strategy.reason = reason;
                (strategy, snowball_warnings)
            }
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Strategy recommendation (avalanche vs. snowball with a debt-to-income gate)",
        &serde_json::json!({
            "extra_payment": extra_payment.max(Decimal::ZERO).to_string(),
            "debt_to_income": summary.debt_to_income.to_string(),
            "high_dti_threshold": HIGH_DTI_THRESHOLD.to_string(),
            "interest_threshold": AVALANCHE_INTEREST_THRESHOLD.to_string(),
            "months_threshold": AVALANCHE_MONTHS_THRESHOLD,
        }),
        warnings,
        elapsed,
        chosen,
    )
}

/// Project what an extra monthly budget buys when spread across all loans
/// in proportion to their remaining balances.
pub fn interest_savings(
    loans: &[Loan],
    extra_payment: Money,
    as_of: DateTime<Utc>,
) -> ComputationOutput<InterestSavings> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let extra = extra_payment.max(Decimal::ZERO);

    let total_balance: Decimal = loans.iter().map(|l| l.remaining_balance).sum();
    let total_minimums: Decimal = loans.iter().map(|l| l.monthly_payment).sum();

    let mut current_total = Some(Decimal::ZERO);
    let mut new_total = Some(Decimal::ZERO);
    let mut saved = Some(Decimal::ZERO);
    let mut current_horizons = Vec::with_capacity(loans.len());
    let mut new_horizons = Vec::with_capacity(loans.len());

    for loan in loans {
        let share = proportional_share(extra, loan.remaining_balance, total_balance);
        let boosted = loan.monthly_payment + share;

        let current = project_loan(loan);
        let new_months = payoff_horizon(loan.remaining_balance, loan.interest_rate, boosted);
        let new_interest = total_interest(loan.remaining_balance, loan.interest_rate, boosted);

        accumulate(&mut current_total, current.total_interest);
        accumulate(&mut new_total, new_interest);

        match (current.total_interest, new_interest) {
            (Some(before), Some(after)) => {
                if let Some(total) = saved.as_mut() {
                    *total += before - after;
                }
            }
            (None, Some(_)) => {
                warnings.push(format!(
                    "{}: the extra payment makes a never-amortizing loan payable, so interest savings are unbounded",
                    loan.lender
                ));
                saved = None;
            }
            (_, None) => {
                warnings.push(format!(
                    "{}: payment does not cover the monthly interest accrual even with the extra share; the balance never amortizes",
                    loan.lender
                ));
            }
        }

        current_horizons.push(current.months);
        new_horizons.push(new_months);
    }

    let current_horizon = portfolio_horizon(current_horizons);
    let new_horizon = portfolio_horizon(new_horizons);
    let months_saved = months_saved_between(current_horizon, new_horizon, &mut warnings);

    let break_even_months = match (extra > Decimal::ZERO, saved) {
        (true, Some(s)) => Some(ceil_to_u32(s / extra)),
        _ => None,
    };

    let savings = InterestSavings {
        current_total_interest: current_total,
        new_total_interest: new_total,
        interest_saved: saved,
        current_debt_free_date: current_horizon.date_from(as_of),
        new_debt_free_date: new_horizon.date_from(as_of),
        months_saved,
        break_even_months,
        suggested_extra_payment: total_minimums * SUGGESTED_EXTRA_SHARE,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Interest savings projection (extra payment distributed in proportion to remaining balances)",
        &serde_json::json!({
            "extra_payment": extra.to_string(),
            "distribution": "proportional to remaining balance",
            "loan_count": loans.len(),
            "suggested_extra_share": SUGGESTED_EXTRA_SHARE.to_string(),
        }),
        warnings,
        elapsed,
        savings,
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build(
    loans: &[Loan],
    extra_payment: Money,
    kind: StrategyKind,
    as_of: DateTime<Utc>,
) -> (PaymentStrategy, Vec<String>) {
    let extra = extra_payment.max(Decimal::ZERO);
    if loans.is_empty() {
        return (no_debt_strategy(extra, as_of), Vec::new());
    }

    let mut warnings: Vec<String> = Vec::new();

    let mut ordered: Vec<&Loan> = loans.iter().collect();
    match kind {
        StrategyKind::Avalanche => {
            ordered.sort_by(|a, b| b.interest_rate.cmp(&a.interest_rate));
        }
        StrategyKind::Snowball => {
            ordered.sort_by(|a, b| a.remaining_balance.cmp(&b.remaining_balance));
        }
        StrategyKind::NoDebt => {}
    }

    // Baseline in the portfolio's own order: every loan at its own minimum
    let baseline: HashMap<Uuid, LoanProjection> =
        loans.iter().map(|l| (l.id, project_loan(l))).collect();

    let mut plans = Vec::with_capacity(ordered.len());
    for (idx, loan) in ordered.iter().enumerate() {
        // The whole budget goes to the priority loan; no split, no rollover
        let boost = if idx == 0 { extra } else { Decimal::ZERO };
        let payment = loan.monthly_payment + boost;
        let months = payoff_horizon(loan.remaining_balance, loan.interest_rate, payment);
        let interest = total_interest(loan.remaining_balance, loan.interest_rate, payment);
        if months.is_never() {
            warnings.push(format!(
                "{}: payment {} does not cover the monthly interest accrual; the balance never amortizes",
                loan.lender, payment
            ));
        }
        plans.push(LoanPaymentPlan {
            loan_id: loan.id,
            lender: loan.lender.clone(),
            balance: loan.remaining_balance,
            interest_rate: loan.interest_rate,
            minimum_payment: loan.monthly_payment,
            recommended_payment: payment,
            payoff_order: (idx + 1) as u32,
            months_to_payoff: months,
            total_interest: interest,
            payoff_date: months.date_from(as_of),
        });
    }

    let total_interest_saved = interest_saved_vs_baseline(&plans, &baseline, &mut warnings);

    let baseline_horizon = portfolio_horizon(baseline.values().map(|p| p.months));
    let strategy_horizon = portfolio_horizon(plans.iter().map(|p| p.months_to_payoff));
    let months_saved = months_saved_between(baseline_horizon, strategy_horizon, &mut warnings);

    let total_monthly_payment = loans.iter().map(|l| l.monthly_payment).sum::<Decimal>() + extra;

    let reason = match kind {
        StrategyKind::Avalanche => {
            "Directing the extra payment at the highest-rate loan minimizes total interest paid."
        }
        StrategyKind::Snowball => {
            "Directing the extra payment at the smallest balance clears loans sooner and builds momentum."
        }
        StrategyKind::NoDebt => "No outstanding loans.",
    }
    .to_string();

    (
        PaymentStrategy {
            strategy_type: kind,
            extra_payment: extra,
            payment_plans: plans,
            total_interest_saved,
            months_saved,
            total_monthly_payment,
            debt_free_date: strategy_horizon.date_from(as_of),
            reason,
        },
        warnings,
    )
}

fn no_debt_strategy(extra: Money, as_of: DateTime<Utc>) -> PaymentStrategy {
    PaymentStrategy {
        strategy_type: StrategyKind::NoDebt,
        extra_payment: extra,
        payment_plans: Vec::new(),
        total_interest_saved: Some(Decimal::ZERO),
        months_saved: Some(0),
        total_monthly_payment: Decimal::ZERO,
        debt_free_date: Some(as_of),
        reason: "No outstanding loans. You are already debt-free.".to_string(),
    }
}

/// Sum per-loan interest deltas against the baseline. A loan the extra
/// payment rescues from `Never` makes the total unbounded (`None`); a loan
/// that stays never-amortizing contributes nothing.
fn interest_saved_vs_baseline(
    plans: &[LoanPaymentPlan],
    baseline: &HashMap<Uuid, LoanProjection>,
    warnings: &mut Vec<String>,
) -> Option<Money> {
    let mut saved = Some(Decimal::ZERO);
    for plan in plans {
        let base = match baseline.get(&plan.loan_id) {
            Some(projection) => projection,
            None => continue,
        };
        match (base.total_interest, plan.total_interest) {
            (Some(before), Some(after)) => {
                if let Some(total) = saved.as_mut() {
                    *total += before - after;
                }
            }
            (None, Some(_)) => {
                warnings.push(format!(
                    "{}: the extra payment makes a never-amortizing loan payable, so interest savings are unbounded",
                    plan.lender
                ));
                saved = None;
            }
            (_, None) => {}
        }
    }
    saved
}

fn months_saved_between(
    baseline: PayoffHorizon,
    strategy: PayoffHorizon,
    warnings: &mut Vec<String>,
) -> Option<u32> {
    match (baseline, strategy) {
        (PayoffHorizon::Months(before), PayoffHorizon::Months(after)) => {
            Some(before.saturating_sub(after))
        }
        (PayoffHorizon::Never, PayoffHorizon::Never) => Some(0),
        (PayoffHorizon::Never, PayoffHorizon::Months(_)) => {
            warnings.push(
                "the extra payment turns a never-amortizing portfolio into a payable one; months saved are unbounded"
                    .to_string(),
            );
            None
        }
        // A boosted payment never extends a horizon
        (PayoffHorizon::Months(_), PayoffHorizon::Never) => Some(0),
    }
}

/// Add a per-loan figure into a running total; an unbounded component makes
/// the whole total unbounded.
fn accumulate(total: &mut Option<Money>, item: Option<Money>) {
    match item {
        Some(value) => {
            if let Some(t) = total.as_mut() {
                *t += value;
            }
        }
        None => *total = None,
    }
}

/// Slice of the extra budget allocated to one loan, proportional to its
/// share of the total balance.
pub(crate) fn proportional_share(extra: Money, balance: Money, total_balance: Money) -> Money {
    if total_balance <= Decimal::ZERO || balance <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    extra * balance / total_balance
}

enum Preference {
    Avalanche(String),
    Snowball(String),
}

fn preferred_strategy(avalanche: &PaymentStrategy, snowball: &PaymentStrategy) -> Preference {
    // Unbounded savings beat any finite figure: rescuing a loan that would
    // never amortize wins outright.
    match (avalanche.total_interest_saved, snowball.total_interest_saved) {
        (None, Some(_)) => {
            return Preference::Avalanche(
                "Avalanche rescues a loan that would never amortize at its minimum payment."
                    .to_string(),
            )
        }
        (Some(_), None) => {
            return Preference::Snowball(
                "Snowball rescues a loan that would never amortize at its minimum payment."
                    .to_string(),
            )
        }
        _ => {}
    }
    match (avalanche.months_saved, snowball.months_saved) {
        (None, Some(_)) => {
            return Preference::Avalanche(
                "Avalanche makes a never-amortizing portfolio payable.".to_string(),
            )
        }
        (Some(_), None) => {
            return Preference::Snowball(
                "Snowball makes a never-amortizing portfolio payable.".to_string(),
            )
        }
        _ => {}
    }

    let interest_diff = match (avalanche.total_interest_saved, snowball.total_interest_saved) {
        (Some(a), Some(s)) => a - s,
        _ => Decimal::ZERO,
    };
    let months_diff = match (avalanche.months_saved, snowball.months_saved) {
        (Some(a), Some(s)) => i64::from(a) - i64::from(s),
        _ => 0,
    };

    if interest_diff > AVALANCHE_INTEREST_THRESHOLD {
        return Preference::Avalanche(format!(
            "Avalanche saves ${} more in interest than snowball.",
            interest_diff.round_dp(2)
        ));
    }
    if months_diff > AVALANCHE_MONTHS_THRESHOLD {
        return Preference::Avalanche(format!(
            "Avalanche reaches debt freedom {} months sooner than snowball.",
            months_diff
        ));
    }
    Preference::Snowball(
        "Snowball's quick early payoffs build momentum at a comparable financial cost.".to_string(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
