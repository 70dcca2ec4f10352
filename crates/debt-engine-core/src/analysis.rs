//! Portfolio-level debt analysis: weighted statistics, extremal loans,
//! health classification, and templated recommendations.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::{portfolio_horizon, project_loan, PayoffHorizon};
use crate::types::{
    with_metadata, ComputationOutput, FinanceSummary, Loan, Money, Percent, Ratio,
};

// Classification thresholds; the first matching rule wins, top down.
const DTI_POOR: Decimal = dec!(0.50);
const DTI_FAIR: Decimal = dec!(0.36);
const DTI_GOOD: Decimal = dec!(0.20);
const RATE_POOR: Decimal = dec!(20);
const RATE_FAIR: Decimal = dec!(10);
const RATE_GOOD: Decimal = dec!(6);
/// Total debt above this multiple of monthly income is Poor on its own.
const INCOME_MULTIPLE_POOR: Decimal = dec!(10);

/// A highest rate more than 1.5x the weighted average reads as "dispersed".
const RATE_DISPERSION_FACTOR: Decimal = dec!(1.5);
/// Disposable income must clear this floor before we suggest an extra payment.
const DISPOSABLE_FLOOR: Decimal = dec!(100);
const DISPOSABLE_EXTRA_SHARE: Decimal = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Overall portfolio debt health, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtHealth {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl fmt::Display for DebtHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtHealth::Excellent => write!(f, "Excellent"),
            DebtHealth::Good => write!(f, "Good"),
            DebtHealth::Fair => write!(f, "Fair"),
            DebtHealth::Poor => write!(f, "Poor"),
        }
    }
}

/// Extremal-loan summary (highest/lowest rate, largest/smallest balance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanHighlight {
    pub loan_id: Uuid,
    pub lender: String,
    pub interest_rate: Percent,
    pub balance: Money,
}

/// Per-loan payoff projection at the loan's own minimum payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPayoffProjection {
    pub loan_id: Uuid,
    pub lender: String,
    pub balance: Money,
    pub monthly_payment: Money,
    pub months_to_payoff: PayoffHorizon,
    pub total_interest: Option<Money>,
    pub payoff_date: Option<DateTime<Utc>>,
}

/// Top-level portfolio summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtAnalysis {
    pub total_debt: Money,
    pub total_monthly_payments: Money,
    /// Average rate weighted by remaining balance.
    pub weighted_average_rate: Percent,
    pub highest_rate_loan: Option<LoanHighlight>,
    pub lowest_rate_loan: Option<LoanHighlight>,
    pub largest_balance_loan: Option<LoanHighlight>,
    pub smallest_balance_loan: Option<LoanHighlight>,
    pub debt_to_income: Ratio,
    /// Latest horizon across the portfolio; `Never` dominates.
    pub months_to_debt_free: PayoffHorizon,
    /// Sum of finite per-loan interest; never-amortizing loans are excluded
    /// and reported in the envelope warnings.
    pub total_remaining_interest: Money,
    pub debt_health: DebtHealth,
    pub recommendations: Vec<String>,
    pub payoff_projections: Vec<LoanPayoffProjection>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze a loan portfolio against the owner's cash position.
///
/// An empty portfolio is a success path: health `Excellent`, every numeric
/// field zero (including the debt-to-income ratio, which the summary may
/// still report for other obligations), and a single congratulatory
/// recommendation.
pub fn analyze_debt(
    loans: &[Loan],
    summary: &FinanceSummary,
    as_of: DateTime<Utc>,
) -> ComputationOutput<DebtAnalysis> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let analysis = if loans.is_empty() {
        empty_portfolio_analysis()
    } else {
        let total_debt: Decimal = loans.iter().map(|l| l.remaining_balance).sum();
        let total_monthly_payments: Decimal = loans.iter().map(|l| l.monthly_payment).sum();

        let weighted_average_rate = if total_debt > Decimal::ZERO {
            loans
                .iter()
                .map(|l| l.interest_rate * l.remaining_balance)
                .sum::<Decimal>()
                / total_debt
        } else {
            Decimal::ZERO
        };

        // One pass over the input order; strict comparisons keep the first
        // loan encountered on ties
        let mut highest_rate = &loans[0];
        let mut lowest_rate = &loans[0];
        let mut largest_balance = &loans[0];
        let mut smallest_balance = &loans[0];
        for loan in &loans[1..] {
            if loan.interest_rate > highest_rate.interest_rate {
                highest_rate = loan;
            }
            if loan.interest_rate < lowest_rate.interest_rate {
                lowest_rate = loan;
            }
            if loan.remaining_balance > largest_balance.remaining_balance {
                largest_balance = loan;
            }
            if loan.remaining_balance < smallest_balance.remaining_balance {
                smallest_balance = loan;
            }
        }

        let mut payoff_projections = Vec::with_capacity(loans.len());
        let mut total_remaining_interest = Decimal::ZERO;
        for loan in loans {
            let projection = project_loan(loan);
            match projection.total_interest {
                Some(interest) => total_remaining_interest += interest,
                None => warnings.push(format!(
                    "{}: payment does not cover the monthly interest accrual; excluded from the remaining-interest total",
                    loan.lender
                )),
            }
            payoff_projections.push(LoanPayoffProjection {
                loan_id: loan.id,
                lender: loan.lender.clone(),
                balance: loan.remaining_balance,
                monthly_payment: loan.monthly_payment,
                months_to_payoff: projection.months,
                total_interest: projection.total_interest,
                payoff_date: projection.months.date_from(as_of),
            });
        }

        let months_to_debt_free =
            portfolio_horizon(payoff_projections.iter().map(|p| p.months_to_payoff));

        let debt_health = classify_health(
            summary.debt_to_income,
            weighted_average_rate,
            total_debt,
            summary.monthly_income,
        );

        let recommendations = build_recommendations(
            debt_health,
            weighted_average_rate,
            highest_rate,
            smallest_balance,
            summary,
        );

        DebtAnalysis {
            total_debt,
            total_monthly_payments,
            weighted_average_rate,
            highest_rate_loan: Some(highlight(highest_rate)),
            lowest_rate_loan: Some(highlight(lowest_rate)),
            largest_balance_loan: Some(highlight(largest_balance)),
            smallest_balance_loan: Some(highlight(smallest_balance)),
            debt_to_income: summary.debt_to_income,
            months_to_debt_free,
            total_remaining_interest,
            debt_health,
            recommendations,
            payoff_projections,
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Portfolio debt analysis (balance-weighted rates, extremal loans, rule-based health classification)",
        &serde_json::json!({
            "loan_count": loans.len(),
            "as_of": as_of.to_rfc3339(),
            "dti_thresholds": {
                "poor": DTI_POOR.to_string(),
                "fair": DTI_FAIR.to_string(),
                "good": DTI_GOOD.to_string(),
            },
            "rate_thresholds_pct": {
                "poor": RATE_POOR.to_string(),
                "fair": RATE_FAIR.to_string(),
                "good": RATE_GOOD.to_string(),
            },
            "income_multiple_poor": INCOME_MULTIPLE_POOR.to_string(),
        }),
        warnings,
        elapsed,
        analysis,
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn empty_portfolio_analysis() -> DebtAnalysis {
    DebtAnalysis {
        total_debt: Decimal::ZERO,
        total_monthly_payments: Decimal::ZERO,
        weighted_average_rate: Decimal::ZERO,
        highest_rate_loan: None,
        lowest_rate_loan: None,
        largest_balance_loan: None,
        smallest_balance_loan: None,
        debt_to_income: Decimal::ZERO,
        months_to_debt_free: PayoffHorizon::Months(0),
        total_remaining_interest: Decimal::ZERO,
        debt_health: DebtHealth::Excellent,
        recommendations: vec![
            "You have no outstanding loans. Great job staying debt-free!".to_string()
        ],
        payoff_projections: Vec::new(),
    }
}

fn classify_health(
    dti: Ratio,
    weighted_rate: Percent,
    total_debt: Money,
    monthly_income: Money,
) -> DebtHealth {
    if dti > DTI_POOR
        || weighted_rate > RATE_POOR
        || total_debt > monthly_income * INCOME_MULTIPLE_POOR
    {
        DebtHealth::Poor
    } else if dti > DTI_FAIR || weighted_rate > RATE_FAIR {
        DebtHealth::Fair
    } else if dti > DTI_GOOD || weighted_rate > RATE_GOOD {
        DebtHealth::Good
    } else {
        DebtHealth::Excellent
    }
}

fn build_recommendations(
    health: DebtHealth,
    weighted_rate: Percent,
    highest_rate: &Loan,
    smallest_balance: &Loan,
    summary: &FinanceSummary,
) -> Vec<String> {
    let mut recommendations = vec![match health {
        DebtHealth::Poor => {
            "Your debt load is critical. Pay down the highest-rate balance first and avoid taking on new debt."
                .to_string()
        }
        DebtHealth::Fair => {
            "Your debt load is elevated. Directing extra payments at high-rate balances will bring interest costs down."
                .to_string()
        }
        DebtHealth::Good => {
            "Your debt load is manageable. Staying consistent with payments keeps you on track."
                .to_string()
        }
        DebtHealth::Excellent => {
            "Your debt is well under control. Keep up the consistent payments.".to_string()
        }
    }];

    if highest_rate.interest_rate > weighted_rate * RATE_DISPERSION_FACTOR {
        recommendations.push(format!(
            "Interest rates vary widely across your loans; prioritizing {} at {}% cuts the most interest.",
            highest_rate.lender, highest_rate.interest_rate
        ));
    } else {
        recommendations.push(format!(
            "Your rates are clustered; paying off {} first (your smallest balance) builds momentum.",
            smallest_balance.lender
        ));
    }

    if summary.disposable_income > DISPOSABLE_FLOOR {
        let extra = (summary.disposable_income * DISPOSABLE_EXTRA_SHARE).normalize();
        recommendations.push(format!(
            "With ${} of monthly disposable income, putting ${} toward debt would speed up your payoff.",
            summary.disposable_income, extra
        ));
    }

    recommendations
}

fn highlight(loan: &Loan) -> LoanHighlight {
    LoanHighlight {
        loan_id: loan.id,
        lender: loan.lender.clone(),
        interest_rate: loan.interest_rate,
        balance: loan.remaining_balance,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn loan(lender: &str, balance: Decimal, rate: Decimal, payment: Decimal) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            lender: lender.to_string(),
            loan_type: crate::types::LoanType::CreditCard,
            original_amount: balance,
            remaining_balance: balance,
            monthly_payment: payment,
            interest_rate: rate,
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        }
    }

    fn summary(dti: Decimal, monthly_income: Decimal, disposable: Decimal) -> FinanceSummary {
        FinanceSummary {
            monthly_income,
            monthly_expenses: monthly_income - disposable,
            disposable_income: disposable,
            debt_to_income: dti,
        }
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    // ---------------------------------------------------------------
    // Weighted average rate
    // ---------------------------------------------------------------
    #[test]
    fn test_weighted_average_rate() {
        let loans = vec![
            loan("A", dec!(1000), dec!(10), dec!(50)),
            loan("B", dec!(3000), dec!(20), dec!(150)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        // (10*1000 + 20*3000) / 4000
        assert_eq!(output.result.weighted_average_rate, dec!(17.5));
    }

    #[test]
    fn test_weighted_rate_zero_when_balances_are_zero() {
        let loans = vec![
            loan("A", Decimal::ZERO, dec!(10), dec!(50)),
            loan("B", Decimal::ZERO, dec!(20), dec!(150)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.weighted_average_rate, Decimal::ZERO);
        assert_eq!(output.result.total_debt, Decimal::ZERO);
    }

    // ---------------------------------------------------------------
    // Extremal loans
    // ---------------------------------------------------------------
    #[test]
    fn test_single_loan_is_every_extreme() {
        let loans = vec![loan("Only", dec!(5000), dec!(12), dec!(200))];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        let analysis = &output.result;

        assert_eq!(analysis.weighted_average_rate, dec!(12));
        let id = loans[0].id;
        assert_eq!(analysis.highest_rate_loan.as_ref().unwrap().loan_id, id);
        assert_eq!(analysis.lowest_rate_loan.as_ref().unwrap().loan_id, id);
        assert_eq!(analysis.largest_balance_loan.as_ref().unwrap().loan_id, id);
        assert_eq!(analysis.smallest_balance_loan.as_ref().unwrap().loan_id, id);
    }

    #[test]
    fn test_extremes_pick_the_right_loans() {
        let loans = vec![
            loan("MidRate", dec!(4000), dec!(12), dec!(200)),
            loan("HotSmall", dec!(1000), dec!(24), dec!(60)),
            loan("ColdBig", dec!(9000), dec!(4), dec!(250)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        let analysis = &output.result;

        assert_eq!(
            analysis.highest_rate_loan.as_ref().unwrap().lender,
            "HotSmall"
        );
        assert_eq!(analysis.lowest_rate_loan.as_ref().unwrap().lender, "ColdBig");
        assert_eq!(
            analysis.largest_balance_loan.as_ref().unwrap().lender,
            "ColdBig"
        );
        assert_eq!(
            analysis.smallest_balance_loan.as_ref().unwrap().lender,
            "HotSmall"
        );
    }

    #[test]
    fn test_extreme_ties_keep_first_loan() {
        let loans = vec![
            loan("First", dec!(3000), dec!(10), dec!(120)),
            loan("Twin", dec!(3000), dec!(10), dec!(120)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        let analysis = &output.result;
        let first = loans[0].id;

        assert_eq!(analysis.highest_rate_loan.as_ref().unwrap().loan_id, first);
        assert_eq!(analysis.lowest_rate_loan.as_ref().unwrap().loan_id, first);
        assert_eq!(
            analysis.largest_balance_loan.as_ref().unwrap().loan_id,
            first
        );
        assert_eq!(
            analysis.smallest_balance_loan.as_ref().unwrap().loan_id,
            first
        );
    }

    // ---------------------------------------------------------------
    // Health classification
    // ---------------------------------------------------------------
    #[test]
    fn test_health_poor_by_dti() {
        let loans = vec![loan("A", dec!(5000), dec!(5), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.55), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.debt_health, DebtHealth::Poor);
    }

    #[test]
    fn test_health_poor_by_rate() {
        let loans = vec![loan("A", dec!(5000), dec!(25), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.debt_health, DebtHealth::Poor);
    }

    #[test]
    fn test_health_poor_by_income_multiple() {
        // 100k of debt against 8k income crosses the 10x line
        let loans = vec![loan("Mortgage", dec!(100_000), dec!(5), dec!(900))];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.debt_health, DebtHealth::Poor);
    }

    #[test]
    fn test_health_fair_by_dti() {
        let loans = vec![loan("A", dec!(5000), dec!(5), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.40), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.debt_health, DebtHealth::Fair);
    }

    #[test]
    fn test_health_fair_by_rate() {
        let loans = vec![loan("A", dec!(5000), dec!(15), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.debt_health, DebtHealth::Fair);
    }

    #[test]
    fn test_health_good_by_dti() {
        let loans = vec![loan("A", dec!(5000), dec!(5), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.25), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.debt_health, DebtHealth::Good);
    }

    #[test]
    fn test_health_excellent_when_everything_is_low() {
        let loans = vec![loan("A", dec!(5000), dec!(5), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(50)), as_of());
        assert_eq!(output.result.debt_health, DebtHealth::Excellent);
    }

    // ---------------------------------------------------------------
    // Empty portfolio
    // ---------------------------------------------------------------
    #[test]
    fn test_no_loans_is_a_success_path() {
        let output = analyze_debt(&[], &summary(dec!(0.30), dec!(8000), dec!(500)), as_of());
        let analysis = &output.result;

        assert_eq!(analysis.debt_health, DebtHealth::Excellent);
        assert_eq!(analysis.total_debt, Decimal::ZERO);
        assert_eq!(analysis.total_monthly_payments, Decimal::ZERO);
        assert_eq!(analysis.weighted_average_rate, Decimal::ZERO);
        assert_eq!(analysis.debt_to_income, Decimal::ZERO);
        assert_eq!(analysis.months_to_debt_free, PayoffHorizon::Months(0));
        assert!(analysis.highest_rate_loan.is_none());
        assert!(analysis.payoff_projections.is_empty());
        assert_eq!(analysis.recommendations.len(), 1);
        assert!(analysis.recommendations[0].contains("debt-free"));
        assert!(output.warnings.is_empty());
    }

    // ---------------------------------------------------------------
    // Never-amortizing loans
    // ---------------------------------------------------------------
    #[test]
    fn test_never_loan_dominates_horizon_and_is_excluded_from_interest() {
        let loans = vec![
            loan("Stuck", dec!(5000), dec!(20), dec!(80)),
            loan("Fine", dec!(8000), dec!(12), dec!(300)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.30), dec!(8000), dec!(50)), as_of());
        let analysis = &output.result;

        assert_eq!(analysis.months_to_debt_free, PayoffHorizon::Never);
        // Only the amortizing loan's 1600 lands in the total
        assert_eq!(analysis.total_remaining_interest, dec!(1600));
        assert_eq!(analysis.payoff_projections[0].payoff_date, None);
        assert!(output.warnings.iter().any(|w| w.contains("Stuck")));
    }

    // ---------------------------------------------------------------
    // Recommendations
    // ---------------------------------------------------------------
    #[test]
    fn test_dispersed_rates_recommend_highest_rate_loan() {
        let loans = vec![
            loan("Hot", dec!(3000), dec!(30), dec!(200)),
            loan("Cold", dec!(3000), dec!(5), dec!(150)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.30), dec!(8000), dec!(50)), as_of());
        // Weighted average is 17.5; 30 > 26.25 counts as dispersed
        assert!(output
            .result
            .recommendations
            .iter()
            .any(|r| r.contains("Hot")));
    }

    #[test]
    fn test_clustered_rates_recommend_smallest_balance() {
        let loans = vec![
            loan("Big", dec!(5000), dec!(10), dec!(250)),
            loan("Little", dec!(2000), dec!(10), dec!(100)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.30), dec!(8000), dec!(50)), as_of());
        assert!(output
            .result
            .recommendations
            .iter()
            .any(|r| r.contains("Little") && r.contains("momentum")));
    }

    #[test]
    fn test_disposable_income_suggests_half_as_extra_payment() {
        let loans = vec![loan("A", dec!(5000), dec!(5), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(400)), as_of());
        assert!(output
            .result
            .recommendations
            .iter()
            .any(|r| r.contains("$200")));
    }

    #[test]
    fn test_low_disposable_income_gets_no_extra_payment_suggestion() {
        let loans = vec![loan("A", dec!(5000), dec!(5), dec!(250))];
        let output = analyze_debt(&loans, &summary(dec!(0.10), dec!(8000), dec!(100)), as_of());
        assert!(!output
            .result
            .recommendations
            .iter()
            .any(|r| r.contains("disposable income")));
    }

    // ---------------------------------------------------------------
    // Totals and projections
    // ---------------------------------------------------------------
    #[test]
    fn test_totals_sum_over_portfolio() {
        let loans = vec![
            loan("A", dec!(1000), dec!(10), dec!(50)),
            loan("B", dec!(3000), dec!(20), dec!(150)),
        ];
        let output = analyze_debt(&loans, &summary(dec!(0.30), dec!(8000), dec!(50)), as_of());

        assert_eq!(output.result.total_debt, dec!(4000));
        assert_eq!(output.result.total_monthly_payments, dec!(200));
        assert_eq!(output.result.debt_to_income, dec!(0.30));
    }

    #[test]
    fn test_payoff_projection_dates_count_from_as_of() {
        let loans = vec![loan("A", dec!(8000), dec!(12), dec!(300))];
        let output = analyze_debt(&loans, &summary(dec!(0.30), dec!(8000), dec!(50)), as_of());
        let projection = &output.result.payoff_projections[0];

        assert_eq!(projection.months_to_payoff, PayoffHorizon::Months(32));
        let expected = Utc.with_ymd_and_hms(2028, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(projection.payoff_date, Some(expected));
    }
}
