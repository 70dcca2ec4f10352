use chrono::{NaiveDate, Utc};
use debt_engine_core::amortization::PayoffHorizon;
use debt_engine_core::analysis::DebtHealth;
use debt_engine_core::strategy::StrategyKind;
use debt_engine_core::types::{FinanceSummary, Loan, LoanType};
use debt_engine_core::{BoxError, DebtCalculator, DebtEngineError, FinanceService};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

// ===========================================================================
// A fixture collaborator standing in for the persistence layer
// ===========================================================================

struct InMemoryFinance {
    loans: Vec<Loan>,
    summary: FinanceSummary,
}

impl FinanceService for InMemoryFinance {
    fn user_loans(&self, _user_id: Uuid) -> Result<Vec<Loan>, BoxError> {
        Ok(self.loans.clone())
    }

    fn finance_summary(&self, _user_id: Uuid) -> Result<FinanceSummary, BoxError> {
        Ok(self.summary.clone())
    }
}

fn loan(lender: &str, balance: Decimal, rate: Decimal, payment: Decimal) -> Loan {
    Loan {
        id: Uuid::new_v4(),
        lender: lender.to_string(),
        loan_type: LoanType::Personal,
        original_amount: balance,
        remaining_balance: balance,
        monthly_payment: payment,
        interest_rate: rate,
        end_date: NaiveDate::from_ymd_opt(2031, 6, 1).unwrap(),
    }
}

fn household_calculator(dti: Decimal) -> DebtCalculator<InMemoryFinance> {
    DebtCalculator::new(InMemoryFinance {
        loans: vec![
            loan("Visa", dec!(4500), dec!(22.9), dec!(180)),
            loan("AutoBank", dec!(14_000), dec!(6.5), dec!(410)),
            loan("EduLend", dec!(22_000), dec!(4.8), dec!(310)),
        ],
        summary: FinanceSummary {
            monthly_income: dec!(7200),
            monthly_expenses: dec!(5300),
            disposable_income: dec!(1900),
            debt_to_income: dti,
        },
    })
}

fn debt_free_calculator() -> DebtCalculator<InMemoryFinance> {
    DebtCalculator::new(InMemoryFinance {
        loans: Vec::new(),
        summary: FinanceSummary {
            monthly_income: dec!(7200),
            monthly_expenses: dec!(5300),
            disposable_income: dec!(1900),
            debt_to_income: Decimal::ZERO,
        },
    })
}

// ===========================================================================
// End-to-end facade flows
// ===========================================================================

#[test]
fn test_total_debt_over_the_household() {
    let calc = household_calculator(dec!(0.125));
    assert_eq!(calc.total_debt(Uuid::new_v4()).unwrap(), dec!(40_500));
}

#[test]
fn test_debt_free_date_is_the_slowest_loan() {
    let calc = household_calculator(dec!(0.125));
    let projection = calc.project_debt_free_date(Uuid::new_v4()).unwrap();

    // EduLend at 310/month on 22k takes the longest
    assert!(matches!(projection.months, PayoffHorizon::Months(m) if m > 60));
    assert!(projection.projected_date.is_some());
}

#[test]
fn test_strategy_suggestion_full_flow() {
    let calc = household_calculator(dec!(0.55));
    let output = calc
        .suggest_payment_strategy(Uuid::new_v4(), dec!(300))
        .unwrap();
    let strategy = &output.result;

    assert_eq!(strategy.strategy_type, StrategyKind::Avalanche);
    assert_eq!(strategy.payment_plans.len(), 3);
    assert_eq!(strategy.payment_plans[0].lender, "Visa");
    assert_eq!(strategy.total_monthly_payment, dec!(1200));
    assert!(!output.methodology.is_empty());
}

#[test]
fn test_interest_savings_full_flow() {
    let calc = household_calculator(dec!(0.125));
    let output = calc.interest_savings(Uuid::new_v4(), dec!(400)).unwrap();
    let savings = &output.result;

    assert!(savings.interest_saved.unwrap() > Decimal::ZERO);
    assert!(savings.new_total_interest.unwrap() < savings.current_total_interest.unwrap());
    assert!(savings.break_even_months.is_some());
    assert_eq!(savings.suggested_extra_payment, dec!(112.5));
}

#[test]
fn test_debt_analysis_full_flow() {
    let calc = household_calculator(dec!(0.125));
    let output = calc.debt_analysis(Uuid::new_v4()).unwrap();
    let analysis = &output.result;

    assert_eq!(analysis.total_debt, dec!(40_500));
    assert_eq!(analysis.highest_rate_loan.as_ref().unwrap().lender, "Visa");
    assert!(matches!(
        analysis.debt_health,
        DebtHealth::Good | DebtHealth::Excellent
    ));
    assert_eq!(analysis.payoff_projections.len(), 3);
}

#[test]
fn test_minimum_payment_needs_no_collaborator() {
    let payment = DebtCalculator::<InMemoryFinance>::minimum_payment(dec!(8000), dec!(12), 36);
    assert!(payment > dec!(265) && payment < dec!(266));
}

// ===========================================================================
// The already-debt-free user
// ===========================================================================

#[test]
fn test_debt_free_user_across_every_operation() {
    let calc = debt_free_calculator();
    let user = Uuid::new_v4();

    assert_eq!(calc.total_debt(user).unwrap(), Decimal::ZERO);

    let projection = calc.project_debt_free_date(user).unwrap();
    assert_eq!(projection.months, PayoffHorizon::Months(0));
    let drift = (Utc::now() - projection.projected_date.unwrap())
        .num_seconds()
        .abs();
    assert!(drift < 3600, "projected date drifted {}s from now", drift);

    let strategy = calc.suggest_payment_strategy(user, dec!(300)).unwrap();
    assert_eq!(strategy.result.strategy_type, StrategyKind::NoDebt);

    let analysis = calc.debt_analysis(user).unwrap();
    assert_eq!(analysis.result.debt_health, DebtHealth::Excellent);
}

// ===========================================================================
// Upstream failures
// ===========================================================================

#[test]
fn test_upstream_loan_failure_keeps_the_source_message() {
    struct Refusing;

    impl FinanceService for Refusing {
        fn user_loans(&self, _user_id: Uuid) -> Result<Vec<Loan>, BoxError> {
            Err("connection pool exhausted".into())
        }

        fn finance_summary(&self, _user_id: Uuid) -> Result<FinanceSummary, BoxError> {
            unreachable!("loans are fetched first")
        }
    }

    let calc = DebtCalculator::new(Refusing);
    let err = calc.total_debt(Uuid::new_v4()).unwrap_err();

    assert!(matches!(err, DebtEngineError::Upstream { .. }));
    assert_eq!(
        err.to_string(),
        "failed to get user loans: connection pool exhausted"
    );
}

#[test]
fn test_upstream_summary_failure_names_its_operation() {
    struct SummaryDown {
        loans: Vec<Loan>,
    }

    impl FinanceService for SummaryDown {
        fn user_loans(&self, _user_id: Uuid) -> Result<Vec<Loan>, BoxError> {
            Ok(self.loans.clone())
        }

        fn finance_summary(&self, _user_id: Uuid) -> Result<FinanceSummary, BoxError> {
            Err("summary query timed out".into())
        }
    }

    let calc = DebtCalculator::new(SummaryDown {
        loans: vec![loan("Visa", dec!(4500), dec!(22.9), dec!(180))],
    });
    let err = calc.debt_analysis(Uuid::new_v4()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to get finance summary: summary query timed out"
    );

    // Operations that never touch the summary still succeed
    assert_eq!(
        calc.total_debt(Uuid::new_v4()).unwrap(),
        dec!(4500)
    );
}
