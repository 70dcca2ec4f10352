use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annual interest rates expressed as percentages (12.5 = 12.5%/yr).
/// This is the unit the finance service stores; divide by 12 and by 100
/// to get a monthly compounding rate.
pub type Percent = Decimal;

/// Dimensionless fractions (0.36 = 36%), e.g. debt-to-income.
pub type Ratio = Decimal;

/// Loan category as recorded by the finance service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Mortgage,
    Auto,
    Student,
    CreditCard,
    Personal,
    Other(String),
}

/// A loan as supplied by the finance service.
///
/// The engine never mutates a loan; every computed figure is derived from a
/// snapshot of these fields and discarded by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub lender: String,
    pub loan_type: LoanType,
    /// Principal at origination.
    pub original_amount: Money,
    /// Remaining principal, >= 0.
    pub remaining_balance: Money,
    /// Fixed scheduled monthly payment, >= 0.
    pub monthly_payment: Money,
    /// Fixed annual rate as a percentage, >= 0.
    pub interest_rate: Percent,
    /// Contractual end date of the loan.
    pub end_date: NaiveDate,
}

/// Snapshot of the user's monthly cash position, computed by the finance
/// service from its income and expense records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    /// Income minus expenses; may be negative.
    pub disposable_income: Money,
    /// Total monthly debt payments divided by monthly income.
    pub debt_to_income: Ratio,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
