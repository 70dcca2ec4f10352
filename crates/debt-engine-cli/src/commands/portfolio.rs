use chrono::Utc;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use debt_engine_core::strategy::{avalanche_strategy, snowball_strategy};
use debt_engine_core::types::{FinanceSummary, Loan};
use debt_engine_core::{BoxError, DebtCalculator, FinanceService};

use crate::input;

/// A portfolio snapshot loaded from JSON, standing in for the finance
/// service's persistence layer. Implementing `FinanceService` routes the
/// portfolio commands through the same facade an HTTP handler would use.
#[derive(Deserialize)]
pub struct PortfolioFile {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub loans: Vec<Loan>,
    pub summary: FinanceSummary,
}

impl PortfolioFile {
    fn user(&self) -> Uuid {
        self.user_id.unwrap_or_else(Uuid::nil)
    }
}

impl FinanceService for PortfolioFile {
    fn user_loans(&self, _user_id: Uuid) -> Result<Vec<Loan>, BoxError> {
        Ok(self.loans.clone())
    }

    fn finance_summary(&self, _user_id: Uuid) -> Result<FinanceSummary, BoxError> {
        Ok(self.summary.clone())
    }
}

/// Which payoff strategy to build
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyChoice {
    /// Highest interest rate first
    Avalanche,
    /// Smallest balance first
    Snowball,
    /// Let the engine recommend one
    Auto,
}

/// Arguments for payment-plan construction
#[derive(Args)]
pub struct StrategyArgs {
    /// Path to a portfolio JSON file (or pipe it via stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Extra monthly payment budget
    #[arg(long, default_value = "0")]
    pub extra: Decimal,

    /// Strategy to build
    #[arg(long, value_enum, default_value = "auto")]
    pub strategy: StrategyChoice,
}

/// Arguments for the interest-savings projection
#[derive(Args)]
pub struct SavingsArgs {
    /// Path to a portfolio JSON file (or pipe it via stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Extra monthly payment budget
    #[arg(long)]
    pub extra: Decimal,
}

/// Arguments for the full portfolio analysis
#[derive(Args)]
pub struct AnalysisArgs {
    /// Path to a portfolio JSON file (or pipe it via stdin)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_strategy(args: StrategyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = load_portfolio(args.input.as_deref())?;

    let output = match args.strategy {
        StrategyChoice::Avalanche => avalanche_strategy(&portfolio.loans, args.extra, Utc::now()),
        StrategyChoice::Snowball => snowball_strategy(&portfolio.loans, args.extra, Utc::now()),
        StrategyChoice::Auto => {
            let user = portfolio.user();
            let calculator = DebtCalculator::new(portfolio);
            calculator.suggest_payment_strategy(user, args.extra)?
        }
    };

    Ok(serde_json::to_value(output)?)
}

pub fn run_savings(args: SavingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = load_portfolio(args.input.as_deref())?;
    let user = portfolio.user();
    let calculator = DebtCalculator::new(portfolio);
    let output = calculator.interest_savings(user, args.extra)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_analysis(args: AnalysisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio = load_portfolio(args.input.as_deref())?;
    let user = portfolio.user();
    let calculator = DebtCalculator::new(portfolio);
    let output = calculator.debt_analysis(user)?;
    Ok(serde_json::to_value(output)?)
}

fn load_portfolio(path: Option<&str>) -> Result<PortfolioFile, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("provide a portfolio via --input or piped stdin".into())
    }
}
