pub mod amortization;
pub mod analysis;
pub mod calculator;
pub mod error;
pub mod strategy;
pub mod types;

pub use amortization::PayoffHorizon;
pub use calculator::{DebtCalculator, DebtFreeProjection, FinanceService};
pub use error::{BoxError, DebtEngineError};
pub use types::*;

/// Standard result type for all debt-engine operations
pub type DebtEngineResult<T> = Result<T, DebtEngineError>;
