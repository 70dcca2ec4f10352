//! Facade over the finance-service collaborator: fetches the user's loan
//! portfolio and cash-position snapshot, then delegates to the pure
//! computation modules.
//!
//! This is the only module that performs I/O or returns errors. Collaborator
//! failures are wrapped with the operation that triggered them and surfaced
//! otherwise unchanged; everything below the facade is total.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::{self, portfolio_horizon, project_loan, PayoffHorizon};
use crate::analysis::{analyze_debt, DebtAnalysis};
use crate::error::{BoxError, DebtEngineError};
use crate::strategy::{self, InterestSavings, PaymentStrategy};
use crate::types::{ComputationOutput, FinanceSummary, Loan, Money, Percent};
use crate::DebtEngineResult;

/// The external collaborator that owns loan and income/expense persistence.
///
/// Implemented by the storage layer (out of scope for this crate) or by
/// in-memory fixtures in tests and CLI tooling. The interface is
/// synchronous; an async consumer gets cancellation at its own task layer.
pub trait FinanceService {
    fn user_loans(&self, user_id: Uuid) -> Result<Vec<Loan>, BoxError>;
    fn finance_summary(&self, user_id: Uuid) -> Result<FinanceSummary, BoxError>;
}

/// When the portfolio reaches zero balance, as a month count and a calendar
/// date projected from the time of the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtFreeProjection {
    pub months: PayoffHorizon,
    /// `None` when some loan never amortizes at its minimum payment.
    pub projected_date: Option<DateTime<Utc>>,
}

/// Debt analysis facade over a finance-service collaborator.
///
/// Every operation recomputes from a fresh snapshot; nothing is cached or
/// persisted here, so a `DebtCalculator` is safe to share across threads
/// whenever its service is.
pub struct DebtCalculator<S: FinanceService> {
    service: S,
}

impl<S: FinanceService> DebtCalculator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Sum of remaining balances across the user's loans.
    pub fn total_debt(&self, user_id: Uuid) -> DebtEngineResult<Money> {
        let loans = self.fetch_loans(user_id)?;
        Ok(loans.iter().map(|l| l.remaining_balance).sum())
    }

    /// When the user becomes debt-free with every loan held at its own
    /// minimum payment. Zero loans projects to "now": the user is already
    /// debt-free.
    pub fn project_debt_free_date(&self, user_id: Uuid) -> DebtEngineResult<DebtFreeProjection> {
        let loans = self.fetch_loans(user_id)?;
        let as_of = Utc::now();
        let months = portfolio_horizon(loans.iter().map(|l| project_loan(l).months));
        Ok(DebtFreeProjection {
            months,
            projected_date: months.date_from(as_of),
        })
    }

    /// Recommend avalanche or snowball for this user's portfolio and cash
    /// position, with the full comparison baked into the chosen strategy.
    pub fn suggest_payment_strategy(
        &self,
        user_id: Uuid,
        extra_payment: Money,
    ) -> DebtEngineResult<ComputationOutput<PaymentStrategy>> {
        let loans = self.fetch_loans(user_id)?;
        let summary = self.fetch_summary(user_id)?;
        Ok(strategy::suggest_payment_strategy(
            &loans,
            &summary,
            extra_payment,
            Utc::now(),
        ))
    }

    /// Project what an extra monthly budget buys, spread across the user's
    /// loans in proportion to their remaining balances.
    pub fn interest_savings(
        &self,
        user_id: Uuid,
        extra_payment: Money,
    ) -> DebtEngineResult<ComputationOutput<InterestSavings>> {
        let loans = self.fetch_loans(user_id)?;
        Ok(strategy::interest_savings(&loans, extra_payment, Utc::now()))
    }

    /// Full portfolio analysis: totals, weighted rate, extremal loans,
    /// health classification, recommendations, per-loan projections.
    pub fn debt_analysis(&self, user_id: Uuid) -> DebtEngineResult<ComputationOutput<DebtAnalysis>> {
        let loans = self.fetch_loans(user_id)?;
        let summary = self.fetch_summary(user_id)?;
        Ok(analyze_debt(&loans, &summary, Utc::now()))
    }

    /// Standard annuity minimum payment. Pure passthrough to the amortizer;
    /// no collaborator call is made.
    pub fn minimum_payment(principal: Money, annual_pct: Percent, term_months: u32) -> Money {
        amortization::minimum_payment(principal, annual_pct, term_months)
    }

    fn fetch_loans(&self, user_id: Uuid) -> DebtEngineResult<Vec<Loan>> {
        self.service
            .user_loans(user_id)
            .map_err(|e| DebtEngineError::upstream("get user loans", e))
    }

    fn fetch_summary(&self, user_id: Uuid) -> DebtEngineResult<FinanceSummary> {
        self.service
            .finance_summary(user_id)
            .map_err(|e| DebtEngineError::upstream("get finance summary", e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
