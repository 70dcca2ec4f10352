use thiserror::Error;

/// Errors surfaced by the finance service collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DebtEngineError {
    /// The finance service failed to supply the data an operation needs.
    ///
    /// The pure computation modules never produce this; degenerate numeric
    /// input is clamped, not rejected. Only the calculator facade, which
    /// talks to the outside world, can fail.
    #[error("failed to {operation}: {source}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl DebtEngineError {
    pub(crate) fn upstream(operation: &'static str, source: BoxError) -> Self {
        DebtEngineError::Upstream { operation, source }
    }
}
