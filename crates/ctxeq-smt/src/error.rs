use std::time::Duration;

use ctxeq_ir::FormulaError;
use thiserror::Error;

/// Errors raised while encoding for, running or reading an external oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("oracle not found: {0}")]
    NotFound(String),
    #[error("oracle timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("oracle failure: {0}")]
    Failure(String),
    #[error("failed to parse oracle output: {0}")]
    Parse(String),
    #[error("too many variables for the encoding (at most {limit})")]
    TooManyVariables { limit: usize },
    #[error("invalid formula: {0}")]
    InvalidFormula(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl OracleError {
    /// Timeout for a budget, rounded up to whole seconds.
    pub fn timeout(budget: Duration) -> Self {
        let secs = budget.as_secs() + u64::from(budget.subsec_nanos() > 0);
        OracleError::Timeout { secs }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, OracleError::Timeout { .. })
    }
}

impl From<FormulaError> for OracleError {
    fn from(err: FormulaError) -> Self {
        match err {
            FormulaError::InvalidFormula(message) => OracleError::InvalidFormula(message),
            FormulaError::InvariantViolation(message) => OracleError::InvariantViolation(message),
        }
    }
}
