use thiserror::Error;

/// Errors raised while manipulating or evaluating formulas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula uses an operator the selected logic does not allow.
    #[error("Invalid formula: {0}")]
    InvalidFormula(String),
    /// An internal precondition was broken (stray hole, unbound context).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl FormulaError {
    pub fn invalid(message: impl Into<String>) -> Self {
        FormulaError::InvalidFormula(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        FormulaError::InvariantViolation(message.into())
    }
}
