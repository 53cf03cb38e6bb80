//! Propositional formulas to Boolean SMT terms and back.

use ctxeq_dsl::{BinaryOp, Formula, UnaryOp};
use ctxeq_ir::Assignment;
use indexmap::IndexSet;
use tracing::debug;

use crate::error::OracleError;
use crate::solver::{Model, SatResult, SmtSolver};
use crate::terms::SmtTerm;

/// Maps proposition names to solver symbols `v0`, `v1`, ... in order of first
/// use. Solver symbols never depend on how a name would need to be quoted.
#[derive(Debug, Clone, Default)]
pub struct BoolEncoder {
    props: IndexSet<String>,
}

impl BoolEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver symbol for `prop`, allocating one if needed.
    pub fn symbol(&mut self, prop: &str) -> String {
        let (index, _) = self.props.insert_full(prop.to_string());
        format!("v{index}")
    }

    /// Proposition behind a solver symbol.
    pub fn prop_of(&self, symbol: &str) -> Option<&str> {
        let index: usize = symbol.strip_prefix('v')?.parse().ok()?;
        self.props.get_index(index).map(String::as_str)
    }

    /// Every allocated symbol, in allocation order.
    pub fn symbols(&self) -> Vec<String> {
        (0..self.props.len()).map(|i| format!("v{i}")).collect()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn encode(&mut self, formula: &Formula) -> Result<SmtTerm, OracleError> {
        match formula {
            Formula::Lit(b) => Ok(SmtTerm::bool(*b)),
            Formula::Var(name) => Ok(SmtTerm::var(self.symbol(name))),
            Formula::Context { name, .. } => Err(OracleError::InvariantViolation(format!(
                "context {name} reached the Boolean encoder"
            ))),
            Formula::Hole => Err(OracleError::InvariantViolation(
                "hole reached the Boolean encoder".into(),
            )),
            Formula::Unary(UnaryOp::Not, arg) => Ok(self.encode(arg)?.not()),
            Formula::Unary(op, _) => Err(OracleError::InvalidFormula(format!(
                "{op} is not a propositional operator"
            ))),
            Formula::Binary(op, lhs, rhs) => {
                let combine: fn(SmtTerm, SmtTerm) -> SmtTerm = match op {
                    BinaryOp::Or => SmtTerm::or,
                    BinaryOp::And => SmtTerm::and,
                    BinaryOp::Implies => SmtTerm::implies,
                    BinaryOp::Xor => SmtTerm::xor,
                    BinaryOp::Equiv => SmtTerm::eq,
                    BinaryOp::Until
                    | BinaryOp::WeakUntil
                    | BinaryOp::Release
                    | BinaryOp::StrongRelease => {
                        return Err(OracleError::InvalidFormula(format!(
                            "{op} is not a propositional operator"
                        )))
                    }
                };
                Ok(combine(self.encode(lhs)?, self.encode(rhs)?))
            }
        }
    }

    /// Named assignment for every proposition the model mentions.
    pub fn decode(&self, model: &Model) -> Assignment {
        model
            .values
            .iter()
            .filter_map(|(symbol, value)| self.prop_of(symbol).map(|p| (p.to_string(), *value)))
            .collect()
    }
}

/// Satisfying assignment of a propositional formula, or `None` if there is
/// none. An `unknown` answer is an [`OracleError::Failure`].
pub fn check_satisfiable<S: SmtSolver + ?Sized>(
    solver: &mut S,
    formula: &Formula,
) -> Result<Option<Assignment>, OracleError> {
    let mut encoder = BoolEncoder::new();
    let term = encoder.encode(formula)?;
    let symbols = encoder.symbols();

    solver.reset()?;
    for symbol in &symbols {
        solver.declare_var(symbol)?;
    }
    solver.assert(&term)?;

    let names: Vec<&str> = symbols.iter().map(String::as_str).collect();
    let (result, model) = solver.check_sat_with_model(&names)?;
    debug!(vars = symbols.len(), ?result, "Boolean satisfiability");
    match result {
        SatResult::Sat => Ok(Some(
            model.map(|m| encoder.decode(&m)).unwrap_or_default(),
        )),
        SatResult::Unsat => Ok(None),
        SatResult::Unknown(reason) => Err(OracleError::Failure(reason)),
    }
}
