//! Propositional logic: a SAT query per direction.

use ctxeq_dsl::Formula;
use ctxeq_ir::FormulaError;
use ctxeq_smt::encoder::check_satisfiable;
use ctxeq_smt::OracleError;
use tracing::debug;

use super::{check_operators, difference_formula};
use crate::oracles::OracleSet;
use crate::result::Counterexample;

pub fn validate(formula: &Formula) -> Result<(), FormulaError> {
    check_operators(formula, &|f: &Formula| match f {
        Formula::Unary(op, _) if *op != ctxeq_dsl::UnaryOp::Not => {
            Err(FormulaError::invalid(format!("not a Boolean formula: {op}")))
        }
        Formula::Binary(op, _, _) if op.is_temporal() => {
            Err(FormulaError::invalid(format!("not a Boolean formula: {op}")))
        }
        _ => Ok(()),
    })
}

pub fn find_difference(
    oracles: &mut dyn OracleSet,
    left: &Formula,
    condition: Option<&Formula>,
    right: &Formula,
) -> Result<Option<Counterexample>, OracleError> {
    let query = difference_formula(left, condition, right);
    debug!(%query, "SAT query");
    let model = check_satisfiable(oracles.sat()?, &query)?;
    Ok(model.map(Counterexample::Assignment))
}
