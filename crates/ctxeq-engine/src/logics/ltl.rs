//! LTL: accepting words from Spot, and witnesses read off a single run.

use ctxeq_dsl::{Formula, UnaryOp};
use ctxeq_ir::lasso::Lasso;
use ctxeq_ir::ternary::{Ternary, Valuation};
use ctxeq_ir::transform::ContextTable;
use ctxeq_ir::FormulaError;
use ctxeq_smt::OracleError;
use indexmap::IndexMap;
use tracing::debug;

use super::{check_operators, difference_formula};
use crate::oracles::OracleSet;
use crate::result::{ContextMap, Counterexample};

pub fn validate(formula: &Formula) -> Result<(), FormulaError> {
    check_operators(formula, &|f: &Formula| match f {
        Formula::Unary(op @ (UnaryOp::ForAll | UnaryOp::Exists), _) => Err(FormulaError::invalid(
            format!("path quantifier {op} is not allowed in LTL"),
        )),
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
    debug!(%query, "LTL emptiness query");
    let word = oracles.lasso()?.accepting_word(&query)?;
    Ok(word.map(Counterexample::Lasso))
}

/// `X^i base` for every position `i` where `values` is true, and its negation
/// where it is false (unless `ignore_false`). Unknown positions say nothing.
pub fn formula_from_trace(base: Formula, values: &[Ternary], ignore_false: bool) -> Formula {
    let mut clauses = Vec::new();
    let mut shifted = base;
    for value in values {
        match value {
            Ternary::True => clauses.push(shifted.clone()),
            Ternary::False if !ignore_false => clauses.push(shifted.clone().not()),
            _ => {}
        }
        shifted = shifted.next();
    }
    Formula::conjunction(clauses).unwrap_or(Formula::Lit(true))
}

/// Contexts that reproduce the behaviour of the fresh propositions along
/// `lasso`, using only `X` to describe positions.
///
/// For every position `k` of one period where the proposition of an
/// occurrence holds, the witness admits an argument that agrees with that
/// occurrence's argument from `k` on, provided every other proposition also
/// has the values the run gives it from `k` on. A context whose propositions
/// never hold gets `false`.
pub fn witness_from_run(contexts: &ContextTable, lasso: &Lasso) -> Result<ContextMap, FormulaError> {
    let valuation = Valuation::from_lasso(lasso)?;
    let period = valuation.period();
    let aps: Vec<String> = valuation
        .props
        .keys()
        .filter(|ap| !contexts.is_fresh(ap))
        .cloned()
        .collect();

    let mut witnesses = ContextMap::new();
    for (name, occurrences) in contexts.table() {
        let mut clauses: IndexMap<usize, Formula> = IndexMap::new();
        for (arg, prop) in occurrences {
            let applied = valuation.evaluate(&Formula::var(prop.as_str()))?;
            let arg_trace = valuation.evaluate(arg)?;
            for k in (0..period).filter(|&k| applied.at(k) == Ternary::True) {
                let clause = formula_from_trace(Formula::Hole, &arg_trace.values(k, period), true);
                // Inserting an existing key keeps its position.
                let merged = match clauses.get(&k) {
                    Some(existing) => existing.clone().or(clause),
                    None => clause,
                };
                clauses.insert(k, merged);
            }
        }

        let witness = clauses
            .into_iter()
            .map(|(k, clause)| {
                aps.iter().fold(clause, |acc, ap| {
                    let values = valuation.values(ap, k, None);
                    acc.and(formula_from_trace(Formula::var(ap.as_str()), &values, false))
                })
            })
            .reduce(Formula::or)
            .unwrap_or(Formula::Lit(false));
        debug!(context = %name, size = witness.size(), "witness from run");
        witnesses.insert(name.clone(), witness);
    }
    Ok(witnesses)
}
