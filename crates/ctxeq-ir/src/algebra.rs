//! Hole and context substitution.

use ctxeq_dsl::Formula;
use indexmap::IndexMap;

use crate::error::FormulaError;

/// Replace every hole of `context` by `replacement`.
///
/// A canonical context repeats its hole once per occurrence clause; all of
/// them stand for the same argument. Holes inside nested context bodies are
/// substituted too. A context without a hole is returned unchanged. The
/// replacement itself must be hole-free.
pub fn instantiate_context(context: &Formula, replacement: &Formula) -> Result<Formula, FormulaError> {
    if replacement.has_hole() {
        return Err(FormulaError::invariant(format!(
            "cannot instantiate {context} with {replacement}, which has a hole"
        )));
    }
    Ok(fill(context, replacement))
}

fn fill(node: &Formula, replacement: &Formula) -> Formula {
    match node {
        Formula::Hole => replacement.clone(),
        Formula::Lit(_) | Formula::Var(_) => node.clone(),
        Formula::Context { name, arg } => Formula::context(name.clone(), fill(arg, replacement)),
        Formula::Unary(op, arg) => Formula::unary(*op, fill(arg, replacement)),
        Formula::Binary(op, lhs, rhs) => {
            Formula::binary(*op, fill(lhs, replacement), fill(rhs, replacement))
        }
    }
}

/// Replace every application of a context listed in `replacements` by the
/// replacement instantiated with the (already substituted) argument.
pub fn instantiate_formula(
    formula: &Formula,
    replacements: &IndexMap<String, Formula>,
) -> Result<Formula, FormulaError> {
    Ok(match formula {
        Formula::Hole => {
            return Err(FormulaError::invariant(
                "a hole cannot appear outside a canonical context",
            ))
        }
        Formula::Lit(_) | Formula::Var(_) => formula.clone(),
        Formula::Context { name, arg } => {
            let arg = instantiate_formula(arg, replacements)?;
            match replacements.get(name) {
                Some(replacement) => instantiate_context(replacement, &arg)?,
                None => Formula::context(name.clone(), arg),
            }
        }
        Formula::Unary(op, arg) => Formula::unary(*op, instantiate_formula(arg, replacements)?),
        Formula::Binary(op, lhs, rhs) => Formula::binary(
            *op,
            instantiate_formula(lhs, replacements)?,
            instantiate_formula(rhs, replacements)?,
        ),
    })
}
