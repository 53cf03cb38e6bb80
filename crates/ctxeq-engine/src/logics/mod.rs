//! Per-logic validation and counterexample search.

pub mod boolean;
pub mod ctl;
pub mod ltl;

use ctxeq_dsl::Formula;
use ctxeq_ir::logic::Logic;
use ctxeq_ir::FormulaError;
use ctxeq_smt::OracleError;

use crate::oracles::OracleSet;
use crate::result::Counterexample;

/// Reject operators `logic` does not have.
pub fn validate(logic: Logic, formula: &Formula) -> Result<(), FormulaError> {
    match logic {
        Logic::Bool => boolean::validate(formula),
        Logic::Ltl => ltl::validate(formula),
        Logic::Ctl => ctxeq_ir::ctl::check_ctl(formula),
    }
}

/// A model of `left ∧ condition ∧ ¬right`, if there is one.
pub fn find_difference(
    logic: Logic,
    oracles: &mut dyn OracleSet,
    left: &Formula,
    condition: Option<&Formula>,
    right: &Formula,
) -> Result<Option<Counterexample>, OracleError> {
    match logic {
        Logic::Bool => boolean::find_difference(oracles, left, condition, right),
        Logic::Ltl => ltl::find_difference(oracles, left, condition, right),
        Logic::Ctl => ctl::find_difference(oracles, left, condition, right),
    }
}

/// `left ∧ condition ∧ ¬right`, leaving out a trivially true condition.
pub(crate) fn difference_formula(
    left: &Formula,
    condition: Option<&Formula>,
    right: &Formula,
) -> Formula {
    let condition = condition.filter(|c| !c.is_true()).cloned();
    Formula::conjunction(
        std::iter::once(left.clone())
            .chain(condition)
            .chain(std::iter::once(right.clone().not())),
    )
    .unwrap_or(Formula::Lit(true))
}

/// Walk `formula`, rejecting the first unary or binary operator `allowed`
/// refuses. Context arguments are checked too.
pub(crate) fn check_operators(
    formula: &Formula,
    allowed: &dyn Fn(&Formula) -> Result<(), FormulaError>,
) -> Result<(), FormulaError> {
    allowed(formula)?;
    match formula {
        Formula::Lit(_) | Formula::Var(_) | Formula::Hole => Ok(()),
        Formula::Context { arg, .. } | Formula::Unary(_, arg) => check_operators(arg, allowed),
        Formula::Binary(_, lhs, rhs) => {
            check_operators(lhs, allowed)?;
            check_operators(rhs, allowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Formula {
        ctxeq_dsl::parse(text).unwrap()
    }

    fn parse_ctl(text: &str) -> Formula {
        ctxeq_dsl::parse_ctl(text).unwrap()
    }

    #[test]
    fn difference_formula_drops_true_condition() {
        let l = parse("p");
        let r = parse("q");
        assert_eq!(difference_formula(&l, Some(&Formula::Lit(true)), &r), parse("p & !q"));
        assert_eq!(difference_formula(&l, None, &r), parse("p & !q"));
        assert_eq!(
            difference_formula(&l, Some(&parse("G r")), &r),
            parse("p & G r & !q")
        );
    }

    #[test]
    fn validation_per_logic() {
        assert!(validate(Logic::Bool, &parse("c[p & q] -> r")).is_ok());
        assert!(validate(Logic::Bool, &parse("c[X p]")).is_err());
        assert!(validate(Logic::Ltl, &parse("c[p] U G q")).is_ok());
        assert!(validate(Logic::Ltl, &parse_ctl("A G p")).is_err());
        assert!(validate(Logic::Ctl, &parse_ctl("A c[p]")).is_err());
        assert!(validate(Logic::Ctl, &parse_ctl("A G p & c[E F q]")).is_ok());
    }
}
