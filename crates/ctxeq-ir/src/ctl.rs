//! CTL well-formedness and rewriting into the operator set CTL-SAT accepts
//! (`¬ ∨ ∧ → A E X F G U`).

use ctxeq_dsl::{BinaryOp, Formula, UnaryOp};

use crate::error::FormulaError;

/// What the enclosing operators expect at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    State,
    Path,
    NegatedPath,
}

/// Check that every temporal operator sits directly below a path quantifier,
/// optionally with a single negation in between.
pub fn check_ctl(formula: &Formula) -> Result<(), FormulaError> {
    check(formula, Position::State)
}

fn check(formula: &Formula, position: Position) -> Result<(), FormulaError> {
    match formula {
        Formula::Lit(_) | Formula::Var(_) | Formula::Hole => Ok(()),
        Formula::Context { arg, .. } => {
            if position != Position::State {
                return Err(FormulaError::invalid("context cannot appear as path formula"));
            }
            check(arg, Position::State)
        }
        Formula::Unary(UnaryOp::Not, arg) => match position {
            Position::NegatedPath => Err(FormulaError::invalid(
                "double negation under a path quantifier is not supported",
            )),
            Position::Path => check(arg, Position::NegatedPath),
            Position::State => check(arg, Position::State),
        },
        Formula::Unary(op, arg) if op.is_quantifier() => {
            if position != Position::State {
                return Err(FormulaError::invalid("double quantification"));
            }
            check(arg, Position::Path)
        }
        Formula::Unary(op, arg) => {
            if position == Position::State {
                return Err(FormulaError::invalid(format!("unexpected {op} operator")));
            }
            check(arg, Position::State)
        }
        Formula::Binary(op, lhs, rhs) => {
            if op.is_temporal() == (position == Position::State) {
                return Err(FormulaError::invalid(format!("unexpected {op} operator")));
            }
            check(lhs, Position::State)?;
            check(rhs, Position::State)
        }
    }
}

/// Rewrite a well-formed CTL formula so that only `¬ ∨ ∧ → A E X F G U`
/// remain. Applying it twice gives the same result.
pub fn adapt_ctl(formula: &Formula) -> Formula {
    adapt(formula, None, false)
}

fn negate_if(negated: bool, formula: Formula) -> Formula {
    if negated {
        formula.not()
    } else {
        formula
    }
}

fn quantify(quantifier: Option<UnaryOp>, negated: bool, body: Formula) -> Formula {
    let body = negate_if(negated, body);
    match quantifier {
        Some(q) => Formula::unary(q, body),
        None => body,
    }
}

fn adapt(formula: &Formula, quantifier: Option<UnaryOp>, negated: bool) -> Formula {
    match formula {
        Formula::Lit(_) | Formula::Var(_) | Formula::Hole => negate_if(negated, formula.clone()),
        Formula::Context { name, arg } => {
            negate_if(negated, Formula::context(name.clone(), adapt(arg, None, false)))
        }
        Formula::Unary(op, arg) if op.is_quantifier() => adapt(arg, Some(*op), false),
        Formula::Unary(UnaryOp::Not, arg) if quantifier.is_some() && !negated => {
            adapt(arg, quantifier, true)
        }
        Formula::Unary(op, arg) => {
            let arg = adapt(arg, None, false);
            if op.is_temporal() {
                quantify(quantifier, negated, Formula::unary(*op, arg))
            } else {
                negate_if(negated, Formula::unary(*op, arg))
            }
        }
        Formula::Binary(op, lhs, rhs) => {
            let a = adapt(lhs, None, false);
            let b = adapt(rhs, None, false);
            match op {
                BinaryOp::Equiv => negate_if(
                    negated,
                    a.clone().implies(b.clone()).and(b.implies(a)),
                ),
                BinaryOp::Xor => negate_if(
                    negated,
                    a.clone().and(b.clone().not()).or(b.and(a.not())),
                ),
                BinaryOp::Or | BinaryOp::And | BinaryOp::Implies => {
                    negate_if(negated, Formula::binary(*op, a, b))
                }
                // a R b = ¬(¬a U ¬b)
                BinaryOp::Release => quantify(quantifier, !negated, a.not().until(b.not())),
                // a W b = ¬(¬b U (¬a ∧ ¬b))
                BinaryOp::WeakUntil => {
                    let until = b.clone().not().until(a.not().and(b.not()));
                    quantify(quantifier, !negated, until)
                }
                // a M b = b U (a ∧ b)
                BinaryOp::StrongRelease => {
                    quantify(quantifier, negated, b.clone().until(a.and(b)))
                }
                BinaryOp::Until => quantify(quantifier, negated, a.until(b)),
            }
        }
    }
}
