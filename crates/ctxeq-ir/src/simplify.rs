//! Literal-driven formula simplification.
//!
//! Children are simplified first, then at most one rule fires at the current
//! node. Rules are tried in a fixed order and the first match wins; no
//! further pass is attempted, so callers wanting a fixpoint must iterate.

use ctxeq_dsl::{BinaryOp, Formula, UnaryOp};
use indexmap::IndexMap;

/// Partial truth assignment to atomic propositions.
pub type Assignment = IndexMap<String, bool>;

/// Simplify `formula` under the partial assignment `valuation`.
pub fn simplify(formula: &Formula, valuation: &Assignment) -> Formula {
    match formula {
        Formula::Lit(_) | Formula::Hole => formula.clone(),
        Formula::Var(name) => match valuation.get(name) {
            Some(value) => Formula::Lit(*value),
            None => formula.clone(),
        },
        Formula::Context { name, arg } => Formula::context(name.clone(), simplify(arg, valuation)),
        Formula::Unary(op, arg) => simplify_unary(*op, simplify(arg, valuation)),
        Formula::Binary(op, lhs, rhs) => {
            simplify_binary(*op, simplify(lhs, valuation), simplify(rhs, valuation))
        }
    }
}

/// Negate, removing an existing outer negation instead of stacking a second one.
pub fn negate(formula: Formula) -> Formula {
    match formula {
        Formula::Unary(UnaryOp::Not, inner) => *inner,
        other => other.not(),
    }
}

fn simplify_unary(op: UnaryOp, arg: Formula) -> Formula {
    match op {
        UnaryOp::Not => match arg {
            Formula::Lit(b) => Formula::Lit(!b),
            Formula::Unary(UnaryOp::Not, inner) => *inner,
            other => other.not(),
        },
        _ => match arg {
            Formula::Lit(_) => arg,
            Formula::Unary(UnaryOp::Not, inner) => Formula::unary(op.dual(), *inner).not(),
            other => Formula::unary(op, other),
        },
    }
}

fn simplify_binary(op: BinaryOp, a: Formula, b: Formula) -> Formula {
    use BinaryOp::*;

    match op {
        Or => {
            if a.is_true() || b.is_true() {
                Formula::Lit(true)
            } else if a.is_false() {
                b
            } else if b.is_false() || a == b {
                a
            } else {
                a.or(b)
            }
        }
        And => {
            if a.is_false() || b.is_false() {
                Formula::Lit(false)
            } else if a.is_true() {
                b
            } else if b.is_true() || a == b {
                a
            } else {
                a.and(b)
            }
        }
        Implies => {
            if a.is_false() || b.is_true() {
                Formula::Lit(true)
            } else if a.is_true() {
                b
            } else if b.is_false() {
                negate(a)
            } else {
                a.implies(b)
            }
        }
        Equiv => {
            if a.is_true() {
                b
            } else if b.is_true() {
                a
            } else if a.is_false() {
                negate(b)
            } else if b.is_false() {
                negate(a)
            } else {
                a.equiv(b)
            }
        }
        Xor => {
            if a.is_true() {
                negate(b)
            } else if b.is_true() {
                negate(a)
            } else if a.is_false() {
                b
            } else if b.is_false() {
                a
            } else {
                a.xor(b)
            }
        }
        Until => {
            if b.is_lit() {
                b
            } else if a.is_false() {
                b
            } else if a.is_true() {
                b.eventually()
            } else {
                a.until(b)
            }
        }
        WeakUntil => {
            if a.is_true() || b.is_true() {
                Formula::Lit(true)
            } else if b.is_false() {
                a.always()
            } else if a.is_false() {
                b
            } else {
                a.weak_until(b)
            }
        }
        Release => {
            if a.is_true() || b.is_true() {
                Formula::Lit(true)
            } else if a.is_false() {
                b.always()
            } else if b.is_false() {
                Formula::Lit(false)
            } else {
                a.release(b)
            }
        }
        StrongRelease => {
            if a.is_false() || b.is_false() {
                Formula::Lit(false)
            } else if a.is_true() {
                b
            } else if b.is_true() {
                a.eventually()
            } else {
                a.strong_release(b)
            }
        }
    }
}
