//! Proptest strategies for formulas and lassos.

use ctxeq_dsl::{BinaryOp, Formula, UnaryOp};
use proptest::prelude::*;

use crate::lasso::{Lasso, Step};

/// Propositions used by the generated formulas and lassos.
pub const ATOMS: [&str; 3] = ["a", "b", "c"];

fn arb_atom() -> impl Strategy<Value = Formula> {
    prop_oneof![
        4 => prop::sample::select(ATOMS.to_vec()).prop_map(Formula::var),
        1 => any::<bool>().prop_map(Formula::Lit),
    ]
}

fn arb_linear_unary() -> impl Strategy<Value = UnaryOp> {
    prop::sample::select(vec![
        UnaryOp::Not,
        UnaryOp::Next,
        UnaryOp::Always,
        UnaryOp::Eventually,
    ])
}

fn arb_boolean_binary() -> impl Strategy<Value = BinaryOp> {
    prop::sample::select(vec![
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Implies,
        BinaryOp::Xor,
        BinaryOp::Equiv,
    ])
}

/// LTL formulas over [`ATOMS`] without contexts or path quantifiers.
pub fn arb_ltl_formula() -> impl Strategy<Value = Formula> {
    arb_atom().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (arb_linear_unary(), inner.clone()).prop_map(|(op, f)| Formula::unary(op, f)),
            (prop::sample::select(BinaryOp::ALL.to_vec()), inner.clone(), inner)
                .prop_map(|(op, l, r)| Formula::binary(op, l, r)),
        ]
    })
}

/// Propositional formulas over [`ATOMS`].
pub fn arb_boolean_formula() -> impl Strategy<Value = Formula> {
    arb_atom().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::not),
            (arb_boolean_binary(), inner.clone(), inner)
                .prop_map(|(op, l, r)| Formula::binary(op, l, r)),
        ]
    })
}

/// LTL formulas that may apply the contexts `c1` and `c2`, possibly nested.
pub fn arb_formula_with_contexts() -> impl Strategy<Value = Formula> {
    arb_atom().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (prop::sample::select(vec!["c1", "c2"]), inner.clone())
                .prop_map(|(name, f)| Formula::context(name, f)),
            (arb_linear_unary(), inner.clone()).prop_map(|(op, f)| Formula::unary(op, f)),
            (prop::sample::select(BinaryOp::ALL.to_vec()), inner.clone(), inner)
                .prop_map(|(op, l, r)| Formula::binary(op, l, r)),
        ]
    })
}

/// A formula with exactly one hole, usable as a context body.
pub fn arb_single_hole_context() -> impl Strategy<Value = Formula> {
    (arb_ltl_formula(), arb_ltl_formula(), 0..4usize).prop_map(|(f, g, shape)| match shape {
        0 => Formula::Hole.and(f),
        1 => f.until(Formula::Hole),
        2 => Formula::Hole.or(g).always().implies(f),
        _ => Formula::Hole.next().not(),
    })
}

fn arb_step(total: bool) -> impl Strategy<Value = Step> {
    let value = if total {
        any::<bool>().prop_map(Some).boxed()
    } else {
        prop::option::weighted(0.7, any::<bool>()).boxed()
    };
    prop::collection::vec(value, ATOMS.len()).prop_map(|values| {
        ATOMS
            .iter()
            .zip(values)
            .filter_map(|(name, v)| v.map(|v| (name.to_string(), v)))
            .collect()
    })
}

/// Lassos over [`ATOMS`] where every proposition is assigned at every step.
pub fn arb_total_lasso() -> impl Strategy<Value = Lasso> {
    (
        prop::collection::vec(arb_step(true), 0..4),
        prop::collection::vec(arb_step(true), 1..4),
    )
        .prop_map(|(prefix, cycle)| Lasso::new(prefix, cycle))
}

/// Lassos over [`ATOMS`] with some values left unassigned.
pub fn arb_partial_lasso() -> impl Strategy<Value = Lasso> {
    (
        prop::collection::vec(arb_step(false), 0..4),
        prop::collection::vec(arb_step(false), 1..4),
    )
        .prop_map(|(prefix, cycle)| Lasso::new(prefix, cycle))
}
