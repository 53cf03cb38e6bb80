//! Randomized checks of the propositional engine against the truth-table
//! oracle.

mod common;

use common::MockOracles;
use ctxeq_dsl::{BinaryOp, Formula};
use ctxeq_engine::logics::find_difference;
use ctxeq_engine::pipeline::{check_formulas, EquivalenceOptions, WitnessMode};
use ctxeq_ir::algebra::instantiate_context;
use ctxeq_ir::logic::Logic;
use ctxeq_ir::transform::{ContextMode, Transformer};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, RngAlgorithm, RngSeed};

fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("CTXEQ_PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(32);
    ProptestConfig {
        cases,
        failure_persistence: None,
        rng_algorithm: RngAlgorithm::ChaCha,
        rng_seed: RngSeed::Fixed(0xC7E0_0002_u64),
        ..ProptestConfig::default()
    }
}

fn arb_mode() -> impl Strategy<Value = ContextMode> {
    any::<bool>().prop_map(ContextMode::from_any_formula)
}

/// Propositional formulas over `a` and `b` applying the context `c`.
fn arb_bool_with_contexts() -> impl Strategy<Value = Formula> {
    let leaf = prop_oneof![
        4 => prop::sample::select(vec!["a", "b"]).prop_map(Formula::var),
        1 => any::<bool>().prop_map(Formula::Lit),
    ];
    leaf.prop_recursive(3, 10, 2, |inner| {
        prop_oneof![
            2 => inner.clone().prop_map(|f| Formula::context("c", f)),
            1 => inner.clone().prop_map(Formula::not),
            2 => (
                prop::sample::select(vec![BinaryOp::And, BinaryOp::Or, BinaryOp::Implies]),
                inner.clone(),
                inner,
            )
                .prop_map(|(op, l, r)| Formula::binary(op, l, r)),
        ]
    })
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn canonical_context_entails_each_occurrence(
        left in arb_bool_with_contexts(),
        right in arb_bool_with_contexts(),
        mode in arb_mode(),
    ) {
        let translation = Transformer::new(mode, Logic::Bool.premise_wrap())
            .translate(&left, &right)
            .unwrap();
        let canonical = translation.contexts.canonical_context();
        let mut oracles = MockOracles::default();
        for (name, occurrences) in translation.contexts.table() {
            for (arg, prop) in occurrences {
                let applied = instantiate_context(&canonical[name], arg).unwrap();
                let prop = Formula::var(prop.as_str());
                let gap = find_difference(Logic::Bool, &mut oracles, &applied, None, &prop).unwrap();
                prop_assert!(gap.is_none(), "{} does not entail {}", applied, prop);
            }
        }
    }

    #[test]
    fn canonical_substitution_matches_the_verdict(
        left in arb_bool_with_contexts(),
        right in arb_bool_with_contexts(),
        mode in arb_mode(),
    ) {
        let options = EquivalenceOptions {
            logic: Logic::Bool,
            mode,
            check_with_canonical: true,
            witnesses: WitnessMode::Yes,
            ..EquivalenceOptions::default()
        };
        let mut oracles = MockOracles::default();
        let report = check_formulas(&left, &right, &options, &mut oracles).unwrap();
        prop_assert_eq!(report.canonical_agrees, Some(true), "{} vs {}", left, right);
    }

    #[test]
    fn equivalence_is_symmetric(
        left in arb_bool_with_contexts(),
        right in arb_bool_with_contexts(),
        mode in arb_mode(),
    ) {
        let options = EquivalenceOptions {
            logic: Logic::Bool,
            mode,
            witnesses: WitnessMode::No,
            ..EquivalenceOptions::default()
        };
        let mut oracles = MockOracles::default();
        let forward = check_formulas(&left, &right, &options, &mut oracles).unwrap();
        let backward = check_formulas(&right, &left, &options, &mut oracles).unwrap();
        prop_assert_eq!(forward.equivalent, backward.equivalent);
        prop_assert_eq!(forward.lnr.is_some(), backward.rnl.is_some());
    }
}
