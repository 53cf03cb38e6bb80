#![doc = include_str!("../README.md")]

//! Equivalence checking of formulas with contexts.
//!
//! [`pipeline::check_equivalence`] parses two formulas, eliminates their
//! contexts, asks the oracle of the selected logic for counterexamples in
//! both directions and reports the verdict with context witnesses.

pub mod logics;
pub mod oracles;
pub mod pipeline;
pub mod problem;
pub mod result;
