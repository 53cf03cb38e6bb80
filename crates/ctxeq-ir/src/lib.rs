#![doc = include_str!("../README.md")]

//! Formula transformations behind contextual equivalence checking.
//!
//! The entry point is [`transform::Transformer`], which turns a pair of
//! formulas with contexts into plain formulas plus a consistency condition.
//! [`ternary::Valuation`] evaluates linear-time formulas over counterexample
//! lassos and [`simplify::simplify`] shrinks the resulting witnesses.

pub mod algebra;
pub mod ctl;
pub mod error;
pub mod lasso;
pub mod logic;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod simplify;
pub mod ternary;
pub mod transform;

pub use error::FormulaError;
pub use simplify::Assignment;
