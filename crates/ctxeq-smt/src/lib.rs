#![doc = include_str!("../README.md")]

//! External decision procedures behind small traits: [`solver::SmtSolver`]
//! for Boolean satisfiability, [`backends::ctlsat_backend::CtlSatisfiability`]
//! for CTL and [`backends::spot_backend::LassoOracle`] for LTL.

pub mod backends;
pub mod ctlsat;
pub mod encoder;
pub mod error;
pub mod process;
pub mod solver;
pub mod spot;
pub mod terms;

pub use error::OracleError;
