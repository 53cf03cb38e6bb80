//! End-to-end equivalence checks: parse, eliminate contexts, ask the
//! oracles, and assemble a report.

pub mod timeout;

use std::fmt;

use ctxeq_dsl::errors::ParseError;
use ctxeq_dsl::Formula;
use ctxeq_ir::logic::Logic;
use ctxeq_ir::transform::ContextMode;
use ctxeq_ir::FormulaError;
use ctxeq_smt::OracleError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::oracles::{ExternalOracles, OracleSet};
use crate::problem::EquivalenceProblem;
use crate::result::{EquivalenceReport, Relation};

/// Which of the two compared formulas an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{side} formula: {source}")]
    Parse {
        side: Side,
        #[source]
        source: ParseError,
    },
    #[error("{side} formula: {message}")]
    InvalidFormula { side: Side, message: String },
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl EngineError {
    /// Attach `side` to a validation failure. Internal invariant violations
    /// are kept as they are.
    pub fn on_side(side: Side, error: FormulaError) -> Self {
        match error {
            FormulaError::InvalidFormula(message) => EngineError::InvalidFormula { side, message },
            other => EngineError::Formula(other),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Oracle(e) if e.is_timeout())
    }
}

/// When to compute context witnesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WitnessMode {
    Yes,
    No,
    /// Only for formulas that are not equivalent.
    #[default]
    Auto,
}

impl WitnessMode {
    pub fn wanted(self, equivalent: bool) -> bool {
        match self {
            WitnessMode::Yes => true,
            WitnessMode::No => false,
            WitnessMode::Auto => !equivalent,
        }
    }
}

impl std::str::FromStr for WitnessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(WitnessMode::Yes),
            "no" => Ok(WitnessMode::No),
            "auto" => Ok(WitnessMode::Auto),
            other => Err(format!("unknown witness mode '{other}' (expected yes, no or auto)")),
        }
    }
}

/// Options for one equivalence check.
#[derive(Debug, Clone)]
pub struct EquivalenceOptions {
    pub logic: Logic,
    pub mode: ContextMode,
    /// Budget for all oracle calls of one check, in seconds. Zero disables it.
    pub timeout_secs: u64,
    /// SMT-LIB solver used for propositional problems.
    pub smt_command: String,
    pub ctl_sat_command: String,
    /// Spot's formula-to-automaton translator.
    pub spot_translate_command: String,
    /// Spot tool printing an accepting word of an automaton.
    pub spot_word_command: String,
    /// Simplify canonical contexts with the counterexample valuations.
    pub simplify: bool,
    /// Also decide equivalence with the canonical contexts substituted.
    pub check_with_canonical: bool,
    pub witnesses: WitnessMode,
}

impl Default for EquivalenceOptions {
    fn default() -> Self {
        Self {
            logic: Logic::Ltl,
            mode: ContextMode::Monotonic,
            timeout_secs: 20,
            smt_command: "z3".into(),
            ctl_sat_command: "ctl-sat".into(),
            spot_translate_command: "ltl2tgba".into(),
            spot_word_command: "autfilt".into(),
            simplify: true,
            check_with_canonical: false,
            witnesses: WitnessMode::Auto,
        }
    }
}

/// Parse both formulas and check them with the external oracles of `options`.
pub fn check_equivalence(
    left: &str,
    right: &str,
    options: &EquivalenceOptions,
) -> Result<EquivalenceReport, EngineError> {
    let left = options
        .logic
        .parse(left, "left")
        .map_err(|source| EngineError::Parse { side: Side::Left, source })?;
    let right = options
        .logic
        .parse(right, "right")
        .map_err(|source| EngineError::Parse { side: Side::Right, source })?;
    let mut oracles = ExternalOracles::from_options(options);
    let report = check_formulas(&left, &right, options, &mut oracles);
    if let Some(secs) = timeout::remaining_timeout_secs(oracles.deadline()) {
        debug!(remaining_secs = secs, "time budget left after check");
    }
    report
}

/// Check two parsed formulas with the given oracles.
pub fn check_formulas(
    left: &Formula,
    right: &Formula,
    options: &EquivalenceOptions,
    oracles: &mut dyn OracleSet,
) -> Result<EquivalenceReport, EngineError> {
    info!(logic = %options.logic, mode = ?options.mode, %left, %right, "checking equivalence");
    let mut problem = EquivalenceProblem::new(left, right, options.logic, options.mode)?;
    let equivalent = problem.solve(oracles)?;
    let lnr = problem.lnr().cloned();
    let rnl = problem.rnl().cloned();

    let mut canonical_agrees = None;
    let wanted = options.witnesses.wanted(equivalent);
    let run_witnesses = if wanted { problem.run_witnesses()? } else { None };
    let witnesses = if wanted {
        let witnesses = if options.check_with_canonical {
            let (witnesses, holds) = problem.solve_with_context(oracles, options.simplify)?;
            if holds != equivalent {
                warn!(equivalent, substituted = holds, "canonical substitution disagrees");
            }
            canonical_agrees = Some(holds == equivalent);
            witnesses
        } else {
            problem.canonical_context(options.simplify)
        };
        (!witnesses.is_empty()).then_some(witnesses)
    } else {
        None
    };

    let relation = Relation::from_counterexamples(lnr.is_some(), rnl.is_some());
    info!(?relation, "equivalence check finished");
    Ok(EquivalenceReport {
        logic: options.logic,
        equivalent,
        relation,
        lnr,
        rnl,
        generated: problem.generated(),
        witnesses,
        run_witnesses,
        canonical_agrees,
    })
}
