//! The decision procedures an equivalence check may call.

use std::time::Instant;

use ctxeq_smt::backends::ctlsat_backend::{CtlSatSolver, CtlSatisfiability};
use ctxeq_smt::backends::script_solver::ScriptSolver;
use ctxeq_smt::backends::spot_backend::{LassoOracle, SpotSolver};
use ctxeq_smt::solver::SmtSolver;
use ctxeq_smt::OracleError;

use crate::pipeline::timeout::{deadline_from_timeout_secs, oracle_budget};
use crate::pipeline::EquivalenceOptions;

/// One oracle per logic. Handing out an oracle may fail once the time
/// budget of the check is spent.
pub trait OracleSet {
    fn sat(&mut self) -> Result<&mut dyn SmtSolver, OracleError>;
    fn ctl(&mut self) -> Result<&mut dyn CtlSatisfiability, OracleError>;
    fn lasso(&mut self) -> Result<&mut dyn LassoOracle, OracleError>;
}

/// The external binaries configured in [`EquivalenceOptions`], sharing one
/// deadline.
pub struct ExternalOracles {
    smt: ScriptSolver,
    ctl: CtlSatSolver,
    spot: SpotSolver,
    deadline: Option<Instant>,
    timeout_secs: u64,
}

impl ExternalOracles {
    /// Oracles whose deadline starts now.
    pub fn from_options(options: &EquivalenceOptions) -> Self {
        Self {
            smt: ScriptSolver::with_command(&options.smt_command),
            ctl: CtlSatSolver::with_command(&options.ctl_sat_command),
            spot: SpotSolver::with_commands(
                &options.spot_translate_command,
                &options.spot_word_command,
            ),
            deadline: deadline_from_timeout_secs(options.timeout_secs),
            timeout_secs: options.timeout_secs,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl OracleSet for ExternalOracles {
    fn sat(&mut self) -> Result<&mut dyn SmtSolver, OracleError> {
        self.smt.set_timeout(oracle_budget(self.deadline, self.timeout_secs)?);
        Ok(&mut self.smt)
    }

    fn ctl(&mut self) -> Result<&mut dyn CtlSatisfiability, OracleError> {
        self.ctl.set_timeout(oracle_budget(self.deadline, self.timeout_secs)?);
        Ok(&mut self.ctl)
    }

    fn lasso(&mut self) -> Result<&mut dyn LassoOracle, OracleError> {
        self.spot.set_timeout(oracle_budget(self.deadline, self.timeout_secs)?);
        Ok(&mut self.spot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spent_budget_refuses_oracles() {
        let options = EquivalenceOptions {
            timeout_secs: 5,
            ..EquivalenceOptions::default()
        };
        let mut oracles = ExternalOracles::from_options(&options);
        assert!(oracles.sat().is_ok());
        oracles.deadline = Some(Instant::now() - std::time::Duration::from_millis(1));
        assert!(matches!(oracles.ctl(), Err(OracleError::Timeout { secs: 5 })));
    }

    #[test]
    fn zero_timeout_means_no_deadline() {
        let options = EquivalenceOptions {
            timeout_secs: 0,
            ..EquivalenceOptions::default()
        };
        let mut oracles = ExternalOracles::from_options(&options);
        assert!(oracles.deadline().is_none());
        assert!(oracles.lasso().is_ok());
    }
}
