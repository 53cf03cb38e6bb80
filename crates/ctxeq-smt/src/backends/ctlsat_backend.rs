//! Runner for the CTL-SAT decision procedure.

use std::process::Command;
use std::time::Duration;

use tracing::debug;

use crate::error::OracleError;
use crate::process::{run_with_timeout, stderr_excerpt};

/// Satisfiability of an already encoded CTL-SAT formula.
pub trait CtlSatisfiability {
    fn is_satisfiable(&mut self, formula: &str) -> Result<bool, OracleError>;
}

/// Runs `<command> <formula>` and reads its verdict.
#[derive(Debug, Clone)]
pub struct CtlSatSolver {
    command: String,
    timeout: Option<Duration>,
}

impl CtlSatSolver {
    pub fn new() -> Self {
        Self::with_command("ctl-sat")
    }

    pub fn with_command(cmd: &str) -> Self {
        Self {
            command: cmd.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }
}

impl Default for CtlSatSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// The verdict is printed on the penultimate line of the output, spelled
/// `satisfable` or `NOT satisfable`.
pub fn parse_verdict(stdout: &str) -> Result<bool, OracleError> {
    let lines: Vec<&str> = stdout.split('\n').collect();
    let line = match lines.len() {
        0 | 1 => "",
        n => lines[n - 2],
    };
    if !line.contains("satisfable") {
        return Err(OracleError::Failure(format!(
            "unexpected ctl-sat output `{}`",
            line.trim()
        )));
    }
    Ok(!line.contains("NOT satisfable"))
}

impl CtlSatisfiability for CtlSatSolver {
    fn is_satisfiable(&mut self, formula: &str) -> Result<bool, OracleError> {
        let mut command = Command::new(&self.command);
        command.arg(formula);
        let output = run_with_timeout(command, None, self.timeout)?;
        if !output.status.success() {
            return Err(OracleError::Failure(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr_excerpt(&output.stderr)
            )));
        }
        let verdict = parse_verdict(&String::from_utf8_lossy(&output.stdout))?;
        debug!(%formula, satisfiable = verdict, "ctl-sat");
        Ok(verdict)
    }
}
