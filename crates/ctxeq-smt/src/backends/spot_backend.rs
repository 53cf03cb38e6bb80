//! Spot as a source of accepting lassos.
//!
//! `ltl2tgba -f <formula>` builds an automaton in HOA format, which is piped
//! into `autfilt --stats=%w` to print one accepted word. An automaton with an
//! empty language prints nothing.

use std::process::Command;
use std::time::{Duration, Instant};

use ctxeq_dsl::Formula;
use ctxeq_ir::lasso::Lasso;
use tracing::debug;

use crate::error::OracleError;
use crate::process::{run_with_timeout, stderr_excerpt, time_left};
use crate::spot::{parse_spot_word, to_spot};

/// Finds a run satisfying an LTL formula.
pub trait LassoOracle {
    fn accepting_word(&mut self, formula: &Formula) -> Result<Option<Lasso>, OracleError>;
}

#[derive(Debug, Clone)]
pub struct SpotSolver {
    translate_command: String,
    word_command: String,
    timeout: Option<Duration>,
}

impl SpotSolver {
    pub fn new() -> Self {
        Self::with_commands("ltl2tgba", "autfilt")
    }

    pub fn with_commands(translate_command: &str, word_command: &str) -> Self {
        Self {
            translate_command: translate_command.to_string(),
            word_command: word_command.to_string(),
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

    fn run_step(
        &self,
        mut command: Command,
        stdin: Option<&[u8]>,
        deadline: Option<Instant>,
    ) -> Result<Vec<u8>, OracleError> {
        let program = command.get_program().to_string_lossy().into_owned();
        let output = run_with_timeout(command, stdin, time_left(deadline, self.timeout)?)
            .map_err(|e| match e {
                // Report the whole budget, not what was left for this step.
                OracleError::Timeout { .. } => {
                    OracleError::timeout(self.timeout.unwrap_or_default())
                }
                other => other,
            })?;
        if !output.status.success() {
            return Err(OracleError::Failure(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr_excerpt(&output.stderr)
            )));
        }
        Ok(output.stdout)
    }
}

impl Default for SpotSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LassoOracle for SpotSolver {
    fn accepting_word(&mut self, formula: &Formula) -> Result<Option<Lasso>, OracleError> {
        let text = to_spot(formula)?;
        let deadline = self.timeout.map(|t| Instant::now() + t);

        let mut translate = Command::new(&self.translate_command);
        translate.arg("-f").arg(&text);
        let automaton = self.run_step(translate, None, deadline)?;

        let mut word = Command::new(&self.word_command);
        word.arg("--stats=%w");
        let stdout = self.run_step(word, Some(&automaton), deadline)?;

        let word = String::from_utf8_lossy(&stdout);
        let word = word.trim();
        debug!(formula = %text, %word, "spot accepting word");
        if word.is_empty() {
            return Ok(None);
        }
        parse_spot_word(word).map(Some)
    }
}
