//! SMT-LIB 2 solver driven by one script per query.
//!
//! Declarations and assertions are buffered; each `check_sat` runs the solver
//! once on the whole script through [`run_with_timeout`], so a query never
//! outlives its deadline.

use std::process::Command;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::debug;

use crate::backends::smtlib_printer::to_smtlib;
use crate::error::OracleError;
use crate::process::{run_with_timeout, stderr_excerpt};
use crate::solver::{Model, SatResult, SmtSolver};
use crate::terms::SmtTerm;

pub struct ScriptSolver {
    command: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    declarations: Vec<String>,
    assertions: Vec<String>,
}

impl ScriptSolver {
    pub fn z3() -> Self {
        Self::with_command("z3")
    }

    pub fn cvc5() -> Self {
        Self::with_command("cvc5")
    }

    /// Solver at `cmd`; the arguments are chosen from the binary name
    /// (`cvc5` flags if it mentions cvc5, `z3` flags otherwise).
    pub fn with_command(cmd: &str) -> Self {
        let binary = std::path::Path::new(cmd)
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let args: &[&str] = if binary.contains("cvc5") {
            &["--lang", "smt2", "--produce-models", "-"]
        } else {
            &["-smt2", "-in"]
        };
        Self::with_command_and_args(cmd, args.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_command_and_args(cmd: &str, args: Vec<String>) -> Self {
        Self {
            command: cmd.to_string(),
            args,
            timeout: None,
            declarations: Vec::new(),
            assertions: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The script sent to the solver, ending with a `get-value` for `values`
    /// when it is non-empty.
    pub fn script(&self, values: &[&str]) -> String {
        let mut script = String::from("(set-option :produce-models true)\n(set-logic QF_UF)\n");
        for line in self.declarations.iter().chain(&self.assertions) {
            script.push_str(line);
            script.push('\n');
        }
        script.push_str("(check-sat)\n");
        if !values.is_empty() {
            script.push_str(&format!("(get-value ({}))\n", values.join(" ")));
        }
        script.push_str("(exit)\n");
        script
    }

    fn run(&self, values: &[&str]) -> Result<String, OracleError> {
        let mut command = Command::new(&self.command);
        command.args(&self.args);
        let script = self.script(values);
        let output = run_with_timeout(command, Some(script.as_bytes()), self.timeout)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Err(OracleError::Failure(format!(
                "no response from {} (exit status {}): {}",
                self.command,
                output.status,
                stderr_excerpt(&output.stderr)
            )));
        }
        Ok(stdout)
    }
}

/// Read the verdict on the first non-empty line of a solver answer.
pub fn parse_check_sat(response: &str) -> Result<SatResult, OracleError> {
    let line = response.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    match line {
        "sat" => Ok(SatResult::Sat),
        "unsat" => Ok(SatResult::Unsat),
        "unknown" => Ok(SatResult::Unknown("solver returned unknown".into())),
        other if other.starts_with("(error") => Err(OracleError::Failure(other.to_string())),
        other => Err(OracleError::Parse(format!("unexpected check-sat answer `{other}`"))),
    }
}

/// Parse a `get-value` answer such as `((v0 true) (v1 false))`.
pub fn parse_get_value(response: &str) -> Result<IndexMap<String, bool>, OracleError> {
    let flattened = response.replace(['(', ')'], " ");
    let tokens: Vec<&str> = flattened.split_whitespace().collect();
    if tokens.len() % 2 != 0 {
        return Err(OracleError::Parse(format!("unbalanced get-value answer `{}`", response.trim())));
    }
    tokens
        .chunks(2)
        .map(|pair| {
            let value = match pair[1] {
                "true" => true,
                "false" => false,
                other => {
                    return Err(OracleError::Parse(format!(
                        "non-Boolean value `{other}` for {}",
                        pair[0]
                    )))
                }
            };
            Ok((pair[0].to_string(), value))
        })
        .collect()
}

impl SmtSolver for ScriptSolver {
    fn declare_var(&mut self, name: &str) -> Result<(), OracleError> {
        self.declarations.push(format!("(declare-const {name} Bool)"));
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), OracleError> {
        self.assertions.push(format!("(assert {})", to_smtlib(term)));
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, OracleError> {
        let response = self.run(&[])?;
        parse_check_sat(&response)
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[&str],
    ) -> Result<(SatResult, Option<Model>), OracleError> {
        let response = self.run(var_names)?;
        let result = parse_check_sat(&response)?;
        debug!(solver = %self.command, ?result, "check-sat");
        if result != SatResult::Sat || var_names.is_empty() {
            let model = (result == SatResult::Sat).then(Model::default);
            return Ok((result, model));
        }
        let rest: String = response
            .lines()
            .skip_while(|l| l.trim().is_empty())
            .skip(1)
            .collect::<Vec<_>>()
            .join("\n");
        let values = parse_get_value(&rest)?;
        Ok((SatResult::Sat, Some(Model { values })))
    }

    fn reset(&mut self) -> Result<(), OracleError> {
        self.declarations.clear();
        self.assertions.clear();
        Ok(())
    }
}
