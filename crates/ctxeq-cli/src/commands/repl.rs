// Command handler for: Repl
//
// Reads the left and right formulas from consecutive lines of standard
// input until it ends. Errors are reported per pair and the loop goes on.

use std::io::{self, BufRead, IsTerminal, Write};

use ctxeq_engine::pipeline::{check_equivalence, EngineError};
use miette::IntoDiagnostic;
use serde_json::json;
use tracing::debug;

use super::helpers::{render_report, Settings};
use crate::OutputFormat;

fn read_formula(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    side: char,
    interactive: bool,
) -> miette::Result<Option<String>> {
    if interactive {
        print!("({side})> ");
        io::stdout().flush().into_diagnostic()?;
    }
    lines.next().transpose().into_diagnostic()
}

fn error_text(error: &EngineError) -> String {
    match error {
        EngineError::Parse { side, source } => format!("{side} formula: error: {source}"),
        e if e.is_timeout() => format!("error: could not determine equivalence: {e}"),
        e => format!("error: {e}"),
    }
}

pub(crate) fn run_repl_command(settings: &Settings) -> miette::Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();
    let json = settings.format == OutputFormat::Json;
    let mut pairs = 0usize;

    loop {
        let Some(left) = read_formula(&mut lines, 'L', interactive)? else {
            break;
        };
        let Some(right) = read_formula(&mut lines, 'R', interactive)? else {
            break;
        };
        if !interactive && !json {
            println!("{left} =? {right}");
        }
        pairs += 1;

        match check_equivalence(&left, &right, &settings.options) {
            Ok(report) => println!("{}", render_report(&report, settings)?),
            Err(error) if json => {
                debug!(pair = pairs, %error, "check failed");
                println!("{}", json!({ "left": left, "right": right, "error": error.to_string() }))
            }
            Err(error) => {
                debug!(pair = pairs, %error, "check failed");
                println!("{}", error_text(&error))
            }
        }
    }
    debug!(pairs, "end of input");
    Ok(())
}
