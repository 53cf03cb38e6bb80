// Shared helpers: option parsing from the CLI and report rendering.

use std::fmt::Write as _;

use ctxeq_engine::pipeline::{EngineError, EquivalenceOptions, WitnessMode};
use ctxeq_engine::result::EquivalenceReport;
use ctxeq_ir::logic::Logic;
use ctxeq_ir::transform::ContextMode;
use miette::IntoDiagnostic;

use crate::cli::Cli;
use crate::OutputFormat;

/// Everything a command needs from the command line.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) options: EquivalenceOptions,
    pub(crate) format: OutputFormat,
    pub(crate) verbose: u8,
}

pub(crate) fn parse_output_format(raw: &str) -> miette::Result<OutputFormat> {
    match raw {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(miette::miette!(
            "Unknown output format: {other}. Use 'text' or 'json'."
        )),
    }
}

pub(crate) fn parse_logic(raw: &str) -> miette::Result<Logic> {
    raw.parse::<Logic>().map_err(|e| miette::miette!("{e}"))
}

pub(crate) fn parse_witness_mode(raw: &str) -> miette::Result<WitnessMode> {
    raw.parse::<WitnessMode>().map_err(|e| miette::miette!("{e}"))
}

pub(crate) fn settings_from_cli(cli: &Cli) -> miette::Result<Settings> {
    let options = EquivalenceOptions {
        logic: parse_logic(&cli.logic)?,
        mode: ContextMode::from_any_formula(cli.any_formula),
        timeout_secs: cli.timeout,
        smt_command: cli.smt_solver.clone(),
        ctl_sat_command: cli.ctl_sat.clone(),
        spot_translate_command: cli.ltl2tgba.clone(),
        spot_word_command: cli.autfilt.clone(),
        simplify: cli.simplify,
        check_with_canonical: cli.check_with_canonical,
        witnesses: parse_witness_mode(&cli.witness)?,
    };
    Ok(Settings {
        options,
        format: parse_output_format(&cli.format)?,
        verbose: cli.verbose,
    })
}

/// Text or JSON rendering of a report, with the extra sections the
/// verbosity level asks for.
pub(crate) fn render_report(report: &EquivalenceReport, settings: &Settings) -> miette::Result<String> {
    if settings.format == OutputFormat::Json {
        return serde_json::to_string(report).into_diagnostic();
    }

    let mut out = String::new();
    if settings.verbose >= 2 {
        let generated = &report.generated;
        let _ = writeln!(out, "Generated formula:");
        let _ = writeln!(out, "| L = {}", generated.left);
        let _ = writeln!(out, "| R = {}", generated.right);
        let _ = writeln!(out, "| C = {}", generated.condition);
    }
    let _ = write!(out, "{report}");
    if settings.verbose >= 1 {
        if let Some(run) = &report.run_witnesses {
            let _ = write!(out, "\nFrom the counterexample runs:\n{run}");
        }
    }
    Ok(out)
}

/// Diagnostic for a failed check. Parse errors keep their source labels.
pub(crate) fn engine_error(error: EngineError) -> miette::Report {
    match error {
        EngineError::Parse { side, source } => {
            miette::Report::new(source).wrap_err(format!("cannot parse {side} formula"))
        }
        e if e.is_timeout() => miette::miette!("could not determine equivalence: {e}"),
        e => miette::miette!("{e}"),
    }
}
