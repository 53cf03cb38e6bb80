// Command handler for: Check

use ctxeq_engine::pipeline::check_equivalence;

use super::helpers::{engine_error, render_report, Settings};

pub(crate) fn run_check_command(left: &str, right: &str, settings: &Settings) -> miette::Result<()> {
    let report = check_equivalence(left, right, &settings.options).map_err(engine_error)?;
    println!("{}", render_report(&report, settings)?);
    Ok(())
}
