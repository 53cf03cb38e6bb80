#![doc = include_str!("../README.md")]

mod cli;
mod commands;
mod types;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
pub(crate) use crate::types::OutputFormat;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose > 0 { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = commands::helpers::settings_from_cli(&cli)?;
    match &cli.command {
        Some(Commands::Check { left, right }) => {
            commands::check::run_check_command(left, right, &settings)
        }
        Some(Commands::Repl) | None => commands::repl::run_repl_command(&settings),
    }
}
