//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{ArgAction, Parser, Subcommand};

pub(crate) const CLI_LONG_ABOUT: &str =
    "Check equivalence of LTL, CTL or propositional formulas with contexts.\n\n\
    A context c[φ] stands for any formula with a hole applied to φ. Two\n\
    formulas are equivalent when they agree for every choice of contexts\n\
    (monotonic ones by default, arbitrary ones with --any-formula).\n\n\
    Examples:\n  \
    ctxeq --logic bool check 'c[p & q]' 'c[p] & c[q]'\n  \
    ctxeq check 'c[p] U q' 'c[p U q]'\n  \
    ctxeq < pairs.txt";

#[derive(Parser)]
#[command(name = "ctxeq")]
#[command(about = "Check equivalence of LTL/CTL formulas with contexts")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    /// Logic of the formulas: ltl | ctl | bool
    #[arg(long, short = 'l', global = true, default_value = "ltl")]
    pub(crate) logic: String,

    /// Check equivalence for any context, not just monotonic ones
    #[arg(long, short = 'a', global = true)]
    pub(crate) any_formula: bool,

    /// Time budget for the external tools of one check, in seconds (0 disables it)
    #[arg(long, short = 't', global = true, default_value_t = 20)]
    pub(crate) timeout: u64,

    /// When to show context witnesses: yes | no | auto (only when not equivalent)
    #[arg(long, short = 'w', global = true, default_value = "auto")]
    pub(crate) witness: String,

    /// Do not simplify the canonical contexts with the counterexamples
    #[arg(long = "no-simplify", global = true, action = ArgAction::SetFalse)]
    pub(crate) simplify: bool,

    /// Also check equivalence with the canonical contexts substituted
    #[arg(long, global = true)]
    pub(crate) check_with_canonical: bool,

    /// Output format: text | json
    #[arg(long, global = true, default_value = "text")]
    pub(crate) format: String,

    /// Increase verbosity (-v: run witnesses and debug logs, -vv: generated formulas)
    #[arg(short = 'v', global = true, action = ArgAction::Count)]
    pub(crate) verbose: u8,

    /// SMT-LIB solver for propositional problems
    #[arg(long, global = true, default_value = "z3")]
    pub(crate) smt_solver: String,

    /// CTL-SAT executable
    #[arg(long, global = true, default_value = "ctl-sat")]
    pub(crate) ctl_sat: String,

    /// Spot's LTL-to-automaton translator
    #[arg(long, global = true, default_value = "ltl2tgba")]
    pub(crate) ltl2tgba: String,

    /// Spot's automaton filter, used to extract accepting words
    #[arg(long, global = true, default_value = "autfilt")]
    pub(crate) autfilt: String,

    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check one pair of formulas
    Check {
        /// Left formula
        left: String,
        /// Right formula
        right: String,
    },
    /// Read pairs of formulas from standard input, one per line (the default)
    Repl,
}
