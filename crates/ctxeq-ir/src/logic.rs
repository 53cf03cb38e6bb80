//! Logics supported by the checker and how each one wraps a premise.

use ctxeq_dsl::{Formula, ParseError};
use serde::Serialize;

/// How a logic turns a local premise into one that must hold globally.
pub trait PremiseWrap: Sync {
    fn wrap_premise(&self, premise: Formula) -> Formula;
    fn name(&self) -> &'static str;
}

/// LTL: the premise holds at every position of the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTime;

/// CTL: the premise holds in every reachable state.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchingTime;

/// Propositional logic: there is a single state, nothing to wrap.
#[derive(Debug, Clone, Copy, Default)]
pub struct Propositional;

impl PremiseWrap for LinearTime {
    fn wrap_premise(&self, premise: Formula) -> Formula {
        premise.always()
    }

    fn name(&self) -> &'static str {
        "ltl"
    }
}

impl PremiseWrap for BranchingTime {
    fn wrap_premise(&self, premise: Formula) -> Formula {
        premise.always().forall()
    }

    fn name(&self) -> &'static str {
        "ctl"
    }
}

impl PremiseWrap for Propositional {
    fn wrap_premise(&self, premise: Formula) -> Formula {
        premise
    }

    fn name(&self) -> &'static str {
        "bool"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    Bool,
    #[default]
    Ltl,
    Ctl,
}

impl Logic {
    pub const ALL: [Logic; 3] = [Logic::Bool, Logic::Ltl, Logic::Ctl];

    pub fn premise_wrap(self) -> &'static dyn PremiseWrap {
        match self {
            Logic::Bool => &Propositional,
            Logic::Ltl => &LinearTime,
            Logic::Ctl => &BranchingTime,
        }
    }

    pub fn name(self) -> &'static str {
        self.premise_wrap().name()
    }

    /// Parse `source` with this logic's syntax; only CTL reads `A` and `E`
    /// as path quantifiers.
    pub fn parse(self, source: &str, name: &str) -> Result<Formula, ParseError> {
        match self {
            Logic::Ctl => ctxeq_dsl::parse_ctl_named(source, name),
            Logic::Bool | Logic::Ltl => ctxeq_dsl::parse_named(source, name),
        }
    }
}

impl std::fmt::Display for Logic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Logic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" | "prop" => Ok(Logic::Bool),
            "ltl" => Ok(Logic::Ltl),
            "ctl" => Ok(Logic::Ctl),
            other => Err(format!("unknown logic '{other}' (expected bool, ltl or ctl)")),
        }
    }
}
