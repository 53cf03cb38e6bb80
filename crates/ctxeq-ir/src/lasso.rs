//! Ultimately periodic runs (lassos) over partial propositional steps.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::simplify::Assignment;

/// One position of a run: the propositions whose value is known there.
pub type Step = IndexMap<String, bool>;

/// A run `prefix · cycle^ω`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lasso {
    pub prefix: Vec<Step>,
    pub cycle: Vec<Step>,
}

impl Lasso {
    pub fn new(prefix: Vec<Step>, cycle: Vec<Step>) -> Self {
        Self { prefix, cycle }
    }

    /// Number of positions in one unrolled period (prefix plus one cycle).
    pub fn period(&self) -> usize {
        self.prefix.len() + self.cycle.len()
    }

    /// Step at position `k`, following the cycle after the prefix.
    pub fn step(&self, k: usize) -> Option<&Step> {
        if k < self.prefix.len() {
            return self.prefix.get(k);
        }
        if self.cycle.is_empty() {
            return None;
        }
        self.cycle.get((k - self.prefix.len()) % self.cycle.len())
    }

    /// Propositions mentioned anywhere in the run.
    pub fn atoms(&self) -> IndexSet<String> {
        self.prefix
            .iter()
            .chain(&self.cycle)
            .flat_map(|step| step.keys().cloned())
            .collect()
    }

    /// Propositions whose value is the same at every step where they are
    /// mentioned. A proposition seen with both values is dropped for good.
    pub fn invariants(&self) -> Assignment {
        let mut invariants = Assignment::new();
        let mut conflicting = IndexSet::new();

        for step in self.prefix.iter().chain(&self.cycle) {
            for (var, value) in step {
                if conflicting.contains(var) {
                    continue;
                }
                match invariants.get(var) {
                    None => {
                        invariants.insert(var.clone(), *value);
                    }
                    Some(old) if old != value => {
                        invariants.shift_remove(var);
                        conflicting.insert(var.clone());
                    }
                    Some(_) => {}
                }
            }
        }
        invariants
    }
}

fn fmt_step(step: &Step, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if step.is_empty() {
        return write!(f, "1");
    }
    for (i, (var, value)) in step.iter().enumerate() {
        if i > 0 {
            write!(f, " & ")?;
        }
        if !value {
            write!(f, "!")?;
        }
        if ctxeq_dsl::ast::is_plain_identifier(var) {
            write!(f, "{var}")?;
        } else {
            write!(f, "\"{var}\"")?;
        }
    }
    Ok(())
}

/// Spot's accepting-word notation: `a & !b; cycle{a; !a}`.
impl std::fmt::Display for Lasso {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for step in &self.prefix {
            fmt_step(step, f)?;
            write!(f, "; ")?;
        }
        write!(f, "cycle{{")?;
        for (i, step) in self.cycle.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            fmt_step(step, f)?;
        }
        write!(f, "}}")
    }
}
