use std::fmt;

use ctxeq_dsl::Formula;
use ctxeq_ir::lasso::Lasso;
use ctxeq_ir::logic::Logic;
use ctxeq_ir::Assignment;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Replacement formula (with a hole) per context name.
pub type ContextMap = IndexMap<String, Formula>;

fn formula_text<S: Serializer>(formula: &Formula, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(formula)
}

fn context_texts<S: Serializer>(contexts: &ContextMap, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(contexts.iter().map(|(name, f)| (name, f.to_string())))
}

/// Model of `L ∧ C ∧ ¬R` (or the symmetric query) returned by an oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Counterexample {
    Assignment(Assignment),
    Lasso(Lasso),
    /// The oracle says a model exists but does not produce one.
    Opaque,
}

impl Counterexample {
    /// Values used to simplify witnesses: the assignment itself, the
    /// invariants of a lasso, nothing for an opaque answer.
    pub fn valuation(&self) -> Option<Assignment> {
        match self {
            Counterexample::Assignment(values) => Some(values.clone()),
            Counterexample::Lasso(lasso) => Some(lasso.invariants()),
            Counterexample::Opaque => None,
        }
    }

    pub fn as_lasso(&self) -> Option<&Lasso> {
        match self {
            Counterexample::Lasso(lasso) => Some(lasso),
            _ => None,
        }
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counterexample::Assignment(values) if values.is_empty() => write!(f, "true"),
            Counterexample::Assignment(values) => {
                for (i, (name, value)) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ∧ ")?;
                    }
                    if *value {
                        write!(f, "{name}")?;
                    } else {
                        write!(f, "¬ {name}")?;
                    }
                }
                Ok(())
            }
            Counterexample::Lasso(lasso) => write!(f, "{lasso}"),
            Counterexample::Opaque => write!(f, "no more info"),
        }
    }
}

/// The formulas handed to the oracles after context elimination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFormulas {
    #[serde(serialize_with = "formula_text")]
    pub left: Formula,
    #[serde(serialize_with = "formula_text")]
    pub right: Formula,
    #[serde(serialize_with = "formula_text")]
    pub condition: Formula,
}

/// Context witnesses of (non-)equivalence.
///
/// When both directions have counterexamples that simplify the canonical
/// contexts differently, one map per direction is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Witnesses {
    Single {
        #[serde(serialize_with = "context_texts")]
        contexts: ContextMap,
    },
    Split {
        #[serde(serialize_with = "context_texts")]
        lnr: ContextMap,
        #[serde(serialize_with = "context_texts")]
        rnl: ContextMap,
    },
}

impl Witnesses {
    /// Merge per-direction witnesses; equal or missing sides collapse.
    pub fn merge(lnr: Option<ContextMap>, rnl: Option<ContextMap>, fallback: ContextMap) -> Self {
        match (lnr, rnl) {
            (None, None) => Witnesses::Single { contexts: fallback },
            (Some(contexts), None) | (None, Some(contexts)) => Witnesses::Single { contexts },
            (Some(lnr), Some(rnl)) if lnr == rnl => Witnesses::Single { contexts: lnr },
            (Some(lnr), Some(rnl)) => Witnesses::Split { lnr, rnl },
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Witnesses::Single { contexts } => contexts.is_empty(),
            Witnesses::Split { lnr, rnl } => lnr.is_empty() && rnl.is_empty(),
        }
    }

    /// A single context map, taking the L → R one when split.
    pub fn primary(&self) -> &ContextMap {
        match self {
            Witnesses::Single { contexts } => contexts,
            Witnesses::Split { lnr, .. } => lnr,
        }
    }
}

fn fmt_contexts(f: &mut fmt::Formatter<'_>, title: &str, contexts: &ContextMap) -> fmt::Result {
    write!(f, "Witnesses{title}:")?;
    for (k, (name, formula)) in contexts.iter().enumerate() {
        let marker = if k + 1 == contexts.len() { '└' } else { '├' };
        write!(f, "\n {marker} {name:3} ≔  {formula}")?;
    }
    Ok(())
}

impl fmt::Display for Witnesses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Witnesses::Single { contexts } => fmt_contexts(f, "", contexts),
            Witnesses::Split { lnr, rnl } => {
                fmt_contexts(f, " for L → R", lnr)?;
                writeln!(f)?;
                fmt_contexts(f, " for R → L", rnl)
            }
        }
    }
}

/// How the two formulas relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Equivalent,
    /// Every model of the left formula satisfies the right one.
    LeftImpliesRight,
    RightImpliesLeft,
    Incomparable,
}

impl Relation {
    pub fn from_counterexamples(lnr: bool, rnl: bool) -> Self {
        match (lnr, rnl) {
            (false, false) => Relation::Equivalent,
            (false, true) => Relation::LeftImpliesRight,
            (true, false) => Relation::RightImpliesLeft,
            (true, true) => Relation::Incomparable,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Relation::Equivalent => "yes",
            Relation::LeftImpliesRight => {
                "The first formula is covered by the second one (L → R)."
            }
            Relation::RightImpliesLeft => {
                "The second formula is covered by the first one (R → L)."
            }
            Relation::Incomparable => "The two formulas are incomparable.",
        }
    }
}

/// Outcome of one equivalence check.
#[derive(Debug, Clone, Serialize)]
pub struct EquivalenceReport {
    pub logic: Logic,
    pub equivalent: bool,
    pub relation: Relation,
    /// Model of the left formula that violates the right one.
    pub lnr: Option<Counterexample>,
    /// Model of the right formula that violates the left one.
    pub rnl: Option<Counterexample>,
    pub generated: GeneratedFormulas,
    pub witnesses: Option<Witnesses>,
    /// Explicit witnesses read off the counterexample runs (LTL only).
    pub run_witnesses: Option<Witnesses>,
    /// Whether checking with the canonical contexts substituted gave the
    /// same verdict; only set when that check was requested.
    pub canonical_agrees: Option<bool>,
}

impl fmt::Display for EquivalenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relation.message())?;
        if let Some(lnr) = &self.lnr {
            let symbol = if self.rnl.is_some() { '├' } else { '└' };
            write!(f, "\n {symbol} Not in R: {lnr}")?;
        }
        if let Some(rnl) = &self.rnl {
            write!(f, "\n └ Not in L: {rnl}")?;
        }
        if let Some(witnesses) = &self.witnesses {
            write!(f, "\n{witnesses}")?;
        }
        if self.canonical_agrees == Some(false) {
            write!(
                f,
                "\nwarning: the result with the substitution method ({}) does not coincide.",
                !self.equivalent
            )?;
        }
        Ok(())
    }
}
