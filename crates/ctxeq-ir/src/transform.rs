//! Context elimination.
//!
//! Every context application `c[φ]` is replaced by a fresh proposition named
//! after it. The freedom lost by forgetting that these propositions come from
//! the same context is recovered by a consistency condition: whenever the
//! arguments of two occurrences are related (everywhere, for the temporal
//! logics) so must be their propositions.

use ctxeq_dsl::{BinaryOp, Formula};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

use crate::error::FormulaError;
use crate::logic::PremiseWrap;
use crate::simplify::{simplify, Assignment};

/// Which relation between arguments contexts must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Contexts are monotonic: `φ → ψ` implies `c[φ] → c[ψ]`.
    #[default]
    Monotonic,
    /// Contexts are arbitrary formulas: only `φ ↔ ψ` implies `c[φ] ↔ c[ψ]`.
    General,
}

impl ContextMode {
    pub fn from_any_formula(any_formula: bool) -> Self {
        if any_formula {
            ContextMode::General
        } else {
            ContextMode::Monotonic
        }
    }

    fn relation(self) -> BinaryOp {
        match self {
            ContextMode::Monotonic => BinaryOp::Implies,
            ContextMode::General => BinaryOp::Equiv,
        }
    }
}

/// Context name → argument → fresh proposition.
pub type OccurrenceTable = IndexMap<String, IndexMap<Formula, String>>;

/// Context occurrences collected while translating one problem.
#[derive(Clone)]
pub struct ContextTable {
    mode: ContextMode,
    logic: &'static dyn PremiseWrap,
    occurrences: OccurrenceTable,
    reverse: IndexMap<String, (String, Formula)>,
    /// Propositions of the inputs; fresh names must avoid them.
    reserved: IndexSet<String>,
}

impl std::fmt::Debug for ContextTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextTable")
            .field("mode", &self.mode)
            .field("logic", &self.logic.name())
            .field("occurrences", &self.occurrences)
            .finish()
    }
}

impl ContextTable {
    fn new(mode: ContextMode, logic: &'static dyn PremiseWrap) -> Self {
        Self {
            mode,
            logic,
            occurrences: IndexMap::new(),
            reverse: IndexMap::new(),
            reserved: IndexSet::new(),
        }
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    pub fn logic(&self) -> &'static dyn PremiseWrap {
        self.logic
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.occurrences.keys().map(String::as_str)
    }

    /// Arguments of `name` and their fresh propositions, in order of first use.
    pub fn occurrences(&self, name: &str) -> Option<&IndexMap<Formula, String>> {
        self.occurrences.get(name)
    }

    pub fn table(&self) -> &OccurrenceTable {
        &self.occurrences
    }

    /// Context name and translated argument a fresh proposition stands for.
    pub fn resolve(&self, prop: &str) -> Option<(&str, &Formula)> {
        self.reverse.get(prop).map(|(name, arg)| (name.as_str(), arg))
    }

    /// Whether `prop` is one of the fresh propositions.
    pub fn is_fresh(&self, prop: &str) -> bool {
        self.reverse.contains_key(prop)
    }

    fn fresh(&mut self, name: &str, arg: Formula) -> String {
        if let Some(prop) = self.occurrences.get(name).and_then(|args| args.get(&arg)) {
            return prop.clone();
        }
        let mut prop = format!("{name}[{}]", arg.to_string().replace('"', ""));
        // A quoted input atom may spell the same name.
        while self.reserved.contains(&prop) || self.reverse.contains_key(&prop) {
            prop.push('\'');
        }
        debug!(context = name, prop = %prop, "new context occurrence");
        self.occurrences
            .entry(name.to_string())
            .or_default()
            .insert(arg.clone(), prop.clone());
        self.reverse.insert(prop.clone(), (name.to_string(), arg));
        prop
    }

    fn relate(&self, lhs: Formula, rhs: Formula) -> Formula {
        Formula::binary(self.mode.relation(), lhs, rhs)
    }

    /// Conjunction of one wrapped clause per related pair of occurrences.
    pub fn consistency_condition(&self) -> Formula {
        let mut clauses = Vec::new();
        for args in self.occurrences.values() {
            let entries: Vec<(&Formula, &String)> = args.iter().collect();
            for (i, (p_arg, p_var)) in entries.iter().enumerate() {
                for (j, (q_arg, q_var)) in entries.iter().enumerate() {
                    let keep = match self.mode {
                        ContextMode::Monotonic => i != j,
                        ContextMode::General => i < j,
                    };
                    if !keep {
                        continue;
                    }
                    let premise = self
                        .logic
                        .wrap_premise(self.relate((*p_arg).clone(), (*q_arg).clone()));
                    let conclusion =
                        self.relate(Formula::var(p_var.as_str()), Formula::var(q_var.as_str()));
                    clauses.push(self.logic.wrap_premise(premise.implies(conclusion)));
                }
            }
        }
        Formula::conjunction(clauses).unwrap_or(Formula::Lit(true))
    }

    /// The most general context consistent with the recorded occurrences,
    /// one formula with a hole per context name.
    pub fn canonical_context(&self) -> IndexMap<String, Formula> {
        self.occurrences
            .iter()
            .filter_map(|(name, args)| {
                let clauses = args.iter().map(|(arg, var)| {
                    let premise = self.logic.wrap_premise(self.relate(Formula::Hole, arg.clone()));
                    premise.implies(Formula::var(var.as_str()))
                });
                Formula::conjunction(clauses).map(|body| (name.clone(), body))
            })
            .collect()
    }

    pub fn simplify_context(
        &self,
        canonical: &IndexMap<String, Formula>,
        valuation: &Assignment,
    ) -> IndexMap<String, Formula> {
        canonical
            .iter()
            .map(|(name, formula)| (name.clone(), simplify(formula, valuation)))
            .collect()
    }
}

/// Translates one pair of formulas with contexts into formulas without them.
pub struct Transformer {
    table: ContextTable,
}

/// Result of [`Transformer::translate`].
#[derive(Debug, Clone)]
pub struct Translation {
    pub left: Formula,
    pub right: Formula,
    pub condition: Formula,
    pub contexts: ContextTable,
}

impl Transformer {
    pub fn new(mode: ContextMode, logic: &'static dyn PremiseWrap) -> Self {
        Self {
            table: ContextTable::new(mode, logic),
        }
    }

    pub fn translate(mut self, left: &Formula, right: &Formula) -> Result<Translation, FormulaError> {
        self.table.reserved = left.atoms();
        self.table.reserved.extend(right.atoms());
        let left = self.eliminate(left)?;
        let right = self.eliminate(right)?;
        let condition = self.table.consistency_condition();
        debug!(
            logic = self.table.logic.name(),
            contexts = self.table.occurrences.len(),
            condition_size = condition.size(),
            "contexts eliminated"
        );
        Ok(Translation {
            left,
            right,
            condition,
            contexts: self.table,
        })
    }

    fn eliminate(&mut self, formula: &Formula) -> Result<Formula, FormulaError> {
        Ok(match formula {
            Formula::Lit(_) | Formula::Var(_) => formula.clone(),
            Formula::Hole => {
                return Err(FormulaError::invariant("a hole cannot appear in an input formula"))
            }
            Formula::Context { name, arg } => {
                // Inner contexts first, so that nested applications share names.
                let arg = self.eliminate(arg)?;
                Formula::Var(self.table.fresh(name, arg))
            }
            Formula::Unary(op, arg) => Formula::unary(*op, self.eliminate(arg)?),
            Formula::Binary(op, lhs, rhs) => {
                Formula::binary(*op, self.eliminate(lhs)?, self.eliminate(rhs)?)
            }
        })
    }
}
