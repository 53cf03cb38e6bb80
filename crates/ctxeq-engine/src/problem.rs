//! One equivalence problem: two formulas with contexts, their translation,
//! and the counterexamples found for them.

use ctxeq_dsl::Formula;
use ctxeq_ir::algebra::instantiate_formula;
use ctxeq_ir::ctl::adapt_ctl;
use ctxeq_ir::logic::Logic;
use ctxeq_ir::transform::{ContextMode, ContextTable, Transformer, Translation};
use ctxeq_ir::FormulaError;
use tracing::debug;

use crate::logics::{self, ltl};
use crate::oracles::OracleSet;
use crate::pipeline::{EngineError, Side};
use crate::result::{ContextMap, Counterexample, GeneratedFormulas, Witnesses};

#[derive(Debug, Clone)]
pub struct EquivalenceProblem {
    logic: Logic,
    /// Input formulas, adapted to the CTL-SAT operator set for CTL.
    left: Formula,
    right: Formula,
    translation: Translation,
    lnr: Option<Counterexample>,
    rnl: Option<Counterexample>,
}

impl EquivalenceProblem {
    pub fn new(
        left: &Formula,
        right: &Formula,
        logic: Logic,
        mode: ContextMode,
    ) -> Result<Self, EngineError> {
        logics::validate(logic, left).map_err(|e| EngineError::on_side(Side::Left, e))?;
        logics::validate(logic, right).map_err(|e| EngineError::on_side(Side::Right, e))?;

        let (left, right) = match logic {
            Logic::Ctl => (adapt_ctl(left), adapt_ctl(right)),
            _ => (left.clone(), right.clone()),
        };
        let mut translation = Transformer::new(mode, logic.premise_wrap()).translate(&left, &right)?;
        if logic == Logic::Ctl {
            translation.left = adapt_ctl(&translation.left);
            translation.right = adapt_ctl(&translation.right);
            translation.condition = adapt_ctl(&translation.condition);
        }
        debug!(
            %logic,
            left = %translation.left,
            right = %translation.right,
            condition = %translation.condition,
            "generated formulas"
        );

        Ok(Self {
            logic,
            left,
            right,
            translation,
            lnr: None,
            rnl: None,
        })
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }

    pub fn generated(&self) -> GeneratedFormulas {
        GeneratedFormulas {
            left: self.translation.left.clone(),
            right: self.translation.right.clone(),
            condition: self.translation.condition.clone(),
        }
    }

    pub fn contexts(&self) -> &ContextTable {
        &self.translation.contexts
    }

    /// Counterexample of the last solve in the L → R direction.
    pub fn lnr(&self) -> Option<&Counterexample> {
        self.lnr.as_ref()
    }

    pub fn rnl(&self) -> Option<&Counterexample> {
        self.rnl.as_ref()
    }

    /// Decide equivalence of the translated formulas under the consistency
    /// condition. Counterexamples of both directions are kept.
    pub fn solve(&mut self, oracles: &mut dyn OracleSet) -> Result<bool, EngineError> {
        let t = &self.translation;
        let condition = Some(&t.condition);
        let lnr = logics::find_difference(self.logic, oracles, &t.left, condition, &t.right)?;
        let rnl = logics::find_difference(self.logic, oracles, &t.right, condition, &t.left)?;
        debug!(lnr = lnr.is_some(), rnl = rnl.is_some(), "solved");
        self.lnr = lnr;
        self.rnl = rnl;
        Ok(self.lnr.is_none() && self.rnl.is_none())
    }

    /// The canonical contexts, simplified with each direction's
    /// counterexample when `simplified` and one with values exists.
    pub fn canonical_context(&self, simplified: bool) -> Witnesses {
        let contexts = self.contexts();
        let canonical = contexts.canonical_context();
        if !simplified {
            return Witnesses::Single { contexts: canonical };
        }
        let simplify_with = |cex: Option<&Counterexample>| {
            cex.and_then(Counterexample::valuation)
                .filter(|values| !values.is_empty())
                .map(|values| contexts.simplify_context(&canonical, &values))
        };
        Witnesses::merge(simplify_with(self.lnr()), simplify_with(self.rnl()), canonical.clone())
    }

    /// Decide equivalence of the input formulas with every context replaced
    /// by its canonical context, with no side condition. The stored
    /// counterexamples are replaced by those of this check.
    pub fn solve_with_context(
        &mut self,
        oracles: &mut dyn OracleSet,
        simplify: bool,
    ) -> Result<(Witnesses, bool), EngineError> {
        let canonical = self.contexts().canonical_context();
        let (lnr, rnl) = self.instantiated_differences(oracles, &canonical)?;
        let equivalent = lnr.is_none() && rnl.is_none();
        debug!(equivalent, "solved with canonical contexts");
        self.lnr = lnr;
        self.rnl = rnl;
        Ok((self.canonical_context(simplify), equivalent))
    }

    /// Whether the input formulas stay equivalent once every context is
    /// replaced by its entry in `contexts`.
    pub fn equivalent_under(
        &self,
        oracles: &mut dyn OracleSet,
        contexts: &ContextMap,
    ) -> Result<bool, EngineError> {
        let (lnr, rnl) = self.instantiated_differences(oracles, contexts)?;
        Ok(lnr.is_none() && rnl.is_none())
    }

    fn instantiated_differences(
        &self,
        oracles: &mut dyn OracleSet,
        contexts: &ContextMap,
    ) -> Result<(Option<Counterexample>, Option<Counterexample>), EngineError> {
        let mut left = instantiate_formula(&self.left, contexts)?;
        let mut right = instantiate_formula(&self.right, contexts)?;
        if self.logic == Logic::Ctl {
            left = adapt_ctl(&left);
            right = adapt_ctl(&right);
        }
        let lnr = logics::find_difference(self.logic, oracles, &left, None, &right)?;
        let rnl = logics::find_difference(self.logic, oracles, &right, None, &left)?;
        Ok((lnr, rnl))
    }

    /// Explicit witnesses read off the counterexample runs of an LTL
    /// problem; `None` for the other logics or when both directions hold.
    pub fn run_witnesses(&self) -> Result<Option<Witnesses>, FormulaError> {
        if self.logic != Logic::Ltl {
            return Ok(None);
        }
        let from_run = |cex: Option<&Counterexample>| {
            cex.and_then(Counterexample::as_lasso)
                .map(|lasso| ltl::witness_from_run(self.contexts(), lasso))
                .transpose()
        };
        let lnr = from_run(self.lnr())?;
        let rnl = from_run(self.rnl())?;
        if lnr.is_none() && rnl.is_none() {
            return Ok(None);
        }
        Ok(Some(Witnesses::merge(lnr, rnl, ContextMap::new())))
    }
}
