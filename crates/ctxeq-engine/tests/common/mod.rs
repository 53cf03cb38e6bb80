#![allow(dead_code)]

use std::collections::VecDeque;

use ctxeq_dsl::Formula;
use ctxeq_engine::oracles::OracleSet;
use ctxeq_ir::lasso::{Lasso, Step};
use ctxeq_ir::ternary::{Ternary, Valuation};
use ctxeq_smt::backends::ctlsat_backend::CtlSatisfiability;
use ctxeq_smt::backends::spot_backend::LassoOracle;
use ctxeq_smt::solver::{Model, SatResult, SmtSolver};
use ctxeq_smt::terms::SmtTerm;
use ctxeq_smt::OracleError;
use indexmap::IndexMap;

pub fn parse(text: &str) -> Formula {
    ctxeq_dsl::parse(text).unwrap_or_else(|e| panic!("cannot parse {text:?}: {e}"))
}

pub fn parse_ctl(text: &str) -> Formula {
    ctxeq_dsl::parse_ctl(text).unwrap_or_else(|e| panic!("cannot parse CTL {text:?}: {e}"))
}

/// Decides propositional queries by enumerating every assignment.
#[derive(Debug, Default)]
pub struct TruthTableSolver {
    declared: Vec<String>,
    asserted: Vec<SmtTerm>,
    pub calls: usize,
}

fn eval(term: &SmtTerm, env: &IndexMap<String, bool>) -> bool {
    match term {
        SmtTerm::Var(n) => env[n],
        SmtTerm::BoolLit(b) => *b,
        SmtTerm::And(ts) => ts.iter().all(|t| eval(t, env)),
        SmtTerm::Or(ts) => ts.iter().any(|t| eval(t, env)),
        SmtTerm::Not(t) => !eval(t, env),
        SmtTerm::Implies(a, b) => !eval(a, env) || eval(b, env),
        SmtTerm::Xor(a, b) => eval(a, env) != eval(b, env),
        SmtTerm::Eq(a, b) => eval(a, env) == eval(b, env),
    }
}

impl SmtSolver for TruthTableSolver {
    fn declare_var(&mut self, name: &str) -> Result<(), OracleError> {
        self.declared.push(name.to_string());
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), OracleError> {
        self.asserted.push(term.clone());
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, OracleError> {
        Ok(self.check_sat_with_model(&[])?.0)
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[&str],
    ) -> Result<(SatResult, Option<Model>), OracleError> {
        self.calls += 1;
        let n = self.declared.len();
        if n > 16 {
            return Err(OracleError::Failure(format!("{n} variables is too many to enumerate")));
        }
        let found = (0..1u64 << n).find_map(|bits| {
            let env: IndexMap<String, bool> = self
                .declared
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), bits >> i & 1 == 1))
                .collect();
            self.asserted.iter().all(|t| eval(t, &env)).then_some(env)
        });
        Ok(match found {
            None => (SatResult::Unsat, None),
            Some(env) => {
                let values = var_names.iter().map(|n| (n.to_string(), env[*n])).collect();
                (SatResult::Sat, Some(Model { values }))
            }
        })
    }

    fn reset(&mut self) -> Result<(), OracleError> {
        self.declared.clear();
        self.asserted.clear();
        Ok(())
    }
}

/// Searches lassos with a prefix of at most one step and a cycle of at most
/// two steps. Enough for the small formulas of these tests.
#[derive(Debug, Default)]
pub struct BoundedLassoSearch {
    pub queries: Vec<Formula>,
}

fn all_steps(atoms: &[String]) -> Vec<Step> {
    (0..1u64 << atoms.len())
        .map(|bits| {
            atoms
                .iter()
                .enumerate()
                .map(|(i, a)| (a.clone(), bits >> i & 1 == 1))
                .collect()
        })
        .collect()
}

fn candidate_lassos(atoms: &[String]) -> Vec<Lasso> {
    let steps = all_steps(atoms);
    let mut prefixes: Vec<Vec<Step>> = vec![vec![]];
    prefixes.extend(steps.iter().map(|s| vec![s.clone()]));
    let mut cycles: Vec<Vec<Step>> = steps.iter().map(|s| vec![s.clone()]).collect();
    for a in &steps {
        for b in &steps {
            cycles.push(vec![a.clone(), b.clone()]);
        }
    }
    let mut out = Vec::new();
    for cycle in &cycles {
        for prefix in &prefixes {
            out.push(Lasso::new(prefix.clone(), cycle.clone()));
        }
    }
    out
}

impl LassoOracle for BoundedLassoSearch {
    fn accepting_word(&mut self, formula: &Formula) -> Result<Option<Lasso>, OracleError> {
        self.queries.push(formula.clone());
        let atoms: Vec<String> = formula.atoms().into_iter().collect();
        if atoms.len() > 5 {
            return Err(OracleError::Failure(format!(
                "{} propositions is too many to enumerate",
                atoms.len()
            )));
        }
        for lasso in candidate_lassos(&atoms) {
            let trace = Valuation::from_lasso(&lasso)?.evaluate(formula)?;
            if trace.at(0) == Ternary::True {
                return Ok(Some(lasso));
            }
        }
        Ok(None)
    }
}

/// Answers CTL-SAT queries from a script and records them.
#[derive(Debug, Default)]
pub struct ScriptedCtlSat {
    pub answers: VecDeque<bool>,
    pub queries: Vec<String>,
}

impl CtlSatisfiability for ScriptedCtlSat {
    fn is_satisfiable(&mut self, formula: &str) -> Result<bool, OracleError> {
        self.queries.push(formula.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| OracleError::Failure("no scripted answer left".into()))
    }
}

/// In-process oracles for the engine tests.
#[derive(Debug, Default)]
pub struct MockOracles {
    pub sat: TruthTableSolver,
    pub lasso: BoundedLassoSearch,
    pub ctl: ScriptedCtlSat,
    /// Fail every request with a timeout.
    pub expired: bool,
}

impl MockOracles {
    pub fn ctl_answers(answers: &[bool]) -> Self {
        Self {
            ctl: ScriptedCtlSat {
                answers: answers.iter().copied().collect(),
                queries: Vec::new(),
            },
            ..Self::default()
        }
    }

    fn check_budget(&self) -> Result<(), OracleError> {
        if self.expired {
            Err(OracleError::Timeout { secs: 1 })
        } else {
            Ok(())
        }
    }
}

impl OracleSet for MockOracles {
    fn sat(&mut self) -> Result<&mut dyn SmtSolver, OracleError> {
        self.check_budget()?;
        Ok(&mut self.sat)
    }

    fn ctl(&mut self) -> Result<&mut dyn CtlSatisfiability, OracleError> {
        self.check_budget()?;
        Ok(&mut self.ctl)
    }

    fn lasso(&mut self) -> Result<&mut dyn LassoOracle, OracleError> {
        self.check_budget()?;
        Ok(&mut self.lasso)
    }
}
