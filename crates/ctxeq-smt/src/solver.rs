use indexmap::IndexMap;

use crate::error::OracleError;
use crate::terms::SmtTerm;

/// Result of a satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown(String),
}

/// Boolean model extracted from a SAT result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub values: IndexMap<String, bool>,
}

impl Model {
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }
}

/// Abstract SAT solver interface over Boolean SMT terms.
pub trait SmtSolver {
    /// Declare a new Boolean variable.
    fn declare_var(&mut self, name: &str) -> Result<(), OracleError>;

    /// Assert a constraint.
    fn assert(&mut self, term: &SmtTerm) -> Result<(), OracleError>;

    /// Check satisfiability.
    fn check_sat(&mut self) -> Result<SatResult, OracleError>;

    /// Check satisfiability and extract the values of `var_names` if SAT.
    fn check_sat_with_model(
        &mut self,
        var_names: &[&str],
    ) -> Result<(SatResult, Option<Model>), OracleError>;

    /// Forget every declaration and assertion.
    fn reset(&mut self) -> Result<(), OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockSolver {
        sat_result: SatResult,
        declared: Vec<String>,
        asserted: Vec<SmtTerm>,
        check_sat_calls: usize,
        reset_calls: usize,
    }

    impl MockSolver {
        fn new(sat_result: SatResult) -> Self {
            Self {
                sat_result,
                declared: Vec::new(),
                asserted: Vec::new(),
                check_sat_calls: 0,
                reset_calls: 0,
            }
        }
    }

    impl SmtSolver for MockSolver {
        fn declare_var(&mut self, name: &str) -> Result<(), OracleError> {
            self.declared.push(name.to_string());
            Ok(())
        }

        fn assert(&mut self, term: &SmtTerm) -> Result<(), OracleError> {
            self.asserted.push(term.clone());
            Ok(())
        }

        fn check_sat(&mut self) -> Result<SatResult, OracleError> {
            self.check_sat_calls += 1;
            Ok(self.sat_result.clone())
        }

        fn check_sat_with_model(
            &mut self,
            var_names: &[&str],
        ) -> Result<(SatResult, Option<Model>), OracleError> {
            let result = self.check_sat()?;
            if result != SatResult::Sat {
                return Ok((result, None));
            }
            let values = var_names.iter().map(|n| (n.to_string(), true)).collect();
            Ok((result, Some(Model { values })))
        }

        fn reset(&mut self) -> Result<(), OracleError> {
            self.reset_calls += 1;
            self.declared.clear();
            self.asserted.clear();
            Ok(())
        }
    }

    #[test]
    fn model_getter_returns_only_known_values() {
        let mut values = IndexMap::new();
        values.insert("flag".to_string(), true);
        values.insert("off".to_string(), false);
        let model = Model { values };

        assert_eq!(model.get_bool("flag"), Some(true));
        assert_eq!(model.get_bool("off"), Some(false));
        assert_eq!(model.get_bool("missing"), None);
    }

    #[test]
    fn model_is_only_returned_when_sat() {
        let mut solver = MockSolver::new(SatResult::Unsat);
        let (result, model) = solver.check_sat_with_model(&["v0"]).unwrap();
        assert_eq!(result, SatResult::Unsat);
        assert!(model.is_none());

        let mut solver = MockSolver::new(SatResult::Sat);
        let (_, model) = solver.check_sat_with_model(&["v0"]).unwrap();
        assert_eq!(model.unwrap().get_bool("v0"), Some(true));
        assert_eq!(solver.check_sat_calls, 1);
    }

    #[test]
    fn reset_clears_state() {
        let mut solver = MockSolver::new(SatResult::Unknown("timeout".to_string()));
        solver.declare_var("v0").unwrap();
        solver.assert(&SmtTerm::var("v0")).unwrap();
        solver.reset().unwrap();
        assert!(solver.declared.is_empty());
        assert!(solver.asserted.is_empty());
        assert_eq!(solver.reset_calls, 1);
    }
}
