//! Three-valued evaluation of linear-time formulas over lassos.
//!
//! Every sub-formula is evaluated to a [`Trace`]: its value at each position
//! of the prefix and of one cycle. Positions where a proposition is not
//! assigned are `Unknown`, and the Kleene connectives carry that through.

use ctxeq_dsl::{BinaryOp, Formula, UnaryOp};
use indexmap::IndexMap;

use crate::error::FormulaError;
use crate::lasso::{Lasso, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ternary {
    False,
    True,
    Unknown,
}

impl Ternary {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Ternary::True
        } else {
            Ternary::False
        }
    }

    pub fn to_bool(self) -> Option<bool> {
        match self {
            Ternary::True => Some(true),
            Ternary::False => Some(false),
            Ternary::Unknown => None,
        }
    }

    pub fn is_true(self) -> bool {
        self == Ternary::True
    }

    pub fn is_false(self) -> bool {
        self == Ternary::False
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        match self {
            Ternary::True => Ternary::False,
            Ternary::False => Ternary::True,
            Ternary::Unknown => Ternary::Unknown,
        }
    }

    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Ternary::False, _) | (_, Ternary::False) => Ternary::False,
            (Ternary::True, Ternary::True) => Ternary::True,
            _ => Ternary::Unknown,
        }
    }

    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Ternary::True, _) | (_, Ternary::True) => Ternary::True,
            (Ternary::False, Ternary::False) => Ternary::False,
            _ => Ternary::Unknown,
        }
    }

    pub fn implies(self, other: Self) -> Self {
        self.not().or(other)
    }

    pub fn equiv(self, other: Self) -> Self {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => Ternary::from_bool(a == b),
            _ => Ternary::Unknown,
        }
    }

    pub fn xor(self, other: Self) -> Self {
        self.equiv(other).not()
    }

    fn symbol(self) -> char {
        match self {
            Ternary::True => '1',
            Ternary::False => '0',
            Ternary::Unknown => '?',
        }
    }
}

impl From<Option<bool>> for Ternary {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Ternary::Unknown, Ternary::from_bool)
    }
}

/// Values of a formula along `prefix · cycle^ω`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub prefix: Vec<Ternary>,
    pub cycle: Vec<Ternary>,
}

impl Trace {
    pub fn new(prefix: Vec<Ternary>, cycle: Vec<Ternary>) -> Self {
        Self { prefix, cycle }
    }

    pub fn constant(value: Ternary, prefix_len: usize, cycle_len: usize) -> Self {
        Self::new(vec![value; prefix_len], vec![value; cycle_len])
    }

    /// Value at position `k`; positions past the prefix wrap around the cycle.
    pub fn at(&self, k: usize) -> Ternary {
        if k < self.prefix.len() {
            self.prefix[k]
        } else if self.cycle.is_empty() {
            Ternary::Unknown
        } else {
            self.cycle[(k - self.prefix.len()) % self.cycle.len()]
        }
    }

    /// `len` consecutive values starting at position `k`.
    pub fn values(&self, k: usize, len: usize) -> Vec<Ternary> {
        (k..k + len).map(|i| self.at(i)).collect()
    }

    pub fn map(&self, f: impl Fn(Ternary) -> Ternary) -> Self {
        Self::new(
            self.prefix.iter().map(|v| f(*v)).collect(),
            self.cycle.iter().map(|v| f(*v)).collect(),
        )
    }

    pub fn zip_with(&self, other: &Trace, f: impl Fn(Ternary, Ternary) -> Ternary) -> Self {
        Self::new(
            self.prefix.iter().zip(&other.prefix).map(|(a, b)| f(*a, *b)).collect(),
            self.cycle.iter().zip(&other.cycle).map(|(a, b)| f(*a, *b)).collect(),
        )
    }

    fn next(&self) -> Self {
        let head = self.cycle.first().copied();
        let prefix = if self.prefix.is_empty() {
            Vec::new()
        } else {
            self.prefix[1..].iter().copied().chain(head).collect()
        };
        let cycle = self.cycle.iter().skip(1).copied().chain(head).collect();
        Self::new(prefix, cycle)
    }

    /// Shared shape of `F` and `G`: the cycle collapses to the fold of its
    /// values, the prefix is filled backwards from there.
    fn fold_backward(&self, combine: fn(Ternary, Ternary) -> Ternary) -> Self {
        let Some((first, rest)) = self.cycle.split_first() else {
            return self.clone();
        };
        let cycle_value = rest.iter().fold(*first, |acc, v| combine(acc, *v));
        let mut prefix = vec![cycle_value; self.prefix.len()];
        let mut next = cycle_value;
        for k in (0..self.prefix.len()).rev() {
            next = combine(self.prefix[k], next);
            prefix[k] = next;
        }
        Self::new(prefix, vec![cycle_value; self.cycle.len()])
    }

    fn eventually(&self) -> Self {
        self.fold_backward(Ternary::or)
    }

    fn always(&self) -> Self {
        self.fold_backward(Ternary::and)
    }

    /// `a U b`, three-valued.
    ///
    /// "Definitely true" is the least solution of `T = b ∨ (a ∧ X T)` over
    /// known-true values, "definitely false" the greatest solution of
    /// `F = ¬b ∧ (¬a ∨ X F)` over known-false values. Everything else is
    /// unknown.
    fn until(a: &Trace, b: &Trace) -> Self {
        let holds = |k: usize, next: bool| b.at(k).is_true() || (a.at(k).is_true() && next);
        let fails = |k: usize, next: bool| b.at(k).is_false() && (a.at(k).is_false() || next);

        let sure_true = Self::solve_backward(a, holds, false);
        let sure_false = Self::solve_backward(a, fails, true);

        let pick = |t: bool, f: bool| match (t, f) {
            (true, _) => Ternary::True,
            (false, true) => Ternary::False,
            (false, false) => Ternary::Unknown,
        };
        Self::new(
            sure_true.0.iter().zip(&sure_false.0).map(|(t, f)| pick(*t, *f)).collect(),
            sure_true.1.iter().zip(&sure_false.1).map(|(t, f)| pick(*t, *f)).collect(),
        )
    }

    /// Backward fixpoint of `step(k, value_at(k + 1))` from `init`. Two passes
    /// over the cycle are enough for the value to travel once around it.
    fn solve_backward(
        shape: &Trace,
        step: impl Fn(usize, bool) -> bool,
        init: bool,
    ) -> (Vec<bool>, Vec<bool>) {
        let plen = shape.prefix.len();
        let clen = shape.cycle.len();
        let mut cycle = vec![init; clen];

        for _ in 0..2 {
            for i in (0..clen).rev() {
                let next = cycle[(i + 1) % clen];
                cycle[i] = step(plen + i, next);
            }
        }

        let mut prefix = vec![init; plen];
        let mut next = cycle.first().copied().unwrap_or(init);
        for k in (0..plen).rev() {
            next = step(k, next);
            prefix[k] = next;
        }
        (prefix, cycle)
    }

    fn weak_until(a: &Trace, b: &Trace) -> Self {
        Self::until(a, b).zip_with(&a.always(), Ternary::or)
    }
}

/// Renders as `0?1|01`: prefix, a bar, then one cycle.
impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for v in &self.prefix {
            write!(f, "{}", v.symbol())?;
        }
        write!(f, "|")?;
        for v in &self.cycle {
            write!(f, "{}", v.symbol())?;
        }
        Ok(())
    }
}

/// Traces of the propositions of a lasso, plus traces bound to arbitrary
/// sub-formulas.
#[derive(Debug, Clone)]
pub struct Valuation {
    pub props: IndexMap<String, Trace>,
    pub bound: IndexMap<Formula, Trace>,
    pub prefix_len: usize,
    pub cycle_len: usize,
}

impl Valuation {
    pub fn from_lasso(lasso: &Lasso) -> Result<Self, FormulaError> {
        if lasso.cycle.is_empty() {
            return Err(FormulaError::invariant("a lasso needs a non-empty cycle"));
        }
        let props = lasso
            .atoms()
            .into_iter()
            .map(|var| {
                let column = |steps: &[Step]| -> Vec<Ternary> {
                    steps
                        .iter()
                        .map(|step| Ternary::from(step.get(&var).copied()))
                        .collect()
                };
                let trace = Trace::new(column(&lasso.prefix), column(&lasso.cycle));
                (var, trace)
            })
            .collect();
        Ok(Self {
            props,
            bound: IndexMap::new(),
            prefix_len: lasso.prefix.len(),
            cycle_len: lasso.cycle.len(),
        })
    }

    /// Number of positions in one unrolled period.
    pub fn period(&self) -> usize {
        self.prefix_len + self.cycle_len
    }

    /// Use `trace` as the value of `formula` wherever it occurs.
    pub fn bind(&mut self, formula: Formula, trace: Trace) {
        self.bound.insert(formula, trace);
    }

    pub fn prop(&self, name: &str) -> Option<&Trace> {
        self.props.get(name)
    }

    /// `len` values (default: one period) of proposition `name` from position `k`.
    pub fn values(&self, name: &str, k: usize, len: Option<usize>) -> Vec<Ternary> {
        let len = len.unwrap_or_else(|| self.period());
        match self.props.get(name) {
            Some(trace) => trace.values(k, len),
            None => vec![Ternary::Unknown; len],
        }
    }

    fn constant(&self, value: Ternary) -> Trace {
        Trace::constant(value, self.prefix_len, self.cycle_len)
    }

    pub fn evaluate(&self, formula: &Formula) -> Result<Trace, FormulaError> {
        if let Some(trace) = self.bound.get(formula) {
            return Ok(trace.clone());
        }
        Ok(match formula {
            Formula::Lit(b) => self.constant(Ternary::from_bool(*b)),
            Formula::Var(name) => self
                .props
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.constant(Ternary::Unknown)),
            Formula::Hole => return Err(FormulaError::invariant("cannot evaluate a hole")),
            Formula::Context { name, .. } => {
                return Err(FormulaError::invariant(format!(
                    "context {name} has no bound trace"
                )))
            }
            Formula::Unary(op, arg) => {
                let arg = self.evaluate(arg)?;
                match op {
                    UnaryOp::Not => arg.map(Ternary::not),
                    UnaryOp::Next => arg.next(),
                    UnaryOp::Always => arg.always(),
                    UnaryOp::Eventually => arg.eventually(),
                    UnaryOp::ForAll | UnaryOp::Exists => {
                        return Err(FormulaError::invalid(format!(
                            "path quantifier {op} in a linear-time formula"
                        )))
                    }
                }
            }
            Formula::Binary(op, lhs, rhs) => {
                let a = self.evaluate(lhs)?;
                let b = self.evaluate(rhs)?;
                match op {
                    BinaryOp::And => a.zip_with(&b, Ternary::and),
                    BinaryOp::Or => a.zip_with(&b, Ternary::or),
                    BinaryOp::Implies => a.zip_with(&b, Ternary::implies),
                    BinaryOp::Equiv => a.zip_with(&b, Ternary::equiv),
                    BinaryOp::Xor => a.zip_with(&b, Ternary::xor),
                    BinaryOp::Until => Trace::until(&a, &b),
                    BinaryOp::WeakUntil => Trace::weak_until(&a, &b),
                    BinaryOp::Release => Trace::weak_until(&b, &a.zip_with(&b, Ternary::and)),
                    BinaryOp::StrongRelease => Trace::until(&b, &a.zip_with(&b, Ternary::and)),
                }
            }
        })
    }
}

/// One line per proposition, `0?1|01 ← name`, sorted by name.
impl std::fmt::Display for Valuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines: Vec<(String, &Trace)> =
            self.props.iter().map(|(k, v)| (k.clone(), v)).collect();
        lines.extend(self.bound.iter().map(|(k, v)| (k.to_string(), v)));
        lines.sort_by(|a, b| a.0.cmp(&b.0));
        for (i, (name, trace)) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{trace} ← {name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Ternary::{False as F, True as T, Unknown as U};

    fn v(name: &str) -> Formula {
        Formula::var(name)
    }

    fn step(pairs: &[(&str, bool)]) -> Step {
        pairs.iter().map(|(k, b)| (k.to_string(), *b)).collect()
    }

    fn eval(lasso: &Lasso, formula: &Formula) -> Trace {
        Valuation::from_lasso(lasso).unwrap().evaluate(formula).unwrap()
    }

    // ---------------------------------------------------------------
    // Kleene connectives
    // ---------------------------------------------------------------

    #[test]
    fn kleene_short_circuits() {
        assert_eq!(F.and(U), F);
        assert_eq!(T.and(U), U);
        assert_eq!(T.or(U), T);
        assert_eq!(F.or(U), U);
        assert_eq!(F.implies(U), T);
        assert_eq!(U.implies(T), T);
        assert_eq!(U.equiv(T), U);
        assert_eq!(T.xor(F), T);
    }

    // ---------------------------------------------------------------
    // Trace operations
    // ---------------------------------------------------------------

    #[test]
    fn trace_at_wraps_into_cycle() {
        let trace = Trace::new(vec![T], vec![F, U]);
        assert_eq!(trace.values(0, 5), vec![T, F, U, F, U]);
        assert_eq!(trace.to_string(), "1|0?");
    }

    #[test]
    fn next_shifts_prefix_into_cycle() {
        let lasso = Lasso::new(
            vec![step(&[("a", true)])],
            vec![step(&[("a", false)]), step(&[])],
        );
        assert_eq!(eval(&lasso, &v("a").next()), Trace::new(vec![F], vec![U, F]));
    }

    #[test]
    fn next_with_empty_prefix() {
        let lasso = Lasso::new(vec![], vec![step(&[("a", true)]), step(&[("a", false)])]);
        assert_eq!(eval(&lasso, &v("a").next()), Trace::new(vec![], vec![F, T]));
    }

    #[test]
    fn eventually_and_always_fold_the_cycle() {
        let lasso = Lasso::new(
            vec![step(&[("a", true)]), step(&[])],
            vec![step(&[("a", false)])],
        );
        assert_eq!(eval(&lasso, &v("a").eventually()), Trace::new(vec![T, U], vec![F]));
        assert_eq!(eval(&lasso, &v("a").always()), Trace::new(vec![F, F], vec![F]));

        let lasso = Lasso::new(vec![step(&[("a", true)])], vec![step(&[]), step(&[("a", true)])]);
        assert_eq!(eval(&lasso, &v("a").always()), Trace::new(vec![U], vec![U, U]));
        assert_eq!(eval(&lasso, &v("a").eventually()), Trace::new(vec![T], vec![T, T]));
    }

    #[test]
    fn until_propagates_around_the_cycle() {
        // a holds everywhere except at the cycle start, where b holds.
        let lasso = Lasso::new(
            vec![step(&[("a", true), ("b", false)])],
            vec![
                step(&[("a", false), ("b", true)]),
                step(&[("a", true), ("b", false)]),
            ],
        );
        let trace = eval(&lasso, &v("a").until(v("b")));
        assert_eq!(trace, Trace::new(vec![T], vec![T, T]));
    }

    #[test]
    fn until_never_satisfied_is_false() {
        let lasso = Lasso::new(vec![], vec![step(&[("a", true), ("b", false)])]);
        assert_eq!(eval(&lasso, &v("a").until(v("b"))), Trace::new(vec![], vec![F]));
        assert_eq!(eval(&lasso, &v("a").weak_until(v("b"))), Trace::new(vec![], vec![T]));
    }

    #[test]
    fn until_with_unknown_blocker() {
        let lasso = Lasso::new(
            vec![step(&[("a", true), ("b", false)]), step(&[("b", false)])],
            vec![step(&[("a", true), ("b", true)])],
        );
        let trace = eval(&lasso, &v("a").until(v("b")));
        assert_eq!(trace, Trace::new(vec![U, U], vec![T]));
    }

    #[test]
    fn release_and_strong_release() {
        let lasso = Lasso::new(
            vec![step(&[("a", false), ("b", true)])],
            vec![step(&[("a", true), ("b", true)]), step(&[("a", false), ("b", false)])],
        );
        // a R b: b must hold up to and including the first a.
        assert_eq!(eval(&lasso, &v("a").release(v("b"))), Trace::new(vec![T], vec![T, F]));
        assert_eq!(
            eval(&lasso, &v("a").strong_release(v("b"))),
            Trace::new(vec![T], vec![T, F])
        );
    }

    // ---------------------------------------------------------------
    // Valuation
    // ---------------------------------------------------------------

    #[test]
    fn bound_formula_takes_precedence() {
        let lasso = Lasso::new(vec![], vec![step(&[("a", true)])]);
        let mut val = Valuation::from_lasso(&lasso).unwrap();
        let ctx = Formula::context("c", v("a"));
        val.bind(ctx.clone(), Trace::new(vec![], vec![F]));
        assert_eq!(val.evaluate(&ctx.or(v("a"))).unwrap(), Trace::new(vec![], vec![T]));
    }

    #[test]
    fn unknown_variable_is_unknown_everywhere() {
        let lasso = Lasso::new(vec![step(&[])], vec![step(&[("a", true)])]);
        assert_eq!(eval(&lasso, &v("zz")), Trace::new(vec![U], vec![U]));
        assert_eq!(eval(&lasso, &Formula::lit(true)), Trace::new(vec![T], vec![T]));
    }

    #[test]
    fn evaluation_errors() {
        let lasso = Lasso::new(vec![], vec![step(&[("a", true)])]);
        let val = Valuation::from_lasso(&lasso).unwrap();
        assert!(matches!(val.evaluate(&Formula::Hole), Err(FormulaError::InvariantViolation(_))));
        assert!(matches!(
            val.evaluate(&Formula::context("c", v("a"))),
            Err(FormulaError::InvariantViolation(_))
        ));
        assert!(matches!(
            val.evaluate(&v("a").forall()),
            Err(FormulaError::InvalidFormula(_))
        ));
        assert!(Valuation::from_lasso(&Lasso::new(vec![step(&[])], vec![])).is_err());
    }

    #[test]
    fn values_reads_one_period_by_default() {
        let lasso = Lasso::new(vec![step(&[("a", true)])], vec![step(&[("a", false)])]);
        let val = Valuation::from_lasso(&lasso).unwrap();
        assert_eq!(val.values("a", 1, None), vec![F, F]);
        assert_eq!(val.values("missing", 0, Some(3)), vec![U, U, U]);
    }
}
