use indexmap::IndexSet;

/// Unary operators: negation, the linear-time modalities and the CTL path
/// quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum UnaryOp {
    Not,
    Next,
    Always,
    Eventually,
    ForAll,
    Exists,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 6] = [
        UnaryOp::Not,
        UnaryOp::Next,
        UnaryOp::Always,
        UnaryOp::Eventually,
        UnaryOp::ForAll,
        UnaryOp::Exists,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "¬",
            UnaryOp::Next => "X",
            UnaryOp::Always => "G",
            UnaryOp::Eventually => "F",
            UnaryOp::ForAll => "A",
            UnaryOp::Exists => "E",
        }
    }

    /// `X`, `G` and `F`.
    pub fn is_temporal(self) -> bool {
        matches!(self, UnaryOp::Next | UnaryOp::Always | UnaryOp::Eventually)
    }

    pub fn is_quantifier(self) -> bool {
        matches!(self, UnaryOp::ForAll | UnaryOp::Exists)
    }

    /// Operator `D` such that `op ¬φ ≡ ¬ D φ`.
    pub fn dual(self) -> Self {
        match self {
            UnaryOp::Always => UnaryOp::Eventually,
            UnaryOp::Eventually => UnaryOp::Always,
            UnaryOp::ForAll => UnaryOp::Exists,
            UnaryOp::Exists => UnaryOp::ForAll,
            other => other,
        }
    }
}

/// Binary operators, Boolean connectives first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum BinaryOp {
    Or,
    And,
    Implies,
    Xor,
    Equiv,
    Until,
    WeakUntil,
    Release,
    StrongRelease,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 9] = [
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Implies,
        BinaryOp::Xor,
        BinaryOp::Equiv,
        BinaryOp::Until,
        BinaryOp::WeakUntil,
        BinaryOp::Release,
        BinaryOp::StrongRelease,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "∨",
            BinaryOp::And => "∧",
            BinaryOp::Implies => "→",
            BinaryOp::Xor => "⊕",
            BinaryOp::Equiv => "↔",
            BinaryOp::Until => "U",
            BinaryOp::WeakUntil => "W",
            BinaryOp::Release => "R",
            BinaryOp::StrongRelease => "M",
        }
    }

    /// Binding strength used by the renderer (higher binds tighter).
    pub fn priority(self) -> u8 {
        match self {
            BinaryOp::Implies | BinaryOp::Equiv => 0,
            BinaryOp::Xor => 1,
            BinaryOp::Or => 2,
            BinaryOp::And => 3,
            BinaryOp::Until | BinaryOp::WeakUntil | BinaryOp::Release | BinaryOp::StrongRelease => {
                4
            }
        }
    }

    pub fn is_temporal(self) -> bool {
        self.priority() == 4
    }
}

const UNARY_PRIORITY: u8 = 5;
const ATOM_PRIORITY: u8 = 6;

/// A formula with contexts.
///
/// `Hole` only makes sense inside the body of a canonical context, where it
/// stands for the argument the context is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Formula {
    Lit(bool),
    Var(String),
    Context { name: String, arg: Box<Formula> },
    Hole,
    Unary(UnaryOp, Box<Formula>),
    Binary(BinaryOp, Box<Formula>, Box<Formula>),
}

#[allow(clippy::should_implement_trait)]
impl Formula {
    pub fn lit(value: bool) -> Self {
        Formula::Lit(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Formula::Var(name.into())
    }

    pub fn context(name: impl Into<String>, arg: Formula) -> Self {
        Formula::Context {
            name: name.into(),
            arg: Box::new(arg),
        }
    }

    pub fn unary(op: UnaryOp, arg: Formula) -> Self {
        Formula::Unary(op, Box::new(arg))
    }

    pub fn binary(op: BinaryOp, lhs: Formula, rhs: Formula) -> Self {
        Formula::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn not(self) -> Self {
        Formula::unary(UnaryOp::Not, self)
    }

    pub fn next(self) -> Self {
        Formula::unary(UnaryOp::Next, self)
    }

    pub fn always(self) -> Self {
        Formula::unary(UnaryOp::Always, self)
    }

    pub fn eventually(self) -> Self {
        Formula::unary(UnaryOp::Eventually, self)
    }

    pub fn forall(self) -> Self {
        Formula::unary(UnaryOp::ForAll, self)
    }

    pub fn exists(self) -> Self {
        Formula::unary(UnaryOp::Exists, self)
    }

    pub fn or(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Or, self, other)
    }

    pub fn and(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::And, self, other)
    }

    pub fn implies(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Implies, self, other)
    }

    pub fn xor(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Xor, self, other)
    }

    pub fn equiv(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Equiv, self, other)
    }

    pub fn until(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Until, self, other)
    }

    pub fn weak_until(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::WeakUntil, self, other)
    }

    pub fn release(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::Release, self, other)
    }

    pub fn strong_release(self, other: Formula) -> Self {
        Formula::binary(BinaryOp::StrongRelease, self, other)
    }

    /// Fold a sequence of formulas into a left-nested conjunction.
    /// Returns `None` for an empty sequence.
    pub fn conjunction(items: impl IntoIterator<Item = Formula>) -> Option<Formula> {
        items.into_iter().reduce(Formula::and)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Formula::Lit(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Formula::Lit(false))
    }

    pub fn is_lit(&self) -> bool {
        matches!(self, Formula::Lit(_))
    }

    /// Whether a hole is reachable anywhere in the tree, context bodies included.
    pub fn has_hole(&self) -> bool {
        match self {
            Formula::Hole => true,
            Formula::Lit(_) | Formula::Var(_) => false,
            Formula::Context { arg, .. } | Formula::Unary(_, arg) => arg.has_hole(),
            Formula::Binary(_, lhs, rhs) => lhs.has_hole() || rhs.has_hole(),
        }
    }

    pub fn has_context(&self) -> bool {
        match self {
            Formula::Context { .. } => true,
            Formula::Lit(_) | Formula::Var(_) | Formula::Hole => false,
            Formula::Unary(_, arg) => arg.has_context(),
            Formula::Binary(_, lhs, rhs) => lhs.has_context() || rhs.has_context(),
        }
    }

    /// Whether any temporal operator (`X`, `F`, `G`, `U`, `W`, `R`, `M`) or
    /// path quantifier occurs in the formula.
    pub fn has_temporal(&self) -> bool {
        match self {
            Formula::Lit(_) | Formula::Var(_) | Formula::Hole => false,
            Formula::Context { arg, .. } => arg.has_temporal(),
            Formula::Unary(op, arg) => op != &UnaryOp::Not || arg.has_temporal(),
            Formula::Binary(op, lhs, rhs) => {
                op.is_temporal() || lhs.has_temporal() || rhs.has_temporal()
            }
        }
    }

    /// Atomic proposition names in order of first appearance.
    pub fn atoms(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms(&self, out: &mut IndexSet<String>) {
        match self {
            Formula::Var(name) => {
                out.insert(name.clone());
            }
            Formula::Lit(_) | Formula::Hole => {}
            Formula::Context { arg, .. } | Formula::Unary(_, arg) => arg.collect_atoms(out),
            Formula::Binary(_, lhs, rhs) => {
                lhs.collect_atoms(out);
                rhs.collect_atoms(out);
            }
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        match self {
            Formula::Lit(_) | Formula::Var(_) | Formula::Hole => 1,
            Formula::Context { arg, .. } | Formula::Unary(_, arg) => 1 + arg.size(),
            Formula::Binary(_, lhs, rhs) => 1 + lhs.size() + rhs.size(),
        }
    }

    fn priority(&self) -> u8 {
        match self {
            Formula::Unary(..) => UNARY_PRIORITY,
            Formula::Binary(op, ..) => op.priority(),
            _ => ATOM_PRIORITY,
        }
    }

    fn fmt_child(
        &self,
        child: &Formula,
        parent: u8,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        // Nested unary operators read fine without parentheses.
        let needs_parens = match child {
            Formula::Unary(..) => parent > UNARY_PRIORITY,
            _ => child.priority() <= parent,
        };
        if needs_parens {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

/// Whether `name` can be printed bare and read back as the same proposition
/// by both the LTL and the CTL parser.
pub fn is_plain_identifier(name: &str) -> bool {
    const RESERVED: [&str; 9] = ["U", "W", "R", "V", "M", "xor", "true", "false", "_"];
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && !matches!(first, 'F' | 'G' | 'X' | 'A' | 'E')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED.contains(&name)
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Lit(true) => write!(f, "true"),
            Formula::Lit(false) => write!(f, "false"),
            Formula::Var(name) => {
                if is_plain_identifier(name) {
                    write!(f, "{name}")
                } else {
                    write!(f, "\"{name}\"")
                }
            }
            Formula::Context { name, arg } if is_plain_identifier(name) => write!(f, "{name}[{arg}]"),
            Formula::Context { name, arg } => write!(f, "\"{name}\"[{arg}]"),
            Formula::Hole => write!(f, "_"),
            Formula::Unary(op, arg) => {
                write!(f, "{op}")?;
                self.fmt_child(arg, UNARY_PRIORITY, f)
            }
            Formula::Binary(op, lhs, rhs) => {
                let prio = op.priority();
                self.fmt_child(lhs, prio, f)?;
                write!(f, " {op} ")?;
                self.fmt_child(rhs, prio, f)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> Formula {
        Formula::var("p")
    }

    fn q() -> Formula {
        Formula::var("q")
    }

    // ---------------------------------------------------------------
    // Operator metadata
    // ---------------------------------------------------------------

    #[test]
    fn dual_swaps_always_eventually_and_quantifiers() {
        assert_eq!(UnaryOp::Always.dual(), UnaryOp::Eventually);
        assert_eq!(UnaryOp::Eventually.dual(), UnaryOp::Always);
        assert_eq!(UnaryOp::ForAll.dual(), UnaryOp::Exists);
        assert_eq!(UnaryOp::Exists.dual(), UnaryOp::ForAll);
        assert_eq!(UnaryOp::Next.dual(), UnaryOp::Next);
        assert_eq!(UnaryOp::Not.dual(), UnaryOp::Not);
    }

    #[test]
    fn temporal_binary_operators_share_priority() {
        for op in BinaryOp::ALL {
            assert_eq!(op.is_temporal(), op.priority() == 4, "{op:?}");
        }
        assert!(BinaryOp::Until.is_temporal());
        assert!(!BinaryOp::Xor.is_temporal());
    }

    // ---------------------------------------------------------------
    // Structural queries
    // ---------------------------------------------------------------

    #[test]
    fn structural_equality_distinguishes_operand_order() {
        assert_eq!(p().and(q()), p().and(q()));
        assert_ne!(p().and(q()), q().and(p()));
    }

    #[test]
    fn has_hole_looks_inside_contexts() {
        let f = Formula::context("c", Formula::Hole.or(p()));
        assert!(f.has_hole());
        assert!(!p().until(q()).has_hole());
    }

    #[test]
    fn has_temporal_ignores_boolean_connectives() {
        assert!(!p().and(q().not()).has_temporal());
        assert!(p().and(q().next()).has_temporal());
        assert!(p().until(q()).has_temporal());
        assert!(p().forall().has_temporal());
    }

    #[test]
    fn atoms_are_in_first_appearance_order() {
        let f = q().and(Formula::context("c", p().or(q())));
        let atoms: Vec<_> = f.atoms().into_iter().collect();
        assert_eq!(atoms, vec!["q".to_string(), "p".to_string()]);
    }

    #[test]
    fn conjunction_is_left_nested() {
        let f = Formula::conjunction([p(), q(), Formula::var("r")]).unwrap();
        assert_eq!(f, p().and(q()).and(Formula::var("r")));
        assert!(Formula::conjunction(Vec::new()).is_none());
    }

    #[test]
    fn size_counts_every_node() {
        assert_eq!(p().size(), 1);
        assert_eq!(Formula::context("c", p().not()).size(), 3);
        assert_eq!(p().until(q()).always().size(), 4);
    }

    // ---------------------------------------------------------------
    // Display
    // ---------------------------------------------------------------

    #[test]
    fn display_literals_and_variables() {
        assert_eq!(Formula::lit(true).to_string(), "true");
        assert_eq!(Formula::lit(false).to_string(), "false");
        assert_eq!(p().to_string(), "p");
        assert_eq!(Formula::var("c[p]").to_string(), "\"c[p]\"");
        assert_eq!(Formula::var("Fa").to_string(), "\"Fa\"");
    }

    #[test]
    fn display_unary_operators_without_space() {
        assert_eq!(p().not().to_string(), "¬p");
        assert_eq!(p().always().to_string(), "Gp");
        assert_eq!(p().eventually().always().to_string(), "GFp");
        assert_eq!(p().next().forall().to_string(), "AXp");
    }

    #[test]
    fn display_parenthesises_weaker_children() {
        assert_eq!(p().or(q()).always().to_string(), "G(p ∨ q)");
        assert_eq!(p().or(q()).and(p()).to_string(), "(p ∨ q) ∧ p");
        assert_eq!(p().and(q()).or(p()).to_string(), "p ∧ q ∨ p");
        assert_eq!(
            p().implies(q()).implies(p()).to_string(),
            "(p → q) → p"
        );
        assert_eq!(p().until(q().until(p())).to_string(), "p U (q U p)");
    }

    #[test]
    fn display_context_and_hole() {
        let f = Formula::context("c", p().and(q())).until(q());
        assert_eq!(f.to_string(), "c[p ∧ q] U q");
        assert_eq!(Formula::Hole.implies(p()).to_string(), "_ → p");
        assert_eq!(Formula::context("Apple", p()).to_string(), "\"Apple\"[p]");
    }

    #[test]
    fn plain_identifier_rules() {
        assert!(is_plain_identifier("p"));
        assert!(is_plain_identifier("p_1"));
        assert!(is_plain_identifier("Until"));
        assert!(!is_plain_identifier("U"));
        assert!(!is_plain_identifier("Gp"));
        assert!(!is_plain_identifier("1p"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("a b"));
        assert!(!is_plain_identifier("Apple"));
        assert!(!is_plain_identifier("X1"));
    }
}
