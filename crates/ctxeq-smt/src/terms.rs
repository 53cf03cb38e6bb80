/// Boolean SMT term, solver-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtTerm {
    /// Variable reference by name.
    Var(String),
    /// Boolean literal.
    BoolLit(bool),

    And(Vec<SmtTerm>),
    Or(Vec<SmtTerm>),
    Not(Box<SmtTerm>),
    Implies(Box<SmtTerm>, Box<SmtTerm>),
    Xor(Box<SmtTerm>, Box<SmtTerm>),
    Eq(Box<SmtTerm>, Box<SmtTerm>),
}

#[allow(clippy::should_implement_trait)]
impl SmtTerm {
    pub fn var(name: impl Into<String>) -> Self {
        SmtTerm::Var(name.into())
    }

    pub fn bool(b: bool) -> Self {
        SmtTerm::BoolLit(b)
    }

    pub fn and(self, other: SmtTerm) -> Self {
        SmtTerm::And(vec![self, other])
    }

    pub fn or(self, other: SmtTerm) -> Self {
        SmtTerm::Or(vec![self, other])
    }

    pub fn not(self) -> Self {
        SmtTerm::Not(Box::new(self))
    }

    pub fn implies(self, other: SmtTerm) -> Self {
        SmtTerm::Implies(Box::new(self), Box::new(other))
    }

    pub fn xor(self, other: SmtTerm) -> Self {
        SmtTerm::Xor(Box::new(self), Box::new(other))
    }

    pub fn eq(self, other: SmtTerm) -> Self {
        SmtTerm::Eq(Box::new(self), Box::new(other))
    }

    /// Variables in order of first occurrence.
    pub fn vars(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            SmtTerm::Var(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            SmtTerm::BoolLit(_) => {}
            SmtTerm::And(terms) | SmtTerm::Or(terms) => {
                for t in terms {
                    t.collect_vars(out);
                }
            }
            SmtTerm::Not(inner) => inner.collect_vars(out),
            SmtTerm::Implies(lhs, rhs) | SmtTerm::Xor(lhs, rhs) | SmtTerm::Eq(lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}
