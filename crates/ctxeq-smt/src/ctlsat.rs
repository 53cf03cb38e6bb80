//! Byte encoding of CTL formulas for the CTL-SAT decision procedure.
//!
//! CTL-SAT reads propositions as single characters, so every proposition
//! gets its own printable ASCII symbol. Characters that CTL-SAT uses as
//! operators are never handed out.

use ctxeq_dsl::{BinaryOp, Formula, UnaryOp};
use indexmap::IndexMap;

use crate::error::OracleError;

/// Placeholder for the hole; the first printable character.
pub const HOLE_SYMBOL: u8 = b'!';

/// Characters CTL-SAT reserves for its own syntax.
pub const RESERVED: &[u8] = b"^v~->()TAEUFGX$";

const FIRST_SYMBOL: u8 = HOLE_SYMBOL + 2;
const LAST_SYMBOL: u8 = b'~';

/// Number of distinct propositions the encoding can represent.
pub fn capacity() -> usize {
    (FIRST_SYMBOL..=LAST_SYMBOL)
        .filter(|c| !RESERVED.contains(c))
        .count()
}

#[derive(Debug, Clone, Default)]
pub struct CtlSatEncoder {
    symbols: IndexMap<String, u8>,
}

impl CtlSatEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol assignment so far, in allocation order.
    pub fn symbols(&self) -> &IndexMap<String, u8> {
        &self.symbols
    }

    fn symbol(&mut self, prop: &str) -> Result<char, OracleError> {
        if let Some(&c) = self.symbols.get(prop) {
            return Ok(char::from(c));
        }
        let mut next = self
            .symbols
            .last()
            .map_or(FIRST_SYMBOL, |(_, &c)| c.saturating_add(1));
        while RESERVED.contains(&next) {
            next += 1;
        }
        if next > LAST_SYMBOL {
            return Err(OracleError::TooManyVariables { limit: capacity() });
        }
        self.symbols.insert(prop.to_string(), next);
        Ok(char::from(next))
    }

    pub fn encode(&mut self, formula: &Formula) -> Result<String, OracleError> {
        Ok(match formula {
            Formula::Lit(true) => "T".to_string(),
            Formula::Lit(false) => "(~T)".to_string(),
            Formula::Var(name) => self.symbol(name)?.to_string(),
            Formula::Hole => char::from(HOLE_SYMBOL).to_string(),
            Formula::Context { name, .. } => {
                return Err(OracleError::InvariantViolation(format!(
                    "cannot encode context {name} for CTL-SAT"
                )))
            }
            Formula::Unary(op, arg) => {
                let a = self.encode(arg)?;
                match op {
                    UnaryOp::Not => format!("~ {a}"),
                    UnaryOp::ForAll => format!("(A {a})"),
                    UnaryOp::Exists => format!("(E {a})"),
                    UnaryOp::Next => format!("X {a}"),
                    UnaryOp::Eventually => format!("F {a}"),
                    UnaryOp::Always => format!("G {a}"),
                }
            }
            Formula::Binary(op, lhs, rhs) => {
                let template = match op {
                    BinaryOp::Or => "v",
                    BinaryOp::And => "^",
                    BinaryOp::Implies => "->",
                    BinaryOp::Until => "U",
                    BinaryOp::Xor
                    | BinaryOp::Equiv
                    | BinaryOp::WeakUntil
                    | BinaryOp::Release
                    | BinaryOp::StrongRelease => {
                        return Err(OracleError::InvalidFormula(format!(
                            "not a valid CTL-SAT formula: {op}"
                        )))
                    }
                };
                let a = self.encode(lhs)?;
                let b = self.encode(rhs)?;
                format!("({a} {template} {b})")
            }
        })
    }

    /// Query satisfiable iff some model of `left` (and `condition`, when
    /// given) violates `right`.
    pub fn difference_query(
        &mut self,
        left: &Formula,
        condition: Option<&Formula>,
        right: &Formula,
    ) -> Result<String, OracleError> {
        let l = self.encode(left)?;
        let r = self.encode(right)?;
        Ok(match condition {
            Some(condition) => {
                let c = self.encode(condition)?;
                format!("({l}) ^ ({c}) ^ (~ {r})")
            }
            None => format!("{l} ^ (~ {r})"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Formula {
        ctxeq_dsl::parse_ctl(text).unwrap()
    }

    #[test]
    fn encodes_every_supported_operator() {
        let mut enc = CtlSatEncoder::new();
        assert_eq!(enc.encode(&parse("E X p | !q")).unwrap(), "((E X #) v ~ %)");
        assert_eq!(
            enc.encode(&parse("A (p U q) & (q -> A F p)")).unwrap(),
            "((A (# U %)) ^ (% -> (A F #)))"
        );
        assert_eq!(enc.encode(&parse("E G true")).unwrap(), "(E G T)");
        assert_eq!(enc.encode(&parse("false")).unwrap(), "(~T)");
        assert_eq!(enc.encode(&Formula::Hole.and(parse("p"))).unwrap(), "(! ^ #)");
    }

    #[test]
    fn unsupported_operators_are_invalid() {
        let mut enc = CtlSatEncoder::new();
        for text in ["p xor q", "p <-> q", "A (p W q)", "A (p R q)", "E (p M q)"] {
            assert!(
                matches!(enc.encode(&parse(text)), Err(OracleError::InvalidFormula(_))),
                "{text}"
            );
        }
        assert!(matches!(
            enc.encode(&parse("c[p]")),
            Err(OracleError::InvariantViolation(_))
        ));
    }

    #[test]
    fn reserved_characters_are_skipped() {
        let mut enc = CtlSatEncoder::new();
        for i in 0..capacity() {
            enc.encode(&Formula::var(format!("p{i}"))).unwrap();
        }
        let symbols: Vec<u8> = enc.symbols().values().copied().collect();
        assert_eq!(symbols[0], b'#');
        assert_eq!(symbols[1], b'%');
        assert!(symbols.iter().all(|c| !RESERVED.contains(c) && c.is_ascii_graphic()));
        assert_eq!(*symbols.last().unwrap(), b'}');
    }

    #[test]
    fn running_out_of_symbols_is_reported() {
        let mut enc = CtlSatEncoder::new();
        let limit = capacity();
        assert_eq!(limit, 77);
        for i in 0..limit {
            enc.encode(&Formula::var(format!("p{i}"))).unwrap();
        }
        let err = enc.encode(&Formula::var("one_too_many")).unwrap_err();
        assert!(matches!(err, OracleError::TooManyVariables { limit: 77 }));
        // Known propositions keep working.
        assert!(enc.encode(&Formula::var("p0")).is_ok());
    }

    #[test]
    fn difference_queries() {
        let mut enc = CtlSatEncoder::new();
        let query = enc
            .difference_query(&parse("A G p"), Some(&parse("true")), &parse("q"))
            .unwrap();
        assert_eq!(query, "((A G #)) ^ (T) ^ (~ %)");
        let query = enc.difference_query(&parse("q"), None, &parse("A G p")).unwrap();
        assert_eq!(query, "% ^ (~ (A G #))");
    }
}
