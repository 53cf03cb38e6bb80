#![allow(clippy::result_large_err)]

use pest::Parser;
use pest_derive::Parser;

use crate::ast::{BinaryOp, Formula, UnaryOp};
use crate::errors::ParseError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct FormulaParser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;
type Pairs<'a> = pest::iterators::Pairs<'a, Rule>;

/// Parse an LTL or propositional formula read from an unnamed source.
pub fn parse(source: &str) -> Result<Formula, ParseError> {
    parse_named(source, "<input>")
}

/// Parse an LTL or propositional formula; `name` labels the source in
/// diagnostics (e.g. `left`). `A` and `E` are ordinary identifier letters here.
pub fn parse_named(source: &str, name: &str) -> Result<Formula, ParseError> {
    parse_rule(Rule::formula, source, name)
}

/// Parse a CTL formula read from an unnamed source.
pub fn parse_ctl(source: &str) -> Result<Formula, ParseError> {
    parse_ctl_named(source, "<input>")
}

/// Parse a CTL formula, where `A`/`∀` and `E`/`∃` are path quantifiers.
pub fn parse_ctl_named(source: &str, name: &str) -> Result<Formula, ParseError> {
    parse_rule(Rule::ctl_formula, source, name)
}

fn parse_rule(rule: Rule, source: &str, name: &str) -> Result<Formula, ParseError> {
    let mut pairs = FormulaParser::parse(rule, source).map_err(|e| {
        let (start, end) = match e.location {
            pest::error::InputLocation::Pos(p) => (p, p + 1),
            pest::error::InputLocation::Span((s, e)) => (s, e),
        };
        ParseError::syntax(e.variant.message(), start..end, source, name)
    })?;

    let builder = Builder { source, name };
    let root = builder.expect(&mut pairs, 0..source.len(), "formula")?;
    let body = builder.expect(&mut root.into_inner(), 0..source.len(), "formula body")?;
    builder.build(body)
}

/// Turns pest pairs into `Formula`s, attaching the source for error reports.
struct Builder<'s> {
    source: &'s str,
    name: &'s str,
}

impl<'s> Builder<'s> {
    fn expect<'a>(
        &self,
        pairs: &mut Pairs<'a>,
        span: std::ops::Range<usize>,
        what: &str,
    ) -> Result<Pair<'a>, ParseError> {
        pairs
            .next()
            .ok_or_else(|| ParseError::malformed(format!("missing {what}"), span, self.source, self.name))
    }

    fn malformed(&self, pair: &Pair<'_>, message: impl Into<String>) -> ParseError {
        let span = pair.as_span();
        ParseError::malformed(message, span.start()..span.end(), self.source, self.name)
    }

    fn build(&self, pair: Pair<'_>) -> Result<Formula, ParseError> {
        let span = pair.as_span().start()..pair.as_span().end();
        match pair.as_rule() {
            Rule::formula0 | Rule::formula4 | Rule::ctl_formula0 | Rule::ctl_formula4 => {
                let mut inner = pair.into_inner();
                let lhs = self.build(self.expect(&mut inner, span.clone(), "operand")?)?;
                let Some(op) = inner.next() else {
                    return Ok(lhs);
                };
                let rhs = self.build(self.expect(&mut inner, span, "right operand")?)?;
                Ok(Formula::binary(self.binary_op(&op)?, lhs, rhs))
            }
            Rule::formula1
            | Rule::formula2
            | Rule::formula3
            | Rule::ctl_formula1
            | Rule::ctl_formula2
            | Rule::ctl_formula3 => {
                let mut inner = pair.into_inner();
                let mut acc = self.build(self.expect(&mut inner, span.clone(), "operand")?)?;
                while let Some(op) = inner.next() {
                    let rhs = self.build(self.expect(&mut inner, span.clone(), "right operand")?)?;
                    acc = Formula::binary(self.binary_op(&op)?, acc, rhs);
                }
                Ok(acc)
            }
            Rule::formula5 | Rule::ctl_formula5 => {
                let mut inner = pair.into_inner();
                let first = self.expect(&mut inner, span.clone(), "operand")?;
                if !matches!(first.as_rule(), Rule::unary_op | Rule::ctl_unary_op) {
                    return self.build(first);
                }
                let op = self.unary_op(&first)?;
                let arg = self.build(self.expect(&mut inner, span, "operand")?)?;
                Ok(Formula::unary(op, arg))
            }
            Rule::formula6 | Rule::ctl_formula6 => {
                let inner = self.expect(&mut pair.into_inner(), span, "atom")?;
                self.build(inner)
            }
            Rule::literal => Ok(Formula::Lit(matches!(pair.as_str(), "true" | "1"))),
            Rule::ident | Rule::ctl_ident => Ok(Formula::Var(self.ident_name(pair)?)),
            Rule::context | Rule::ctl_context => {
                let mut inner = pair.into_inner();
                let name = self.ident_name(self.expect(&mut inner, span.clone(), "context name")?)?;
                let arg = self.build(self.expect(&mut inner, span, "context argument")?)?;
                Ok(Formula::context(name, arg))
            }
            other => Err(self.malformed(&pair, format!("unexpected rule {other:?}"))),
        }
    }

    fn ident_name(&self, pair: Pair<'_>) -> Result<String, ParseError> {
        let span = pair.as_span().start()..pair.as_span().end();
        let inner = self.expect(&mut pair.into_inner(), span.clone(), "identifier")?;
        match inner.as_rule() {
            Rule::plain_ident | Rule::ctl_plain_ident => Ok(inner.as_str().to_string()),
            Rule::quoted_ident => {
                let text = self.expect(&mut inner.into_inner(), span, "quoted identifier")?;
                Ok(text.as_str().to_string())
            }
            other => Err(self.malformed(&inner, format!("unexpected identifier rule {other:?}"))),
        }
    }

    fn unary_op(&self, pair: &Pair<'_>) -> Result<UnaryOp, ParseError> {
        Ok(match pair.as_str() {
            "!" | "~" | "¬" => UnaryOp::Not,
            "X" => UnaryOp::Next,
            "F" | "<>" | "◇" => UnaryOp::Eventually,
            "G" | "[]" | "□" => UnaryOp::Always,
            "A" | "∀" => UnaryOp::ForAll,
            "E" | "∃" => UnaryOp::Exists,
            other => return Err(self.malformed(pair, format!("unknown unary operator {other:?}"))),
        })
    }

    fn binary_op(&self, pair: &Pair<'_>) -> Result<BinaryOp, ParseError> {
        let op = match pair.as_rule() {
            Rule::equiv_op => BinaryOp::Equiv,
            Rule::implies_op => BinaryOp::Implies,
            Rule::xor_op => BinaryOp::Xor,
            Rule::or_op => BinaryOp::Or,
            Rule::and_op => BinaryOp::And,
            Rule::temporal_op => match pair.as_str() {
                "U" => BinaryOp::Until,
                "W" => BinaryOp::WeakUntil,
                "R" | "V" => BinaryOp::Release,
                "M" => BinaryOp::StrongRelease,
                other => {
                    return Err(self.malformed(pair, format!("unknown temporal operator {other:?}")))
                }
            },
            other => return Err(self.malformed(pair, format!("unexpected operator rule {other:?}"))),
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(name: &str) -> Formula {
        Formula::var(name)
    }

    fn ok(src: &str) -> Formula {
        parse(src).unwrap_or_else(|e| panic!("failed to parse {src:?}: {e}"))
    }

    fn ctl(src: &str) -> Formula {
        parse_ctl(src).unwrap_or_else(|e| panic!("failed to parse CTL {src:?}: {e}"))
    }

    // ---------------------------------------------------------------
    // Atoms
    // ---------------------------------------------------------------

    #[test]
    fn parse_literals() {
        assert_eq!(ok("true"), Formula::lit(true));
        assert_eq!(ok("false"), Formula::lit(false));
        assert_eq!(ok("1"), Formula::lit(true));
        assert_eq!(ok("0"), Formula::lit(false));
    }

    #[test]
    fn identifiers_may_start_with_keywords() {
        assert_eq!(ok("trueish"), v("trueish"));
        assert_eq!(ok("Until"), v("Until"));
        assert_eq!(ok("xor_gate"), v("xor_gate"));
    }

    #[test]
    fn quantifier_letters_start_identifiers_outside_ctl() {
        assert_eq!(ok("Apple"), v("Apple"));
        assert_eq!(ok("E | Every"), v("E").or(v("Every")));
        assert_eq!(ok("G Apple"), v("Apple").always());
        assert!(parse("A G p").is_err());
        assert!(parse("∀ p").is_err());
    }

    #[test]
    fn quantifier_letters_are_operators_in_ctl() {
        assert_eq!(ctl("Apple"), v("pple").forall());
        assert_eq!(ctl("A G p"), v("p").always().forall());
        assert!(parse_ctl("E").is_err());
        assert_eq!(ctl("\"Apple\" & q"), v("Apple").and(v("q")));
    }

    #[test]
    fn numbered_x_is_a_proposition() {
        assert_eq!(ok("X1"), v("X1"));
        assert_eq!(ok("X1 U X23"), v("X1").until(v("X23")));
        assert_eq!(ok("X X1"), v("X1").next());
        assert_eq!(ok("X 1"), Formula::lit(true).next());
        assert_eq!(ctl("A X X2"), v("X2").next().forall());
        assert!(parse("X1p").is_err());
    }

    #[test]
    fn quoted_identifier_strips_quotes() {
        assert_eq!(ok("\"c[p]\""), v("c[p]"));
        assert_eq!(ok("\"G p\" & q"), v("G p").and(v("q")));
    }

    #[test]
    fn parse_context_application() {
        assert_eq!(ok("c[p]"), Formula::context("c", v("p")));
        assert_eq!(
            ok("c [ p & q ]"),
            Formula::context("c", v("p").and(v("q")))
        );
        assert_eq!(
            ok("c[d[p]]"),
            Formula::context("c", Formula::context("d", v("p")))
        );
    }

    // ---------------------------------------------------------------
    // Operators and priorities
    // ---------------------------------------------------------------

    #[test]
    fn unary_operator_letters_bind_to_following_atom() {
        assert_eq!(ok("Gp"), v("p").always());
        assert_eq!(ok("GF p"), v("p").eventually().always());
        assert_eq!(ctl("AX p"), v("p").next().forall());
        assert_eq!(ctl("E F p"), v("p").eventually().exists());
        assert_eq!(ok("[] <> p"), v("p").eventually().always());
        assert_eq!(ok("!~p"), v("p").not().not());
    }

    #[test]
    fn conjunction_binds_tighter_than_disjunction() {
        assert_eq!(ok("p | q & r"), v("p").or(v("q").and(v("r"))));
        assert_eq!(ok("p & q | r"), v("p").and(v("q")).or(v("r")));
    }

    #[test]
    fn boolean_connectives_are_left_associative() {
        assert_eq!(ok("p & q & r"), v("p").and(v("q")).and(v("r")));
        assert_eq!(ok("p xor q ^ r"), v("p").xor(v("q")).xor(v("r")));
    }

    #[test]
    fn implication_and_until_are_right_associative() {
        assert_eq!(ok("p -> q -> r"), v("p").implies(v("q").implies(v("r"))));
        assert_eq!(ok("p U q U r"), v("p").until(v("q").until(v("r"))));
    }

    #[test]
    fn temporal_binary_binds_tighter_than_boolean() {
        assert_eq!(ok("p U q & r"), v("p").until(v("q")).and(v("r")));
        assert_eq!(ok("!p U q"), v("p").not().until(v("q")));
    }

    #[test]
    fn all_operator_spellings() {
        assert_eq!(ok("p <-> q"), v("p").equiv(v("q")));
        assert_eq!(ok("p <=> q"), v("p").equiv(v("q")));
        assert_eq!(ok("p ↔ q"), v("p").equiv(v("q")));
        assert_eq!(ok("p => q"), v("p").implies(v("q")));
        assert_eq!(ok("p → q"), v("p").implies(v("q")));
        assert_eq!(ok("p || q"), v("p").or(v("q")));
        assert_eq!(ok("p \\/ q"), v("p").or(v("q")));
        assert_eq!(ok("p /\\ q"), v("p").and(v("q")));
        assert_eq!(ok("p ∧ q"), v("p").and(v("q")));
        assert_eq!(ok("p ⊕ q"), v("p").xor(v("q")));
        assert_eq!(ok("p W q"), v("p").weak_until(v("q")));
        assert_eq!(ok("p R q"), v("p").release(v("q")));
        assert_eq!(ok("p V q"), v("p").release(v("q")));
        assert_eq!(ok("p M q"), v("p").strong_release(v("q")));
        assert_eq!(ok("¬p"), v("p").not());
        assert_eq!(ok("□◇p"), v("p").eventually().always());
        assert_eq!(ctl("∀∃p"), v("p").exists().forall());
    }

    #[test]
    fn parentheses_override_priority() {
        assert_eq!(ok("(p | q) & r"), v("p").or(v("q")).and(v("r")));
        assert_eq!(ok("G(p -> F q)"), v("p").implies(v("q").eventually()).always());
    }

    // ---------------------------------------------------------------
    // Rendering round trip
    // ---------------------------------------------------------------

    #[test]
    fn rendered_formula_parses_back() {
        for src in [
            "c[p] U q",
            "G(p → Fq)",
            "(p ∨ q) ∧ ¬r",
            "\"c[p]\" ↔ c[p]",
            "p ⊕ q ⊕ r",
            "(p → q) → r",
        ] {
            let f = ok(src);
            assert_eq!(ok(&f.to_string()), f, "round trip of {src}");
        }
    }

    #[test]
    fn rendered_ctl_formula_parses_back() {
        for src in ["A(p U c[q ∧ r])", "E X \"Apple\" → A G c[p]", "∀□(p → ∃◇q)"] {
            let f = ctl(src);
            assert_eq!(ctl(&f.to_string()), f, "round trip of {src}");
        }
    }

    // ---------------------------------------------------------------
    // Errors
    // ---------------------------------------------------------------

    #[test]
    fn unbalanced_bracket_is_syntax_error() {
        let err = parse("c[p").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert_eq!(err.span().start, 3);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(parse("p q").is_err());
        assert!(parse("p &").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn lone_operator_letter_is_not_an_identifier() {
        assert!(parse("U").is_err());
        assert!(parse("p & G").is_err());
    }

    #[test]
    fn named_source_is_kept_in_diagnostic() {
        let err = parse_named("p &", "right").unwrap_err();
        match err {
            ParseError::Syntax { src, .. } => assert_eq!(src.name(), "right"),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
