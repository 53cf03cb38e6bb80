//! Spot's textual formula syntax and accepting-word format.

use ctxeq_dsl::{BinaryOp, Formula, UnaryOp};
use ctxeq_ir::lasso::{Lasso, Step};

use crate::error::OracleError;

/// Render a context-free LTL formula in Spot syntax. Every compound
/// sub-formula is parenthesised.
pub fn to_spot(formula: &Formula) -> Result<String, OracleError> {
    Ok(match formula {
        Formula::Lit(true) => "true".to_string(),
        Formula::Lit(false) => "false".to_string(),
        Formula::Var(name) => spot_atom(name),
        Formula::Context { name, .. } => {
            return Err(OracleError::InvariantViolation(format!(
                "cannot translate context {name} to Spot"
            )))
        }
        Formula::Hole => {
            return Err(OracleError::InvariantViolation(
                "cannot translate a hole to Spot".into(),
            ))
        }
        Formula::Unary(op, arg) => {
            let symbol = match op {
                UnaryOp::Not => "!",
                UnaryOp::Next => "X ",
                UnaryOp::Always => "G ",
                UnaryOp::Eventually => "F ",
                UnaryOp::ForAll | UnaryOp::Exists => {
                    return Err(OracleError::InvalidFormula(format!(
                        "path quantifier {op} is not LTL"
                    )))
                }
            };
            format!("({symbol}{})", to_spot(arg)?)
        }
        Formula::Binary(op, lhs, rhs) => {
            let symbol = match op {
                BinaryOp::Or => "|",
                BinaryOp::And => "&",
                BinaryOp::Implies => "->",
                BinaryOp::Xor => "xor",
                BinaryOp::Equiv => "<->",
                BinaryOp::Until => "U",
                BinaryOp::WeakUntil => "W",
                BinaryOp::Release => "R",
                BinaryOp::StrongRelease => "M",
            };
            format!("({} {symbol} {})", to_spot(lhs)?, to_spot(rhs)?)
        }
    })
}

/// Lowercase identifiers go through unquoted; anything else is quoted so
/// Spot never reads it as an operator.
fn spot_atom(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(name, "true" | "false" | "xor");
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Parse a word printed by Spot, e.g. `a & !b; cycle{"c[p]"; 1}`.
pub fn parse_spot_word(text: &str) -> Result<Lasso, OracleError> {
    let text = text.trim();
    let start = find_unquoted(text, "cycle{")
        .ok_or_else(|| OracleError::Parse(format!("word without cycle: `{text}`")))?;
    let body_start = start + "cycle{".len();
    let body_len = find_unquoted(&text[body_start..], "}")
        .ok_or_else(|| OracleError::Parse(format!("unterminated cycle in `{text}`")))?;
    let trailing = text[body_start + body_len + 1..].trim();
    if !trailing.is_empty() {
        return Err(OracleError::Parse(format!("unexpected `{trailing}` after cycle")));
    }

    let prefix = parse_steps(&text[..start])?;
    let cycle = parse_steps(&text[body_start..body_start + body_len])?;
    if cycle.is_empty() {
        return Err(OracleError::Parse(format!("empty cycle in `{text}`")));
    }
    Ok(Lasso::new(prefix, cycle))
}

fn parse_steps(text: &str) -> Result<Vec<Step>, OracleError> {
    split_unquoted(text, ';')
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_step)
        .collect()
}

fn parse_step(text: &str) -> Result<Step, OracleError> {
    let mut step = Step::new();
    if matches!(text, "1" | "true") {
        return Ok(step);
    }
    for literal in split_unquoted(text, '&') {
        let literal = literal.trim();
        let (value, atom) = match literal.strip_prefix('!') {
            Some(rest) => (false, rest.trim()),
            None => (true, literal),
        };
        let name = parse_atom(atom)?;
        step.insert(name, value);
    }
    Ok(step)
}

fn parse_atom(atom: &str) -> Result<String, OracleError> {
    if let Some(inner) = atom.strip_prefix('"').and_then(|a| a.strip_suffix('"')) {
        let mut name = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                name.extend(chars.next());
            } else {
                name.push(c);
            }
        }
        return Ok(name);
    }
    let valid = !atom.is_empty()
        && !matches!(atom, "0" | "false" | "1" | "true")
        && atom.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(atom.to_string())
    } else {
        Err(OracleError::Parse(format!("unexpected literal `{atom}` in word")))
    }
}

/// Byte offsets of unquoted characters, honouring `\` escapes in quotes.
fn unquoted_positions(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut quoted = false;
    let mut escaped = false;
    text.char_indices().filter(move |&(_, c)| {
        if escaped {
            escaped = false;
            return false;
        }
        match c {
            '\\' if quoted => {
                escaped = true;
                false
            }
            '"' => {
                quoted = !quoted;
                false
            }
            _ => !quoted,
        }
    })
}

fn find_unquoted(text: &str, needle: &str) -> Option<usize> {
    unquoted_positions(text)
        .map(|(i, _)| i)
        .find(|&i| text[i..].starts_with(needle))
}

fn split_unquoted(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in unquoted_positions(text) {
        if c == separator {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}
