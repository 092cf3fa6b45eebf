//! Condition text tokenizer.
//!
//! Two surface forms are accepted:
//!
//! - `<path> <op> <operand>`: the path runs until whitespace or one of
//!   `< > = !`. The operator is a symbol (`>=`, `<=`, `==`, `!=`, `>`, `<`,
//!   longest first, no surrounding whitespace needed) or a word standing alone
//!   between whitespace (`not_in`, `between`, `startswith`, `endswith`, `like`,
//!   `regex`). Everything after it, trimmed, is the operand.
//! - `<operand> in <path>`: the last lexeme is the path, the one before it is
//!   the word `in`.
//!
//! Operator words only count at lexeme boundaries, so a field called
//! `containing` or an operand such as `'a like b'` is never split.

use regex::Regex;
use tracing::warn;

use crate::coerce::strip_quotes;
use crate::condition::{Condition, Operand};
use crate::error::{QueryError, Result};
use crate::op::Op;
use crate::path::Path;

const SYMBOLS: [Op; 6] = [Op::Gte, Op::Lte, Op::Eq, Op::Ne, Op::Gt, Op::Lt];

/// Compiles condition text into a [`Condition`].
///
/// Fails with [`QueryError::InvalidCondition`] for empty text, an empty path,
/// text with no recognized operator, or a `between` operand that is not two
/// comma-separated values. An invalid `regex` pattern still compiles, into a
/// condition that matches nothing.
///
/// # Example
///
/// ```
/// use jsonq::{parse, Op};
///
/// let condition = parse("age between 30,50").unwrap();
/// assert_eq!(condition.path().as_str(), "age");
/// assert_eq!(condition.op(), Op::Between);
///
/// let condition = parse("Thor in name.first").unwrap();
/// assert_eq!(condition.path().as_str(), "name.first");
/// assert_eq!(condition.op(), Op::In);
/// ```
pub fn parse(text: &str) -> Result<Condition> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(QueryError::invalid_condition(text, "empty condition"));
    }

    let (path, op, operand) = match split_path_first(trimmed) {
        Some(parts) => parts,
        None => split_membership(trimmed)
            .ok_or_else(|| QueryError::invalid_condition(text, "no operator found"))?,
    };
    if path.is_empty() {
        return Err(QueryError::invalid_condition(text, "missing field path"));
    }

    let operand = match op {
        Op::Between => split_range(operand)
            .ok_or_else(|| {
                QueryError::invalid_condition(text, "between expects two values: low,high")
            })?,
        Op::Regex => Operand::Pattern(compile_pattern(text, operand)),
        _ => Operand::Scalar(operand.to_string()),
    };

    Ok(Condition::new(text, Path::parse(path), op, operand))
}

fn split_path_first(text: &str) -> Option<(&str, Op, &str)> {
    let end = text
        .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '=' | '!'))
        .unwrap_or(text.len());
    let (path, rest) = text.split_at(end);
    let rest = rest.trim_start();

    if let Some(op) = SYMBOLS.into_iter().find(|op| rest.starts_with(op.as_str())) {
        return Some((path, op, rest[op.as_str().len()..].trim()));
    }

    let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (word, operand) = rest.split_at(word_end);
    match Op::from_token(word) {
        Some(op) if op.is_word() && op != Op::In => Some((path, op, operand.trim())),
        _ => None,
    }
}

fn split_membership(text: &str) -> Option<(&str, Op, &str)> {
    let (head, path) = text.rsplit_once(char::is_whitespace)?;
    let (operand, keyword) = head.trim_end().rsplit_once(char::is_whitespace)?;
    let operand = operand.trim();
    if keyword != Op::In.as_str() || operand.is_empty() {
        return None;
    }
    Some((path, Op::In, operand))
}

fn split_range(operand: &str) -> Option<Operand> {
    let (low, high) = operand.split_once(',')?;
    let (low, high) = (low.trim(), high.trim());
    if low.is_empty() || high.is_empty() || high.contains(',') {
        return None;
    }
    Some(Operand::Range {
        low: low.to_string(),
        high: high.to_string(),
    })
}

fn compile_pattern(condition: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(strip_quotes(pattern)) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(condition, error = %err, "invalid regex pattern, condition matches nothing");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(text: &str) -> (String, Op, String) {
        let c = parse(text).unwrap();
        let Operand::Scalar(operand) = c.operand().clone() else {
            panic!("expected scalar operand for {text}");
        };
        (c.path().as_str().to_string(), c.op(), operand)
    }

    #[test]
    fn symbolic_operators() {
        assert_eq!(scalar("sex == M"), ("sex".into(), Op::Eq, "M".into()));
        assert_eq!(scalar("age>=30"), ("age".into(), Op::Gte, "30".into()));
        assert_eq!(scalar("age <= 30"), ("age".into(), Op::Lte, "30".into()));
        assert_eq!(scalar("age != 30"), ("age".into(), Op::Ne, "30".into()));
        assert_eq!(scalar("age> 30"), ("age".into(), Op::Gt, "30".into()));
        assert_eq!(scalar("age <30"), ("age".into(), Op::Lt, "30".into()));
    }

    #[test]
    fn word_operators() {
        assert_eq!(
            scalar("family not_in Avengers"),
            ("family".into(), Op::NotIn, "Avengers".into())
        );
        assert_eq!(
            scalar("name.first startswith T"),
            ("name.first".into(), Op::StartsWith, "T".into())
        );
        assert_eq!(scalar("name endswith or"), ("name".into(), Op::EndsWith, "or".into()));
        assert_eq!(scalar("name like tho"), ("name".into(), Op::Like, "tho".into()));
    }

    #[test]
    fn operand_keeps_inner_whitespace_and_quotes() {
        assert_eq!(
            scalar("name == 'Tony Stark'  "),
            ("name".into(), Op::Eq, "'Tony Stark'".into())
        );
        assert_eq!(scalar("name =="), ("name".into(), Op::Eq, "".into()));
    }

    #[test]
    fn membership_form_swaps_path_and_operand() {
        assert_eq!(scalar("Thor in name.first"), ("name.first".into(), Op::In, "Thor".into()));
        assert_eq!(
            scalar("Tony Stark in name"),
            ("name".into(), Op::In, "Tony Stark".into())
        );
        assert_eq!(
            scalar("beer in favorite.*.food"),
            ("favorite.*.food".into(), Op::In, "beer".into())
        );
    }

    #[test]
    fn operator_words_inside_lexemes_do_not_split() {
        assert_eq!(
            scalar("containing == x"),
            ("containing".into(), Op::Eq, "x".into())
        );
        assert_eq!(
            scalar("title == a like b"),
            ("title".into(), Op::Eq, "a like b".into())
        );
        assert_eq!(
            scalar("between_dates == 1"),
            ("between_dates".into(), Op::Eq, "1".into())
        );
    }

    #[test]
    fn between_operand() {
        let c = parse("age between 30, 50").unwrap();
        assert_eq!(
            c.operand(),
            &Operand::Range {
                low: "30".into(),
                high: "50".into()
            }
        );
    }

    #[test]
    fn malformed_between_is_rejected() {
        for text in ["age between 30", "age between 1,2,3", "age between ,5", "age between"] {
            assert!(
                matches!(parse(text), Err(QueryError::InvalidCondition { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn missing_operator_is_rejected() {
        for text in ["", "   ", "age", "age 45", "age = 45", "in name", "== M"] {
            assert!(
                matches!(parse(text), Err(QueryError::InvalidCondition { .. })),
                "{text:?}"
            );
        }
    }

    #[test]
    fn word_operators_are_case_sensitive() {
        assert!(parse("name LIKE x").is_err());
    }

    #[test]
    fn regex_compiled_once() {
        let c = parse("name regex '^T'").unwrap();
        let Operand::Pattern(Some(regex)) = c.operand() else {
            panic!("expected compiled pattern");
        };
        assert_eq!(regex.as_str(), "^T");
    }

    #[test]
    fn raw_text_is_preserved() {
        let c = parse("  age == 45 ").unwrap();
        assert_eq!(c.text(), "  age == 45 ");
        assert_eq!(c.to_string(), "  age == 45 ");
    }
}
