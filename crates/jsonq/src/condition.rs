//! Compiled conditions and per-record evaluation.
//!
//! A [`Condition`] is the compiled form of one condition text: a path, an
//! operator and an operand. Evaluation is total: a record either matches or
//! it does not, and every data-shape problem (absent path, type mismatch,
//! unparseable operand) counts as no match.

use std::fmt;

use regex::Regex;

use crate::coerce::{coerce, strip_quotes};
use crate::op::Op;
use crate::ordering::{compare_values, loose_eq};
use crate::path::{Path, Resolved};
use crate::value::{Record, Value};

/// Operand of a compiled condition.
///
/// Scalar literals are kept as text and coerced per record, against the value
/// actually found there.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A single literal, quotes still attached.
    Scalar(String),
    /// The two bounds of `between`.
    Range { low: String, high: String },
    /// A `regex` pattern. `None` when the pattern failed to compile.
    Pattern(Option<Regex>),
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::Scalar(a), Operand::Scalar(b)) => a == b,
            (
                Operand::Range { low, high },
                Operand::Range {
                    low: other_low,
                    high: other_high,
                },
            ) => low == other_low && high == other_high,
            (Operand::Pattern(a), Operand::Pattern(b)) => {
                a.as_ref().map(Regex::as_str) == b.as_ref().map(Regex::as_str)
            }
            _ => false,
        }
    }
}

/// A compiled condition: `<path> <op> <operand>`.
///
/// Build one with [`parse`](crate::parse) or through a
/// [`ConditionCache`](crate::ConditionCache).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    raw: String,
    path: Path,
    op: Op,
    operand: Operand,
}

impl Condition {
    pub(crate) fn new(raw: &str, path: Path, op: Op, operand: Operand) -> Self {
        Condition {
            raw: raw.to_string(),
            path,
            op,
            operand,
        }
    }

    /// The condition text this was compiled from.
    pub fn text(&self) -> &str {
        &self.raw
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Returns `true` if the equality index can answer this condition:
    /// a wildcard-free path with `==`, an ordering operator on a scalar
    /// operand, or `between`.
    pub fn is_indexable(&self) -> bool {
        if self.path.has_wildcard() {
            return false;
        }
        match &self.operand {
            Operand::Scalar(_) => self.op == Op::Eq || (self.op.is_range() && self.op != Op::Between),
            Operand::Range { .. } => self.op == Op::Between,
            Operand::Pattern(_) => false,
        }
    }

    /// Evaluates the condition against one record.
    ///
    /// Wildcard paths match when any resolved element satisfies the operator.
    pub fn matches(&self, record: &Record) -> bool {
        match self.path.resolve(record) {
            None => false,
            Some(Resolved::One(value)) => self.test(value),
            Some(Resolved::Many(values)) => values.into_iter().any(|v| self.test(v)),
        }
    }

    /// Evaluates the operator against a single resolved value.
    pub fn test(&self, value: &Value) -> bool {
        match (&self.operand, self.op) {
            (Operand::Scalar(lit), Op::Eq) => loose_eq(value, &coerce(lit, value)),
            (Operand::Scalar(lit), Op::Ne) => !loose_eq(value, &coerce(lit, value)),
            (Operand::Scalar(lit), op @ (Op::Gt | Op::Gte | Op::Lt | Op::Lte)) => {
                compare_values(value, &coerce(lit, value)).is_some_and(|o| op.eval_ordering(o))
            }
            (Operand::Scalar(lit), Op::In) => contains(value, lit).unwrap_or(false),
            (Operand::Scalar(lit), Op::NotIn) => contains(value, lit).is_some_and(|c| !c),
            (Operand::Scalar(lit), Op::Like) => value
                .render()
                .to_lowercase()
                .contains(&strip_quotes(lit).to_lowercase()),
            (Operand::Scalar(lit), Op::StartsWith) => {
                value.render().starts_with(strip_quotes(lit))
            }
            (Operand::Scalar(lit), Op::EndsWith) => value.render().ends_with(strip_quotes(lit)),
            (Operand::Range { low, high }, Op::Between) => {
                let above = compare_values(value, &coerce(low, value))
                    .is_some_and(|o| o.is_ge());
                above
                    && compare_values(value, &coerce(high, value)).is_some_and(|o| o.is_le())
            }
            (Operand::Pattern(Some(regex)), Op::Regex) => regex.is_match(&value.render()),
            _ => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Membership test shared by `in` and `not_in`.
///
/// Text contains the unquoted literal as a substring; a sequence contains an
/// element loosely equal to the literal coerced against that element. Any
/// other value cannot contain anything and yields `None`.
fn contains(value: &Value, literal: &str) -> Option<bool> {
    match value {
        Value::Text(s) => Some(s.contains(strip_quotes(literal))),
        Value::Sequence(items) => Some(
            items
                .iter()
                .any(|item| loose_eq(item, &coerce(literal, item))),
        ),
        _ => None,
    }
}
