//! Condition operators.
//!
//! The [`Op`] enum lists every operator the condition grammar accepts. The
//! order of [`Op::PRECEDENCE`] is the order in which the grammar tries them:
//! longer and more specific tokens first.

use std::cmp::Ordering;

/// Comparison operator of a compiled condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Word operators
    /// Value does not contain the operand (substring or sequence element).
    NotIn,
    /// Inclusive range: `low <= value <= high`.
    Between,
    /// Rendered value starts with the operand.
    StartsWith,
    /// Rendered value ends with the operand.
    EndsWith,
    /// Case-insensitive substring match.
    Like,
    /// Regular expression search in the rendered value.
    Regex,

    // Symbolic operators
    Gte,
    Lte,
    Eq,
    Ne,
    Gt,
    Lt,

    /// Value contains the operand. Written `<operand> in <path>`.
    In,
}

impl Op {
    /// Every operator, in the order the grammar tries them.
    pub const PRECEDENCE: [Op; 13] = [
        Op::NotIn,
        Op::Between,
        Op::StartsWith,
        Op::EndsWith,
        Op::Like,
        Op::Regex,
        Op::Gte,
        Op::Lte,
        Op::Eq,
        Op::Ne,
        Op::Gt,
        Op::Lt,
        Op::In,
    ];

    /// The operator token as written in condition text.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::NotIn => "not_in",
            Op::Between => "between",
            Op::StartsWith => "startswith",
            Op::EndsWith => "endswith",
            Op::Like => "like",
            Op::Regex => "regex",
            Op::Gte => ">=",
            Op::Lte => "<=",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::In => "in",
        }
    }

    /// Looks up an operator by its token.
    pub fn from_token(token: &str) -> Option<Op> {
        Op::PRECEDENCE.into_iter().find(|op| op.as_str() == token)
    }

    /// Returns `true` for operators spelled with letters, which must stand
    /// alone between whitespace.
    pub fn is_word(self) -> bool {
        self.as_str().bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
    }

    /// Returns `true` for the range operators the sorted index can answer.
    pub fn is_range(self) -> bool {
        matches!(self, Op::Gt | Op::Gte | Op::Lt | Op::Lte | Op::Between)
    }

    /// Evaluates an ordering-based operator.
    ///
    /// Returns `false` for operators that are not ordering-based.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
