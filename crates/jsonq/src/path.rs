//! Dotted path parsing and resolution against records.
//!
//! A path such as `name.first` walks nested records. A `*` segment iterates
//! the sequence found at that position and resolves the rest of the path
//! against each element independently: `favorite.*.food` yields the `food`
//! value of every element of `favorite`.
//!
//! Resolution is total. A missing key, a lookup against something that is not
//! a record, a wildcard over something that is not a sequence, or a `null`
//! leaf all yield "absent" rather than an error.

use std::fmt;

use crate::value::{Record, Value};

/// One segment of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Record key lookup.
    Key(String),
    /// `*`: iterate the sequence at this position.
    Wildcard,
}

/// A parsed dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Splits `text` on `.` into segments. Never fails.
    pub fn parse(text: &str) -> Self {
        let segments = text
            .split('.')
            .map(|part| {
                if part == "*" {
                    Segment::Wildcard
                } else {
                    Segment::Key(part.to_string())
                }
            })
            .collect();
        Path {
            raw: text.to_string(),
            segments,
        }
    }

    /// The path text as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if any segment is `*`.
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Wildcard))
    }

    /// Resolves this path against a record.
    pub fn resolve<'a>(&self, record: &'a Record) -> Option<Resolved<'a>> {
        resolve(record, self)
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Outcome of resolving a path that did not come up absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// Wildcard-free path: exactly one value.
    One(&'a Value),
    /// Path with a wildcard: one entry per element that resolved, absent
    /// elements dropped. May be empty.
    Many(Vec<&'a Value>),
}

impl<'a> Resolved<'a> {
    /// Iterates the resolved values.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + '_ {
        let (one, many) = match self {
            Resolved::One(v) => (Some(*v), &[][..]),
            Resolved::Many(items) => (None, items.as_slice()),
        };
        one.into_iter().chain(many.iter().copied())
    }

    /// Owned form: a single value, or a sequence for wildcard results.
    pub fn to_value(&self) -> Value {
        match self {
            Resolved::One(v) => (*v).clone(),
            Resolved::Many(items) => Value::Sequence(items.iter().map(|v| (*v).clone()).collect()),
        }
    }
}

/// Resolves `path` against `record`, returning `None` when it is absent.
///
/// A leading `*` never resolves: the record itself is a mapping, not a
/// sequence. Several `*` segments fan out independently and their results are
/// flattened into a single [`Resolved::Many`].
pub fn resolve<'a>(record: &'a Record, path: &Path) -> Option<Resolved<'a>> {
    let (first, rest) = path.segments.split_first()?;
    let Segment::Key(key) = first else {
        return None;
    };
    descend(record.get(key)?, rest)
}

fn descend<'a>(start: &'a Value, segments: &[Segment]) -> Option<Resolved<'a>> {
    let mut current = start;
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Key(key) => current = current.as_record()?.get(key)?,
            Segment::Wildcard => {
                let rest = &segments[i + 1..];
                let mut out = Vec::new();
                for item in current.as_sequence()? {
                    match descend(item, rest) {
                        Some(Resolved::One(v)) => out.push(v),
                        Some(Resolved::Many(vs)) => out.extend(vs),
                        None => {}
                    }
                }
                return Some(Resolved::Many(out));
            }
        }
    }
    if current.is_null() {
        None
    } else {
        Some(Resolved::One(current))
    }
}
