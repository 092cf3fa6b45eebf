//! Value ordering and sort direction.
//!
//! Provides [`Dir`] for sort direction and [`compare_values`], the loose
//! ordering shared by condition evaluation, the index and `sort_by`.

use std::cmp::Ordering;

use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compares two values loosely.
///
/// Integers and floats compare numerically across the two variants, text
/// compares by bytes, `false < true`. Every other pairing, and any NaN, is
/// incomparable and yields `None`.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => a.as_number()?.compare(b.as_number()?),
    }
}

/// Loose equality: `compare_values` says `Equal`, or the values are
/// structurally equal nested values.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => !a.is_scalar() && a == b,
    }
}

/// Ordering class of a sort key. Keys of different classes cannot be
/// sorted against each other.
fn sort_class(value: &Value) -> Option<u8> {
    match value {
        Value::Int(_) => Some(0),
        Value::Float(f) if !f.is_nan() => Some(0),
        Value::Text(_) => Some(1),
        Value::Bool(_) => Some(2),
        _ => None,
    }
}

/// Computes a stable sort permutation over `keys`.
///
/// Returns `None` when the keys are not mutually comparable (mixed classes,
/// nested values or NaN); callers then keep the original order.
pub fn sort_permutation(keys: &[Value], dir: Dir) -> Option<Vec<usize>> {
    let mut classes = keys.iter().map(sort_class);
    if let Some(first) = classes.next() {
        let first = first?;
        for class in classes {
            if class? != first {
                return None;
            }
        }
    }

    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| {
        compare_values(&keys[a], &keys[b])
            .map(|o| dir.apply(o))
            .unwrap_or(Ordering::Equal)
    });
    Some(order)
}
