//! Per-field secondary index over a root view's records.
//!
//! Each indexed field keeps an exact-match map (scalar value -> positions) and
//! a sorted `(value, position)` list for range lookups. Fields are indexed
//! lazily on first use, exactly once even when several threads ask at the
//! same time.
//!
//! Lookups reproduce the scan semantics exactly: the operand is coerced once
//! per kind of value present in the field, with a reference value of that
//! kind, and only keys of the same kind are probed.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::coerce::coerce;
use crate::condition::{Condition, Operand};
use crate::op::Op;
use crate::path::{Path, Resolved};
use crate::value::{Record, Value};

/// Float wrapper with a total order. NaN never gets here and `-0.0` is folded
/// into `0.0`.
#[derive(Debug, Clone, Copy)]
struct FloatKey(f64);

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatKey {}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Indexable scalar. Ordered by kind first, then by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum ScalarKey {
    Bool(bool),
    Int(i64),
    Float(FloatKey),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum KeyKind {
    Bool,
    Int,
    Float,
    Text,
}

impl KeyKind {
    fn reference(self) -> Value {
        match self {
            KeyKind::Bool => Value::Bool(false),
            KeyKind::Int => Value::Int(0),
            KeyKind::Float => Value::Float(0.0),
            KeyKind::Text => Value::Text(String::new()),
        }
    }
}

impl ScalarKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(ScalarKey::Bool(*b)),
            Value::Int(n) => Some(ScalarKey::Int(*n)),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) if *f == 0.0 => Some(ScalarKey::Float(FloatKey(0.0))),
            Value::Float(f) => Some(ScalarKey::Float(FloatKey(*f))),
            Value::Text(s) => Some(ScalarKey::Text(s.clone())),
            _ => None,
        }
    }

    fn kind(&self) -> KeyKind {
        match self {
            ScalarKey::Bool(_) => KeyKind::Bool,
            ScalarKey::Int(_) => KeyKind::Int,
            ScalarKey::Float(_) => KeyKind::Float,
            ScalarKey::Text(_) => KeyKind::Text,
        }
    }

    /// Coerces `literal` against `kind`, keeping the result only if it stays
    /// in that kind.
    fn coerced(literal: &str, kind: KeyKind) -> Option<Self> {
        ScalarKey::from_value(&coerce(literal, &kind.reference())).filter(|k| k.kind() == kind)
    }
}

/// Index of one field.
#[derive(Debug, Default)]
pub struct FieldIndex {
    exact: HashMap<ScalarKey, Vec<usize>>,
    sorted: Vec<(ScalarKey, usize)>,
    kinds: Vec<KeyKind>,
}

impl FieldIndex {
    /// Indexes the scalar value of `path` in every record.
    ///
    /// Absent, null, nested and NaN values are left out: no indexable
    /// condition can match them.
    pub fn build(records: &[Arc<Record>], path: &Path) -> Self {
        let mut index = FieldIndex::default();
        for (pos, record) in records.iter().enumerate() {
            let Some(Resolved::One(value)) = path.resolve(record) else {
                continue;
            };
            if let Some(key) = ScalarKey::from_value(value) {
                index.exact.entry(key.clone()).or_default().push(pos);
                index.sorted.push((key, pos));
            }
        }
        index.sorted.sort();
        index.kinds = index.sorted.iter().map(|(k, _)| k.kind()).collect();
        index.kinds.dedup();
        index
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Positions matching `condition`, ascending.
    ///
    /// Returns `None` when the operator cannot be answered from the index.
    pub fn lookup(&self, condition: &Condition) -> Option<Vec<usize>> {
        let mut out = Vec::new();
        match (condition.op(), condition.operand()) {
            (Op::Eq, Operand::Scalar(lit)) => {
                for &kind in &self.kinds {
                    let hits = ScalarKey::coerced(lit, kind).and_then(|k| self.exact.get(&k));
                    if let Some(hits) = hits {
                        out.extend_from_slice(hits);
                    }
                }
            }
            (op @ (Op::Gt | Op::Gte | Op::Lt | Op::Lte), Operand::Scalar(lit)) => {
                for &kind in &self.kinds {
                    if let Some(key) = ScalarKey::coerced(lit, kind) {
                        let slot = self.kind_range(kind);
                        let range = match op {
                            Op::Gt => self.upper_bound(slot.clone(), &key)..slot.end,
                            Op::Gte => self.lower_bound(slot.clone(), &key)..slot.end,
                            Op::Lt => slot.start..self.lower_bound(slot.clone(), &key),
                            _ => slot.start..self.upper_bound(slot.clone(), &key),
                        };
                        out.extend(self.sorted[range].iter().map(|(_, pos)| *pos));
                    }
                }
            }
            (Op::Between, Operand::Range { low, high }) => {
                for &kind in &self.kinds {
                    let (Some(lo), Some(hi)) =
                        (ScalarKey::coerced(low, kind), ScalarKey::coerced(high, kind))
                    else {
                        continue;
                    };
                    let slot = self.kind_range(kind);
                    let start = self.lower_bound(slot.clone(), &lo);
                    let end = self.upper_bound(slot, &hi);
                    if start < end {
                        out.extend(self.sorted[start..end].iter().map(|(_, pos)| *pos));
                    }
                }
            }
            _ => return None,
        }
        out.sort_unstable();
        Some(out)
    }

    fn kind_range(&self, kind: KeyKind) -> Range<usize> {
        let start = self.sorted.partition_point(|(k, _)| k.kind() < kind);
        let end = self.sorted.partition_point(|(k, _)| k.kind() <= kind);
        start..end
    }

    /// First position in `slot` whose key is `>= key`.
    fn lower_bound(&self, slot: Range<usize>, key: &ScalarKey) -> usize {
        slot.start + self.sorted[slot].partition_point(|(k, _)| k < key)
    }

    /// First position in `slot` whose key is `> key`.
    fn upper_bound(&self, slot: Range<usize>, key: &ScalarKey) -> usize {
        slot.start + self.sorted[slot].partition_point(|(k, _)| k <= key)
    }
}

/// Snapshot of an [`EqualityIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Paths indexed so far, sorted.
    pub indexed_fields: Vec<String>,
    /// Number of field builds performed. Never exceeds the number of
    /// indexed fields.
    pub builds: usize,
}

/// Lazily built per-field indexes for one record sequence.
#[derive(Debug)]
pub struct EqualityIndex {
    records: Arc<[Arc<Record>]>,
    fields: DashMap<String, Arc<OnceCell<Arc<FieldIndex>>>>,
    builds: AtomicUsize,
}

impl EqualityIndex {
    pub fn new(records: Arc<[Arc<Record>]>) -> Self {
        Self {
            records,
            fields: DashMap::new(),
            builds: AtomicUsize::new(0),
        }
    }

    /// The index for `path`, building it on first use.
    pub fn field(&self, path: &Path) -> Arc<FieldIndex> {
        // Clone the cell out so the map shard is not locked during the build.
        let cell = self
            .fields
            .entry(path.as_str().to_string())
            .or_default()
            .value()
            .clone();
        let index = cell.get_or_init(|| {
            self.builds.fetch_add(1, AtomicOrdering::Relaxed);
            let index = FieldIndex::build(&self.records, path);
            debug!(field = %path, entries = index.len(), "built field index");
            Arc::new(index)
        });
        Arc::clone(index)
    }

    /// Positions matching `condition`, or `None` if the index cannot answer it.
    pub fn lookup(&self, condition: &Condition) -> Option<Vec<usize>> {
        if !condition.is_indexable() {
            return None;
        }
        self.field(condition.path()).lookup(condition)
    }

    pub fn stats(&self) -> IndexStats {
        let mut indexed_fields: Vec<String> = self
            .fields
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .map(|entry| entry.key().clone())
            .collect();
        indexed_fields.sort();
        IndexStats {
            indexed_fields,
            builds: self.builds.load(AtomicOrdering::Relaxed),
        }
    }
}
