//! Condition and result caches.
//!
//! Both caches are concurrent maps, so a [`View`](crate::View) can be queried
//! from several threads at once.
//!
//! - [`ConditionCache`] memoizes compiled conditions by exact text. A
//!   process-wide instance backs every view unless one is given its own.
//! - [`ResultCache`] memoizes filter results by (condition text, dataset
//!   fingerprint). One instance is shared by a root view and every view
//!   derived from it.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use seahash::SeaHasher;

use crate::condition::Condition;
use crate::error::Result;
use crate::parser::parse;
use crate::value::{Record, Value};

static GLOBAL_CONDITIONS: Lazy<Arc<ConditionCache>> =
    Lazy::new(|| Arc::new(ConditionCache::new()));

/// Thread-safe cache of compiled conditions, keyed by condition text.
///
/// Entries are never evicted; the cache grows with the number of distinct
/// condition texts until [`clear`](Self::clear) is called.
#[derive(Debug, Default)]
pub struct ConditionCache {
    entries: DashMap<String, Arc<Condition>>,
}

impl ConditionCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide cache.
    pub fn global() -> Arc<ConditionCache> {
        Arc::clone(&GLOBAL_CONDITIONS)
    }

    /// Returns the compiled condition for `text`, compiling it on first use.
    ///
    /// Compile errors are returned and not cached.
    pub fn compile(&self, text: &str) -> Result<Arc<Condition>> {
        if let Some(hit) = self.entries.get(text) {
            return Ok(hit.value().clone());
        }

        let compiled = Arc::new(parse(text)?);
        // A racing thread may have inserted first; keep whichever landed.
        let entry = self.entries.entry(text.to_string()).or_insert(compiled);
        Ok(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached condition.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Filtered record list stored in the result cache.
pub type CachedRecords = Arc<[Arc<Record>]>;

/// Thread-safe cache of filter results.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<(String, u64), CachedRecords>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, condition: &str, fingerprint: u64) -> Option<CachedRecords> {
        self.entries
            .get(&(condition.to_string(), fingerprint))
            .map(|hit| hit.value().clone())
    }

    pub fn insert(&self, condition: &str, fingerprint: u64, records: CachedRecords) {
        self.entries
            .insert((condition.to_string(), fingerprint), records);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Content hash of a record sequence.
///
/// Equal sequences (same records, same order) always share a fingerprint.
/// Floats are hashed by their exact bits, so `-0.0` and `0.0` differ here
/// even though they compare equal as values: the string operators can tell
/// them apart.
pub fn fingerprint(records: &[Arc<Record>]) -> u64 {
    let mut hasher = SeaHasher::new();
    records.len().hash(&mut hasher);
    for record in records {
        hash_record(record, &mut hasher);
    }
    hasher.finish()
}

fn hash_record<H: Hasher>(record: &Record, state: &mut H) {
    record.len().hash(state);
    for (key, value) in record {
        key.hash(state);
        hash_exact(value, state);
    }
}

fn hash_exact<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Float(f) => f.to_bits().hash(state),
        Value::Sequence(items) => {
            items.len().hash(state);
            for item in items {
                hash_exact(item, state);
            }
        }
        Value::Record(record) => hash_record(record, state),
        other => other.hash(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn record(pairs: &[(&str, Value)]) -> Arc<Record> {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn condition_cache_reuses_compiled_conditions() {
        let cache = ConditionCache::new();
        assert!(cache.is_empty());

        let a = cache.compile("age > 30").unwrap();
        let b = cache.compile("age > 30").unwrap();
        let c = cache.compile("age > 31").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn condition_cache_keeps_exact_text() {
        let cache = ConditionCache::new();
        cache.compile("age > 30").unwrap();
        cache.compile("age>30").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn compile_errors_are_not_cached() {
        let cache = ConditionCache::new();
        assert!(cache.compile("age").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn global_cache_is_shared() {
        let a = ConditionCache::global();
        let b = ConditionCache::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn result_cache_round_trip() {
        let cache = ResultCache::new();
        let records: CachedRecords = vec![record(&[("a", Value::Int(1))])].into();

        assert!(cache.get("a == 1", 7).is_none());
        cache.insert("a == 1", 7, Arc::clone(&records));

        assert!(Arc::ptr_eq(&cache.get("a == 1", 7).unwrap(), &records));
        assert!(cache.get("a == 1", 8).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn fingerprint_depends_on_content_and_order() {
        let a = record(&[("a", Value::Int(1))]);
        let b = record(&[("a", Value::Int(2))]);

        let ab = fingerprint(&[Arc::clone(&a), Arc::clone(&b)]);
        assert_eq!(ab, fingerprint(&[record(&[("a", Value::Int(1))]), Arc::clone(&b)]));
        assert_ne!(ab, fingerprint(&[Arc::clone(&b), Arc::clone(&a)]));
        assert_ne!(ab, fingerprint(&[a]));
    }

    #[test]
    fn fingerprint_separates_signed_zeros() {
        let neg = record(&[("a", Value::Float(-0.0))]);
        let pos = record(&[("a", Value::Float(0.0))]);
        assert_eq!(neg, pos);
        assert_ne!(fingerprint(&[neg]), fingerprint(&[pos]));

        let nested = |f: f64| record(&[("a", Value::Sequence(vec![Value::Float(f)]))]);
        assert_ne!(fingerprint(&[nested(-0.0)]), fingerprint(&[nested(0.0)]));
    }
}
