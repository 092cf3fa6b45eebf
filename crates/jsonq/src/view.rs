//! Views: immutable handles over record sequences.
//!
//! A [`View`] is where queries run. Every chainable operation returns a new
//! view over a subsequence (or permutation) of the records; the records
//! themselves are shared and never copied or mutated. Terminal operations
//! return plain values.
//!
//! Filtering goes through three layers:
//!
//! 1. the lineage's result cache, keyed by condition text and the view's
//!    content fingerprint,
//! 2. the condition cache, which compiles each distinct text once,
//! 3. the evaluation strategy: an index lookup when the view carries an
//!    index and the condition is indexable, a linear scan otherwise.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::aggregate::{self, Stats};
use crate::cache::{self, ConditionCache, ResultCache};
use crate::condition::Condition;
use crate::config::EngineConfig;
use crate::error::{QueryError, Result};
use crate::index::{EqualityIndex, IndexStats};
use crate::ordering::{sort_permutation, Dir};
use crate::page::Page;
use crate::path::{Path, Segment};
use crate::value::{Number, Record, Value};

type Records = Arc<[Arc<Record>]>;

/// An immutable, cheaply clonable handle over a sequence of records.
///
/// # Example
///
/// ```
/// use jsonq::View;
/// use serde_json::json;
///
/// let view = View::from_json(json!([
///     {"name": "Thor", "age": 1500, "family": "Avengers"},
///     {"name": "Eleven", "age": 14, "family": "StrangerThings"},
///     {"name": "Ironman", "age": 45, "family": "Avengers"},
/// ]))
/// .unwrap();
///
/// let avengers = view.filter("family == Avengers").unwrap();
/// assert_eq!(avengers.len(), 2);
/// assert_eq!(avengers.filter("age < 100").unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct View {
    records: Records,
    config: EngineConfig,
    conditions: Arc<ConditionCache>,
    results: Arc<ResultCache>,
    index: Option<Arc<EqualityIndex>>,
    fingerprint: Arc<OnceCell<u64>>,
}

/// Parses a JSON array of objects into records.
///
/// Fails with [`QueryError::NotARecord`] if the value is not an array, or if
/// any element is not an object.
pub fn records_from_json(json: serde_json::Value) -> Result<Vec<Record>> {
    let serde_json::Value::Array(items) = json else {
        return Err(QueryError::NotARecord { position: 0 });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| match Value::from(item) {
            Value::Record(record) => Ok(record),
            _ => Err(QueryError::NotARecord { position }),
        })
        .collect()
}

impl View {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Creates a root view with the default configuration.
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self::with_config(records, EngineConfig::default())
    }

    /// Creates a root view.
    ///
    /// The view carries an equality index when the configuration enables
    /// indexing and the sequence is longer than the index threshold. Fields
    /// are indexed lazily on first use.
    pub fn with_config(records: impl IntoIterator<Item = Record>, config: EngineConfig) -> Self {
        let records: Records = records.into_iter().map(Arc::new).collect();
        let index = config
            .wants_index(records.len())
            .then(|| Arc::new(EqualityIndex::new(Arc::clone(&records))));
        View {
            records,
            config,
            conditions: ConditionCache::global(),
            results: Arc::new(ResultCache::new()),
            index,
            fingerprint: Arc::new(OnceCell::new()),
        }
    }

    /// Creates a root view from a JSON array of objects.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Ok(Self::new(records_from_json(json)?))
    }

    /// Creates a root view from JSON text holding an array of objects.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// Uses `cache` instead of the process-wide condition cache, for this
    /// view and everything derived from it.
    pub fn with_condition_cache(mut self, cache: Arc<ConditionCache>) -> Self {
        self.conditions = cache;
        self
    }

    /// An empty view sharing this view's caches and configuration.
    pub fn empty_like(&self) -> View {
        self.derive_from(std::iter::empty())
    }

    fn derive(&self, records: Records) -> View {
        View {
            records,
            config: self.config,
            conditions: Arc::clone(&self.conditions),
            results: Arc::clone(&self.results),
            index: None,
            fingerprint: Arc::new(OnceCell::new()),
        }
    }

    fn derive_from(&self, records: impl IntoIterator<Item = Arc<Record>>) -> View {
        self.derive(records.into_iter().collect())
    }

    // ========================================================================
    // Access
    // ========================================================================

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position).map(|r| r.as_ref())
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first().map(|r| r.as_ref())
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last().map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().map(|r| r.as_ref())
    }

    /// The shared record handles, in view order.
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    /// Owned copies of the records.
    pub fn to_vec(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }

    /// The records as a JSON array.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.iter()
                .map(|r| serde_json::Value::from(Value::Record(r.clone())))
                .collect(),
        )
    }

    /// The first `n` records.
    pub fn limit(&self, n: usize) -> View {
        self.derive_from(self.records.iter().take(n).cloned())
    }

    /// Resolved values of `field`, one per record where it is present.
    ///
    /// Wildcard paths contribute one sequence per record.
    pub fn values(&self, field: &str) -> Vec<Value> {
        let path = Path::parse(field);
        self.records
            .iter()
            .filter_map(|r| path.resolve(r))
            .map(|resolved| resolved.to_value())
            .collect()
    }

    /// Index statistics, for root views that carry an index.
    pub fn index_stats(&self) -> Option<IndexStats> {
        self.index.as_ref().map(|index| index.stats())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Content hash of this view's records, computed once.
    pub fn fingerprint(&self) -> u64 {
        *self
            .fingerprint
            .get_or_init(|| cache::fingerprint(&self.records))
    }

    // ========================================================================
    // Filtering
    // ========================================================================

    /// Keeps the records matching `condition`, in their original order.
    ///
    /// Records where the path is absent or the value has the wrong type
    /// simply do not match. The only error is a condition that does not
    /// compile; use `unwrap_or_else(|_| view.empty_like())` to treat that as
    /// an empty result.
    pub fn filter(&self, condition: &str) -> Result<View> {
        let cacheable = self.config.wants_result_cache(self.len());
        if cacheable {
            if let Some(hit) = self.results.get(condition, self.fingerprint()) {
                debug!(condition, matched = hit.len(), "result cache hit");
                return Ok(self.derive(hit));
            }
        }

        let compiled = self.conditions.compile(condition)?;
        let matched = self.evaluate(&compiled);

        if cacheable {
            self.results
                .insert(condition, self.fingerprint(), Arc::clone(&matched));
            debug!(condition, matched = matched.len(), "result cache store");
        }
        Ok(self.derive(matched))
    }

    fn evaluate(&self, condition: &Condition) -> Records {
        if let Some(index) = &self.index {
            if let Some(positions) = index.lookup(condition) {
                debug!(condition = %condition, strategy = "index", "evaluating condition");
                return positions
                    .into_iter()
                    .map(|pos| Arc::clone(&self.records[pos]))
                    .collect();
            }
        }
        debug!(condition = %condition, strategy = "scan", "evaluating condition");
        self.records
            .iter()
            .filter(|r| condition.matches(r))
            .cloned()
            .collect()
    }

    /// Keeps the records for which `predicate` returns `true`.
    pub fn filter_with<F>(&self, predicate: F) -> View
    where
        F: Fn(&Record) -> bool,
    {
        self.derive_from(self.records.iter().filter(|r| predicate(r.as_ref())).cloned())
    }

    /// Keeps the records where `field` resolves to a value.
    ///
    /// `null` counts as absent. A wildcard path over a sequence resolves,
    /// even when the sequence is empty, matching what [`View::values`]
    /// reports for it.
    pub fn exists(&self, field: &str) -> View {
        let path = Path::parse(field);
        self.filter_with(|r| path.resolve(r).is_some())
    }

    /// Keeps the records where `field` does not resolve.
    pub fn missing(&self, field: &str) -> View {
        let path = Path::parse(field);
        self.filter_with(|r| path.resolve(r).is_none())
    }

    /// Drops records equal to an earlier one.
    pub fn distinct_records(&self) -> View {
        let mut seen: HashSet<&Record> = HashSet::new();
        self.derive_from(
            self.records
                .iter()
                .filter(|r| seen.insert(&***r))
                .cloned(),
        )
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Replaces every record with `f(record)`.
    pub fn map<F>(&self, f: F) -> View
    where
        F: Fn(&Record) -> Record,
    {
        self.derive_from(self.records.iter().map(|r| Arc::new(f(r))))
    }

    /// Stable sort on the resolved value of `field`.
    ///
    /// Absent values sort as the empty string. If the keys cannot all be
    /// compared with each other (numbers mixed with text, nested values),
    /// the original order is kept.
    pub fn sort_by(&self, field: &str, dir: Dir) -> View {
        let path = Path::parse(field);
        let keys: Vec<Value> = self
            .records
            .iter()
            .map(|r| {
                path.resolve(r)
                    .map(|v| v.to_value())
                    .unwrap_or_else(|| Value::Text(String::new()))
            })
            .collect();

        match sort_permutation(&keys, dir) {
            Some(order) => self.derive_from(order.into_iter().map(|i| Arc::clone(&self.records[i]))),
            None => {
                debug!(field, "sort keys not comparable, keeping original order");
                self.derive(Arc::clone(&self.records))
            }
        }
    }

    /// Picks each record's listed paths into a new record.
    ///
    /// Dotted paths come out nested: `name.first` becomes
    /// `{"name": {"first": ...}}`. Wildcard segments are dropped from the
    /// output shape and the collected values stored as a sequence:
    /// `favorite.*.food` becomes `{"favorite": {"food": [...]}}`. Absent
    /// paths are omitted.
    pub fn project(&self, fields: &[&str]) -> Vec<Record> {
        let paths: Vec<Path> = fields.iter().map(|f| Path::parse(f)).collect();
        self.records
            .iter()
            .map(|record| {
                let mut out = Record::new();
                for path in &paths {
                    if let Some(resolved) = path.resolve(record) {
                        insert_nested(&mut out, path, resolved.to_value());
                    }
                }
                out
            })
            .collect()
    }

    /// Partitions the records by the resolved value of `field`.
    ///
    /// Groups appear in first-occurrence order. Records where the field is
    /// absent are grouped under [`Value::Null`].
    pub fn group_by(&self, field: &str) -> IndexMap<Value, View> {
        let path = Path::parse(field);
        let mut groups: IndexMap<Value, Vec<Arc<Record>>> = IndexMap::new();
        for record in self.records.iter() {
            let key = path
                .resolve(record)
                .map(|v| v.to_value())
                .unwrap_or(Value::Null);
            groups.entry(key).or_default().push(Arc::clone(record));
        }
        groups
            .into_iter()
            .map(|(key, records)| (key, self.derive_from(records)))
            .collect()
    }

    /// Splits into consecutive views of `size` records; the last may be
    /// shorter.
    pub fn chunk(&self, size: usize) -> Result<Vec<View>> {
        if size == 0 {
            return Err(QueryError::InvalidChunkSize);
        }
        Ok(self
            .records
            .chunks(size)
            .map(|chunk| self.derive_from(chunk.iter().cloned()))
            .collect())
    }

    /// Deterministic pseudo-random selection of `min(n, len)` records.
    ///
    /// Runs a partial Fisher-Yates shuffle over record positions with a
    /// generator seeded by `seed`; records come out in selection order. The
    /// same seed over the same view always selects the same records.
    pub fn sample(&self, n: usize, seed: u64) -> View {
        let len = self.len();
        let take = n.min(len);
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut positions: Vec<usize> = (0..len).collect();
        for i in 0..take {
            let j = rng.usize(i..len);
            positions.swap(i, j);
        }
        self.derive_from(
            positions[..take]
                .iter()
                .map(|&i| Arc::clone(&self.records[i])),
        )
    }

    /// One page of records, 1-indexed.
    pub fn paginate(&self, page: usize, per_page: usize) -> Result<Page> {
        Page::slice(&self.records, page, per_page)
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Distinct resolved values of `field`, in first-occurrence order.
    pub fn distinct_values(&self, field: &str) -> Vec<Value> {
        self.values(field)
            .into_iter()
            .collect::<IndexSet<Value>>()
            .into_iter()
            .collect()
    }

    /// Occurrences of each resolved value of `field`. Absent fields are not
    /// counted.
    pub fn value_counts(&self, field: &str) -> IndexMap<Value, usize> {
        let mut counts = IndexMap::new();
        for value in self.values(field) {
            *counts.entry(value).or_insert(0) += 1;
        }
        counts
    }

    /// Maps the resolved `key_field` to the resolved `value_field`, or to the
    /// whole record when no value field is given.
    ///
    /// Records without a key are skipped; an absent value maps to
    /// [`Value::Null`]; a later duplicate key overwrites the earlier value.
    pub fn to_association(&self, key_field: &str, value_field: Option<&str>) -> IndexMap<Value, Value> {
        let key_path = Path::parse(key_field);
        let value_path = value_field.map(Path::parse);
        let mut out = IndexMap::new();
        for record in self.records.iter() {
            let Some(key) = key_path.resolve(record) else {
                continue;
            };
            let value = match &value_path {
                Some(path) => path
                    .resolve(record)
                    .map(|v| v.to_value())
                    .unwrap_or(Value::Null),
                None => Value::Record(record.as_ref().clone()),
            };
            out.insert(key.to_value(), value);
        }
        out
    }

    fn numbers(&self, field: &str) -> Vec<Number> {
        aggregate::numbers(&self.records, &Path::parse(field))
    }

    /// Sum of the numeric values of `field`; `0` when there are none.
    pub fn sum(&self, field: &str) -> Number {
        aggregate::sum(&self.numbers(field))
    }

    /// Mean of the numeric values of `field`; `0.0` when there are none.
    pub fn avg(&self, field: &str) -> f64 {
        aggregate::avg(&self.numbers(field))
    }

    pub fn min(&self, field: &str) -> Option<Number> {
        aggregate::min(&self.numbers(field))
    }

    pub fn max(&self, field: &str) -> Option<Number> {
        aggregate::max(&self.numbers(field))
    }

    pub fn stats(&self, field: &str) -> Stats {
        Stats::from_numbers(&self.numbers(field))
    }

    // ========================================================================
    // Cache control
    // ========================================================================

    /// Empties the lineage's result cache and this view's condition cache.
    pub fn clear_cache(&self) {
        self.results.clear();
        self.conditions.clear();
    }

    /// Number of results cached for this lineage.
    pub fn cached_results(&self) -> usize {
        self.results.len()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("len", &self.len())
            .field("config", &self.config)
            .field("indexed", &self.index.is_some())
            .field("cached_results", &self.results.len())
            .finish()
    }
}

fn insert_nested(out: &mut Record, path: &Path, value: Value) {
    let keys: Vec<&str> = path
        .segments()
        .iter()
        .filter_map(|segment| match segment {
            Segment::Key(key) => Some(key.as_str()),
            Segment::Wildcard => None,
        })
        .collect();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut current = out;
    for key in parents {
        let slot = current
            .entry(key.to_string())
            .or_insert_with(|| Value::Record(Record::new()));
        match slot {
            Value::Record(inner) => current = inner,
            // An earlier path already put a scalar here.
            _ => return,
        }
    }
    current.entry(last.to_string()).or_insert(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(json: serde_json::Value) -> View {
        View::from_json(json).unwrap()
    }

    #[test]
    fn from_json_rejects_non_records() {
        assert!(matches!(
            View::from_json(json!([{"a": 1}, 2])),
            Err(QueryError::NotARecord { position: 1 })
        ));
        assert!(matches!(
            View::from_json(json!({"a": 1})),
            Err(QueryError::NotARecord { position: 0 })
        ));
        assert!(matches!(
            View::from_json_str("[{"),
            Err(QueryError::Json(_))
        ));
    }

    #[test]
    fn small_views_scan_large_views_index() {
        let small = View::new((0..100).map(|i| Record::from([("n".to_string(), Value::Int(i))])));
        assert!(small.index_stats().is_none());

        let large = View::new((0..101).map(|i| Record::from([("n".to_string(), Value::Int(i))])));
        assert_eq!(large.filter("n == 7").unwrap().len(), 1);
        let stats = large.index_stats().unwrap();
        assert_eq!(stats.indexed_fields, vec!["n".to_string()]);
    }

    #[test]
    fn derived_views_do_not_carry_an_index() {
        let config = EngineConfig::default().index_threshold(0);
        let root = View::with_config(
            (0..10).map(|i| Record::from([("n".to_string(), Value::Int(i))])),
            config,
        );
        let derived = root.filter("n > 3").unwrap();
        assert!(root.index_stats().is_some());
        assert!(derived.index_stats().is_none());
        assert_eq!(derived.filter("n == 5").unwrap().len(), 1);
    }

    #[test]
    fn results_are_cached_per_lineage() {
        let cache = Arc::new(ConditionCache::new());
        let root = view(json!([{"a": 1}, {"a": 2}])).with_condition_cache(Arc::clone(&cache));

        let first = root.filter("a == 1").unwrap();
        let second = root.filter("a == 1").unwrap();
        assert_eq!(first.records(), second.records());
        assert_eq!(root.cached_results(), 1);
        assert_eq!(cache.len(), 1);

        // derived views share the lineage cache
        first.filter("a == 1").unwrap();
        assert_eq!(root.cached_results(), 2);

        root.clear_cache();
        assert_eq!(root.cached_results(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn cached_results_stay_within_their_view() {
        let root = View::new([-0.0, 0.0].map(|f| Record::from([("a".to_string(), Value::Float(f))])))
            .with_condition_cache(Arc::new(ConditionCache::new()));
        let neg = root.filter("a startswith -").unwrap();
        let pos = root.filter("a regex ^0").unwrap();
        assert_eq!(neg.len(), 1);
        assert_eq!(pos.len(), 1);
        assert_ne!(neg.fingerprint(), pos.fingerprint());

        assert_eq!(neg.filter("a startswith -").unwrap().len(), 1);
        assert!(pos.filter("a startswith -").unwrap().is_empty());
    }

    #[test]
    fn result_cache_respects_ceiling() {
        let config = EngineConfig::default().result_cache_ceiling(2);
        let root = View::with_config(
            (0..2).map(|i| Record::from([("n".to_string(), Value::Int(i))])),
            config,
        );
        root.filter("n == 1").unwrap();
        assert_eq!(root.cached_results(), 0);
    }

    #[test]
    fn invalid_condition_is_an_error() {
        let v = view(json!([{"a": 1}]));
        assert!(matches!(
            v.filter("a"),
            Err(QueryError::InvalidCondition { .. })
        ));
        assert!(v.filter("a").unwrap_or_else(|_| v.empty_like()).is_empty());
        assert_eq!(v.cached_results(), 0);
    }

    #[test]
    fn project_nests_dotted_paths() {
        let v = view(json!([
            {"name": {"first": "Thor", "last": "Odinson"}, "age": 1500},
            {"name": {"first": "Eleven"}, "favorite": [{"food": "eggos"}, {"food": "pizza"}]}
        ]));
        let projected = v.project(&["name.first", "age", "favorite.*.food"]);
        assert_eq!(
            serde_json::Value::from(Value::Record(projected[0].clone())),
            json!({"name": {"first": "Thor"}, "age": 1500})
        );
        assert_eq!(
            serde_json::Value::from(Value::Record(projected[1].clone())),
            json!({"name": {"first": "Eleven"}, "favorite": {"food": ["eggos", "pizza"]}})
        );
    }

    #[test]
    fn project_keeps_first_shape_on_conflict() {
        let v = view(json!([{"x": [{"y": 1}]}]));
        let projected = v.project(&["x.*", "x.*.y"]);
        assert_eq!(
            serde_json::Value::from(Value::Record(projected[0].clone())),
            json!({"x": [{"y": 1}]})
        );
    }

    #[test]
    fn sort_by_direction_and_absent_keys() {
        let v = view(json!([{"n": "b"}, {"n": "a"}, {"x": 1}, {"n": "c"}]));
        let names = |v: &View| v.values("n");

        let asc = v.sort_by("n", Dir::Asc);
        assert!(asc.first().unwrap().get("n").is_none());
        assert_eq!(names(&asc), vec![Value::from("a"), Value::from("b"), Value::from("c")]);

        let desc = v.sort_by("n", Dir::Desc);
        assert_eq!(names(&desc), vec![Value::from("c"), Value::from("b"), Value::from("a")]);
        assert!(desc.last().unwrap().get("n").is_none());
    }

    #[test]
    fn sort_by_mixed_types_keeps_order() {
        let v = view(json!([{"n": 2}, {"n": "a"}, {"n": 1}]));
        let sorted = v.sort_by("n", Dir::Asc);
        assert_eq!(sorted.records(), v.records());
    }

    #[test]
    fn exists_and_missing() {
        let v = view(json!([{"a": 1}, {"a": null}, {"b": 1}, {"a": []}, {"a": [1]}]));
        assert_eq!(v.exists("a").len(), 3);
        assert_eq!(v.missing("a").len(), 2);
        // `[]` resolves to an empty sequence; `1` is not a sequence
        assert_eq!(v.exists("a.*").len(), 2);
        assert_eq!(v.missing("a.*").len(), 3);
    }

    #[test]
    fn empty_wildcard_result_is_present_everywhere() {
        let v = view(json!([{"tags": []}, {"other": 1}]));
        assert_eq!(v.exists("tags.*").len(), 1);
        assert_eq!(v.missing("tags.*").len(), 1);
        assert_eq!(v.values("tags.*"), vec![Value::Sequence(vec![])]);
        assert_eq!(v.value_counts("tags.*")[&Value::Sequence(vec![])], 1);
        assert_eq!(
            serde_json::Value::from(Value::Record(v.project(&["tags.*"])[0].clone())),
            json!({"tags": []})
        );
    }

    #[test]
    fn distinct_records_keep_first_occurrence() {
        let v = view(json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}, {"a": 2}]));
        let distinct = v.distinct_records();
        assert_eq!(distinct.len(), 2);
        assert_eq!(distinct.get(1).unwrap()["a"], Value::Int(2));
    }

    #[test]
    fn association_and_counts() {
        let v = view(json!([
            {"id": 1, "name": "a"},
            {"id": 2},
            {"id": 1, "name": "c"},
            {"name": "d"}
        ]));
        let by_id = v.to_association("id", Some("name"));
        assert_eq!(by_id.len(), 2);
        assert_eq!(by_id[&Value::Int(1)], Value::from("c"));
        assert_eq!(by_id[&Value::Int(2)], Value::Null);

        let whole = v.to_association("name", None);
        assert_eq!(whole[&Value::from("d")], Value::Record(v.get(3).unwrap().clone()));

        let counts = v.value_counts("id");
        assert_eq!(counts[&Value::Int(1)], 2);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn chunks_and_limits() {
        let v = View::new((0..5).map(|i| Record::from([("n".to_string(), Value::Int(i))])));
        let chunks = v.chunk(2).unwrap();
        assert_eq!(chunks.iter().map(View::len).collect::<Vec<_>>(), vec![2, 2, 1]);
        assert!(matches!(v.chunk(0), Err(QueryError::InvalidChunkSize)));
        assert_eq!(v.limit(3).len(), 3);
        assert_eq!(v.limit(10).len(), 5);
    }

    #[test]
    fn map_and_filter_with() {
        let v = view(json!([{"n": 1}, {"n": 2}]));
        let doubled = v.map(|r| {
            let mut r = r.clone();
            if let Some(Value::Int(n)) = r.get("n").cloned() {
                r.insert("n".to_string(), Value::Int(n * 2));
            }
            r
        });
        assert_eq!(doubled.values("n"), vec![Value::Int(2), Value::Int(4)]);
        assert_eq!(v.filter_with(|r| r.contains_key("n")).len(), 2);
    }

    #[test]
    fn debug_output_is_compact() {
        let v = view(json!([{"n": 1}]));
        let text = format!("{v:?}");
        assert!(text.starts_with("View { len: 1"));
    }

    #[test]
    fn view_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<View>();
    }
}
