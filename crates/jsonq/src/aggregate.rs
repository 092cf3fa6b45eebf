//! Numeric aggregates over resolved field values.
//!
//! Only integers and floats take part. Booleans, text, nested values and
//! absent fields are skipped without error; a wildcard path contributes each
//! numeric element it reaches.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::path::Path;
use crate::value::{Number, Record};

/// Summary statistics of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    /// Number of numeric values seen.
    pub count: usize,
    pub sum: Number,
    /// `0.0` when there are no values.
    pub avg: f64,
    pub min: Option<Number>,
    pub max: Option<Number>,
}

impl Stats {
    pub fn from_numbers(numbers: &[Number]) -> Self {
        Stats {
            count: numbers.len(),
            sum: sum(numbers),
            avg: avg(numbers),
            min: min(numbers),
            max: max(numbers),
        }
    }
}

/// Collects the numeric values `path` resolves to across `records`.
pub fn numbers(records: &[Arc<Record>], path: &Path) -> Vec<Number> {
    records
        .iter()
        .filter_map(|record| path.resolve(record))
        .flat_map(|resolved| resolved.iter().filter_map(|v| v.as_number()).collect::<Vec<_>>())
        .collect()
}

/// Sum of `numbers`, integral while every input is an integer and the
/// running total fits in an `i64`.
pub fn sum(numbers: &[Number]) -> Number {
    let mut total: i64 = 0;
    for (i, n) in numbers.iter().enumerate() {
        let next = match n {
            Number::Int(n) => total.checked_add(*n),
            Number::Float(_) => None,
        };
        match next {
            Some(next) => total = next,
            None => {
                let rest: f64 = numbers[i..].iter().map(|n| n.to_f64()).sum();
                return Number::Float(total as f64 + rest);
            }
        }
    }
    Number::Int(total)
}

/// Arithmetic mean, `0.0` for no values.
pub fn avg(numbers: &[Number]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    sum(numbers).to_f64() / numbers.len() as f64
}

pub fn min(numbers: &[Number]) -> Option<Number> {
    extreme(numbers, Ordering::Less)
}

pub fn max(numbers: &[Number]) -> Option<Number> {
    extreme(numbers, Ordering::Greater)
}

fn extreme(numbers: &[Number], keep: Ordering) -> Option<Number> {
    numbers.iter().copied().reduce(|best, n| {
        if n.compare(best) == Some(keep) {
            n
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;

    fn records(items: serde_json::Value) -> Vec<Arc<Record>> {
        let serde_json::Value::Array(items) = items else {
            panic!("expected array");
        };
        items
            .into_iter()
            .map(|item| match Value::from(item) {
                Value::Record(r) => Arc::new(r),
                other => panic!("not a record: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn numbers_skip_non_numeric() {
        let data = records(json!([
            {"age": 10},
            {"age": "20"},
            {"age": true},
            {"age": 2.5},
            {"name": "x"},
            {"age": null}
        ]));
        assert_eq!(
            numbers(&data, &Path::parse("age")),
            vec![Number::Int(10), Number::Float(2.5)]
        );
    }

    #[test]
    fn numbers_fan_out_over_wildcards() {
        let data = records(json!([
            {"scores": [{"v": 1}, {"v": 2}]},
            {"scores": [{"v": "x"}, {"v": 3}]}
        ]));
        assert_eq!(
            numbers(&data, &Path::parse("scores.*.v")),
            vec![Number::Int(1), Number::Int(2), Number::Int(3)]
        );
    }

    #[test]
    fn sum_stays_integral() {
        assert_eq!(sum(&[Number::Int(1), Number::Int(2)]), Number::Int(3));
        assert_eq!(
            sum(&[Number::Int(1), Number::Float(0.5)]),
            Number::Float(1.5)
        );
        assert_eq!(
            sum(&[Number::Int(i64::MAX), Number::Int(1)]),
            Number::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn avg_min_max() {
        let nums = [
            Number::Int(1500),
            Number::Int(1054),
            Number::Int(1000),
            Number::Int(45),
        ];
        assert_eq!(avg(&nums), 899.75);
        assert_eq!(min(&nums), Some(Number::Int(45)));
        assert_eq!(max(&nums), Some(Number::Int(1500)));
        assert_eq!(max(&[Number::Int(2), Number::Float(2.5)]), Some(Number::Float(2.5)));
    }

    #[test]
    fn empty_defaults() {
        let stats = Stats::from_numbers(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.sum, Number::Int(0));
        assert_eq!(stats.avg, 0.0);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
    }

    #[test]
    fn stats_serialize_as_plain_numbers() {
        let stats = Stats::from_numbers(&[Number::Int(1), Number::Int(3)]);
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            json!({"count": 2, "sum": 4, "avg": 2.0, "min": 1, "max": 3})
        );
    }
}
