//! jsonq - Embeddable query engine for in-memory JSON-shaped records.
//!
//! jsonq filters, reshapes and aggregates a sequence of records (string keys
//! mapped to nested records, sequences or scalars) using short condition
//! strings instead of hand-written traversal code. It provides:
//!
//! - Dotted paths with `*` wildcards: `name.first`, `favorite.*.food`
//! - A small condition language: `age between 30,50`, `Thor in name.first`
//! - Literal coercion driven by the type found in each record
//! - A lazily built per-field index for equality and range conditions
//! - A process-wide condition cache and a per-lineage result cache
//! - Grouping, projection, aggregates, pagination, chunking and sampling
//!
//! # Quick Start
//!
//! ```rust
//! use jsonq::{Dir, Number, View};
//! use serde_json::json;
//!
//! let view = View::from_json(json!([
//!     {"name": {"first": "Thor"}, "age": 1500, "family": "Avengers"},
//!     {"name": {"first": "Loki"}, "age": 1054, "family": "Avengers"},
//!     {"name": {"first": "Eleven"}, "age": 14, "family": "StrangerThings",
//!      "favorite": [{"food": "eggos"}]},
//! ]))
//! .unwrap();
//!
//! let adults = view.filter("age > 18").unwrap();
//! assert_eq!(adults.len(), 2);
//! assert_eq!(adults.sum("age"), Number::Int(2554));
//!
//! let youngest = view.sort_by("age", Dir::Asc);
//! assert_eq!(youngest.first().unwrap()["age"], jsonq::Value::Int(14));
//!
//! let eggo_fans = view.filter("favorite.*.food == eggos").unwrap();
//! assert_eq!(eggo_fans.len(), 1);
//!
//! let families = view.group_by("family");
//! assert_eq!(families.len(), 2);
//! ```
//!
//! # Condition Syntax
//!
//! ```text
//! <path> <op> <operand>      op: == != > >= < <= like regex startswith
//!                                endswith not_in between
//! <operand> in <path>
//! ```
//!
//! | Operator | Matches when |
//! |----------|--------------|
//! | `==`, `!=` | the operand, coerced to the record value's type, is (not) equal |
//! | `>`, `>=`, `<`, `<=` | the coerced operand orders as stated |
//! | `between` | `low <= value <= high`, bounds coerced independently |
//! | `in`, `not_in` | text contains the operand, or a sequence has an equal element |
//! | `like` | case-insensitive substring |
//! | `startswith`, `endswith` | case-sensitive prefix / suffix |
//! | `regex` | the pattern is found in the value's text |
//!
//! A record whose path is absent, `null`, or of a type the operator cannot
//! handle does not match. Only malformed condition text is an error.

mod aggregate;
mod cache;
mod coerce;
mod condition;
mod config;
mod error;
mod index;
mod op;
mod ordering;
mod page;
mod parser;
mod path;
mod value;
mod view;

// Re-export public API
pub use aggregate::Stats;
pub use cache::{fingerprint, CachedRecords, ConditionCache, ResultCache};
pub use coerce::{coerce, strip_quotes};
pub use condition::{Condition, Operand};
pub use config::{
    EngineConfig, DEFAULT_INDEX_THRESHOLD, DEFAULT_RESULT_CACHE_CEILING, ENV_INDEX_THRESHOLD,
    ENV_RESULT_CACHE_CEILING, ENV_USE_INDEX,
};
pub use error::{QueryError, Result};
pub use index::{EqualityIndex, FieldIndex, IndexStats};
pub use op::Op;
pub use ordering::{compare_values, loose_eq, Dir};
pub use page::Page;
pub use parser::parse;
pub use path::{resolve, Path, Resolved, Segment};
pub use value::{Number, Record, Value};
pub use view::{records_from_json, View};
