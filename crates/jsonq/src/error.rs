//! Error types for the jsonq crate.

use thiserror::Error;

/// Errors raised for malformed control input.
///
/// Data-shape problems (missing fields, type mismatches, values an operator
/// cannot handle) are never errors: the affected record simply does not match.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The condition text could not be compiled.
    #[error("invalid condition '{condition}': {reason}")]
    InvalidCondition { condition: String, reason: String },

    /// `chunk` was called with a size of zero.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// `paginate` was called with a page size of zero.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Input data contained an element that is not a JSON object.
    #[error("element {position} is not a record (expected a JSON object)")]
    NotARecord { position: usize },

    /// Input data was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryError {
    pub(crate) fn invalid_condition(condition: &str, reason: impl Into<String>) -> Self {
        QueryError::InvalidCondition {
            condition: condition.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for jsonq operations.
pub type Result<T> = std::result::Result<T, QueryError>;
