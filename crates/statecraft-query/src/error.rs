//! Error types for query cursors.

use crate::Path;
use thiserror::Error;

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while navigating or mutating through a [`Query`](crate::Query).
#[derive(Debug, Error)]
pub enum QueryError {
    /// `at` was called with a negative index.
    #[error("'at' cannot use an index lower than 0 (got {index}) at \"{path}\"")]
    NegativeIndex { path: Path, index: i64 },

    /// `at` was called with an index past the end of the array.
    #[error("'at' cannot use an index greater or equal to the array length. index: {index}, array length: {len} at \"{path}\"")]
    IndexOutOfBounds { path: Path, index: usize, len: usize },

    /// `find` matched nothing and no default value was supplied.
    #[error("'find' did not find a value at \"{path}\" and has no default value defined")]
    NotFound { path: Path },

    /// An operation received an argument of the wrong shape.
    #[error("type mismatch at \"{path}\": expected {expected}, found {found}")]
    TypeMismatch {
        path: Path,
        expected: &'static str,
        found: &'static str,
    },

    /// The write-back position no longer exists in the root value.
    #[error("cannot write back to \"{path}\": parent value is missing")]
    DetachedPath { path: Path },

    /// Free-form failure, typically raised from user callbacks.
    #[error("invalid query operation: {message}")]
    InvalidOperation { message: String },
}

impl QueryError {
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        QueryError::TypeMismatch {
            path,
            expected,
            found,
        }
    }

    #[inline]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        QueryError::InvalidOperation {
            message: message.into(),
        }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
