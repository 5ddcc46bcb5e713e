use thiserror::Error;

/// Errors raised by the bridge layer.
///
/// Nothing here is retried or recovered internally; every failure carries the
/// original driver diagnostic (where there is one) and propagates to the host.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Native `SQLite` error, used for plumbing inside the sqlite driver.
    /// Re-wrapped into `QueryError`/`CallError` at the executor boundary.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("wrong number of bind values: statement expects {expected}, got {supplied}")]
    BindArity { expected: usize, supplied: usize },

    #[error("cannot convert {actual} to {expected}")]
    TypeMismatch { expected: String, actual: String },

    #[error("query failed: {0}")]
    QueryError(String),

    #[error("call failed: {0}")]
    CallError(String),

    #[error("array index {index} out of bounds")]
    IndexError { index: usize },

    #[error("unsupported argument: {0}")]
    UnsupportedArgument(String),
}

impl BridgeError {
    /// Fold a raw driver error into `QueryError`, preserving the native
    /// message verbatim. Errors already in the bridge taxonomy pass through.
    #[must_use]
    pub(crate) fn into_query_error(self) -> Self {
        match self {
            BridgeError::Sqlite(e) => BridgeError::QueryError(e.to_string()),
            other => other,
        }
    }

    /// Fold a raw driver error into `CallError`, preserving the native
    /// message verbatim. Errors already in the bridge taxonomy pass through.
    #[must_use]
    pub(crate) fn into_call_error(self) -> Self {
        match self {
            BridgeError::Sqlite(e) => BridgeError::CallError(e.to_string()),
            other => other,
        }
    }
}
