//! Error types for the migration engine.

use std::time::Duration;

use thiserror::Error;

use crate::report::ItemStatus;

/// Fatal errors that abort an invocation before any store is contacted.
#[derive(Debug, Error)]
pub enum Error {
    /// The mapping document is structurally invalid.
    #[error("malformed mapping{}: {reason}", row_suffix(.row))]
    MalformedMapping {
        /// Zero-based row within the `secrets` list, when the problem is row-specific.
        row: Option<usize>,
        /// Description of the problem.
        reason: String,
    },

    /// IO error while reading the mapping.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedMapping {
            row: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_row(row: usize, reason: impl Into<String>) -> Self {
        Error::MalformedMapping {
            row: Some(row),
            reason: reason.into(),
        }
    }
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" (row {})", row),
        None => String::new(),
    }
}

/// Errors reported by a source or destination store.
///
/// All of these are transient from the point of view of a run: re-running
/// the migration is the retry mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store rejected the call due to rate limiting.
    #[error("throttled: {0}")]
    Throttled(String),

    /// Credentials are missing, expired, or lack permission.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The store rejected the request (e.g. malformed name).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The store could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Any other service-side error.
    #[error("service error: {0}")]
    Service(String),
}

/// Store operation an item error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading the source parameter.
    Resolve,
    /// Creating or updating the destination secret.
    Write,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Resolve => write!(f, "resolve"),
            Operation::Write => write!(f, "write"),
        }
    }
}

/// Per-item failures. These never propagate out of a run; the driver turns
/// them into report entries.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The source store has no value for the key.
    #[error("parameter not found: {key}")]
    NotFound {
        /// The missing source key.
        key: String,
    },

    /// The store failed the call.
    #[error("{operation} failed: {source}")]
    Transient {
        /// Which call failed.
        operation: Operation,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The call did not complete within the configured timeout.
    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        /// Which call timed out.
        operation: Operation,
        /// The configured per-call timeout.
        after: Duration,
    },
}

impl ItemError {
    /// Report status for this failure.
    pub fn status(&self) -> ItemStatus {
        match self {
            ItemError::NotFound { .. } => ItemStatus::NotFound,
            ItemError::Transient { .. } | ItemError::Timeout { .. } => ItemStatus::TransientError,
        }
    }

    /// Whether re-running the job may succeed without changing the mapping.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ItemError::NotFound { .. })
    }
}

/// Result type for fallible engine operations.
pub type Result<T> = std::result::Result<T, Error>;
