//! Structured error types for map/reduce job execution
//!
//! Every failure a job can produce is represented here; nothing is retried
//! or recovered internally, so each variant reaches the caller of `run`
//! (or of pool shutdown) carrying its original cause.

use thiserror::Error;

/// Main error type for map/reduce operations
#[derive(Debug, Error)]
pub enum MapReduceError {
    /// Invalid constructor or submission arguments, raised before any work
    /// is dispatched.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Iterator start offset at or beyond the item count.
    #[error("start index out of range: passed {start}, item count {total}")]
    StartIndexOutOfRange { start: usize, total: usize },

    /// The transport codec failed to encode an argument or decode a
    /// dispatch record.
    #[error("transport codec failed while {context}")]
    Transport {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The map function failed while executing a work item.
    #[error("map task {index} failed: {reason}")]
    MapFailed {
        index: usize,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The reduce function failed.
    #[error("reduce phase failed: {reason}")]
    ReduceFailed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A map task panicked inside the pool.
    #[error("worker task {index} panicked")]
    WorkerPanic { index: usize },

    /// Work was submitted to a pool that has been closed.
    #[error("worker pool is closed to new submissions")]
    PoolClosed,

    /// General error for cases that carry no structured context.
    #[error("{message}")]
    General {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MapReduceError {
    /// Configuration error with the offending field named.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised before any task was dispatched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::StartIndexOutOfRange { .. }
        )
    }
}

/// Result type alias for map/reduce operations
pub type MapReduceResult<T> = Result<T, MapReduceError>;
