//! Storage error model shared by every repository port.
//!
//! Repository ports report "entity absent" through their return values
//! (`Option` / `bool`), never through this type. A `StorageError` always means
//! the store itself failed.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Opaque store failure, propagated unchanged to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Connectivity problems, pool exhaustion, deadlines.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness, foreign key or check constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The transaction was aborted by the store (serialization failure, deadlock).
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether a caller may reasonably retry (with backoff). The core never retries itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Aborted(_))
    }
}
