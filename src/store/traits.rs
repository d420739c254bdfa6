//! `KeyValueStore` trait — the single async persistence seam.
//!
//! Every state container in the crate sits on top of one shared store and
//! owns a disjoint set of keys (see [`keys`](super::keys)).

use async_trait::async_trait;

use crate::error::StorageError;

/// Async, fallible, string-keyed store treated as ground truth across restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or overwrite) a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove several keys. Best-effort: every key is attempted and the first
    /// failure is reported afterwards. There is no rollback.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Outcome of a persistence write issued by a state container.
///
/// Writes are fire-and-forget from the UI's point of view; the in-memory
/// effect applies either way. The outcome is returned so callers and tests
/// can observe failures instead of losing them.
#[must_use = "persist outcomes should be inspected or explicitly discarded"]
#[derive(Debug, Clone)]
pub enum PersistOutcome {
    /// The write reached the store.
    Written,
    /// The store rejected the write. Already logged.
    Failed(StorageError),
}

impl PersistOutcome {
    /// Convert a store result, logging failures under `op`.
    pub fn from_result(op: &str, result: Result<(), StorageError>) -> Self {
        match result {
            Ok(()) => Self::Written,
            Err(e) => {
                tracing::warn!(op, error = %e, "Persistence write failed, continuing");
                Self::Failed(e)
            }
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }

    pub fn error(&self) -> Option<&StorageError> {
        match self {
            Self::Written => None,
            Self::Failed(e) => Some(e),
        }
    }
}

