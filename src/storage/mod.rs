//! Object storage seam for the pipeline.
//!
//! Every stage reads and writes through [`ObjectStore`]. Keys are opaque
//! `/`-separated strings; the stages never assume a particular backend.

pub mod fs_store;
pub mod memory_store;

pub use fs_store::FsObjectStore;
pub use memory_store::MemoryObjectStore;

use crate::utils::constants::DEFAULT_DELETE_BATCH_SIZE;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }
}

/// Result of deleting a single key as part of a bulk delete
#[derive(Debug)]
pub struct DeleteOutcome {
    pub key: String,
    pub result: StoreResult<()>,
}

impl DeleteOutcome {
    pub fn ok(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            result: Ok(()),
        }
    }

    pub fn failed(key: impl Into<String>, error: StoreError) -> Self {
        Self {
            key: key.into(),
            result: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub trait ObjectStore: Send + Sync {
    /// List every key starting with `prefix`, in lexicographic order
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Write an object. Readers never observe a partially written object.
    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Delete a batch of keys, reporting success or failure per key.
    /// Deleting a key that does not exist succeeds.
    fn delete_many(&self, keys: &[String]) -> Vec<DeleteOutcome>;

    /// Largest batch accepted by a single `delete_many` call
    fn max_delete_batch(&self) -> usize {
        DEFAULT_DELETE_BATCH_SIZE
    }
}
