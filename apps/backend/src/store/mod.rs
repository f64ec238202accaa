//! Document store the membership engine reads and writes through.
//!
//! Records are JSON objects addressed by slash paths
//! (`leagues/{id}/clubs/{id}`), each carrying a per-document version that
//! increases on every committed change. Writes go through [`WriteBatch`]:
//! all writes in a batch apply or none do. Batches from different callers are
//! not serialized against each other; version preconditions are how a caller
//! detects that someone else committed in between.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod apply;
pub mod batch;
pub mod memory;
pub mod path;
pub mod query;
pub mod sea;

pub use batch::{FieldOp, Precondition, Write, WriteBatch, WriteKind};
pub use memory::MemoryStore;
pub use path::{CollectionPath, DocPath, FieldPath};
pub use query::{Filter, Query, QueryScope};
pub use sea::SeaStore;

/// Upper bound on writes in a single batch.
pub const MAX_BATCH_WRITES: usize = 500;

pub type Document = Map<String, Value>;

/// A document as read, with the version a later write can be conditioned on.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: DocPath,
    pub version: u64,
    pub data: Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// Multi-document batches commit all-or-nothing
    pub atomic_batches: bool,
    pub max_batch_writes: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("precondition failed on {path}: {detail}")]
    PreconditionFailed { path: String, detail: String },
    #[error("batch of {size} writes exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out")]
    Timeout,
    #[error("corrupt document {path}: {detail}")]
    Corrupt { path: String, detail: String },
}

impl StoreError {
    pub(crate) fn precondition(path: &DocPath, detail: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            path: path.to_string(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    fn capabilities(&self) -> StoreCapabilities;

    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError>;

    /// Apply every write in order, all-or-nothing.
    ///
    /// Writes later in the batch see the effects of earlier ones. An empty
    /// batch is a no-op.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
