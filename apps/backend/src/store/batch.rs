use serde_json::Value;

use super::path::{DocPath, FieldPath};
use super::{Document, StoreError, MAX_BATCH_WRITES};

/// Field-level mutation applied by `Upsert` and `Update` writes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Set a field, creating intermediate maps as needed
    Put(FieldPath, Value),
    /// Delete a field; missing fields are ignored
    Remove(FieldPath),
    /// Add to a numeric field; a missing field counts as zero
    Increment(FieldPath, i64),
    /// Append values not already present
    ArrayUnion(FieldPath, Vec<Value>),
    /// Drop every element equal to one of the values
    ArrayRemove(FieldPath, Vec<Value>),
}

impl FieldOp {
    pub fn put(path: FieldPath, value: impl Into<Value>) -> Self {
        Self::Put(path, value.into())
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            FieldOp::Put(p, _)
            | FieldOp::Remove(p)
            | FieldOp::Increment(p, _)
            | FieldOp::ArrayUnion(p, _)
            | FieldOp::ArrayRemove(p, _) => p,
        }
    }
}

/// Condition checked against the document's committed state at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precondition {
    #[default]
    None,
    Exists,
    Missing,
    /// Document exists and is still at this version
    Version(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteKind {
    /// Replace the whole document
    Set(Document),
    /// Apply field ops, creating the document when missing
    Upsert(Vec<FieldOp>),
    /// Apply field ops to an existing document
    Update(Vec<FieldOp>),
    /// Remove the document; absent documents are a no-op
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub path: DocPath,
    pub kind: WriteKind,
    pub precondition: Precondition,
}

impl Write {
    pub fn set(path: DocPath, data: Document) -> Self {
        Self::new(path, WriteKind::Set(data))
    }

    pub fn upsert(path: DocPath, ops: Vec<FieldOp>) -> Self {
        Self::new(path, WriteKind::Upsert(ops))
    }

    pub fn update(path: DocPath, ops: Vec<FieldOp>) -> Self {
        Self::new(path, WriteKind::Update(ops))
    }

    pub fn delete(path: DocPath) -> Self {
        Self::new(path, WriteKind::Delete)
    }

    pub fn when(mut self, precondition: Precondition) -> Self {
        self.precondition = precondition;
        self
    }

    fn new(path: DocPath, kind: WriteKind) -> Self {
        Self {
            path,
            kind,
            precondition: Precondition::None,
        }
    }
}

/// Ordered set of writes committed as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: Write) -> &mut Self {
        self.writes.push(write);
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn touches(&self, path: &DocPath) -> bool {
        self.writes.iter().any(|w| &w.path == path)
    }

    pub fn ensure_within(&self, max: usize) -> Result<(), StoreError> {
        let max = max.min(MAX_BATCH_WRITES);
        if self.writes.len() > max {
            return Err(StoreError::BatchTooLarge {
                size: self.writes.len(),
                max,
            });
        }
        Ok(())
    }
}

impl IntoIterator for WriteBatch {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}
