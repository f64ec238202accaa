//! In-process store used by tests and the `memory` backend.

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::apply::apply_write;
use super::path::DocPath;
use super::query::Query;
use super::{
    Document, EntityStore, Snapshot, StoreCapabilities, StoreError, WriteBatch, MAX_BATCH_WRITES,
};

/// Deleted documents keep their last version so a re-created document never
/// reuses a version a reader may still hold.
#[derive(Debug, Clone)]
struct Slot {
    version: u64,
    data: Option<Document>,
}

#[derive(Debug)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<DocPath, Slot>>,
    faults: Mutex<VecDeque<StoreError>>,
    atomic_batches: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(VecDeque::new()),
            atomic_batches: true,
        }
    }

    /// A store that advertises no multi-document atomicity.
    pub fn without_atomic_batches() -> Self {
        Self {
            atomic_batches: false,
            ..Self::new()
        }
    }

    /// Make the next commit fail with `error` without applying anything.
    pub fn fail_next_commit(&self, error: StoreError) {
        self.faults.lock().push_back(error);
    }

    /// Every live document, in path order.
    pub fn dump(&self) -> Vec<Snapshot> {
        self.docs
            .lock()
            .iter()
            .filter_map(|(path, slot)| live(path, slot))
            .collect()
    }
}

fn live(path: &DocPath, slot: &Slot) -> Option<Snapshot> {
    slot.data.as_ref().map(|data| Snapshot {
        path: path.clone(),
        version: slot.version,
        data: data.clone(),
    })
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            atomic_batches: self.atomic_batches,
            max_batch_writes: MAX_BATCH_WRITES,
        }
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.docs.lock().get(path).and_then(|slot| live(path, slot)))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let rows = self
            .docs
            .lock()
            .iter()
            .filter(|(path, _)| query.in_scope(path))
            .filter_map(|(path, slot)| live(path, slot))
            .filter(|snap| query.matches(&snap.data))
            .collect();
        Ok(query.finish(rows))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        batch.ensure_within(MAX_BATCH_WRITES)?;
        if let Some(fault) = self.faults.lock().pop_front() {
            return Err(fault);
        }

        let mut docs = self.docs.lock();
        let mut staged: BTreeMap<DocPath, Slot> = BTreeMap::new();

        for write in batch.writes() {
            let committed = docs.get(&write.path);
            let current = staged.get(&write.path).or(committed);
            let current_view = current.and_then(|s| s.data.as_ref().map(|d| (s.version, d)));

            let next = apply_write(current_view, write)?;
            let version = committed.map_or(1, |s| s.version + 1);
            staged.insert(write.path.clone(), Slot { version, data: next });
        }

        // Nothing above touched `docs`, so an early return left it intact.
        for (path, slot) in staged {
            docs.insert(path, slot);
        }
        Ok(())
    }
}
