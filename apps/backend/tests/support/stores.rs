//! Store wrappers that stage races and stalls around a [`MemoryStore`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use league_backend::store::{
    DocPath, EntityStore, MemoryStore, Query, Snapshot, StoreCapabilities, StoreError, WriteBatch,
};
use parking_lot::Mutex;

type Hook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Runs a one-shot hook right before the next commit reaches the inner
/// store, so a competing writer can land between a caller's read and its
/// write.
pub struct InterleavingStore {
    inner: Arc<MemoryStore>,
    hook: Mutex<Option<Hook>>,
    commits: AtomicUsize,
}

impl InterleavingStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            hook: Mutex::new(None),
            commits: AtomicUsize::new(0),
        }
    }

    pub fn before_next_commit<F>(&self, hook: F)
    where
        F: FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    {
        *self.hook.lock() = Some(Box::new(hook));
    }

    /// Commits that reached the inner store, successful or not.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityStore for InterleavingStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.inner.capabilities()
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError> {
        self.inner.get(path).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        self.inner.query(query).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let hook = self.hook.lock().take();
        if let Some(hook) = hook {
            hook().await;
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit(batch).await
    }
}

/// Reads answer normally; every commit hangs for `delay` first.
pub struct StalledStore {
    inner: MemoryStore,
    delay: Duration,
}

impl StalledStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl EntityStore for StalledStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.inner.capabilities()
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError> {
        self.inner.get(path).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        self.inner.query(query).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.commit(batch).await
    }
}

/// A store whose every call fails as unavailable.
pub struct DownStore;

#[async_trait]
impl EntityStore for DownStore {
    fn capabilities(&self) -> StoreCapabilities {
        MemoryStore::new().capabilities()
    }

    async fn get(&self, _path: &DocPath) -> Result<Option<Snapshot>, StoreError> {
        Err(StoreError::Unavailable("maintenance".into()))
    }

    async fn query(&self, _query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        Err(StoreError::Unavailable("maintenance".into()))
    }

    async fn commit(&self, _batch: WriteBatch) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("maintenance".into()))
    }
}
