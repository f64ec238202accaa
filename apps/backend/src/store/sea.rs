//! SeaORM-backed store over the `documents` table (Postgres or SQLite).
//!
//! A batch runs in one database transaction. Every row it changes is
//! written with an optimistic `lock_version` check, so two transactions that
//! read the same document cannot both commit a change derived from it. When
//! this transaction loses such a race the whole batch is re-read and
//! re-applied from the top; preconditions are re-checked against the fresh
//! state, so a batch guarded by `Precondition::Version` then fails instead of
//! overwriting.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use tracing::debug;

use super::apply::apply_write;
use super::path::DocPath;
use super::query::{Query, QueryScope};
use super::{
    Document, EntityStore, Snapshot, StoreCapabilities, StoreError, WriteBatch, MAX_BATCH_WRITES,
};
use crate::adapters::documents_sea::{self, DocumentCreate};
use crate::entities::documents;
use crate::infra::db_errors::{is_lost_race, map_db_err};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct SeaStore {
    conn: DatabaseConnection,
    max_attempts: u32,
}

enum AttemptError {
    LostRace(DbErr),
    Failed(StoreError),
}

impl From<DbErr> for AttemptError {
    fn from(e: DbErr) -> Self {
        if is_lost_race(&e) {
            AttemptError::LostRace(e)
        } else {
            AttemptError::Failed(map_db_err(e))
        }
    }
}

/// One document touched by the batch being applied.
struct Staged {
    /// `lock_version` of the row when this attempt read it
    original: Option<i64>,
    current: Option<(u64, Document)>,
}

fn decode(row: documents::Model) -> Result<Snapshot, StoreError> {
    let corrupt = |detail: String| StoreError::Corrupt {
        path: row.path.clone(),
        detail,
    };
    let path = DocPath::parse(&row.path).map_err(|e| corrupt(e.to_string()))?;
    let version = u64::try_from(row.lock_version)
        .map_err(|_| corrupt(format!("negative lock_version {}", row.lock_version)))?;
    let data: Document =
        serde_json::from_str(&row.body).map_err(|e| corrupt(format!("body is not an object: {e}")))?;
    Ok(Snapshot {
        path,
        version,
        data,
    })
}

fn encode(path: &DocPath, data: &Document) -> Result<String, StoreError> {
    serde_json::to_string(data).map_err(|e| StoreError::Corrupt {
        path: path.to_string(),
        detail: e.to_string(),
    })
}

impl SeaStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// How many times a batch is re-applied after losing a race.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    async fn try_commit(&self, batch: &WriteBatch) -> Result<(), AttemptError> {
        let txn = self.conn.begin().await?;
        let mut staged: BTreeMap<DocPath, Staged> = BTreeMap::new();

        for write in batch.writes() {
            if !staged.contains_key(&write.path) {
                let row = documents_sea::find_by_path(&txn, write.path.as_str()).await?;
                let entry = match row {
                    Some(row) => {
                        let original = row.lock_version;
                        let snap = decode(row).map_err(AttemptError::Failed)?;
                        Staged {
                            original: Some(original),
                            current: Some((snap.version, snap.data)),
                        }
                    }
                    None => Staged {
                        original: None,
                        current: None,
                    },
                };
                staged.insert(write.path.clone(), entry);
            }

            let Some(entry) = staged.get_mut(&write.path) else {
                continue;
            };
            let next = apply_write(entry.current.as_ref().map(|(v, d)| (*v, d)), write)
                .map_err(AttemptError::Failed)?;
            let version = entry.original.map_or(1, |v| v.saturating_add(1) as u64);
            entry.current = next.map(|data| (version, data));
        }

        for (path, entry) in staged {
            match (entry.original, entry.current) {
                (Some(lock_version), Some((_, data))) => {
                    let body = encode(&path, &data).map_err(AttemptError::Failed)?;
                    documents_sea::optimistic_update(&txn, path.as_str(), lock_version, body)
                        .await?;
                }
                (Some(lock_version), None) => {
                    documents_sea::optimistic_delete(&txn, path.as_str(), lock_version).await?;
                }
                (None, Some((_, data))) => {
                    let body = encode(&path, &data).map_err(AttemptError::Failed)?;
                    let parent = path.parent();
                    let dto = DocumentCreate::new(
                        path.as_str(),
                        parent.as_str(),
                        parent.collection_id(),
                        body,
                    );
                    documents_sea::insert_document(&txn, dto, 1).await?;
                }
                (None, None) => {}
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for SeaStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            atomic_batches: true,
            max_batch_writes: MAX_BATCH_WRITES,
        }
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Snapshot>, StoreError> {
        documents_sea::find_by_path(&self.conn, path.as_str())
            .await
            .map_err(map_db_err)?
            .map(decode)
            .transpose()
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let rows = match &query.scope {
            QueryScope::Collection(collection) => {
                documents_sea::find_in_collection(&self.conn, collection.as_str()).await
            }
            QueryScope::Group(id) => documents_sea::find_in_group(&self.conn, id).await,
        }
        .map_err(map_db_err)?;

        let mut matched = Vec::with_capacity(rows.len());
        for row in rows {
            let snap = decode(row)?;
            if query.matches(&snap.data) {
                matched.push(snap);
            }
        }
        Ok(query.finish(matched))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        batch.ensure_within(MAX_BATCH_WRITES)?;
        if batch.is_empty() {
            return Ok(());
        }

        let mut attempt = 1;
        loop {
            match self.try_commit(&batch).await {
                Ok(()) => return Ok(()),
                Err(AttemptError::Failed(e)) => return Err(e),
                Err(AttemptError::LostRace(e)) if attempt >= self.max_attempts => {
                    return Err(map_db_err(e));
                }
                Err(AttemptError::LostRace(e)) => {
                    debug!(attempt, error = %e, "batch lost a race; re-applying");
                    attempt += 1;
                }
            }
        }
    }
}
