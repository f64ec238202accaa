//! Error translation at the persistence boundary.
//!
//! `DbErr` from the SeaORM adapters becomes `StoreError` here, and
//! `StoreError` becomes `DomainError` here, so neither the store trait nor
//! the services ever look at driver messages.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use crate::store::StoreError;
use crate::trace_ctx;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

fn is_unique_violation(msg: &str) -> bool {
    mentions_sqlstate(msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

/// Postgres serialization failures and SQLite busy errors are safe to retry
/// from the top of the transaction.
fn is_serialization_failure(msg: &str) -> bool {
    mentions_sqlstate(msg, "40001") || msg.contains("database is locked")
}

/// True when the error means another writer committed first: the optimistic
/// update or delete matched no row, or a concurrent insert won the path.
pub fn is_lost_race(e: &sea_orm::DbErr) -> bool {
    match e {
        sea_orm::DbErr::Custom(msg) => msg.starts_with("OPTIMISTIC_LOCK:"),
        sea_orm::DbErr::RecordNotFound(_) => true,
        other => {
            let msg = other.to_string();
            is_unique_violation(&msg) || is_serialization_failure(&msg)
        }
    }
}

/// Translate a `DbErr` into a `StoreError`.
pub fn map_db_err(e: sea_orm::DbErr) -> StoreError {
    let trace_id = trace_ctx::trace_id();
    let msg = e.to_string();

    if is_lost_race(&e) {
        warn!(trace_id = %trace_id, raw_error = %msg, "concurrent write detected");
        return StoreError::PreconditionFailed {
            path: String::new(),
            detail: "document changed concurrently".to_string(),
        };
    }

    match &e {
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %msg, "database unavailable");
            StoreError::Unavailable("database unavailable".to_string())
        }
        _ if msg.contains("timeout") || msg.contains("timed out") => {
            warn!(trace_id = %trace_id, raw_error = %msg, "database timeout");
            StoreError::Timeout
        }
        _ => {
            error!(trace_id = %trace_id, raw_error = %msg, "unhandled database error");
            StoreError::Unavailable("database operation failed".to_string())
        }
    }
}

/// Translate a `StoreError` into a `DomainError`.
///
/// A failed precondition and a vanished update target both mean a concurrent
/// batch won; they map to the retryable optimistic-lock conflict so the
/// caller re-reads and decides again.
pub fn map_store_err(e: StoreError) -> DomainError {
    let trace_id = trace_ctx::trace_id();
    match e {
        StoreError::PreconditionFailed { path, detail } => {
            warn!(trace_id = %trace_id, path = %path, detail = %detail, "optimistic lock conflict");
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Record was modified concurrently; please retry",
            )
        }
        StoreError::NotFound(path) => {
            warn!(trace_id = %trace_id, path = %path, "update target vanished");
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Record was removed concurrently; please retry",
            )
        }
        StoreError::BatchTooLarge { size, max } => DomainError::infra(
            InfraErrorKind::Other("BatchTooLarge".into()),
            format!("operation needs {size} writes, the store allows {max}"),
        ),
        StoreError::InvalidPath(detail) => {
            error!(trace_id = %trace_id, detail = %detail, "invalid document path");
            DomainError::infra(InfraErrorKind::Other("InvalidPath".into()), detail)
        }
        StoreError::Unavailable(detail) => {
            DomainError::infra(InfraErrorKind::Unavailable, detail)
        }
        StoreError::Timeout => {
            DomainError::infra(InfraErrorKind::Timeout, "store call timed out")
        }
        StoreError::Corrupt { path, detail } => {
            error!(trace_id = %trace_id, path = %path, detail = %detail, "corrupt document");
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("document {path} could not be decoded"),
            )
        }
    }
}
