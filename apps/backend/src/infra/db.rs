//! SQL connection bootstrap for the SeaORM-backed store.

use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, DbKind};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_INTERVAL_MS: u64 = 500;

/// Retry a connection attempt with fixed interval delays
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempts = attempt, interval_ms, "connection_retry=success");
                }
                return Ok(conn);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(_) => {
                warn!(attempt, max_attempts, interval_ms, "connection_retry=failed");
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
        }
    }
}

fn connect_options(kind: DbKind, url: String) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false);
    match kind {
        // one connection: an in-memory database lives and dies with it
        DbKind::SqliteMemory | DbKind::SqliteFile => {
            opts.max_connections(1).min_connections(1);
        }
        DbKind::Postgres => {
            opts.max_connections(10)
                .min_connections(1)
                .connect_timeout(Duration::from_secs(5));
        }
    }
    opts
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let url = db_url(kind)?;
    let conn = match kind {
        DbKind::Postgres => {
            retry_connection(
                || {
                    let opts = connect_options(kind, url.clone());
                    async move { Database::connect(opts).await.map_err(AppError::from) }
                },
                CONNECT_ATTEMPTS,
                CONNECT_INTERVAL_MS,
            )
            .await?
        }
        DbKind::SqliteFile | DbKind::SqliteMemory => {
            Database::connect(connect_options(kind, url)).await?
        }
    };

    migrate(&conn, MigrationCommand::Up).await?;
    info!(db_kind = ?kind, "database ready");
    Ok(conn)
}
