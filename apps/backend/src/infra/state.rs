use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::app::{AppConfig, StoreBackend};
use crate::config::db::DbKind;
use crate::error::AppError;
use crate::infra::analytics::TracingAnalytics;
use crate::infra::db::bootstrap_db;
use crate::infra::name_filter::WordListFilter;
use crate::infra::remote_ops::{HttpRemoteOps, DEFAULT_REMOTE_TIMEOUT};
use crate::ledger::{MembershipLedger, DEFAULT_MAX_ATTEMPTS, DEFAULT_STORE_TIMEOUT};
use crate::services::{Collaborators, Services};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;
use crate::store::{EntityStore, MemoryStore, SeaStore};

enum StoreSource {
    Memory,
    Sql(DbKind),
    Provided(Arc<dyn EntityStore>),
}

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    store: StoreSource,
    collaborators: Option<Collaborators>,
    store_timeout: Duration,
    max_attempts: u32,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            store: StoreSource::Memory,
            collaborators: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Everything `main` needs, taken from the environment config.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let remote = HttpRemoteOps::new(config.remote_functions_url.clone(), config.remote_timeout)?;
        let collaborators = Collaborators {
            analytics: Arc::new(TracingAnalytics),
            names: Arc::new(WordListFilter::from_csv(&config.blocked_name_words)),
            remote: Arc::new(remote),
        };
        Ok(Self::new()
            .with_backend(config.store_backend)
            .with_security(SecurityConfig::new(config.jwt_secret.clone()))
            .with_collaborators(collaborators)
            .with_store_timeout(config.store_timeout)
            .with_max_attempts(config.commit_max_attempts))
    }

    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.store = match backend {
            StoreBackend::Memory => StoreSource::Memory,
            StoreBackend::Sqlite => StoreSource::Sql(DbKind::SqliteFile),
            StoreBackend::Postgres => StoreSource::Sql(DbKind::Postgres),
        };
        self
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.store = StoreSource::Sql(kind);
        self
    }

    /// Use an already built store; tests keep a handle to seed and inspect it.
    pub fn with_store(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.store = StoreSource::Provided(store);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = Some(collaborators);
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let store: Arc<dyn EntityStore> = match self.store {
            StoreSource::Memory => Arc::new(MemoryStore::new()),
            // single entrypoint: connect + migrate
            StoreSource::Sql(kind) => Arc::new(SeaStore::new(bootstrap_db(kind).await?)),
            StoreSource::Provided(store) => store,
        };
        let caps = store.capabilities();
        info!(
            atomic_batches = caps.atomic_batches,
            max_batch_writes = caps.max_batch_writes,
            "document store ready"
        );

        let collaborators = match self.collaborators {
            Some(c) => c,
            None => Collaborators {
                analytics: Arc::new(TracingAnalytics),
                names: Arc::new(WordListFilter::default()),
                remote: Arc::new(HttpRemoteOps::new(None, DEFAULT_REMOTE_TIMEOUT)?),
            },
        };

        let ledger = MembershipLedger::new(store)
            .with_timeout(self.store_timeout)
            .with_max_attempts(self.max_attempts);
        let ledger = Arc::new(ledger);
        let services = Services::new(ledger.clone(), collaborators);
        Ok(AppState::new(ledger, services, self.security_config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
