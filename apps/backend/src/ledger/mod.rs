//! Membership Ledger: the single owner of league, club, user-pointer and
//! standings records.
//!
//! Services read through the ledger and describe their mutation as a
//! [`ChangeSet`]. A change set only offers operations that keep the
//! denormalized copies in step (club index, accepted count, roster, user
//! pointer, standings), and every write in it is conditioned on the version
//! the decision was made from. A concurrent commit in between turns into a
//! retryable conflict; [`MembershipLedger::retrying`] re-reads and decides
//! again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{
    Club, ClubId, ClubStanding, League, LeagueId, MatchId, MatchRecord, UserId, UserRecord,
};
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::infra::db_errors::map_store_err;
use crate::repos::matches::MatchFilter;
use crate::repos::{clubs, leagues, matches, standings, users, Versioned};
use crate::store::{DocPath, EntityStore};

mod changes;

pub use changes::{ChangeSet, PlayerStats};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

pub struct MembershipLedger {
    store: Arc<dyn EntityStore>,
    timeout: Duration,
    max_attempts: u32,
}

impl MembershipLedger {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_STORE_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "store call timed out");
                DomainError::infra(InfraErrorKind::Timeout, "store call timed out")
            })?
    }

    /// Cheap read proving the store answers within the call timeout.
    pub async fn ping(&self) -> Result<(), DomainError> {
        let probe = DocPath::parse("health/probe").map_err(map_store_err)?;
        self.bounded(async { self.store.get(&probe).await.map_err(map_store_err) })
            .await
            .map(|_| ())
    }

    pub async fn find_league(&self, id: &LeagueId) -> Result<Option<Versioned<League>>, DomainError> {
        self.bounded(leagues::find(self.store(), id)).await
    }

    pub async fn league(&self, id: &LeagueId) -> Result<Versioned<League>, DomainError> {
        self.find_league(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::League, format!("League {id} not found")))
    }

    pub async fn find_club(
        &self,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<Option<Versioned<Club>>, DomainError> {
        self.bounded(clubs::find(self.store(), league_id, club_id)).await
    }

    pub async fn club(
        &self,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<Versioned<Club>, DomainError> {
        self.find_club(league_id, club_id).await?.ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Club, format!("Club {club_id} not found"))
        })
    }

    pub async fn clubs(&self, league_id: &LeagueId) -> Result<Vec<Versioned<Club>>, DomainError> {
        self.bounded(clubs::in_league(self.store(), league_id)).await
    }

    pub async fn user(&self, id: &UserId) -> Result<Option<Versioned<UserRecord>>, DomainError> {
        self.bounded(users::find(self.store(), id)).await
    }

    /// Records for every listed user that has one.
    pub async fn users<'a, I>(&self, ids: I) -> Result<Vec<Versioned<UserRecord>>, DomainError>
    where
        I: IntoIterator<Item = &'a UserId>,
    {
        let mut found = Vec::new();
        for id in ids {
            if let Some(user) = self.user(id).await? {
                found.push(user);
            }
        }
        Ok(found)
    }

    pub async fn match_record(
        &self,
        league_id: &LeagueId,
        match_id: &MatchId,
    ) -> Result<Versioned<MatchRecord>, DomainError> {
        self.bounded(matches::find(self.store(), league_id, match_id))
            .await?
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Match, format!("Match {match_id} not found"))
            })
    }

    pub async fn matches(
        &self,
        league_id: &LeagueId,
        filter: MatchFilter,
    ) -> Result<Vec<Versioned<MatchRecord>>, DomainError> {
        self.bounded(matches::in_league(self.store(), league_id, filter))
            .await
    }

    pub async fn awaiting_stats(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<Versioned<MatchRecord>>, DomainError> {
        self.bounded(matches::awaiting_stats(self.store(), user, limit))
            .await
    }

    pub async fn standings(
        &self,
        league_id: &LeagueId,
    ) -> Result<Vec<(ClubId, ClubStanding)>, DomainError> {
        self.bounded(standings::load(self.store(), league_id)).await
    }

    /// Commit a change set as one batch.
    ///
    /// A change touching more than one record is refused outright on a store
    /// without atomic batches; nothing is written in that case.
    pub async fn commit(&self, changes: ChangeSet) -> Result<(), DomainError> {
        if changes.is_empty() {
            return Ok(());
        }
        let caps = self.store.capabilities();
        if !caps.atomic_batches && changes.records_touched() > 1 {
            return Err(DomainError::infra(
                InfraErrorKind::AtomicityUnsupported,
                format!(
                    "operation spans {} records and the store cannot commit them atomically",
                    changes.records_touched()
                ),
            ));
        }

        let batch = changes.into_batch();
        batch
            .ensure_within(caps.max_batch_writes)
            .map_err(map_store_err)?;
        debug!(writes = batch.len(), "committing change set");
        self.bounded(async move { self.store.commit(batch).await.map_err(map_store_err) })
            .await
    }

    /// Run a read-decide-commit attempt until it commits, fails for a
    /// non-race reason, or the attempt budget is spent.
    pub async fn retrying<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mut n = 1;
        loop {
            match attempt().await {
                Err(e) if e.is_retryable() && n < self.max_attempts => {
                    warn!(op, attempt = n, "concurrent change detected; re-reading");
                    n += 1;
                }
                other => return other,
            }
        }
    }
}
