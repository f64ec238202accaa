//! Opaque remote operations the engine invokes but does not implement.
//!
//! Each call is a POST of `{"data": <payload>}` to `{base}/{name}`; any
//! transport failure, non-success status or missing base URL is a
//! `RemoteOperation` failure. Calls are never retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::{ClubId, LeagueId, MatchId, UserId};
use crate::errors::domain::{DomainError, InfraErrorKind};

pub const SCHEDULE_MATCHES: &str = "scheduleMatches";
pub const DELETE_LEAGUE: &str = "deleteLeague";
pub const UNDO_PUBLISHED_MATCH: &str = "undoPublishedMatch";
pub const REMOVE_SUBMISSION: &str = "removeSubmission";

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_millis(10_000);

#[async_trait]
pub trait RemoteOps: Send + Sync {
    async fn call(&self, name: &str, payload: Value) -> Result<Value, DomainError>;
}

fn remote_failure(name: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::infra(
        InfraErrorKind::RemoteOperation,
        format!("{name} failed: {detail}"),
    )
}

pub struct HttpRemoteOps {
    client: Client,
    base_url: Option<String>,
}

impl HttpRemoteOps {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| remote_failure("client", e))?;
        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        })
    }
}

#[async_trait]
impl RemoteOps for HttpRemoteOps {
    async fn call(&self, name: &str, payload: Value) -> Result<Value, DomainError> {
        let Some(base) = &self.base_url else {
            warn!(operation = name, "remote functions URL not configured");
            return Err(remote_failure(name, "remote functions are not configured"));
        };

        let response = self
            .client
            .post(format!("{base}/{name}"))
            .json(&json!({ "data": payload }))
            .send()
            .await
            .map_err(|e| {
                warn!(operation = name, error = %e, "remote call failed");
                remote_failure(name, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(operation = name, status = status.as_u16(), "remote call rejected");
            return Err(remote_failure(name, format!("status {status}")));
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        info!(operation = name, "remote call succeeded");
        Ok(body)
    }
}

pub fn schedule_matches_payload(league: &LeagueId) -> Value {
    json!({ "leagueId": league })
}

pub fn delete_league_payload(league: &LeagueId, owner: &UserId) -> Value {
    json!({ "leagueId": league, "ownerId": owner })
}

pub fn undo_published_match_payload(league: &LeagueId, match_id: &MatchId) -> Value {
    json!({ "leagueId": league, "matchId": match_id })
}

pub fn remove_submission_payload(
    league: &LeagueId,
    match_id: &MatchId,
    club: &ClubId,
    player: Option<&UserId>,
) -> Value {
    json!({
        "leagueId": league,
        "matchId": match_id,
        "clubId": club,
        "playerId": player,
    })
}
