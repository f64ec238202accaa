use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use time::OffsetDateTime;
use tracing::info;

use super::authz::{require_admin, require_owner};
use super::Collaborators;
use crate::domain::records::{DEFAULT_MATCH_NUM, DEFAULT_TEAM_NUM};
use crate::domain::standings::rank;
use crate::domain::validation::{check_league_settings, normalize_name};
use crate::domain::{AdminEntry, Actor, League, LeagueId, Platform, RankedRow, UserRecord};
use crate::errors::domain::{DomainError, InvalidStateKind, ValidationKind};
use crate::infra::name_filter::NameFilter;
use crate::infra::remote_ops::{self, delete_league_payload, schedule_matches_payload};
use crate::ledger::{ChangeSet, MembershipLedger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeague {
    pub name: String,
    pub platform: Platform,
    pub team_num: Option<u32>,
    pub match_num: Option<u32>,
    pub private: bool,
    pub description: Option<String>,
}

/// Normalize a name and run it past the name filter.
pub(crate) fn clean_name(names: &dyn NameFilter, raw: &str) -> Result<String, DomainError> {
    let name = normalize_name(raw)?;
    if names.is_blocked(&name) {
        return Err(DomainError::validation(
            ValidationKind::Name,
            "Name contains a blocked word",
        ));
    }
    Ok(name)
}

pub struct LeagueService {
    ledger: Arc<MembershipLedger>,
    deps: Collaborators,
}

impl LeagueService {
    pub fn new(ledger: Arc<MembershipLedger>, deps: Collaborators) -> Self {
        Self { ledger, deps }
    }

    pub async fn create_league(&self, actor: &Actor, input: NewLeague) -> Result<League, DomainError> {
        let name = clean_name(self.deps.names.as_ref(), &input.name)?;
        let team_num = input.team_num.unwrap_or(DEFAULT_TEAM_NUM);
        let match_num = input.match_num.unwrap_or(DEFAULT_MATCH_NUM);
        check_league_settings(team_num, match_num)?;

        let mut admins = BTreeMap::new();
        admins.insert(
            actor.id.clone(),
            AdminEntry {
                owner: true,
                username: actor.username.clone(),
            },
        );
        let league = League {
            id: LeagueId::generate(),
            name,
            platform: input.platform,
            admins,
            owner_id: actor.id.clone(),
            team_num,
            match_num,
            accepted_clubs: 0,
            scheduled: false,
            club_index: BTreeMap::new(),
            conflict_matches_count: 0,
            private: input.private,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created: OffsetDateTime::now_utc(),
        };

        let league_ref = &league;
        self.ledger
            .retrying("create_league", move || async move {
                let owner_record = self.ledger.user(&actor.id).await?;
                let mut changes = ChangeSet::new();
                changes.open_league(league_ref, actor, owner_record.as_ref())?;
                self.ledger.commit(changes).await
            })
            .await?;

        info!(league_id = %league.id, owner = %actor.id, "league created");
        self.deps.analytics.log_event(
            "create_league",
            json!({ "leagueId": league.id, "platform": league.platform }),
        );
        Ok(league)
    }

    pub async fn get_league(&self, league_id: &LeagueId) -> Result<League, DomainError> {
        Ok(self.ledger.league(league_id).await?.value)
    }

    /// Ranked standings for display; points only, stored order on ties.
    pub async fn standings(&self, league_id: &LeagueId) -> Result<Vec<RankedRow>, DomainError> {
        self.ledger.league(league_id).await?;
        let rows = self.ledger.standings(league_id).await?;
        Ok(rank(&rows))
    }

    /// The actor's own record; an unknown user has no memberships.
    pub async fn membership(&self, actor: &Actor) -> Result<UserRecord, DomainError> {
        Ok(self
            .ledger
            .user(&actor.id)
            .await?
            .map(|u| u.value)
            .unwrap_or_else(|| UserRecord {
                id: actor.id.clone(),
                username: actor.username.clone(),
                ..Default::default()
            }))
    }

    pub async fn schedule_matches(&self, actor: &Actor, league_id: &LeagueId) -> Result<(), DomainError> {
        let league = self.ledger.league(league_id).await?;
        require_admin(&league, actor, "schedule matches")?;
        if league.scheduled {
            return Err(DomainError::invalid_state(
                InvalidStateKind::LeagueScheduled,
                "League matches are already scheduled",
            ));
        }

        self.deps
            .remote
            .call(remote_ops::SCHEDULE_MATCHES, schedule_matches_payload(league_id))
            .await?;
        info!(league_id = %league_id, actor = %actor.id, "matches scheduled");
        self.deps
            .analytics
            .log_event("schedule_matches", json!({ "leagueId": league_id }));
        Ok(())
    }

    pub async fn delete_league(&self, actor: &Actor, league_id: &LeagueId) -> Result<(), DomainError> {
        let league = self.ledger.league(league_id).await?;
        require_owner(&league, actor, "delete the league")?;

        self.deps
            .remote
            .call(
                remote_ops::DELETE_LEAGUE,
                delete_league_payload(league_id, &actor.id),
            )
            .await?;
        info!(league_id = %league_id, owner = %actor.id, "league deleted");
        self.deps
            .analytics
            .log_event("delete_league", json!({ "leagueId": league_id }));
        Ok(())
    }
}
