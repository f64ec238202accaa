use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::authz::{require_admin, require_manager_or_admin};
use super::leagues::clean_name;
use super::Collaborators;
use crate::domain::{Actor, Club, ClubId, LeagueId, RosterEntry, UserId};
use crate::errors::domain::{
    ConflictKind, DomainError, InvalidStateKind, NotFoundKind, ValidationKind,
};
use crate::ledger::{ChangeSet, MembershipLedger};

/// Result of a delete-like operation. Losing the race to another remover is
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Removal {
    Removed,
    AlreadyRemoved,
}

pub struct ClubService {
    ledger: Arc<MembershipLedger>,
    deps: Collaborators,
}

impl ClubService {
    pub fn new(ledger: Arc<MembershipLedger>, deps: Collaborators) -> Self {
        Self { ledger, deps }
    }

    pub async fn list_clubs(&self, league_id: &LeagueId) -> Result<Vec<Club>, DomainError> {
        self.ledger.league(league_id).await?;
        Ok(self
            .ledger
            .clubs(league_id)
            .await?
            .into_iter()
            .map(|c| c.value)
            .collect())
    }

    pub async fn get_club(&self, league_id: &LeagueId, club_id: &ClubId) -> Result<Club, DomainError> {
        Ok(self.ledger.club(league_id, club_id).await?.value)
    }

    /// Create a club managed by `actor`.
    ///
    /// League admins' clubs start accepted; anyone else's club is a pending
    /// league-join request until an admin accepts it.
    pub async fn create_club(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        raw_name: &str,
    ) -> Result<Club, DomainError> {
        let name = clean_name(self.deps.names.as_ref(), raw_name)?;
        let name = name.as_str();

        let club = self
            .ledger
            .retrying("create_club", move || async move {
                let league = self.ledger.league(league_id).await?;
                let user = self.ledger.user(&actor.id).await?;
                if let Some(existing) = user.as_ref().and_then(|u| u.club_in(league_id)) {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadyInLeague,
                        format!("You already belong to club {existing} in this league"),
                    ));
                }

                let accepted = league.is_admin(&actor.id);
                let mut roster = BTreeMap::new();
                roster.insert(
                    actor.id.clone(),
                    RosterEntry {
                        accepted: true,
                        username: actor.username.clone(),
                    },
                );
                let club = Club {
                    id: ClubId::generate(),
                    name: name.to_string(),
                    manager_id: actor.id.clone(),
                    manager_username: actor.username.clone(),
                    accepted,
                    roster,
                    created: OffsetDateTime::now_utc(),
                    league_id: league_id.clone(),
                };

                let mut changes = ChangeSet::new();
                changes.found_club(&league, &club, actor, user.as_ref())?;
                self.ledger.commit(changes).await?;
                Ok(club)
            })
            .await?;

        info!(
            league_id = %league_id,
            club_id = %club.id,
            accepted = club.accepted,
            "club created"
        );
        self.deps.analytics.log_event(
            "create_club",
            json!({ "leagueId": league_id, "clubId": club.id, "accepted": club.accepted }),
        );
        Ok(club)
    }

    pub async fn remove_club(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<Removal, DomainError> {
        let removal = self
            .ledger
            .retrying("remove_club", move || async move {
                let league = self.ledger.league(league_id).await?;
                if league.scheduled {
                    return Err(DomainError::invalid_state(
                        InvalidStateKind::LeagueScheduled,
                        "Clubs cannot be removed once matches are scheduled",
                    ));
                }
                let Some(club) = self.ledger.find_club(league_id, club_id).await? else {
                    return Ok(Removal::AlreadyRemoved);
                };
                require_manager_or_admin(&league, &club, actor, "remove the club")?;

                let members = self.ledger.users(club.roster.keys()).await?;
                let mut changes = ChangeSet::new();
                changes.dissolve_club(&league, &club, &members)?;
                self.ledger.commit(changes).await?;
                Ok(Removal::Removed)
            })
            .await?;

        match removal {
            Removal::Removed => {
                info!(league_id = %league_id, club_id = %club_id, actor = %actor.id, "club removed");
                self.deps.analytics.log_event(
                    "remove_club",
                    json!({ "leagueId": league_id, "clubId": club_id }),
                );
            }
            Removal::AlreadyRemoved => {
                warn!(league_id = %league_id, club_id = %club_id, "club already removed");
            }
        }
        Ok(removal)
    }

    /// Remove one roster entry. League counts never change here.
    pub async fn remove_player(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
        player: &UserId,
    ) -> Result<Removal, DomainError> {
        let removal = self
            .ledger
            .retrying("remove_player", move || async move {
                let league = self.ledger.league(league_id).await?;
                let Some(club) = self.ledger.find_club(league_id, club_id).await? else {
                    return Ok(Removal::AlreadyRemoved);
                };
                if !club.roster.contains_key(player) {
                    return Ok(Removal::AlreadyRemoved);
                }
                if &club.manager_id == player {
                    return Err(DomainError::invalid_state(
                        InvalidStateKind::ManagerCannotLeave,
                        "The manager cannot leave the club; remove the club instead",
                    ));
                }
                if &actor.id != player {
                    require_manager_or_admin(&league, &club, actor, "remove players")?;
                }

                let record = self.ledger.user(player).await?;
                let mut changes = ChangeSet::new();
                changes.drop_member(&league, &club, player, record.as_ref())?;
                self.ledger.commit(changes).await?;
                Ok(Removal::Removed)
            })
            .await?;

        match removal {
            Removal::Removed => {
                info!(league_id = %league_id, club_id = %club_id, player = %player, "player removed");
            }
            Removal::AlreadyRemoved => {
                warn!(league_id = %league_id, club_id = %club_id, player = %player, "player already removed");
            }
        }
        Ok(removal)
    }

    /// Move an accepted, non-manager player between two clubs of a league.
    pub async fn transfer_player(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        from_id: &ClubId,
        to_id: &ClubId,
        player: &UserId,
    ) -> Result<(), DomainError> {
        if from_id == to_id {
            return Err(DomainError::validation(
                ValidationKind::Other("Transfer".into()),
                "Source and destination clubs must differ",
            ));
        }

        self.ledger
            .retrying("transfer_player", move || async move {
                let league = self.ledger.league(league_id).await?;
                require_admin(&league, actor, "transfer players")?;
                let from = self.ledger.club(league_id, from_id).await?;
                let to = self.ledger.club(league_id, to_id).await?;

                let entry = from
                    .roster
                    .get(player)
                    .filter(|e| e.accepted)
                    .ok_or_else(|| {
                        DomainError::not_found(
                            NotFoundKind::RosterEntry,
                            format!("{player} is not an accepted member of {from_id}"),
                        )
                    })?;
                if &from.manager_id == player {
                    return Err(DomainError::invalid_state(
                        InvalidStateKind::ManagerCannotLeave,
                        "A club manager cannot be transferred",
                    ));
                }
                if to.roster.contains_key(player) {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadyInLeague,
                        format!("{player} is already on {to_id}"),
                    ));
                }

                let record = self.ledger.user(player).await?;
                let mut changes = ChangeSet::new();
                changes.move_member(&from, &to, player, entry, record.as_ref())?;
                self.ledger.commit(changes).await
            })
            .await?;

        info!(
            league_id = %league_id,
            from = %from_id,
            to = %to_id,
            player = %player,
            "player transferred"
        );
        Ok(())
    }
}
