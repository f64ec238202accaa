//! Join requests: player to club, and club to league.
//!
//! Every transition re-reads the request's backing flag first. A request
//! that was already actioned by the other party reports its current state
//! with `changed: false` instead of failing, so accept, decline and cancel
//! can race and be retried freely.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use super::authz::{require_admin, require_manager, require_manager_or_admin};
use crate::domain::{
    Actor, Club, ClubId, LeagueId, RequestKind, RequestOutcome, RequestState, RequestView,
    RequestsOverview, UserId,
};
use crate::errors::domain::{ConflictKind, DomainError, InvalidStateKind};
use crate::infra::analytics::Analytics;
use crate::ledger::{ChangeSet, MembershipLedger};

pub struct RequestService {
    ledger: Arc<MembershipLedger>,
    analytics: Arc<dyn Analytics>,
}

fn entry_state(club: &Club, user: &UserId) -> RequestState {
    match club.roster.get(user) {
        Some(entry) if entry.accepted => RequestState::Accepted,
        Some(_) => RequestState::Pending,
        None => RequestState::Declined,
    }
}

fn club_state(club: Option<&Club>) -> RequestState {
    match club {
        Some(c) if c.accepted => RequestState::Accepted,
        Some(_) => RequestState::Pending,
        None => RequestState::Declined,
    }
}

fn pending_members(club: &Club) -> impl Iterator<Item = RequestView> + '_ {
    club.roster
        .iter()
        .filter(|(_, e)| !e.accepted)
        .map(|(user_id, e)| RequestView {
            kind: RequestKind::ClubJoin,
            state: RequestState::Pending,
            league_id: club.league_id.clone(),
            club_id: club.id.clone(),
            club_name: club.name.clone(),
            user_id: user_id.clone(),
            username: e.username.clone(),
        })
}

fn league_request(club: &Club) -> RequestView {
    RequestView {
        kind: RequestKind::LeagueJoin,
        state: club_state(Some(club)),
        league_id: club.league_id.clone(),
        club_id: club.id.clone(),
        club_name: club.name.clone(),
        user_id: club.manager_id.clone(),
        username: club.manager_username.clone(),
    }
}

impl RequestService {
    pub fn new(ledger: Arc<MembershipLedger>, analytics: Arc<dyn Analytics>) -> Self {
        Self { ledger, analytics }
    }

    fn report(&self, action: &'static str, outcome: RequestOutcome, league_id: &LeagueId, club_id: &ClubId) {
        if outcome.changed {
            info!(action, league_id = %league_id, club_id = %club_id, state = ?outcome.state, "request updated");
            self.analytics.log_event(
                action,
                json!({ "leagueId": league_id, "clubId": club_id, "state": outcome.state }),
            );
        } else {
            warn!(action, league_id = %league_id, club_id = %club_id, state = ?outcome.state, "request already settled");
        }
    }

    /// Ask to join an accepted club.
    pub async fn request_join(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<RequestOutcome, DomainError> {
        let outcome = self
            .ledger
            .retrying("request_join", move || async move {
                let club = self.ledger.club(league_id, club_id).await?;
                if !club.accepted {
                    return Err(DomainError::invalid_state(
                        InvalidStateKind::ClubNotAccepted,
                        "This club has not been accepted into the league yet",
                    ));
                }
                if club.roster.contains_key(&actor.id) {
                    return Ok(RequestOutcome::unchanged(entry_state(&club, &actor.id)));
                }
                let user = self.ledger.user(&actor.id).await?;
                if user.as_ref().and_then(|u| u.club_in(league_id)).is_some() {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadyInLeague,
                        "You already belong to a club in this league",
                    ));
                }

                let mut changes = ChangeSet::new();
                changes.add_pending_member(&club, actor, user.as_ref())?;
                self.ledger.commit(changes).await?;
                Ok(RequestOutcome::changed(RequestState::Pending))
            })
            .await?;
        self.report("join_request", outcome, league_id, club_id);
        Ok(outcome)
    }

    /// Manager or admin accepts a pending player.
    pub async fn accept_member(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
        user_id: &UserId,
    ) -> Result<RequestOutcome, DomainError> {
        let outcome = self
            .ledger
            .retrying("accept_member", move || async move {
                let league = self.ledger.league(league_id).await?;
                let Some(club) = self.ledger.find_club(league_id, club_id).await? else {
                    return Ok(RequestOutcome::unchanged(RequestState::Declined));
                };
                require_manager_or_admin(&league, &club, actor, "accept join requests")?;
                let state = entry_state(&club, user_id);
                if state != RequestState::Pending {
                    return Ok(RequestOutcome::unchanged(state));
                }

                let record = self.ledger.user(user_id).await?;
                if let Some(other) = record
                    .as_ref()
                    .and_then(|u| u.club_in(league_id))
                    .filter(|c| *c != club_id)
                {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadyInLeague,
                        format!("{user_id} already belongs to club {other} in this league"),
                    ));
                }

                let mut changes = ChangeSet::new();
                changes.accept_member(&club, user_id, record.as_ref())?;
                self.ledger.commit(changes).await?;
                Ok(RequestOutcome::changed(RequestState::Accepted))
            })
            .await?;
        self.report("accept_member", outcome, league_id, club_id);
        Ok(outcome)
    }

    /// Manager or admin declines a pending player.
    pub async fn decline_member(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
        user_id: &UserId,
    ) -> Result<RequestOutcome, DomainError> {
        let outcome = self
            .withdraw_member("decline_member", Some(actor), league_id, club_id, user_id)
            .await?;
        self.report("decline_member", outcome, league_id, club_id);
        Ok(outcome)
    }

    /// The requesting player withdraws their own pending request.
    pub async fn cancel_join(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<RequestOutcome, DomainError> {
        let outcome = self
            .withdraw_member("cancel_join", None, league_id, club_id, &actor.id)
            .await?;
        self.report("cancel_join", outcome, league_id, club_id);
        Ok(outcome)
    }

    /// Remove a pending roster entry. `approver` is checked for the manager
    /// or admin role; `None` means the requester is acting on their own
    /// request.
    async fn withdraw_member(
        &self,
        op: &'static str,
        approver: Option<&Actor>,
        league_id: &LeagueId,
        club_id: &ClubId,
        user_id: &UserId,
    ) -> Result<RequestOutcome, DomainError> {
        self.ledger
            .retrying(op, move || async move {
                let league = self.ledger.league(league_id).await?;
                let Some(club) = self.ledger.find_club(league_id, club_id).await? else {
                    return Ok(RequestOutcome::unchanged(RequestState::Declined));
                };
                if let Some(approver) = approver {
                    require_manager_or_admin(&league, &club, approver, "decline join requests")?;
                }
                let state = entry_state(&club, user_id);
                if state != RequestState::Pending {
                    return Ok(RequestOutcome::unchanged(state));
                }

                let record = self.ledger.user(user_id).await?;
                let mut changes = ChangeSet::new();
                changes.drop_member(&league, &club, user_id, record.as_ref())?;
                self.ledger.commit(changes).await?;
                Ok(RequestOutcome::changed(RequestState::Declined))
            })
            .await
    }

    /// Admin accepts a pending club into the league.
    pub async fn accept_club(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<RequestOutcome, DomainError> {
        let outcome = self
            .ledger
            .retrying("accept_club", move || async move {
                let league = self.ledger.league(league_id).await?;
                require_admin(&league, actor, "accept clubs")?;
                let Some(club) = self.ledger.find_club(league_id, club_id).await? else {
                    return Ok(RequestOutcome::unchanged(RequestState::Declined));
                };
                if club.accepted {
                    return Ok(RequestOutcome::unchanged(RequestState::Accepted));
                }

                let manager = self.ledger.user(&club.manager_id).await?;
                let mut changes = ChangeSet::new();
                changes.admit_club(&league, &club, manager.as_ref())?;
                self.ledger.commit(changes).await?;
                Ok(RequestOutcome::changed(RequestState::Accepted))
            })
            .await?;
        self.report("accept_club", outcome, league_id, club_id);
        Ok(outcome)
    }

    /// Admin declines a pending club; the club is removed.
    pub async fn decline_club(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<RequestOutcome, DomainError> {
        let outcome = self.withdraw_club("decline_club", actor, true, league_id, club_id).await?;
        self.report("decline_club", outcome, league_id, club_id);
        Ok(outcome)
    }

    /// The manager withdraws their club's pending league request.
    pub async fn cancel_club(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<RequestOutcome, DomainError> {
        let outcome = self.withdraw_club("cancel_club", actor, false, league_id, club_id).await?;
        self.report("cancel_club", outcome, league_id, club_id);
        Ok(outcome)
    }

    async fn withdraw_club(
        &self,
        op: &'static str,
        actor: &Actor,
        as_admin: bool,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<RequestOutcome, DomainError> {
        self.ledger
            .retrying(op, move || async move {
                let league = self.ledger.league(league_id).await?;
                if as_admin {
                    require_admin(&league, actor, "decline clubs")?;
                }
                let Some(club) = self.ledger.find_club(league_id, club_id).await? else {
                    return Ok(RequestOutcome::unchanged(RequestState::Declined));
                };
                if !as_admin {
                    require_manager(&club, actor, "cancel the league request")?;
                }
                if club.accepted {
                    return Ok(RequestOutcome::unchanged(RequestState::Accepted));
                }

                let members = self.ledger.users(club.roster.keys()).await?;
                let mut changes = ChangeSet::new();
                changes.dissolve_club(&league, &club, &members)?;
                self.ledger.commit(changes).await?;
                Ok(RequestOutcome::changed(RequestState::Declined))
            })
            .await
    }

    /// Pending players of one club, for its manager or a league admin.
    pub async fn club_requests(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        club_id: &ClubId,
    ) -> Result<Vec<RequestView>, DomainError> {
        let league = self.ledger.league(league_id).await?;
        let club = self.ledger.club(league_id, club_id).await?;
        require_manager_or_admin(&league, &club, actor, "view join requests")?;
        Ok(pending_members(&club).collect())
    }

    /// Clubs waiting for admission, for league admins.
    pub async fn league_requests(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
    ) -> Result<Vec<RequestView>, DomainError> {
        let league = self.ledger.league(league_id).await?;
        require_admin(&league, actor, "view league requests")?;
        Ok(self
            .ledger
            .clubs(league_id)
            .await?
            .iter()
            .filter(|c| !c.accepted)
            .map(|c| league_request(c))
            .collect())
    }

    /// The actor's own pending requests, projected from their pointers.
    pub async fn sent_requests(&self, actor: &Actor) -> Result<Vec<RequestView>, DomainError> {
        let Some(user) = self.ledger.user(&actor.id).await? else {
            return Ok(Vec::new());
        };
        Ok(user
            .leagues
            .iter()
            .filter(|(_, p)| !p.accepted)
            .filter_map(|(league_id, p)| {
                let club_id = p.club_id.clone()?;
                Some(RequestView {
                    kind: if p.manager {
                        RequestKind::LeagueJoin
                    } else {
                        RequestKind::ClubJoin
                    },
                    state: RequestState::Pending,
                    league_id: league_id.clone(),
                    club_id,
                    club_name: p.club_name.clone().unwrap_or_default(),
                    user_id: actor.id.clone(),
                    username: actor.username.clone(),
                })
            })
            .collect())
    }

    /// Everything awaiting the actor: players asking to join clubs they
    /// manage, clubs asking to join leagues they administer, and their own
    /// outstanding requests.
    pub async fn overview(&self, actor: &Actor) -> Result<RequestsOverview, DomainError> {
        let mut overview = RequestsOverview {
            sent: self.sent_requests(actor).await?,
            ..Default::default()
        };
        let Some(user) = self.ledger.user(&actor.id).await? else {
            return Ok(overview);
        };

        for (league_id, pointer) in &user.leagues {
            if pointer.manager && pointer.accepted {
                if let Some(club_id) = &pointer.club_id {
                    if let Some(club) = self.ledger.find_club(league_id, club_id).await? {
                        overview.club.extend(pending_members(&club));
                    }
                }
            }
            if pointer.admin {
                let clubs = self.ledger.clubs(league_id).await?;
                overview
                    .league
                    .extend(clubs.iter().filter(|c| !c.accepted).map(|c| league_request(c)));
            }
        }
        Ok(overview)
    }
}
