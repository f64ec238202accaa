//! Match submission and reconciliation.
//!
//! Each club writes only its own key in `submissions`. The decision to
//! publish or flag a conflict is made from the freshly read match with this
//! club's claim merged in, and the write is conditioned on that read; if the
//! other side committed in between, the attempt is re-run on the new state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::authz::{require_admin, require_manager};
use super::Collaborators;
use crate::domain::reconcile::{reconcile_motm, reconcile_scores};
use crate::domain::validation::{check_player_stats, parse_score};
use crate::domain::{
    Actor, Club, ClubId, LeagueId, MatchId, MatchPlayer, MatchRecord, MatchState,
    MotmReconciliation, Reconciliation, Submission, SubmissionOutcome, UserId,
};
use crate::errors::domain::{ConflictKind, DomainError, InvalidStateKind, NotFoundKind};
use crate::infra::remote_ops::{self, remove_submission_payload, undo_published_match_payload};
use crate::ledger::{ChangeSet, MembershipLedger, PlayerStats};
use crate::repos::matches::MatchFilter;
use crate::repos::Versioned;

/// How many matches the pending-stats view returns.
pub const PENDING_STATS_LIMIT: usize = 4;

/// A match as listed to clients, with club names resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub match_id: MatchId,
    pub league_id: LeagueId,
    pub fixture: u32,
    pub home_team_id: ClubId,
    pub home_team: String,
    pub away_team_id: ClubId,
    pub away_team: String,
    pub state: MatchState,
    pub submission_count: u32,
    pub result: BTreeMap<ClubId, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motm: Option<UserId>,
    pub motm_conflict: bool,
    pub not_submitted_players: Vec<UserId>,
}

impl MatchView {
    fn new(record: MatchRecord, names: &BTreeMap<ClubId, String>) -> Self {
        let name = |id: &ClubId| names.get(id).cloned().unwrap_or_default();
        Self {
            home_team: name(&record.home_team_id),
            away_team: name(&record.away_team_id),
            state: record.state(),
            match_id: record.match_id,
            league_id: record.league_id,
            fixture: record.fixture,
            home_team_id: record.home_team_id,
            away_team_id: record.away_team_id,
            submission_count: record.submission_count,
            result: record.result,
            motm: record.motm,
            motm_conflict: record.motm_conflict,
            not_submitted_players: record.not_submitted_players,
        }
    }
}

/// Per-player entries for a published match: every accepted member of both
/// clubs, nothing submitted yet.
fn seed_players(
    clubs: [Option<&Club>; 2],
    motm: Option<&UserId>,
) -> BTreeMap<UserId, MatchPlayer> {
    let mut players = BTreeMap::new();
    for club in clubs.into_iter().flatten() {
        for (user_id, entry) in club.accepted_members() {
            players.insert(
                user_id.clone(),
                MatchPlayer {
                    submitted: false,
                    skipped: false,
                    club_id: club.id.clone(),
                    club: club.name.clone(),
                    username: entry.username.clone(),
                    motm: motm == Some(user_id),
                    goals: None,
                    assists: None,
                    rating: None,
                },
            );
        }
    }
    players
}

fn ensure_open(record: &MatchRecord) -> Result<(), DomainError> {
    match record.state() {
        MatchState::Published => Err(DomainError::invalid_state(
            InvalidStateKind::MatchPublished,
            "Match result is already published",
        )),
        MatchState::Conflicted => Err(DomainError::invalid_state(
            InvalidStateKind::MatchConflicted,
            "Match result is in conflict and awaits an admin",
        )),
        MatchState::Unsubmitted | MatchState::PartiallySubmitted => Ok(()),
    }
}

fn ensure_participant(record: &MatchRecord, club_id: &ClubId) -> Result<(), DomainError> {
    if record.involves(club_id) {
        Ok(())
    } else {
        Err(DomainError::invalid_state(
            InvalidStateKind::NotParticipant,
            format!("Club {club_id} does not play in this match"),
        ))
    }
}

fn ensure_published(record: &MatchRecord) -> Result<(), DomainError> {
    if record.published {
        Ok(())
    } else {
        Err(DomainError::invalid_state(
            InvalidStateKind::Other("MatchNotPublished".into()),
            "Match result is not published",
        ))
    }
}

pub struct MatchService {
    ledger: Arc<MembershipLedger>,
    deps: Collaborators,
}

impl MatchService {
    pub fn new(ledger: Arc<MembershipLedger>, deps: Collaborators) -> Self {
        Self { ledger, deps }
    }

    /// Record `club_id`'s claim of the final score and reconcile it with the
    /// other side's, if present.
    pub async fn submit_result(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        match_id: &MatchId,
        club_id: &ClubId,
        own_score: &str,
        opp_score: &str,
    ) -> Result<SubmissionOutcome, DomainError> {
        let submission = Submission {
            own_score: parse_score("ownScore", own_score)?,
            opp_score: parse_score("oppScore", opp_score)?,
        };

        let outcome = self
            .ledger
            .retrying("submit_result", move || async move {
                let record = self.ledger.match_record(league_id, match_id).await?;
                ensure_participant(&record, club_id)?;
                let club = self.ledger.club(league_id, club_id).await?;
                require_manager(&club, actor, "submit the result")?;
                ensure_open(&record)?;
                if record.submissions.contains_key(club_id) {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadySubmitted,
                        "Your club has already submitted this result",
                    ));
                }

                let mut merged = record.submissions.clone();
                merged.insert(club_id.clone(), submission);

                let mut changes = ChangeSet::new();
                changes.record_submission(&record, club_id, submission)?;
                let outcome =
                    match reconcile_scores(&record.home_team_id, &record.away_team_id, &merged) {
                        Reconciliation::Pending => SubmissionOutcome::FirstSubmission,
                        Reconciliation::Agreed { home, away } => {
                            self.stage_publication(&mut changes, &record, &club, (home, away))
                                .await?;
                            SubmissionOutcome::Success
                        }
                        Reconciliation::Disagreed => {
                            changes.flag_conflict(&record)?;
                            SubmissionOutcome::Conflict
                        }
                    };
                self.ledger.commit(changes).await?;
                Ok(outcome)
            })
            .await?;

        info!(
            league_id = %league_id,
            match_id = %match_id,
            club_id = %club_id,
            outcome = outcome.as_str(),
            "match result submitted"
        );
        self.deps.analytics.log_event(
            "submit_match",
            json!({
                "leagueId": league_id,
                "matchId": match_id,
                "clubId": club_id,
                "outcome": outcome.as_str(),
            }),
        );
        Ok(outcome)
    }

    async fn stage_publication(
        &self,
        changes: &mut ChangeSet,
        record: &Versioned<MatchRecord>,
        submitting: &Club,
        score: (u32, u32),
    ) -> Result<(), DomainError> {
        let other_id = record
            .opponent_of(&submitting.id)
            .cloned()
            .unwrap_or_default();
        let other = self.ledger.find_club(&record.league_id, &other_id).await?;

        let (home, away) = if submitting.id == record.home_team_id {
            (Some(submitting), other.as_deref())
        } else {
            (other.as_deref(), Some(submitting))
        };
        let players = seed_players([home, away], record.motm.as_ref());
        let names = (
            home.map(|c| c.name.as_str()).unwrap_or_default(),
            away.map(|c| c.name.as_str()).unwrap_or_default(),
        );
        changes.publish(record, score, names, &players)
    }

    /// Record `club_id`'s man-of-the-match pick and reconcile it with the
    /// other side's. Independent of score publication.
    pub async fn submit_motm(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        match_id: &MatchId,
        club_id: &ClubId,
        player: &UserId,
    ) -> Result<SubmissionOutcome, DomainError> {
        let outcome = self
            .ledger
            .retrying("submit_motm", move || async move {
                let record = self.ledger.match_record(league_id, match_id).await?;
                ensure_participant(&record, club_id)?;
                let club = self.ledger.club(league_id, club_id).await?;
                require_manager(&club, actor, "submit man of the match")?;
                if record.motm_submissions.contains_key(club_id) {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadySubmitted,
                        "Your club has already picked man of the match",
                    ));
                }

                let opponent = match record.opponent_of(club_id) {
                    Some(id) => self.ledger.find_club(league_id, id).await?,
                    None => None,
                };
                let eligible = [Some(&club.value), opponent.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|c| c.roster.get(player).is_some_and(|e| e.accepted));
                if !eligible {
                    return Err(DomainError::not_found(
                        NotFoundKind::RosterEntry,
                        format!("{player} did not play for either club"),
                    ));
                }

                let mut merged = record.motm_submissions.clone();
                merged.insert(club_id.clone(), player.clone());
                let decision = reconcile_motm(&record.home_team_id, &record.away_team_id, &merged);

                let mut changes = ChangeSet::new();
                changes.record_motm(&record, club_id, player)?;
                changes.settle_motm(&record, &decision)?;
                self.ledger.commit(changes).await?;

                Ok(match decision {
                    MotmReconciliation::Pending => SubmissionOutcome::FirstSubmission,
                    MotmReconciliation::Agreed(_) => SubmissionOutcome::Success,
                    MotmReconciliation::Disagreed => SubmissionOutcome::Conflict,
                })
            })
            .await?;

        info!(
            league_id = %league_id,
            match_id = %match_id,
            club_id = %club_id,
            outcome = outcome.as_str(),
            "motm submitted"
        );
        self.deps.analytics.log_event(
            "submit_motm",
            json!({ "leagueId": league_id, "matchId": match_id, "outcome": outcome.as_str() }),
        );
        Ok(outcome)
    }

    /// A player records their own stats for a published match.
    pub async fn submit_player_stats(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        match_id: &MatchId,
        stats: PlayerStats,
    ) -> Result<(), DomainError> {
        check_player_stats(stats.rating, stats.goals, stats.assists)?;

        self.ledger
            .retrying("submit_player_stats", move || async move {
                let record = self.ledger.match_record(league_id, match_id).await?;
                ensure_published(&record)?;
                let entry = record.players.get(&actor.id).ok_or_else(|| {
                    DomainError::invalid_state(
                        InvalidStateKind::NotParticipant,
                        "You did not play in this match",
                    )
                })?;
                if entry.submitted || entry.skipped {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadySubmitted,
                        "Your stats for this match are already settled",
                    ));
                }

                let mut changes = ChangeSet::new();
                changes.record_player_stats(&record, &actor.id, stats)?;
                self.ledger.commit(changes).await
            })
            .await?;

        info!(league_id = %league_id, match_id = %match_id, player = %actor.id, "player stats submitted");
        Ok(())
    }

    /// A player opts out of recording stats. Repeating it is a no-op.
    pub async fn skip_player_stats(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        match_id: &MatchId,
    ) -> Result<(), DomainError> {
        self.ledger
            .retrying("skip_player_stats", move || async move {
                let record = self.ledger.match_record(league_id, match_id).await?;
                ensure_published(&record)?;
                let entry = record.players.get(&actor.id).ok_or_else(|| {
                    DomainError::invalid_state(
                        InvalidStateKind::NotParticipant,
                        "You did not play in this match",
                    )
                })?;
                if entry.submitted || entry.skipped {
                    return Ok(());
                }

                let mut changes = ChangeSet::new();
                changes.skip_player_stats(&record, &actor.id)?;
                self.ledger.commit(changes).await
            })
            .await
    }

    /// Matches of a league in fixture order.
    pub async fn list_matches(
        &self,
        league_id: &LeagueId,
        filter: MatchFilter,
    ) -> Result<Vec<MatchView>, DomainError> {
        let league = self.ledger.league(league_id).await?;
        Ok(self
            .ledger
            .matches(league_id, filter)
            .await?
            .into_iter()
            .map(|m| MatchView::new(m.value, &league.club_index))
            .collect())
    }

    /// Published matches, across leagues, where the actor still owes stats.
    pub async fn pending_stats(&self, actor: &Actor) -> Result<Vec<MatchView>, DomainError> {
        let records = self
            .ledger
            .awaiting_stats(&actor.id, PENDING_STATS_LIMIT)
            .await?;

        let mut indexes: HashMap<LeagueId, BTreeMap<ClubId, String>> = HashMap::new();
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            if !indexes.contains_key(&record.league_id) {
                let index = self
                    .ledger
                    .find_league(&record.league_id)
                    .await?
                    .map(|l| l.value.club_index)
                    .unwrap_or_default();
                indexes.insert(record.league_id.clone(), index);
            }
            let names = indexes.entry(record.league_id.clone()).or_default();
            views.push(MatchView::new(record.value, names));
        }
        Ok(views)
    }

    /// Admin reverts a published match through the remote operation.
    pub async fn undo_published_match(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        match_id: &MatchId,
    ) -> Result<(), DomainError> {
        let league = self.ledger.league(league_id).await?;
        require_admin(&league, actor, "undo a published match")?;
        let record = self.ledger.match_record(league_id, match_id).await?;
        ensure_published(&record)?;

        self.deps
            .remote
            .call(
                remote_ops::UNDO_PUBLISHED_MATCH,
                undo_published_match_payload(league_id, match_id),
            )
            .await?;
        info!(league_id = %league_id, match_id = %match_id, actor = %actor.id, "published match undone");
        Ok(())
    }

    /// Admin clears one club's submission through the remote operation.
    pub async fn remove_submission(
        &self,
        actor: &Actor,
        league_id: &LeagueId,
        match_id: &MatchId,
        club_id: &ClubId,
        player: Option<&UserId>,
    ) -> Result<(), DomainError> {
        let league = self.ledger.league(league_id).await?;
        require_admin(&league, actor, "remove a submission")?;
        let record = self.ledger.match_record(league_id, match_id).await?;
        ensure_participant(&record, club_id)?;

        self.deps
            .remote
            .call(
                remote_ops::REMOVE_SUBMISSION,
                remove_submission_payload(league_id, match_id, club_id, player),
            )
            .await?;
        info!(league_id = %league_id, match_id = %match_id, club_id = %club_id, "submission removed");
        Ok(())
    }
}
