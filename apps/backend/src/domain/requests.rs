//! Join requests as explicit states.
//!
//! A request is stored as a flag on existing records: a roster entry with
//! `accepted=false` (club join) or a club with `accepted=false` (league
//! join). Reads project those flags into [`RequestState`]; decline and cancel
//! remove the pending entry and report `Declined`.

use serde::Serialize;

use super::ids::{ClubId, LeagueId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestState {
    Pending,
    Accepted,
    /// Terminal: declined by the approver or cancelled by the requester
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    /// Player asks to join a club
    ClubJoin,
    /// Club asks to be admitted to a league
    LeagueJoin,
}

/// State after a request transition, and whether this call changed anything.
///
/// `changed == false` means another actor got there first; repeating a
/// transition is always safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    pub state: RequestState,
    pub changed: bool,
}

impl RequestOutcome {
    pub fn changed(state: RequestState) -> Self {
        Self {
            state,
            changed: true,
        }
    }

    pub fn unchanged(state: RequestState) -> Self {
        Self {
            state,
            changed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub kind: RequestKind,
    pub state: RequestState,
    pub league_id: LeagueId,
    pub club_id: ClubId,
    pub club_name: String,
    /// Requesting player (club join) or club manager (league join)
    pub user_id: UserId,
    pub username: String,
}

/// The three request lists a user sees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestsOverview {
    /// Players waiting on clubs this user manages
    pub club: Vec<RequestView>,
    /// Clubs waiting on leagues this user administers
    pub league: Vec<RequestView>,
    /// Requests this user made that are still pending
    pub sent: Vec<RequestView>,
}
