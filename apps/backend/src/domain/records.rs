//! Stored record shapes.
//!
//! Field names are the camelCase keys of the stored documents. Ids are not
//! part of a document body; repos fill them in from the document path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ids::{ClubId, LeagueId, MatchId, UserId};

pub const DEFAULT_TEAM_NUM: u32 = 8;
pub const DEFAULT_MATCH_NUM: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ps,
    Xb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEntry {
    #[serde(default)]
    pub owner: bool,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    #[serde(skip)]
    pub id: LeagueId,
    pub name: String,
    pub platform: Platform,
    #[serde(default)]
    pub admins: BTreeMap<UserId, AdminEntry>,
    pub owner_id: UserId,
    #[serde(default = "default_team_num")]
    pub team_num: u32,
    #[serde(default = "default_match_num")]
    pub match_num: u32,
    #[serde(default)]
    pub accepted_clubs: i64,
    #[serde(default)]
    pub scheduled: bool,
    /// clubId -> club name, for every club in the league, accepted or pending
    #[serde(default)]
    pub club_index: BTreeMap<ClubId, String>,
    #[serde(default)]
    pub conflict_matches_count: i64,
    #[serde(default)]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

fn default_team_num() -> u32 {
    DEFAULT_TEAM_NUM
}

fn default_match_num() -> u32 {
    DEFAULT_MATCH_NUM
}

impl League {
    pub fn is_admin(&self, user: &UserId) -> bool {
        self.admins.contains_key(user)
    }

    pub fn is_owner(&self, user: &UserId) -> bool {
        &self.owner_id == user || self.admins.get(user).is_some_and(|a| a.owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub accepted: bool,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    #[serde(skip)]
    pub id: ClubId,
    pub name: String,
    pub manager_id: UserId,
    #[serde(default)]
    pub manager_username: String,
    /// Admitted to the league; false while the league-join request is pending
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub roster: BTreeMap<UserId, RosterEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub league_id: LeagueId,
}

impl Club {
    pub fn accepted_members(&self) -> impl Iterator<Item = (&UserId, &RosterEntry)> {
        self.roster.iter().filter(|(_, e)| e.accepted)
    }
}

/// A user's view of one league: their club there and their roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaguePointer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_id: Option<ClubId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_name: Option<String>,
    #[serde(default)]
    pub manager: bool,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub owner: bool,
    #[serde(default)]
    pub accepted: bool,
}

impl LeaguePointer {
    pub fn points_at(&self, club: &ClubId) -> bool {
        self.club_id.as_ref() == Some(club)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(skip)]
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub leagues: BTreeMap<LeagueId, LeaguePointer>,
}

impl UserRecord {
    pub fn pointer(&self, league: &LeagueId) -> Option<&LeaguePointer> {
        self.leagues.get(league)
    }

    pub fn club_in(&self, league: &LeagueId) -> Option<&ClubId> {
        self.pointer(league).and_then(|p| p.club_id.as_ref())
    }
}

/// One club's accumulated record. Stored keyed by club id in the league's
/// standings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubStanding {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub played: i64,
    #[serde(default)]
    pub won: i64,
    #[serde(default, alias = "draw")]
    pub drawn: i64,
    #[serde(default)]
    pub lost: i64,
    #[serde(default)]
    pub scored: i64,
    #[serde(default)]
    pub conceded: i64,
    #[serde(default)]
    pub points: i64,
}

/// A club's own claim about a match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub own_score: u32,
    pub opp_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPlayer {
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub skipped: bool,
    pub club_id: ClubId,
    /// Club display name at publication time
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub motm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assists: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(skip)]
    pub match_id: MatchId,
    /// Fixture number within the league; listing order
    #[serde(rename = "id")]
    pub fixture: u32,
    pub league_id: LeagueId,
    pub home_team_id: ClubId,
    pub away_team_id: ClubId,
    #[serde(default)]
    pub teams: Vec<ClubId>,
    #[serde(default)]
    pub submissions: BTreeMap<ClubId, Submission>,
    #[serde(default)]
    pub motm_submissions: BTreeMap<ClubId, UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motm: Option<UserId>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub conflict: bool,
    #[serde(default)]
    pub motm_conflict: bool,
    #[serde(default)]
    pub submission_count: u32,
    #[serde(default)]
    pub result: BTreeMap<ClubId, u32>,
    #[serde(default)]
    pub players: BTreeMap<UserId, MatchPlayer>,
    #[serde(default)]
    pub not_submitted_players: Vec<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchState {
    Unsubmitted,
    PartiallySubmitted,
    Published,
    Conflicted,
}

impl MatchRecord {
    pub fn state(&self) -> MatchState {
        if self.published {
            MatchState::Published
        } else if self.conflict {
            MatchState::Conflicted
        } else if self.submission_count == 0 {
            MatchState::Unsubmitted
        } else {
            MatchState::PartiallySubmitted
        }
    }

    pub fn involves(&self, club: &ClubId) -> bool {
        &self.home_team_id == club || &self.away_team_id == club
    }

    pub fn opponent_of(&self, club: &ClubId) -> Option<&ClubId> {
        if &self.home_team_id == club {
            Some(&self.away_team_id)
        } else if &self.away_team_id == club {
            Some(&self.home_team_id)
        } else {
            None
        }
    }
}
