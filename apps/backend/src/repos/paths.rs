//! Where each record lives.
//!
//! ```text
//! leagues/{leagueId}
//! leagues/{leagueId}/clubs/{clubId}
//! leagues/{leagueId}/stats/standings
//! leagues/{leagueId}/matches/{matchId}
//! users/{userId}
//! ```

use crate::domain::{ClubId, LeagueId, MatchId, UserId};
use crate::errors::domain::{DomainError, ValidationKind};
use crate::store::{CollectionPath, DocPath, StoreError};

pub const LEAGUES: &str = "leagues";
pub const CLUBS: &str = "clubs";
pub const MATCHES: &str = "matches";
pub const USERS: &str = "users";
const STATS: &str = "stats";
const STANDINGS: &str = "standings";

/// Ids come from callers; one that cannot form a path is bad input.
fn bad_id(e: StoreError) -> DomainError {
    DomainError::validation(ValidationKind::Other("Id".into()), e.to_string())
}

pub fn league(id: &LeagueId) -> Result<DocPath, DomainError> {
    CollectionPath::root(LEAGUES)
        .and_then(|c| c.doc(id.as_str()))
        .map_err(bad_id)
}

pub fn clubs(league_id: &LeagueId) -> Result<CollectionPath, DomainError> {
    league(league_id)?.collection(CLUBS).map_err(bad_id)
}

pub fn club(league_id: &LeagueId, club_id: &ClubId) -> Result<DocPath, DomainError> {
    clubs(league_id)?.doc(club_id.as_str()).map_err(bad_id)
}

pub fn standings(league_id: &LeagueId) -> Result<DocPath, DomainError> {
    league(league_id)?
        .collection(STATS)
        .and_then(|c| c.doc(STANDINGS))
        .map_err(bad_id)
}

pub fn matches(league_id: &LeagueId) -> Result<CollectionPath, DomainError> {
    league(league_id)?.collection(MATCHES).map_err(bad_id)
}

pub fn match_doc(league_id: &LeagueId, match_id: &MatchId) -> Result<DocPath, DomainError> {
    matches(league_id)?.doc(match_id.as_str()).map_err(bad_id)
}

pub fn user(id: &UserId) -> Result<DocPath, DomainError> {
    CollectionPath::root(USERS)
        .and_then(|c| c.doc(id.as_str()))
        .map_err(bad_id)
}
