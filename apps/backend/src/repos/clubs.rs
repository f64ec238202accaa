//! Club records.

use crate::domain::{Club, ClubId, LeagueId};
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_store_err;
use crate::store::{EntityStore, Query, Snapshot};

use super::{decode, paths, Versioned};

fn from_snapshot(snap: Snapshot) -> Result<Versioned<Club>, DomainError> {
    let id = ClubId::from(snap.path.id());
    let mut club = decode::<Club>(snap)?;
    club.value.id = id;
    Ok(club)
}

pub async fn find(
    store: &dyn EntityStore,
    league_id: &LeagueId,
    club_id: &ClubId,
) -> Result<Option<Versioned<Club>>, DomainError> {
    let path = paths::club(league_id, club_id)?;
    store
        .get(&path)
        .await
        .map_err(map_store_err)?
        .map(from_snapshot)
        .transpose()
}

/// Every club in the league, accepted or pending, in id order.
pub async fn in_league(
    store: &dyn EntityStore,
    league_id: &LeagueId,
) -> Result<Vec<Versioned<Club>>, DomainError> {
    let query = Query::collection(paths::clubs(league_id)?);
    store
        .query(&query)
        .await
        .map_err(map_store_err)?
        .into_iter()
        .map(from_snapshot)
        .collect()
}
