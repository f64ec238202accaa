//! The per-league standings aggregate: one document keyed by club id.

use crate::domain::{ClubId, ClubStanding, LeagueId};
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_store_err;
use crate::store::{EntityStore, StoreError};

use super::paths;

/// Rows in stored key order. A league with no published match has none.
pub async fn load(
    store: &dyn EntityStore,
    league_id: &LeagueId,
) -> Result<Vec<(ClubId, ClubStanding)>, DomainError> {
    let path = paths::standings(league_id)?;
    let Some(snap) = store.get(&path).await.map_err(map_store_err)? else {
        return Ok(Vec::new());
    };

    snap.data
        .into_iter()
        .map(|(club_id, row)| {
            serde_json::from_value::<ClubStanding>(row)
                .map(|standing| (ClubId::from(club_id), standing))
                .map_err(|e| {
                    map_store_err(StoreError::Corrupt {
                        path: path.to_string(),
                        detail: e.to_string(),
                    })
                })
        })
        .collect()
}
