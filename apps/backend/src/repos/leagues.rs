//! League records.

use crate::domain::{League, LeagueId};
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_store_err;
use crate::store::EntityStore;

use super::{decode, paths, Versioned};

pub async fn find(
    store: &dyn EntityStore,
    id: &LeagueId,
) -> Result<Option<Versioned<League>>, DomainError> {
    let path = paths::league(id)?;
    let Some(snap) = store.get(&path).await.map_err(map_store_err)? else {
        return Ok(None);
    };
    let mut league = decode::<League>(snap)?;
    league.value.id = id.clone();
    Ok(Some(league))
}
