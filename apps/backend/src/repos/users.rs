//! User records and their league pointers.

use crate::domain::{UserId, UserRecord};
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_store_err;
use crate::store::EntityStore;

use super::{decode, paths, Versioned};

pub async fn find(
    store: &dyn EntityStore,
    id: &UserId,
) -> Result<Option<Versioned<UserRecord>>, DomainError> {
    let path = paths::user(id)?;
    let Some(snap) = store.get(&path).await.map_err(map_store_err)? else {
        return Ok(None);
    };
    let mut user = decode::<UserRecord>(snap)?;
    user.value.id = id.clone();
    Ok(Some(user))
}
