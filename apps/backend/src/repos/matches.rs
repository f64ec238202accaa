//! Match records.

use serde::Deserialize;

use crate::domain::{LeagueId, MatchId, MatchRecord, UserId};
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_store_err;
use crate::store::{EntityStore, FieldPath, Query, Snapshot};

use super::{decode, paths, Versioned};

/// Listing filters; `None` leaves a field unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFilter {
    pub published: Option<bool>,
    pub conflict: Option<bool>,
    pub submission_count: Option<u32>,
}

fn from_snapshot(snap: Snapshot) -> Result<Versioned<MatchRecord>, DomainError> {
    let id = MatchId::from(snap.path.id());
    let mut record = decode::<MatchRecord>(snap)?;
    record.value.match_id = id;
    Ok(record)
}

pub async fn find(
    store: &dyn EntityStore,
    league_id: &LeagueId,
    match_id: &MatchId,
) -> Result<Option<Versioned<MatchRecord>>, DomainError> {
    let path = paths::match_doc(league_id, match_id)?;
    store
        .get(&path)
        .await
        .map_err(map_store_err)?
        .map(from_snapshot)
        .transpose()
}

/// Matches of one league, ordered by fixture number.
pub async fn in_league(
    store: &dyn EntityStore,
    league_id: &LeagueId,
    filter: MatchFilter,
) -> Result<Vec<Versioned<MatchRecord>>, DomainError> {
    let mut query = Query::collection(paths::matches(league_id)?).order_by(FieldPath::field("id"));
    if let Some(published) = filter.published {
        query = query.where_eq(FieldPath::field("published"), published);
    }
    if let Some(conflict) = filter.conflict {
        query = query.where_eq(FieldPath::field("conflict"), conflict);
    }
    if let Some(count) = filter.submission_count {
        query = query.where_eq(FieldPath::field("submissionCount"), count);
    }
    run(store, &query).await
}

/// Published matches in any league where `user` still owes a stats submission.
pub async fn awaiting_stats(
    store: &dyn EntityStore,
    user: &UserId,
    limit: usize,
) -> Result<Vec<Versioned<MatchRecord>>, DomainError> {
    let query = Query::group(paths::MATCHES)
        .where_eq(FieldPath::field("published"), true)
        .where_array_contains(FieldPath::field("notSubmittedPlayers"), user.as_str())
        .order_by(FieldPath::field("id"))
        .limit(limit);
    run(store, &query).await
}

async fn run(
    store: &dyn EntityStore,
    query: &Query,
) -> Result<Vec<Versioned<MatchRecord>>, DomainError> {
    store
        .query(query)
        .await
        .map_err(map_store_err)?
        .into_iter()
        .map(from_snapshot)
        .collect()
}
