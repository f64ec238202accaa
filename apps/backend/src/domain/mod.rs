//! Domain layer: records, ids and the pure rules over them.

pub mod ids;
pub mod reconcile;
pub mod records;
pub mod requests;
pub mod standings;
pub mod validation;

#[cfg(test)]
mod tests_props_standings;

pub use ids::{Actor, ClubId, LeagueId, MatchId, UserId};
pub use reconcile::{MotmReconciliation, Reconciliation, SubmissionOutcome};
pub use records::{
    AdminEntry, Club, ClubStanding, League, LeaguePointer, MatchPlayer, MatchRecord, MatchState,
    Platform, RosterEntry, Submission, UserRecord,
};
pub use requests::{RequestKind, RequestOutcome, RequestState, RequestView, RequestsOverview};
pub use standings::RankedRow;
