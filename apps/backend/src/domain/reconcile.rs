//! Two-sided agreement rules for match submissions.
//!
//! Each participating club submits independently, keyed by its own id. The
//! decision is made only from the merged, freshly read map, never from what
//! either caller believed the other side had sent.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ids::{ClubId, UserId};
use super::records::Submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Fewer than two sides have submitted
    Pending,
    Agreed { home: u32, away: u32 },
    Disagreed,
}

/// Result reported to the submitting club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionOutcome {
    #[serde(rename = "First Submission")]
    FirstSubmission,
    Success,
    Conflict,
}

impl SubmissionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionOutcome::FirstSubmission => "First Submission",
            SubmissionOutcome::Success => "Success",
            SubmissionOutcome::Conflict => "Conflict",
        }
    }
}

fn both<'a, T>(home: &ClubId, away: &ClubId, map: &'a BTreeMap<ClubId, T>) -> Option<(&'a T, &'a T)> {
    Some((map.get(home)?, map.get(away)?))
}

/// Scores agree when each side's own score is the other side's opponent score.
pub fn reconcile_scores(
    home: &ClubId,
    away: &ClubId,
    submissions: &BTreeMap<ClubId, Submission>,
) -> Reconciliation {
    match both(home, away, submissions) {
        None => Reconciliation::Pending,
        Some((h, a)) if h.own_score == a.opp_score && a.own_score == h.opp_score => {
            Reconciliation::Agreed {
                home: h.own_score,
                away: a.own_score,
            }
        }
        Some(_) => Reconciliation::Disagreed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotmReconciliation {
    Pending,
    Agreed(UserId),
    Disagreed,
}

pub fn reconcile_motm(
    home: &ClubId,
    away: &ClubId,
    submissions: &BTreeMap<ClubId, UserId>,
) -> MotmReconciliation {
    match both(home, away, submissions) {
        None => MotmReconciliation::Pending,
        Some((h, a)) if h == a => MotmReconciliation::Agreed(h.clone()),
        Some(_) => MotmReconciliation::Disagreed,
    }
}
