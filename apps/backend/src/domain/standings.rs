//! Standings: folding published results and ranking for display.

use serde::Serialize;

use super::ids::ClubId;
use super::records::ClubStanding;

pub const WIN_POINTS: i64 = 3;
pub const DRAW_POINTS: i64 = 1;

/// What one published result adds to one club's record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandingDelta {
    pub played: i64,
    pub won: i64,
    pub drawn: i64,
    pub lost: i64,
    pub scored: i64,
    pub conceded: i64,
    pub points: i64,
}

pub fn fold_result(own: u32, opp: u32) -> StandingDelta {
    let (won, drawn, lost) = match own.cmp(&opp) {
        std::cmp::Ordering::Greater => (1, 0, 0),
        std::cmp::Ordering::Equal => (0, 1, 0),
        std::cmp::Ordering::Less => (0, 0, 1),
    };
    StandingDelta {
        played: 1,
        won,
        drawn,
        lost,
        scored: i64::from(own),
        conceded: i64::from(opp),
        points: won * WIN_POINTS + drawn * DRAW_POINTS,
    }
}

impl ClubStanding {
    pub fn apply(&mut self, delta: StandingDelta) {
        self.played += delta.played;
        self.won += delta.won;
        self.drawn += delta.drawn;
        self.lost += delta.lost;
        self.scored += delta.scored;
        self.conceded += delta.conceded;
        self.points += delta.points;
    }

    pub fn goal_difference(&self) -> i64 {
        self.scored - self.conceded
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRow {
    pub position: usize,
    pub club_id: ClubId,
    pub name: String,
    pub played: i64,
    pub won: i64,
    pub drawn: i64,
    pub lost: i64,
    pub scored: i64,
    pub conceded: i64,
    /// Display only; never used for ordering
    pub goal_difference: i64,
    pub points: i64,
}

/// Rank by points, highest first.
///
/// Points are the only key. Equal points keep the order the rows were
/// stored in; goal difference does not break ties.
pub fn rank(rows: &[(ClubId, ClubStanding)]) -> Vec<RankedRow> {
    let mut ordered: Vec<&(ClubId, ClubStanding)> = rows.iter().collect();
    ordered.sort_by(|a, b| b.1.points.cmp(&a.1.points));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (club_id, s))| RankedRow {
            position: i + 1,
            club_id: club_id.clone(),
            name: s.name.clone(),
            played: s.played,
            won: s.won,
            drawn: s.drawn,
            lost: s.lost,
            scored: s.scored,
            conceded: s.conceded,
            goal_difference: s.goal_difference(),
            points: s.points,
        })
        .collect()
}
