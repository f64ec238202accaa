//! Response bodies for records whose id lives in the document path.

use serde::Serialize;

use crate::domain::{Club, ClubId, League, LeagueId, UserId, UserRecord};

#[derive(Debug, Serialize)]
pub struct LeagueResponse {
    pub id: LeagueId,
    #[serde(flatten)]
    pub league: League,
}

impl From<League> for LeagueResponse {
    fn from(league: League) -> Self {
        Self {
            id: league.id.clone(),
            league,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClubResponse {
    pub id: ClubId,
    #[serde(flatten)]
    pub club: Club,
}

impl From<Club> for ClubResponse {
    fn from(club: Club) -> Self {
        Self {
            id: club.id.clone(),
            club,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub id: UserId,
    #[serde(flatten)]
    pub user: UserRecord,
}

impl From<UserRecord> for MembershipResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            user,
        }
    }
}
