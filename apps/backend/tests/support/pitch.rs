//! A league with two accepted clubs, one extra player each, and a fixture
//! between them.

use league_backend::domain::{Actor, Club, ClubId, League, MatchId, SubmissionOutcome};
use league_backend::errors::domain::DomainError;

use super::fixtures::{actor, World};

pub struct Pitch {
    pub world: World,
    pub owner: Actor,
    pub league: League,
    pub home_mgr: Actor,
    pub away_mgr: Actor,
    pub home_player: Actor,
    pub away_player: Actor,
    pub home: Club,
    pub away: Club,
    pub match_id: MatchId,
}

impl Pitch {
    pub async fn new() -> Self {
        Self::on(World::new().await).await
    }

    pub async fn on(world: World) -> Self {
        let owner = actor("owner");
        let (home_mgr, away_mgr) = (actor("home-mgr"), actor("away-mgr"));
        let (home_player, away_player) = (actor("home-player"), actor("away-player"));
        let league = world.league(&owner).await;
        let home = world.accepted_club(&league, &owner, &home_mgr).await;
        let away = world.accepted_club(&league, &owner, &away_mgr).await;
        world.member(&league.id, &home, &home_mgr, &home_player).await;
        world.member(&league.id, &away, &away_mgr, &away_player).await;
        let match_id = world.fixture(&league.id, &home.id, &away.id).await;
        Self {
            world,
            owner,
            league,
            home_mgr,
            away_mgr,
            home_player,
            away_player,
            home,
            away,
            match_id,
        }
    }

    pub async fn submit(
        &self,
        who: &Actor,
        club: &ClubId,
        own: &str,
        opp: &str,
    ) -> Result<SubmissionOutcome, DomainError> {
        self.world
            .services()
            .matches
            .submit_result(who, &self.league.id, &self.match_id, club, own, opp)
            .await
    }

    pub async fn home_submits(&self, own: &str, opp: &str) -> Result<SubmissionOutcome, DomainError> {
        self.submit(&self.home_mgr, &self.home.id, own, opp).await
    }

    pub async fn away_submits(&self, own: &str, opp: &str) -> Result<SubmissionOutcome, DomainError> {
        self.submit(&self.away_mgr, &self.away.id, own, opp).await
    }

    pub async fn motm(
        &self,
        who: &Actor,
        club: &ClubId,
        player: &Actor,
    ) -> Result<SubmissionOutcome, DomainError> {
        self.world
            .services()
            .matches
            .submit_motm(who, &self.league.id, &self.match_id, club, &player.id)
            .await
    }

    /// Home wins 2-1, both sides agreeing.
    pub async fn publish_2_1(&self) {
        self.home_submits("2", "1").await.unwrap();
        self.away_submits("1", "2").await.unwrap();
    }
}
