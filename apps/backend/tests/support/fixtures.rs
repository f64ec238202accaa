//! Test worlds: an app state over an inspectable memory store, plus helpers
//! that seed leagues, clubs, members and matches through the engine.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use backend_test_support::unique_helpers::{unique_name, unique_str};
use league_backend::domain::{
    Actor, Club, ClubId, ClubStanding, League, LeagueId, MatchId, MatchRecord, UserId, UserRecord,
};
use league_backend::repos::paths;
use league_backend::services::{NewLeague, Services};
use league_backend::store::{
    DocPath, EntityStore, FieldOp, FieldPath, MemoryStore, Write, WriteBatch,
};
use league_backend::{build_state, AppState};
use serde_json::Value;

use super::collaborators::{Recorders, RecordingRemoteOps};

pub fn actor(prefix: &str) -> Actor {
    let id = unique_str(prefix);
    Actor::new(id.as_str(), prefix)
}

pub fn new_league() -> NewLeague {
    NewLeague {
        name: unique_name("League"),
        platform: league_backend::domain::Platform::Ps,
        team_num: None,
        match_num: None,
        private: false,
        description: None,
    }
}

/// Write an unsubmitted fixture straight into `store`.
pub async fn seed_fixture(
    store: &dyn EntityStore,
    league: &LeagueId,
    home: &ClubId,
    away: &ClubId,
) -> MatchId {
    let match_id = MatchId::generate();
    let record = MatchRecord {
        match_id: match_id.clone(),
        fixture: 1,
        league_id: league.clone(),
        home_team_id: home.clone(),
        away_team_id: away.clone(),
        teams: vec![home.clone(), away.clone()],
        submissions: Default::default(),
        motm_submissions: Default::default(),
        motm: None,
        published: false,
        conflict: false,
        motm_conflict: false,
        submission_count: 0,
        result: Default::default(),
        players: Default::default(),
        not_submitted_players: Vec::new(),
    };
    let Value::Object(data) = serde_json::to_value(&record).expect("encode match") else {
        panic!("match encodes to an object");
    };
    let mut batch = WriteBatch::new();
    batch.push(Write::set(
        paths::match_doc(league, &match_id).expect("match path"),
        data,
    ));
    store.commit(batch).await.expect("seed match");
    match_id
}

pub struct World {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub recorders: Recorders,
}

pub struct WorldBuilder {
    memory: Arc<MemoryStore>,
    store: Option<Arc<dyn EntityStore>>,
    remote: RecordingRemoteOps,
    store_timeout: Option<Duration>,
    max_attempts: Option<u32>,
}

impl WorldBuilder {
    /// Serve reads and writes through `store`; `memory` stays the handle
    /// tests inspect.
    pub fn through(mut self, memory: Arc<MemoryStore>, store: Arc<dyn EntityStore>) -> Self {
        self.memory = memory;
        self.store = Some(store);
        self
    }

    pub fn remote(mut self, remote: RecordingRemoteOps) -> Self {
        self.remote = remote;
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    pub async fn build(self) -> World {
        let recorders = Recorders::new(self.remote);
        let store = match self.store {
            Some(store) => store,
            None => self.memory.clone() as Arc<dyn EntityStore>,
        };
        let mut builder = build_state()
            .with_store(store)
            .with_collaborators(recorders.collaborators());
        if let Some(timeout) = self.store_timeout {
            builder = builder.with_store_timeout(timeout);
        }
        if let Some(n) = self.max_attempts {
            builder = builder.with_max_attempts(n);
        }
        let state = builder.build().await.expect("build test state");
        World {
            state,
            store: self.memory,
            recorders,
        }
    }
}

impl World {
    pub fn builder() -> WorldBuilder {
        WorldBuilder {
            memory: Arc::new(MemoryStore::new()),
            store: None,
            remote: RecordingRemoteOps::default(),
            store_timeout: None,
            max_attempts: None,
        }
    }

    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn services(&self) -> &Services {
        &self.state.services
    }

    /// A fresh league owned (and administered) by `owner`.
    pub async fn league(&self, owner: &Actor) -> League {
        self.services()
            .leagues
            .create_league(owner, new_league())
            .await
            .expect("create league")
    }

    /// A club created by `manager` and admitted by `admin` when needed.
    pub async fn accepted_club(&self, league: &League, admin: &Actor, manager: &Actor) -> Club {
        let club = self
            .services()
            .clubs
            .create_club(manager, &league.id, &unique_name("Club"))
            .await
            .expect("create club");
        if !club.accepted {
            self.services()
                .requests
                .accept_club(admin, &league.id, &club.id)
                .await
                .expect("accept club");
        }
        self.club(&league.id, &club.id).await.expect("club exists")
    }

    /// `player` asks to join and the club's manager accepts.
    pub async fn member(&self, league: &LeagueId, club: &Club, manager: &Actor, player: &Actor) {
        let requests = &self.services().requests;
        requests
            .request_join(player, league, &club.id)
            .await
            .expect("request join");
        requests
            .accept_member(manager, league, &club.id, &player.id)
            .await
            .expect("accept member");
    }

    /// Store an unsubmitted fixture between two clubs, the way the external
    /// scheduler would.
    pub async fn fixture(&self, league: &LeagueId, home: &ClubId, away: &ClubId) -> MatchId {
        seed_fixture(self.store.as_ref(), league, home, away).await
    }

    /// Flip the league to scheduled without going through the remote call.
    pub async fn mark_scheduled(&self, league: &LeagueId) {
        let mut batch = WriteBatch::new();
        batch.push(Write::update(
            paths::league(league).unwrap(),
            vec![FieldOp::put(FieldPath::field("scheduled"), true)],
        ));
        self.store.commit(batch).await.unwrap();
    }

    pub async fn raw(&self, path: &DocPath) -> Option<Value> {
        self.store
            .get(path)
            .await
            .expect("read doc")
            .map(|s| Value::Object(s.data))
    }

    pub async fn league_record(&self, id: &LeagueId) -> League {
        self.services()
            .leagues
            .get_league(id)
            .await
            .expect("league exists")
    }

    pub async fn club(&self, league: &LeagueId, id: &ClubId) -> Option<Club> {
        self.state
            .ledger
            .find_club(league, id)
            .await
            .expect("read club")
            .map(|c| c.value)
    }

    pub async fn user(&self, id: &UserId) -> Option<UserRecord> {
        self.state
            .ledger
            .user(id)
            .await
            .expect("read user")
            .map(|u| u.value)
    }

    pub async fn match_record(&self, league: &LeagueId, id: &MatchId) -> MatchRecord {
        self.state
            .ledger
            .match_record(league, id)
            .await
            .expect("match exists")
            .value
    }

    pub async fn standing(&self, league: &LeagueId, club: &ClubId) -> Option<ClubStanding> {
        self.state
            .ledger
            .standings(league)
            .await
            .expect("read standings")
            .into_iter()
            .find(|(id, _)| id == club)
            .map(|(_, row)| row)
    }

    /// Club index, accepted count and every accepted member's pointer agree
    /// with the club records.
    pub async fn assert_consistent(&self, league_id: &LeagueId) {
        let league = self.league_record(league_id).await;
        let clubs = self
            .state
            .ledger
            .clubs(league_id)
            .await
            .expect("list clubs");

        let accepted = clubs.iter().filter(|c| c.accepted).count() as i64;
        assert_eq!(league.accepted_clubs, accepted, "acceptedClubs");

        let index: BTreeMap<ClubId, String> = clubs
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        assert_eq!(league.club_index, index, "clubIndex");

        for club in &clubs {
            for (user_id, _) in club.accepted_members() {
                let user = self.user(user_id).await.expect("member has a record");
                assert_eq!(
                    user.club_in(league_id),
                    Some(&club.id),
                    "pointer of {user_id}"
                );
            }
        }
    }

    /// Every live document; used to assert an operation changed nothing.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        self.store
            .dump()
            .into_iter()
            .map(|s| (s.path.to_string(), s.version))
            .collect()
    }
}
