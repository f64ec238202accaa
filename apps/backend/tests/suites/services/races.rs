//! Competing writers, store refusals and stalls.
//!
//! The interleaving store lets a second actor's whole operation land between
//! the first actor's read and its commit.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use league_backend::domain::{RequestOutcome, RequestState, SubmissionOutcome};
use league_backend::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use league_backend::services::Removal;
use league_backend::store::{EntityStore, MemoryStore, Write, WriteBatch};

use crate::support::fixtures::new_league;
use crate::support::pitch::Pitch;
use crate::support::stores::{InterleavingStore, StalledStore};
use crate::support::{actor, World};

async fn interleaved() -> (World, Arc<InterleavingStore>) {
    let memory = Arc::new(MemoryStore::new());
    let racing = Arc::new(InterleavingStore::new(memory.clone()));
    let world = World::builder()
        .through(memory, racing.clone())
        .build()
        .await;
    (world, racing)
}

#[tokio::test]
async fn simultaneous_agreeing_submissions_publish_exactly_once() {
    let (world, racing) = interleaved().await;
    let p = Pitch::on(world).await;

    let matches = p.world.services().matches.clone();
    let (league, m, away, away_mgr) = (
        p.league.id.clone(),
        p.match_id.clone(),
        p.away.id.clone(),
        p.away_mgr.clone(),
    );
    racing.before_next_commit(move || {
        async move {
            let outcome = matches
                .submit_result(&away_mgr, &league, &m, &away, "1", "2")
                .await
                .unwrap();
            assert_eq!(outcome, SubmissionOutcome::FirstSubmission);
        }
        .boxed()
    });

    // Home read an empty submissions map, but the away claim landed first.
    let outcome = p.home_submits("2", "1").await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Success);

    let record = p.world.match_record(&p.league.id, &p.match_id).await;
    assert!(record.published);
    assert_eq!(record.submission_count, 2);
    let home = p.world.standing(&p.league.id, &p.home.id).await.unwrap();
    assert_eq!((home.played, home.points), (1, 3), "folded once");
}

#[tokio::test]
async fn simultaneous_disagreeing_submissions_conflict_once() {
    let (world, racing) = interleaved().await;
    let p = Pitch::on(world).await;

    let matches = p.world.services().matches.clone();
    let (league, m, away, away_mgr) = (
        p.league.id.clone(),
        p.match_id.clone(),
        p.away.id.clone(),
        p.away_mgr.clone(),
    );
    racing.before_next_commit(move || {
        async move {
            matches
                .submit_result(&away_mgr, &league, &m, &away, "3", "3")
                .await
                .unwrap();
        }
        .boxed()
    });

    let outcome = p.home_submits("2", "1").await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Conflict);

    let record = p.world.match_record(&p.league.id, &p.match_id).await;
    assert!(record.conflict && !record.published);
    assert_eq!(record.submission_count, 2);
    assert_eq!(
        p.world.league_record(&p.league.id).await.conflict_matches_count,
        1
    );
    assert!(p.world.standing(&p.league.id, &p.home.id).await.is_none());
}

#[tokio::test]
async fn a_spent_retry_budget_surfaces_the_lost_race() {
    let memory = Arc::new(MemoryStore::new());
    let racing = Arc::new(InterleavingStore::new(memory.clone()));
    let world = World::builder()
        .through(memory, racing.clone())
        .max_attempts(1)
        .build()
        .await;
    let p = Pitch::on(world).await;

    let matches = p.world.services().matches.clone();
    let (league, m, away, away_mgr) = (
        p.league.id.clone(),
        p.match_id.clone(),
        p.away.id.clone(),
        p.away_mgr.clone(),
    );
    racing.before_next_commit(move || {
        async move {
            matches
                .submit_result(&away_mgr, &league, &m, &away, "1", "2")
                .await
                .unwrap();
        }
        .boxed()
    });

    let err = p.home_submits("2", "1").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::OptimisticLock, _)
    ));
    assert!(err.is_retryable());

    // The caller's retry sees both claims.
    assert_eq!(
        p.home_submits("2", "1").await.unwrap(),
        SubmissionOutcome::Success
    );
}

#[tokio::test]
async fn simultaneous_join_requests_both_land() {
    let (world, racing) = interleaved().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let (first, second) = (actor("first"), actor("second"));
    let league = world.league(&owner).await;
    let club = world.accepted_club(&league, &owner, &manager).await;

    let requests = world.services().requests.clone();
    let (league_id, club_id, who) = (league.id.clone(), club.id.clone(), second.clone());
    racing.before_next_commit(move || {
        async move {
            requests
                .request_join(&who, &league_id, &club_id)
                .await
                .unwrap();
        }
        .boxed()
    });

    world
        .services()
        .requests
        .request_join(&first, &league.id, &club.id)
        .await
        .unwrap();

    let roster = world.club(&league.id, &club.id).await.unwrap().roster;
    assert!(roster.contains_key(&first.id));
    assert!(roster.contains_key(&second.id));
}

#[tokio::test]
async fn simultaneous_club_removals_decrement_once() {
    let (world, racing) = interleaved().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let league = world.league(&owner).await;
    let club = world.accepted_club(&league, &owner, &manager).await;
    world
        .services()
        .clubs
        .create_club(&owner, &league.id, "Owners Side")
        .await
        .unwrap();
    assert_eq!(world.league_record(&league.id).await.accepted_clubs, 2);

    let clubs = world.services().clubs.clone();
    let (league_id, club_id, admin) = (league.id.clone(), club.id.clone(), owner.clone());
    racing.before_next_commit(move || {
        async move {
            let removal = clubs.remove_club(&admin, &league_id, &club_id).await.unwrap();
            assert_eq!(removal, Removal::Removed);
        }
        .boxed()
    });

    let removal = world
        .services()
        .clubs
        .remove_club(&manager, &league.id, &club.id)
        .await
        .unwrap();
    assert_eq!(removal, Removal::AlreadyRemoved);
    assert_eq!(world.league_record(&league.id).await.accepted_clubs, 1);
    world.assert_consistent(&league.id).await;
}

#[tokio::test]
async fn accept_racing_a_cancel_reports_the_cancel() {
    let (world, racing) = interleaved().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let player = actor("player");
    let league = world.league(&owner).await;
    let club = world.accepted_club(&league, &owner, &manager).await;
    world
        .services()
        .requests
        .request_join(&player, &league.id, &club.id)
        .await
        .unwrap();

    let requests = world.services().requests.clone();
    let (league_id, club_id, who) = (league.id.clone(), club.id.clone(), player.clone());
    racing.before_next_commit(move || {
        async move {
            requests.cancel_join(&who, &league_id, &club_id).await.unwrap();
        }
        .boxed()
    });

    let outcome = world
        .services()
        .requests
        .accept_member(&manager, &league.id, &club.id, &player.id)
        .await
        .unwrap();
    assert_eq!(outcome, RequestOutcome::unchanged(RequestState::Declined));
    assert!(!world
        .club(&league.id, &club.id)
        .await
        .unwrap()
        .roster
        .contains_key(&player.id));
    assert!(world
        .user(&player.id)
        .await
        .unwrap()
        .pointer(&league.id)
        .is_none());
}

#[tokio::test]
async fn multi_record_changes_are_refused_without_atomic_batches() {
    // Seed through an atomic store, then serve the same documents from one
    // that cannot commit batches atomically.
    let p = Pitch::new().await;
    let plain = Arc::new(MemoryStore::without_atomic_batches());
    let mut batch = WriteBatch::new();
    for snap in p.world.store.dump() {
        batch.push(Write::set(snap.path, snap.data));
    }
    plain.commit(batch).await.unwrap();

    let world = World::builder()
        .through(plain.clone(), plain.clone())
        .build()
        .await;
    let before = world.snapshot();

    let err = world
        .services()
        .clubs
        .create_club(&actor("late"), &p.league.id, "Late Comers")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Infra(InfraErrorKind::AtomicityUnsupported, _)
    ));
    assert_eq!(world.snapshot(), before, "nothing written");

    let err = world
        .services()
        .leagues
        .create_league(&actor("owner"), new_league())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Infra(InfraErrorKind::AtomicityUnsupported, _)
    ));

    // A first submission touches only the match document.
    let outcome = world
        .services()
        .matches
        .submit_result(
            &p.home_mgr,
            &p.league.id,
            &p.match_id,
            &p.home.id,
            "1",
            "0",
        )
        .await
        .unwrap();
    assert_eq!(outcome, SubmissionOutcome::FirstSubmission);
}

#[tokio::test]
async fn stalled_commits_time_out_as_transient_failures() {
    let stalled = Arc::new(StalledStore::new(Duration::from_millis(500)));
    let world = World::builder()
        .through(Arc::new(MemoryStore::new()), stalled)
        .store_timeout(Duration::from_millis(50))
        .build()
        .await;

    let err = world
        .services()
        .leagues
        .create_league(&actor("owner"), new_league())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Infra(InfraErrorKind::Timeout, _)));
    assert!(err.is_transient());
    assert!(!err.is_retryable());
}
