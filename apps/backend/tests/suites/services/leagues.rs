use league_backend::domain::ClubId;
use league_backend::errors::domain::{DomainError, InfraErrorKind, ValidationKind};
use league_backend::infra::remote_ops::{DELETE_LEAGUE, SCHEDULE_MATCHES};
use league_backend::repos::paths;
use league_backend::services::NewLeague;
use league_backend::store::{EntityStore, Write, WriteBatch};
use serde_json::json;

use crate::support::collaborators::RecordingRemoteOps;
use crate::support::fixtures::new_league;
use crate::support::{actor, World};

#[tokio::test]
async fn owner_gets_an_admin_pointer_without_a_club() {
    let world = World::new().await;
    let owner = actor("owner");
    let league = world.league(&owner).await;

    assert!(league.is_owner(&owner.id));
    assert_eq!(league.accepted_clubs, 0);
    assert!(league.club_index.is_empty());

    let user = world.user(&owner.id).await.expect("owner record");
    let pointer = user.pointer(&league.id).expect("pointer");
    assert!(pointer.admin);
    assert!(pointer.owner);
    assert!(pointer.club_id.is_none());
    assert_eq!(
        world.recorders.analytics.last("create_league").unwrap()["leagueId"],
        json!(league.id)
    );
}

#[tokio::test]
async fn league_settings_and_names_are_validated() {
    let world = World::new().await;
    let owner = actor("owner");

    let err = world
        .services()
        .leagues
        .create_league(
            &owner,
            NewLeague {
                team_num: Some(1),
                ..new_league()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::LeagueSettings, _)
    ));

    let err = world
        .services()
        .leagues
        .create_league(
            &owner,
            NewLeague {
                name: "Heck League".into(),
                ..new_league()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Name, _)));
    assert!(world.user(&owner.id).await.is_none(), "nothing written");
}

#[tokio::test]
async fn scheduling_is_an_admin_remote_call() {
    let world = World::new().await;
    let owner = actor("owner");
    let stranger = actor("stranger");
    let league = world.league(&owner).await;

    let err = world
        .services()
        .leagues
        .schedule_matches(&stranger, &league.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
    assert!(world.recorders.remote.calls().is_empty());

    world
        .services()
        .leagues
        .schedule_matches(&owner, &league.id)
        .await
        .unwrap();
    let calls = world.recorders.remote.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, SCHEDULE_MATCHES);
    assert_eq!(calls[0].1["leagueId"], json!(league.id));
}

#[tokio::test]
async fn remote_failures_surface_and_are_not_retried() {
    let world = World::builder()
        .remote(RecordingRemoteOps::failing())
        .build()
        .await;
    let owner = actor("owner");
    let league = world.league(&owner).await;

    let err = world
        .services()
        .leagues
        .delete_league(&owner, &league.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Infra(InfraErrorKind::RemoteOperation, _)
    ));
    assert!(err.is_transient());

    let calls = world.recorders.remote.calls();
    assert_eq!(calls.len(), 1, "one attempt only");
    assert_eq!(calls[0].0, DELETE_LEAGUE);
}

#[tokio::test]
async fn only_the_owner_deletes() {
    let world = World::new().await;
    let owner = actor("owner");
    let league = world.league(&owner).await;

    let err = world
        .services()
        .leagues
        .delete_league(&actor("other"), &league.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    world
        .services()
        .leagues
        .delete_league(&owner, &league.id)
        .await
        .unwrap();
    assert_eq!(world.recorders.remote.calls()[0].1["ownerId"], json!(owner.id));
}

#[tokio::test]
async fn standings_rank_by_points_only_keeping_stored_order_on_ties() {
    let world = World::new().await;
    let owner = actor("owner");
    let league = world.league(&owner).await;

    let row = |name: &str, scored: i64, conceded: i64, points: i64| {
        json!({
            "name": name, "played": 4, "won": 0, "drawn": 0, "lost": 0,
            "scored": scored, "conceded": conceded, "points": points,
        })
    };
    let serde_json::Value::Object(doc) = json!({
        "first": row("First", 4, 4, 10),
        "third": row("Third", 1, 0, 7),
        "second": row("Second", 12, 0, 10),
    }) else {
        unreachable!()
    };
    let mut batch = WriteBatch::new();
    batch.push(Write::set(paths::standings(&league.id).unwrap(), doc));
    world.store.commit(batch).await.unwrap();

    let ranked = world
        .services()
        .leagues
        .standings(&league.id)
        .await
        .unwrap();
    let order: Vec<&ClubId> = ranked.iter().map(|r| &r.club_id).collect();
    assert_eq!(
        order,
        [
            &ClubId::from("first"),
            &ClubId::from("second"),
            &ClubId::from("third")
        ]
    );
    assert_eq!(ranked[1].goal_difference, 12);
    assert_eq!(ranked[0].position, 1);
    assert_eq!(ranked[2].points, 7);
}

#[tokio::test]
async fn unknown_league_is_not_found() {
    let world = World::new().await;
    let err = world
        .services()
        .leagues
        .get_league(&"nope".into())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
