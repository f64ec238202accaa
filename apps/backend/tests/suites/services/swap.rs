use league_backend::errors::domain::{DomainError, ValidationKind};
use league_backend::repos::paths;
use league_backend::store::{EntityStore, StoreError};
use serde_json::json;

use crate::support::{actor, World};

#[tokio::test]
async fn incoming_club_takes_over_the_slot() {
    let world = World::new().await;
    let owner = actor("owner");
    let (old_mgr, old_player) = (actor("old-mgr"), actor("old-player"));
    let (new_mgr, new_player) = (actor("new-mgr"), actor("new-player"));
    let league = world.league(&owner).await;
    let slot = world.accepted_club(&league, &owner, &old_mgr).await;
    world.member(&league.id, &slot, &old_mgr, &old_player).await;
    let incoming = world.accepted_club(&league, &owner, &new_mgr).await;
    world.member(&league.id, &incoming, &new_mgr, &new_player).await;

    let seated = world
        .services()
        .swaps
        .swap_clubs(&owner, &league.id, &slot.id, &incoming.id)
        .await
        .unwrap();

    assert_eq!(seated.id, slot.id);
    assert_eq!(seated.name, incoming.name);
    assert_eq!(seated.manager_id, new_mgr.id);
    assert_eq!(seated.created, slot.created);
    assert!(seated.accepted);
    assert_eq!(world.club(&league.id, &slot.id).await, Some(seated.clone()));
    assert!(world.club(&league.id, &incoming.id).await.is_none());

    for member in [&new_mgr, &new_player] {
        let pointer = world.user(&member.id).await.unwrap().leagues[&league.id].clone();
        assert_eq!(pointer.club_id.as_ref(), Some(&slot.id));
        assert_eq!(pointer.club_name.as_deref(), Some(incoming.name.as_str()));
        assert!(pointer.accepted);
    }
    assert!(world.user(&new_mgr.id).await.unwrap().leagues[&league.id].manager);
    assert!(!world.user(&new_player.id).await.unwrap().leagues[&league.id].manager);

    for member in [&old_mgr, &old_player] {
        assert!(world
            .user(&member.id)
            .await
            .unwrap()
            .pointer(&league.id)
            .is_none());
    }

    let league_after = world.league_record(&league.id).await;
    assert_eq!(league_after.club_index.len(), 1);
    assert_eq!(league_after.club_index[&slot.id], incoming.name);
    assert_eq!(league_after.accepted_clubs, 1);
    world.assert_consistent(&league.id).await;
}

#[tokio::test]
async fn no_pointer_references_the_incoming_id_afterwards() {
    let world = World::new().await;
    let owner = actor("owner");
    let (a, b, c) = (actor("a"), actor("b"), actor("c"));
    let league = world.league(&owner).await;
    let slot = world.accepted_club(&league, &owner, &a).await;
    let incoming = world.accepted_club(&league, &owner, &b).await;
    world.member(&league.id, &incoming, &b, &c).await;

    world
        .services()
        .swaps
        .swap_clubs(&owner, &league.id, &slot.id, &incoming.id)
        .await
        .unwrap();

    for snap in world.store.dump() {
        if snap.path.as_str().starts_with("users/") {
            let doc = serde_json::Value::Object(snap.data.clone());
            let pointer = &doc["leagues"][league.id.as_str()];
            assert_ne!(
                pointer["clubId"],
                json!(incoming.id),
                "{} still points at the incoming club",
                snap.path
            );
        }
    }
}

#[tokio::test]
async fn admins_in_the_old_roster_keep_their_admin_pointer() {
    let world = World::new().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let league = world.league(&owner).await;
    let slot = world
        .services()
        .clubs
        .create_club(&owner, &league.id, "Owners Side")
        .await
        .unwrap();
    let incoming = world.accepted_club(&league, &owner, &manager).await;

    world
        .services()
        .swaps
        .swap_clubs(&owner, &league.id, &slot.id, &incoming.id)
        .await
        .unwrap();

    let pointer = world.user(&owner.id).await.unwrap().leagues[&league.id].clone();
    assert!(pointer.admin && pointer.owner);
    assert!(pointer.club_id.is_none());
}

#[tokio::test]
async fn the_slot_keeps_its_standings_row_under_the_new_name() {
    let world = World::new().await;
    let owner = actor("owner");
    let (a, b, c) = (actor("a"), actor("b"), actor("c"));
    let league = world.league(&owner).await;
    let slot = world.accepted_club(&league, &owner, &a).await;
    let rival = world.accepted_club(&league, &owner, &b).await;
    let incoming = world.accepted_club(&league, &owner, &c).await;

    let m = world.fixture(&league.id, &slot.id, &rival.id).await;
    let matches = &world.services().matches;
    matches
        .submit_result(&a, &league.id, &m, &slot.id, "3", "0")
        .await
        .unwrap();
    matches
        .submit_result(&b, &league.id, &m, &rival.id, "0", "3")
        .await
        .unwrap();

    world
        .services()
        .swaps
        .swap_clubs(&owner, &league.id, &slot.id, &incoming.id)
        .await
        .unwrap();

    let row = world.standing(&league.id, &slot.id).await.unwrap();
    assert_eq!(row.name, incoming.name);
    assert_eq!(row.points, 3);
    assert_eq!(row.won, 1);
}

#[tokio::test]
async fn a_failed_batch_leaves_no_partial_swap() {
    let world = World::new().await;
    let owner = actor("owner");
    let (a, b) = (actor("a"), actor("b"));
    let league = world.league(&owner).await;
    let slot = world.accepted_club(&league, &owner, &a).await;
    let incoming = world.accepted_club(&league, &owner, &b).await;

    let before = world.snapshot();
    world
        .store
        .fail_next_commit(StoreError::Unavailable("disk on fire".into()));
    let err = world
        .services()
        .swaps
        .swap_clubs(&owner, &league.id, &slot.id, &incoming.id)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(world.snapshot(), before);
    assert!(world
        .store
        .get(&paths::club(&league.id, &incoming.id).unwrap())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn swaps_need_two_distinct_clubs_and_an_admin() {
    let world = World::new().await;
    let owner = actor("owner");
    let (a, b) = (actor("a"), actor("b"));
    let league = world.league(&owner).await;
    let slot = world.accepted_club(&league, &owner, &a).await;
    let incoming = world.accepted_club(&league, &owner, &b).await;

    let err = world
        .services()
        .swaps
        .swap_clubs(&owner, &league.id, &slot.id, &slot.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Other(_), _)));

    let err = world
        .services()
        .swaps
        .swap_clubs(&a, &league.id, &slot.id, &incoming.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn pending_incoming_members_stay_pending_at_the_slot() {
    let world = World::new().await;
    let owner = actor("owner");
    let (a, b, hopeful) = (actor("a"), actor("b"), actor("hopeful"));
    let league = world.league(&owner).await;
    let slot = world.accepted_club(&league, &owner, &a).await;
    let incoming = world.accepted_club(&league, &owner, &b).await;
    world
        .services()
        .requests
        .request_join(&hopeful, &league.id, &incoming.id)
        .await
        .unwrap();

    let seated = world
        .services()
        .swaps
        .swap_clubs(&owner, &league.id, &slot.id, &incoming.id)
        .await
        .unwrap();

    assert!(!seated.roster[&hopeful.id].accepted);
    let pointer = world.user(&hopeful.id).await.unwrap().leagues[&league.id].clone();
    assert_eq!(pointer.club_id.as_ref(), Some(&slot.id));
    assert!(!pointer.accepted);
    world.assert_consistent(&league.id).await;
}
