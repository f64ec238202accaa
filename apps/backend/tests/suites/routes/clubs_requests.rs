use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details;
use serde_json::json;

use crate::common::read_json;
use crate::support::{actor, bearer, create_test_app, World};

#[actix_web::test]
async fn club_joins_a_league_and_a_player_joins_the_club() {
    let world = World::new().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let player = actor("player");
    let league = world.league(&owner).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;
    let base = format!("/api/leagues/{}", league.id);

    // manager founds a club; it waits on the league
    let req = test::TestRequest::post()
        .uri(&format!("{base}/clubs"))
        .insert_header(bearer(&world.state, &manager))
        .set_json(json!({ "name": "  Rovers United  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let club = read_json(resp).await;
    assert_eq!(club["name"], "Rovers United");
    assert_eq!(club["accepted"], false);
    let club_id = club["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("{base}/requests"))
        .insert_header(bearer(&world.state, &owner))
        .to_request();
    let pending = read_json(test::call_service(&app, req).await).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["kind"], "leagueJoin");
    assert_eq!(pending[0]["clubId"], club_id.as_str());
    assert_eq!(pending[0]["userId"], manager.id.as_str());

    let req = test::TestRequest::post()
        .uri(&format!("{base}/clubs/{club_id}/accept"))
        .insert_header(bearer(&world.state, &owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        read_json(resp).await,
        json!({ "state": "accepted", "changed": true })
    );

    // player asks in; manager sees and accepts
    let req = test::TestRequest::post()
        .uri(&format!("{base}/clubs/{club_id}/requests"))
        .insert_header(bearer(&world.state, &player))
        .to_request();
    assert_eq!(
        read_json(test::call_service(&app, req).await).await,
        json!({ "state": "pending", "changed": true })
    );

    let req = test::TestRequest::get()
        .uri("/api/me/requests")
        .insert_header(bearer(&world.state, &manager))
        .to_request();
    let overview = read_json(test::call_service(&app, req).await).await;
    assert_eq!(overview["club"].as_array().unwrap().len(), 1);
    assert_eq!(overview["club"][0]["userId"], player.id.as_str());
    assert_eq!(overview["club"][0]["kind"], "clubJoin");

    let req = test::TestRequest::post()
        .uri(&format!("{base}/clubs/{club_id}/requests/{}/accept", player.id))
        .insert_header(bearer(&world.state, &manager))
        .to_request();
    assert_eq!(
        read_json(test::call_service(&app, req).await).await,
        json!({ "state": "accepted", "changed": true })
    );

    // accepting again is a no-op
    let req = test::TestRequest::post()
        .uri(&format!("{base}/clubs/{club_id}/requests/{}/accept", player.id))
        .insert_header(bearer(&world.state, &manager))
        .to_request();
    assert_eq!(
        read_json(test::call_service(&app, req).await).await,
        json!({ "state": "accepted", "changed": false })
    );

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(bearer(&world.state, &player))
        .to_request();
    let me = read_json(test::call_service(&app, req).await).await;
    let pointer = &me["leagues"][league.id.as_str()];
    assert_eq!(pointer["clubId"], club_id.as_str());
    assert_eq!(pointer["clubName"], "Rovers United");
    assert_eq!(pointer["accepted"], true);
    assert_eq!(pointer["manager"], false);

    world.assert_consistent(&league.id).await;
}

#[actix_web::test]
async fn a_second_club_in_the_same_league_conflicts() {
    let world = World::new().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let league = world.league(&owner).await;
    world.accepted_club(&league, &owner, &manager).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/leagues/{}/clubs", league.id))
        .insert_header(bearer(&world.state, &manager))
        .set_json(json!({ "name": "Second Eleven" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "ALREADY_IN_LEAGUE", StatusCode::CONFLICT, None).await;
}

#[actix_web::test]
async fn removing_a_player_twice_reports_already_removed() {
    let world = World::new().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let player = actor("player");
    let league = world.league(&owner).await;
    let club = world.accepted_club(&league, &owner, &manager).await;
    world.member(&league.id, &club, &manager, &player).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;
    let uri = format!(
        "/api/leagues/{}/clubs/{}/players/{}",
        league.id, club.id, player.id
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&world.state, &manager))
        .to_request();
    assert_eq!(
        read_json(test::call_service(&app, req).await).await,
        json!({ "outcome": "removed" })
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&world.state, &manager))
        .to_request();
    assert_eq!(
        read_json(test::call_service(&app, req).await).await,
        json!({ "outcome": "alreadyRemoved" })
    );
    world.assert_consistent(&league.id).await;
}

#[actix_web::test]
async fn only_the_manager_reads_club_requests() {
    let world = World::new().await;
    let owner = actor("owner");
    let manager = actor("manager");
    let league = world.league(&owner).await;
    let club = world.accepted_club(&league, &owner, &manager).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/leagues/{}/clubs/{}/requests",
            league.id, club.id
        ))
        .insert_header(bearer(&world.state, &actor("nosy")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "FORBIDDEN", StatusCode::FORBIDDEN, None).await;
}

#[actix_web::test]
async fn swapping_clubs_over_http() {
    let world = World::new().await;
    let owner = actor("owner");
    let (a, b) = (actor("a"), actor("b"));
    let league = world.league(&owner).await;
    let slot = world.accepted_club(&league, &owner, &a).await;
    let incoming = world.accepted_club(&league, &owner, &b).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/leagues/{}/swaps", league.id))
        .insert_header(bearer(&world.state, &owner))
        .set_json(json!({ "slotClubId": slot.id, "incomingClubId": incoming.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let seated = read_json(resp).await;
    assert_eq!(seated["id"], slot.id.as_str());
    assert_eq!(seated["name"], incoming.name.as_str());
    assert_eq!(seated["managerId"], b.id.as_str());
    world.assert_consistent(&league.id).await;
}
