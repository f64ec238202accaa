use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details;
use backend_test_support::unique_helpers::unique_name;
use league_backend::infra::remote_ops::SCHEDULE_MATCHES;
use serde_json::json;

use crate::common::read_json;
use crate::support::collaborators::RecordingRemoteOps;
use crate::support::{actor, bearer, create_test_app, World};

#[actix_web::test]
async fn create_league_returns_the_new_league() {
    let world = World::new().await;
    let owner = actor("owner");
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let name = unique_name("League");
    let req = test::TestRequest::post()
        .uri("/api/leagues")
        .insert_header(bearer(&world.state, &owner))
        .set_json(json!({ "name": name, "platform": "ps", "teamNum": 8 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = read_json(resp).await;
    assert_eq!(body["name"], name.as_str());
    assert_eq!(body["platform"], "ps");
    assert_eq!(body["teamNum"], 8);
    assert_eq!(body["ownerId"], owner.id.as_str());
    assert_eq!(body["acceptedClubs"], 0);
    assert_eq!(body["scheduled"], false);

    let id = body["id"].as_str().expect("league id");
    let req = test::TestRequest::get()
        .uri(&format!("/api/leagues/{id}"))
        .insert_header(bearer(&world.state, &actor("reader")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["name"], name.as_str());
}

#[actix_web::test]
async fn blocked_league_names_are_invalid() {
    let world = World::new().await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::post()
        .uri("/api/leagues")
        .insert_header(bearer(&world.state, &actor("owner")))
        .set_json(json!({ "name": "What The Heck", "platform": "xb" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "INVALID_NAME", StatusCode::BAD_REQUEST, None).await;
}

#[actix_web::test]
async fn unknown_platform_is_a_bad_request() {
    let world = World::new().await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::post()
        .uri("/api/leagues")
        .insert_header(bearer(&world.state, &actor("owner")))
        .set_json(json!({ "name": "Sunday League", "platform": "dreamcast" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "BAD_REQUEST", StatusCode::BAD_REQUEST, None).await;
}

#[actix_web::test]
async fn missing_league_is_not_found() {
    let world = World::new().await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri("/api/leagues/no-such-league")
        .insert_header(bearer(&world.state, &actor("reader")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "LEAGUE_NOT_FOUND", StatusCode::NOT_FOUND, None).await;
}

#[actix_web::test]
async fn scheduling_is_admin_only_and_happens_once() {
    let world = World::new().await;
    let owner = actor("owner");
    let league = world.league(&owner).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;
    let uri = format!("/api/leagues/{}/schedule", league.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&world.state, &actor("stranger")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "FORBIDDEN", StatusCode::FORBIDDEN, None).await;

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&world.state, &owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(
        world.recorders.remote.calls(),
        vec![(SCHEDULE_MATCHES.to_string(), json!({ "leagueId": league.id }))]
    );
}

#[actix_web::test]
async fn scheduled_league_refuses_club_removal_with_409() {
    let world = World::new().await;
    let owner = actor("owner");
    let league = world.league(&owner).await;
    let club = world.accepted_club(&league, &owner, &actor("manager")).await;
    world.mark_scheduled(&league.id).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/leagues/{}/clubs/{}", league.id, club.id))
        .insert_header(bearer(&world.state, &owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "LEAGUE_SCHEDULED", StatusCode::CONFLICT, None).await;
}

#[actix_web::test]
async fn failed_remote_scheduling_is_a_bad_gateway() {
    let world = World::builder()
        .remote(RecordingRemoteOps::failing())
        .build()
        .await;
    let owner = actor("owner");
    let league = world.league(&owner).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/leagues/{}/schedule", league.id))
        .insert_header(bearer(&world.state, &owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(
        resp,
        "REMOTE_OPERATION_FAILED",
        StatusCode::BAD_GATEWAY,
        None,
    )
    .await;
}

#[actix_web::test]
async fn standings_are_served_ranked() {
    let world = World::new().await;
    let owner = actor("owner");
    let league = world.league(&owner).await;
    let app = create_test_app(world.state.clone())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/leagues/{}/standings", league.id))
        .insert_header(bearer(&world.state, &owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await, json!([]));
}
