//! Join requests: users asking into clubs, clubs asking into leagues.

use actix_web::{web, HttpResponse};

use crate::domain::{ClubId, LeagueId, RequestOutcome, UserId};
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::app_state::AppState;

fn outcome(outcome: RequestOutcome) -> HttpResponse {
    HttpResponse::Ok().json(outcome)
}

async fn request_join(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let result = app_state
        .services
        .requests
        .request_join(&user, &league_id, &club_id)
        .await?;
    Ok(outcome(result))
}

async fn cancel_join(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let result = app_state
        .services
        .requests
        .cancel_join(&user, &league_id, &club_id)
        .await?;
    Ok(outcome(result))
}

async fn club_requests(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let views = app_state
        .services
        .requests
        .club_requests(&user, &league_id, &club_id)
        .await?;
    Ok(HttpResponse::Ok().json(views))
}

async fn accept_member(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId, UserId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id, member) = path.into_inner();
    let result = app_state
        .services
        .requests
        .accept_member(&user, &league_id, &club_id, &member)
        .await?;
    Ok(outcome(result))
}

async fn decline_member(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId, UserId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id, member) = path.into_inner();
    let result = app_state
        .services
        .requests
        .decline_member(&user, &league_id, &club_id, &member)
        .await?;
    Ok(outcome(result))
}

async fn league_requests(
    user: CurrentUser,
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let views = app_state
        .services
        .requests
        .league_requests(&user, &path)
        .await?;
    Ok(HttpResponse::Ok().json(views))
}

async fn accept_club(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let result = app_state
        .services
        .requests
        .accept_club(&user, &league_id, &club_id)
        .await?;
    Ok(outcome(result))
}

async fn decline_club(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let result = app_state
        .services
        .requests
        .decline_club(&user, &league_id, &club_id)
        .await?;
    Ok(outcome(result))
}

async fn cancel_club(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let result = app_state
        .services
        .requests
        .cancel_club(&user, &league_id, &club_id)
        .await?;
    Ok(outcome(result))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // club-join
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}/requests")
            .route(web::get().to(club_requests))
            .route(web::post().to(request_join))
            .route(web::delete().to(cancel_join)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}/requests/{user_id}/accept")
            .route(web::post().to(accept_member)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}/requests/{user_id}/decline")
            .route(web::post().to(decline_member)),
    );

    // league-join
    cfg.service(web::resource("/leagues/{league_id}/requests").route(web::get().to(league_requests)));
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}/accept").route(web::post().to(accept_club)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}/decline")
            .route(web::post().to(decline_club)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}/cancel").route(web::post().to(cancel_club)),
    );
}
