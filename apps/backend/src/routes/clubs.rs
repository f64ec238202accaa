use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::dto::ClubResponse;
use crate::domain::{ClubId, LeagueId, UserId};
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateClubRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_club_id: ClubId,
    pub to_club_id: ClubId,
    pub player_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub slot_club_id: ClubId,
    pub incoming_club_id: ClubId,
}

async fn list_clubs(
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let clubs: Vec<ClubResponse> = app_state
        .services
        .clubs
        .list_clubs(&path)
        .await?
        .into_iter()
        .map(ClubResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(clubs))
}

async fn create_club(
    user: CurrentUser,
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
    body: ValidatedJson<CreateClubRequest>,
) -> Result<HttpResponse, AppError> {
    let club = app_state
        .services
        .clubs
        .create_club(&user, &path, &body.name)
        .await?;
    Ok(HttpResponse::Created().json(ClubResponse::from(club)))
}

async fn get_club(
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let club = app_state.services.clubs.get_club(&league_id, &club_id).await?;
    Ok(HttpResponse::Ok().json(ClubResponse::from(club)))
}

async fn remove_club(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id) = path.into_inner();
    let outcome = app_state
        .services
        .clubs
        .remove_club(&user, &league_id, &club_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "outcome": outcome })))
}

async fn remove_player(
    user: CurrentUser,
    path: web::Path<(LeagueId, ClubId, UserId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, club_id, player) = path.into_inner();
    let outcome = app_state
        .services
        .clubs
        .remove_player(&user, &league_id, &club_id, &player)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "outcome": outcome })))
}

async fn transfer_player(
    user: CurrentUser,
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
    body: ValidatedJson<TransferRequest>,
) -> Result<HttpResponse, AppError> {
    app_state
        .services
        .clubs
        .transfer_player(
            &user,
            &path,
            &body.from_club_id,
            &body.to_club_id,
            &body.player_id,
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn swap_clubs(
    user: CurrentUser,
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
    body: ValidatedJson<SwapRequest>,
) -> Result<HttpResponse, AppError> {
    let club = app_state
        .services
        .swaps
        .swap_clubs(&user, &path, &body.slot_club_id, &body.incoming_club_id)
        .await?;
    Ok(HttpResponse::Ok().json(ClubResponse::from(club)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/leagues/{league_id}/clubs")
            .route(web::get().to(list_clubs))
            .route(web::post().to(create_club)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}")
            .route(web::get().to(get_club))
            .route(web::delete().to(remove_club)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/clubs/{club_id}/players/{user_id}")
            .route(web::delete().to(remove_player)),
    );
    cfg.service(web::resource("/leagues/{league_id}/transfers").route(web::post().to(transfer_player)));
    cfg.service(web::resource("/leagues/{league_id}/swaps").route(web::post().to(swap_clubs)));
}
