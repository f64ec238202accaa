use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::dto::LeagueResponse;
use crate::domain::{LeagueId, Platform};
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::services::NewLeague;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeagueRequest {
    pub name: String,
    pub platform: Platform,
    #[serde(default)]
    pub team_num: Option<u32>,
    #[serde(default)]
    pub match_num: Option<u32>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub description: Option<String>,
}

async fn create_league(
    user: CurrentUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<CreateLeagueRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let league = app_state
        .services
        .leagues
        .create_league(
            &user,
            NewLeague {
                name: body.name,
                platform: body.platform,
                team_num: body.team_num,
                match_num: body.match_num,
                private: body.private,
                description: body.description,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(LeagueResponse::from(league)))
}

async fn get_league(
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let league = app_state.services.leagues.get_league(&path).await?;
    Ok(HttpResponse::Ok().json(LeagueResponse::from(league)))
}

async fn delete_league(
    user: CurrentUser,
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.services.leagues.delete_league(&user, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn schedule_matches(
    user: CurrentUser,
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state
        .services
        .leagues
        .schedule_matches(&user, &path)
        .await?;
    Ok(HttpResponse::Accepted().json(json!({ "scheduled": true })))
}

async fn standings(
    path: web::Path<LeagueId>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let rows = app_state.services.leagues.standings(&path).await?;
    Ok(HttpResponse::Ok().json(rows))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/leagues").route(web::post().to(create_league)));
    cfg.service(
        web::resource("/leagues/{league_id}")
            .route(web::get().to(get_league))
            .route(web::delete().to(delete_league)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/schedule").route(web::post().to(schedule_matches)),
    );
    cfg.service(web::resource("/leagues/{league_id}/standings").route(web::get().to(standings)));
}
