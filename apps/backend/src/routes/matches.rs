use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{ClubId, LeagueId, MatchId, UserId};
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::ledger::PlayerStats;
use crate::repos::matches::MatchFilter;
use crate::state::app_state::AppState;

/// Clients send scores as strings or numbers; validation happens in the engine.
fn raw_score(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub club_id: ClubId,
    pub own_score: Value,
    pub opp_score: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotmRequest {
    pub club_id: ClubId,
    pub player_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    pub rating: u8,
    pub goals: u32,
    pub assists: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveSubmissionQuery {
    #[serde(default)]
    pub player_id: Option<UserId>,
}

async fn list_matches(
    path: web::Path<LeagueId>,
    filter: web::Query<MatchFilter>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let views = app_state
        .services
        .matches
        .list_matches(&path, filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(views))
}

async fn submit_result(
    user: CurrentUser,
    path: web::Path<(LeagueId, MatchId)>,
    app_state: web::Data<AppState>,
    body: ValidatedJson<ResultRequest>,
) -> Result<HttpResponse, AppError> {
    let (league_id, match_id) = path.into_inner();
    let outcome = app_state
        .services
        .matches
        .submit_result(
            &user,
            &league_id,
            &match_id,
            &body.club_id,
            &raw_score(&body.own_score),
            &raw_score(&body.opp_score),
        )
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "outcome": outcome })))
}

async fn submit_motm(
    user: CurrentUser,
    path: web::Path<(LeagueId, MatchId)>,
    app_state: web::Data<AppState>,
    body: ValidatedJson<MotmRequest>,
) -> Result<HttpResponse, AppError> {
    let (league_id, match_id) = path.into_inner();
    let outcome = app_state
        .services
        .matches
        .submit_motm(&user, &league_id, &match_id, &body.club_id, &body.player_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "outcome": outcome })))
}

async fn submit_stats(
    user: CurrentUser,
    path: web::Path<(LeagueId, MatchId)>,
    app_state: web::Data<AppState>,
    body: ValidatedJson<StatsRequest>,
) -> Result<HttpResponse, AppError> {
    let (league_id, match_id) = path.into_inner();
    let stats = PlayerStats {
        rating: body.rating,
        goals: body.goals,
        assists: body.assists,
    };
    app_state
        .services
        .matches
        .submit_player_stats(&user, &league_id, &match_id, stats)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn skip_stats(
    user: CurrentUser,
    path: web::Path<(LeagueId, MatchId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, match_id) = path.into_inner();
    app_state
        .services
        .matches
        .skip_player_stats(&user, &league_id, &match_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn undo_published(
    user: CurrentUser,
    path: web::Path<(LeagueId, MatchId)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, match_id) = path.into_inner();
    app_state
        .services
        .matches
        .undo_published_match(&user, &league_id, &match_id)
        .await?;
    Ok(HttpResponse::Accepted().finish())
}

async fn remove_submission(
    user: CurrentUser,
    path: web::Path<(LeagueId, MatchId, ClubId)>,
    query: web::Query<RemoveSubmissionQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (league_id, match_id, club_id) = path.into_inner();
    app_state
        .services
        .matches
        .remove_submission(
            &user,
            &league_id,
            &match_id,
            &club_id,
            query.player_id.as_ref(),
        )
        .await?;
    Ok(HttpResponse::Accepted().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/leagues/{league_id}/matches").route(web::get().to(list_matches)));
    cfg.service(
        web::resource("/leagues/{league_id}/matches/{match_id}/result")
            .route(web::post().to(submit_result)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/matches/{match_id}/motm")
            .route(web::post().to(submit_motm)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/matches/{match_id}/stats")
            .route(web::post().to(submit_stats)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/matches/{match_id}/stats/skip")
            .route(web::post().to(skip_stats)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/matches/{match_id}/undo")
            .route(web::post().to(undo_published)),
    );
    cfg.service(
        web::resource("/leagues/{league_id}/matches/{match_id}/submissions/{club_id}")
            .route(web::delete().to(remove_submission)),
    );
}
