//! The caller's own view across leagues.

use actix_web::{web, HttpResponse};

use super::dto::MembershipResponse;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::app_state::AppState;

async fn membership(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let record = app_state.services.leagues.membership(&user).await?;
    Ok(HttpResponse::Ok().json(MembershipResponse::from(record)))
}

async fn requests(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let overview = app_state.services.requests.overview(&user).await?;
    Ok(HttpResponse::Ok().json(overview))
}

async fn sent_requests(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let sent = app_state.services.requests.sent_requests(&user).await?;
    Ok(HttpResponse::Ok().json(sent))
}

async fn pending_stats(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let matches = app_state.services.matches.pending_stats(&user).await?;
    Ok(HttpResponse::Ok().json(matches))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/me").route(web::get().to(membership)));
    cfg.service(web::resource("/me/requests").route(web::get().to(requests)));
    cfg.service(web::resource("/me/requests/sent").route(web::get().to(sent_requests)));
    cfg.service(web::resource("/me/pending-stats").route(web::get().to(pending_stats)));
}
