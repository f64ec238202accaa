use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
    time: String,
}

/// Liveness plus a store probe. Always 200; `store` says whether reads work.
async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    let (store, store_error) = match app_state.ledger.ping().await {
        Ok(()) => ("ok", None),
        Err(e) => {
            warn!(error = %e, "store health probe failed");
            ("error", Some(e.to_string()))
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        store,
        store_error,
        time: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string()),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
