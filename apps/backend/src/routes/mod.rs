//! Thin HTTP surface. Each handler resolves the caller, calls exactly one
//! engine operation, and renders its result.

use actix_web::web;

use crate::middleware::JwtExtract;

pub mod clubs;
pub mod dto;
pub mod health;
pub mod leagues;
pub mod matches;
pub mod me;
pub mod requests;

/// Register every route: `/health` is public, `/api/**` requires a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes));
    cfg.service(
        web::scope("/api")
            .wrap(JwtExtract)
            .configure(leagues::configure_routes)
            .configure(clubs::configure_routes)
            .configure(requests::configure_routes)
            .configure(matches::configure_routes)
            .configure(me::configure_routes),
    );
}
