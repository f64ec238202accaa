use std::future::{ready, Ready};
use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::auth::jwt::Claims;
use crate::domain::Actor;
use crate::error::AppError;

/// The authenticated caller, built from the claims `JwtExtract` verified.
///
/// Users have no row of their own until they join something, so nothing is
/// looked up here; the token's subject is the user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub Actor);

impl Deref for CurrentUser {
    type Target = Actor;

    fn deref(&self) -> &Actor {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let actor = req
            .extensions()
            .get::<Claims>()
            .map(Claims::actor)
            .ok_or_else(AppError::unauthorized_missing_bearer);
        ready(actor.map(CurrentUser))
    }
}
