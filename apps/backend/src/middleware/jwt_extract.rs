//! JWT extraction middleware.
//!
//! Verifies the `Authorization: Bearer` token on protected scopes and stores
//! the [`Claims`] in request extensions for the [`CurrentUser`] extractor.
//! Requests without a valid token never reach the handler.
//!
//! [`CurrentUser`]: crate::extractors::current_user::CurrentUser

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::auth::jwt::{verify_access_token, Claims};
use crate::error::AppError;
use crate::state::app_state::AppState;

pub struct JwtExtract;

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware { service }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: S,
}

/// Token from a `Bearer <token>` header value.
fn bearer_token(value: Option<&HeaderValue>) -> Result<&str, AppError> {
    let raw = value
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::unauthorized_missing_bearer)?;
    match raw.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}

fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let token = bearer_token(req.headers().get(header::AUTHORIZATION))?;
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not available"))?;
    verify_access_token(token, &state.security)
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(e) => {
                debug!(code = e.code().as_str(), path = req.path(), "request rejected");
                let err: Error = e.into();
                Box::pin(async move { Err::<ServiceResponse<B>, Error>(err) })
            }
        }
    }
}
