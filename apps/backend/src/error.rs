use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, InvalidStateKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Invalid state: {detail}")]
    InvalidState { code: ErrorCode, detail: String },
    #[error("Unauthorized")]
    Unauthorized { code: ErrorCode },
    #[error("Forbidden: {detail}")]
    Forbidden { detail: String },
    #[error("Store unavailable: {detail}")]
    Unavailable { code: ErrorCode, detail: String },
    #[error("Timeout: {detail}")]
    Timeout { detail: String },
    #[error("Remote operation failed: {detail}")]
    RemoteOperation { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::InvalidState { code, .. }
            | AppError::Unauthorized { code }
            | AppError::Unavailable { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::Timeout { .. } => ErrorCode::StoreTimeout,
            AppError::RemoteOperation { .. } => ErrorCode::RemoteOperationFailed,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::InvalidState { detail, .. }
            | AppError::Forbidden { detail }
            | AppError::Unavailable { detail, .. }
            | AppError::Timeout { detail }
            | AppError::RemoteOperation { detail }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail } => detail.clone(),
            AppError::Unauthorized { code } => match code {
                ErrorCode::UnauthorizedMissingBearer => "Missing or malformed Bearer token",
                ErrorCode::UnauthorizedExpiredJwt => "Token expired",
                ErrorCode::UnauthorizedInvalidJwt => "Invalid JWT",
                _ => "Authentication required",
            }
            .to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } | AppError::InvalidState { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::RemoteOperation { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::Internal,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            code: ErrorCode::Unauthorized,
        }
    }

    pub fn unauthorized_missing_bearer() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedMissingBearer,
        }
    }

    pub fn unauthorized_invalid_jwt() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedInvalidJwt,
        }
    }

    pub fn unauthorized_expired_jwt() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedExpiredJwt,
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::Name => ErrorCode::InvalidName,
                    ValidationKind::Score => ErrorCode::InvalidScore,
                    ValidationKind::PlayerStats => ErrorCode::InvalidPlayerStats,
                    ValidationKind::LeagueSettings => ErrorCode::InvalidLeagueSettings,
                    ValidationKind::Other(_) => ErrorCode::ValidationError,
                };
                AppError::Validation { code, detail }
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::League => ErrorCode::LeagueNotFound,
                    NotFoundKind::Club => ErrorCode::ClubNotFound,
                    NotFoundKind::User => ErrorCode::UserNotFound,
                    NotFoundKind::Match => ErrorCode::MatchNotFound,
                    NotFoundKind::RosterEntry => ErrorCode::RequestNotFound,
                    NotFoundKind::Membership => ErrorCode::MembershipNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::NotFound { code, detail }
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::AlreadyInLeague => ErrorCode::AlreadyInLeague,
                    ConflictKind::AlreadySubmitted => ErrorCode::AlreadySubmitted,
                    ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::Conflict { code, detail }
            }
            DomainError::InvalidState(kind, detail) => {
                let code = match kind {
                    InvalidStateKind::LeagueScheduled => ErrorCode::LeagueScheduled,
                    InvalidStateKind::MatchPublished => ErrorCode::MatchPublished,
                    InvalidStateKind::MatchConflicted => ErrorCode::MatchConflicted,
                    InvalidStateKind::ClubNotAccepted => ErrorCode::ClubNotAccepted,
                    InvalidStateKind::ManagerCannotLeave => ErrorCode::ManagerCannotLeave,
                    InvalidStateKind::NotParticipant => ErrorCode::NotParticipant,
                    InvalidStateKind::Other(_) => ErrorCode::InvalidState,
                };
                AppError::InvalidState { code, detail }
            }
            DomainError::Forbidden(detail) => AppError::Forbidden { detail },
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::Timeout { detail },
                InfraErrorKind::Unavailable => AppError::Unavailable {
                    code: ErrorCode::StoreUnavailable,
                    detail,
                },
                InfraErrorKind::RemoteOperation => AppError::RemoteOperation { detail },
                InfraErrorKind::AtomicityUnsupported => AppError::Internal {
                    code: ErrorCode::AtomicityUnsupported,
                    detail,
                },
                InfraErrorKind::DataCorruption => AppError::Internal {
                    code: ErrorCode::DataCorruption,
                    detail,
                },
                InfraErrorKind::Other(_) => AppError::internal(detail),
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::Unavailable {
            code: ErrorCode::StoreUnavailable,
            detail: format!("database error: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://leagues.example/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
