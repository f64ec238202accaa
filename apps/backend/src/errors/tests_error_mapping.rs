// Mapping from domain errors to HTTP status and code, without HTTP or store dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, InvalidStateKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_400() {
    let app: AppError = DomainError::validation(ValidationKind::Score, "score must be numeric").into();
    assert_eq!(app.code(), ErrorCode::InvalidScore);
    assert_eq!(app.status().as_u16(), 400);

    let app: AppError = DomainError::validation(ValidationKind::Name, "too short").into();
    assert_eq!(app.code(), ErrorCode::InvalidName);
}

#[test]
fn maps_conflicts_to_409() {
    let app: AppError =
        DomainError::conflict(ConflictKind::AlreadyInLeague, "already managing").into();
    assert_eq!(app.code().as_str(), "ALREADY_IN_LEAGUE");
    assert_eq!(app.status().as_u16(), 409);

    let app: AppError = DomainError::conflict(ConflictKind::OptimisticLock, "raced").into();
    assert_eq!(app.code(), ErrorCode::OptimisticLock);

    let app: AppError = DomainError::conflict(ConflictKind::Other("x".into()), "generic").into();
    assert_eq!(app.code(), ErrorCode::Conflict);
}

#[test]
fn maps_invalid_state_to_409_with_named_condition() {
    let app: AppError = DomainError::invalid_state(
        InvalidStateKind::LeagueScheduled,
        "league is scheduled",
    )
    .into();
    assert_eq!(app.code(), ErrorCode::LeagueScheduled);
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_not_found_kinds() {
    let app: AppError = DomainError::not_found(NotFoundKind::Club, "gone").into();
    assert_eq!(app.code(), ErrorCode::ClubNotFound);
    assert_eq!(app.status().as_u16(), 404);

    let app: AppError = DomainError::not_found(NotFoundKind::RosterEntry, "gone").into();
    assert_eq!(app.code(), ErrorCode::RequestNotFound);
}

#[test]
fn maps_forbidden_to_403() {
    let app: AppError = DomainError::forbidden("admins only").into();
    assert_eq!(app.code(), ErrorCode::Forbidden);
    assert_eq!(app.status().as_u16(), 403);
}

#[test]
fn maps_infra() {
    let app: AppError = DomainError::infra(InfraErrorKind::Timeout, "slow").into();
    assert_eq!(app.code(), ErrorCode::StoreTimeout);
    assert_eq!(app.status().as_u16(), 504);
    assert!(matches!(app, AppError::Timeout { .. }));

    let app: AppError = DomainError::infra(InfraErrorKind::Unavailable, "down").into();
    assert_eq!(app.code(), ErrorCode::StoreUnavailable);
    assert_eq!(app.status().as_u16(), 503);

    let app: AppError = DomainError::infra(InfraErrorKind::RemoteOperation, "500").into();
    assert_eq!(app.code(), ErrorCode::RemoteOperationFailed);
    assert_eq!(app.status().as_u16(), 502);

    let app: AppError = DomainError::infra(InfraErrorKind::AtomicityUnsupported, "no").into();
    assert_eq!(app.code(), ErrorCode::AtomicityUnsupported);
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn retryable_and_transient_classification() {
    assert!(DomainError::conflict(ConflictKind::OptimisticLock, "").is_retryable());
    assert!(!DomainError::conflict(ConflictKind::AlreadySubmitted, "").is_retryable());
    assert!(DomainError::infra(InfraErrorKind::Unavailable, "").is_transient());
    assert!(!DomainError::infra(InfraErrorKind::DataCorruption, "").is_transient());
}
