//! Domain-level error type used across the ledger and services.
//!
//! This error type is HTTP- and store-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Operational failures below the domain
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    Unavailable,
    /// An opaque remote callable failed
    RemoteOperation,
    /// The configured store cannot commit multi-record batches atomically
    AtomicityUnsupported,
    DataCorruption,
    Other(String),
}

/// Malformed input
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    Name,
    Score,
    PlayerStats,
    LeagueSettings,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    League,
    Club,
    User,
    Match,
    RosterEntry,
    Membership,
    Other(String),
}

/// Business-rule conflicts
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// User already has a club in this league
    AlreadyInLeague,
    /// This club already submitted for the match
    AlreadySubmitted,
    /// A concurrent writer changed a record between read and commit
    OptimisticLock,
    Other(String),
}

/// Operation disallowed in the current league or match state
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidStateKind {
    LeagueScheduled,
    MatchPublished,
    MatchConflicted,
    ClubNotAccepted,
    ManagerCannotLeave,
    NotParticipant,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input validation failure
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Disallowed by league/match state; detail names the blocking condition
    InvalidState(InvalidStateKind, String),
    /// Actor lacks the role the operation requires
    Forbidden(String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::InvalidState(kind, d) => write!(f, "invalid state {kind:?}: {d}"),
            DomainError::Forbidden(d) => write!(f, "forbidden: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn invalid_state(kind: InvalidStateKind, detail: impl Into<String>) -> Self {
        Self::InvalidState(kind, detail.into())
    }
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden(detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Lost a race against a concurrent batch; re-reading and retrying is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict(ConflictKind::OptimisticLock, _))
    }

    /// Store or remote failure the caller may retry for idempotent operations.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::Infra(
                InfraErrorKind::Timeout | InfraErrorKind::Unavailable | InfraErrorKind::RemoteOperation,
                _
            )
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(..))
    }
}
