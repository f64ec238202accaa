//! Error codes for the league backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    Unauthorized,
    UnauthorizedMissingBearer,
    UnauthorizedInvalidJwt,
    UnauthorizedExpiredJwt,
    Forbidden,

    // Request Validation
    ValidationError,
    InvalidName,
    InvalidScore,
    InvalidPlayerStats,
    InvalidLeagueSettings,
    BadRequest,

    // Resource Not Found
    LeagueNotFound,
    ClubNotFound,
    UserNotFound,
    MatchNotFound,
    RequestNotFound,
    MembershipNotFound,
    NotFound,

    // Business Logic Conflicts
    AlreadyInLeague,
    AlreadySubmitted,
    OptimisticLock,
    Conflict,

    // State Violations
    LeagueScheduled,
    MatchPublished,
    MatchConflicted,
    ClubNotAccepted,
    ManagerCannotLeave,
    NotParticipant,
    InvalidState,

    // System Errors
    StoreUnavailable,
    StoreTimeout,
    RemoteOperationFailed,
    AtomicityUnsupported,
    DataCorruption,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// The exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            Self::Forbidden => "FORBIDDEN",

            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidScore => "INVALID_SCORE",
            Self::InvalidPlayerStats => "INVALID_PLAYER_STATS",
            Self::InvalidLeagueSettings => "INVALID_LEAGUE_SETTINGS",
            Self::BadRequest => "BAD_REQUEST",

            Self::LeagueNotFound => "LEAGUE_NOT_FOUND",
            Self::ClubNotFound => "CLUB_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::RequestNotFound => "REQUEST_NOT_FOUND",
            Self::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::AlreadyInLeague => "ALREADY_IN_LEAGUE",
            Self::AlreadySubmitted => "ALREADY_SUBMITTED",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",

            Self::LeagueScheduled => "LEAGUE_SCHEDULED",
            Self::MatchPublished => "MATCH_PUBLISHED",
            Self::MatchConflicted => "MATCH_CONFLICTED",
            Self::ClubNotAccepted => "CLUB_NOT_ACCEPTED",
            Self::ManagerCannotLeave => "MANAGER_CANNOT_LEAVE",
            Self::NotParticipant => "NOT_PARTICIPANT",
            Self::InvalidState => "INVALID_STATE",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::RemoteOperationFailed => "REMOTE_OPERATION_FAILED",
            Self::AtomicityUnsupported => "ATOMICITY_UNSUPPORTED",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
