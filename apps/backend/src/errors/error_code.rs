//! Error codes for the match orchestrator API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses and WebSocket rejections.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Action rejections
    /// Action not valid for the current stage or sub-state
    IllegalAction,
    /// Sequence allocation race detected while appending
    OutOfOrder,
    /// Per-match action queue is saturated
    Busy,
    /// Match is completed or cancelled
    MatchNotRunning,
    /// Malformed action payload
    ValidationFailed,

    // Availability
    /// Durable store rejected the write
    PersistenceFailure,
    /// Match is waiting for the store to recover
    MatchDegraded,

    // Identity & membership
    /// Missing identity header
    Unauthorized,
    /// Access denied
    Forbidden,
    /// Caller holds no seat in the match
    NotAParticipant,

    // Request validation
    /// Invalid match ID provided
    InvalidMatchId,
    BadRequest,

    // Resource Not Found
    MatchNotFound,
    PlayerNotFound,
    SnapshotNotFound,
    NotFound,

    // Conflicts
    SeatTaken,
    MatchFull,
    AlreadyJoined,
    Conflict,

    // System Errors
    DbError,
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    ConfigError,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IllegalAction => "ILLEGAL_ACTION",
            Self::OutOfOrder => "OUT_OF_ORDER",
            Self::Busy => "BUSY",
            Self::MatchNotRunning => "MATCH_NOT_RUNNING",
            Self::ValidationFailed => "VALIDATION_FAILED",

            Self::PersistenceFailure => "PERSISTENCE_FAILURE",
            Self::MatchDegraded => "MATCH_DEGRADED",

            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotAParticipant => "NOT_A_PARTICIPANT",

            Self::InvalidMatchId => "INVALID_MATCH_ID",
            Self::BadRequest => "BAD_REQUEST",

            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::SnapshotNotFound => "SNAPSHOT_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::SeatTaken => "SEAT_TAKEN",
            Self::MatchFull => "MATCH_FULL",
            Self::AlreadyJoined => "ALREADY_JOINED",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
