//! Domain-level error type used across the reducer, services and adapters.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Malformed payloads, rejected before the reducer runs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    WagerOutOfRange,
    InvalidSpot,
    InvalidCategory,
    InvalidHoldMask,
    InvalidChoice,
    InvalidDisplayName,
    InvalidAmount,
    InvalidPayload,
    Other(String),
}

/// Well-formed actions that are not legal in the current stage or sub-state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IllegalKind {
    WrongStage,
    WrongPhase,
    OutOfTurn,
    SpotTaken,
    InsufficientStack,
    CapExceeded,
    AlreadyActed,
    StaleSubState,
    NotHost,
    NotSeated,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    PersistenceFailure,
    Degraded,
    DataCorruption,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Match,
    Player,
    Snapshot,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    OutOfOrder,
    Busy,
    MatchNotRunning,
    SeatTaken,
    MatchFull,
    AlreadyJoined,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed payload (`ValidationFailed`)
    Validation(ValidationKind, String),
    /// Action not valid for the current stage or sub-state (`IllegalAction`)
    Illegal(IllegalKind, String),
    /// Concurrency contention or terminal-state conflicts
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation failed {kind:?}: {d}"),
            DomainError::Illegal(kind, d) => write!(f, "illegal action {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn illegal(kind: IllegalKind, detail: impl Into<String>) -> Self {
        Self::Illegal(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn busy(match_id: i64) -> Self {
        Self::conflict(
            ConflictKind::Busy,
            format!("match {match_id} action queue is full"),
        )
    }

    pub fn not_running(detail: impl Into<String>) -> Self {
        Self::conflict(ConflictKind::MatchNotRunning, detail)
    }

    /// Contention errors are safe for the client to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::Conflict(ConflictKind::OutOfOrder | ConflictKind::Busy, _)
                | DomainError::Infra(InfraErrorKind::Degraded | InfraErrorKind::Timeout, _)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contention_is_retryable_but_terminal_state_is_not() {
        assert!(DomainError::busy(7).is_retryable());
        assert!(DomainError::conflict(ConflictKind::OutOfOrder, "seq race").is_retryable());
        assert!(!DomainError::not_running("completed").is_retryable());
        assert!(!DomainError::illegal(IllegalKind::SpotTaken, "spot 3").is_retryable());
    }

    #[test]
    fn display_includes_kind_and_detail() {
        let e = DomainError::illegal(IllegalKind::OutOfTurn, "seat 2 is not active");
        assert_eq!(e.to_string(), "illegal action OutOfTurn: seat 2 is not active");
    }
}
