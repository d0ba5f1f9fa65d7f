// Domain error to HTTP mapping, no database or server involved.
use crate::errors::domain::{
    ConflictKind, DomainError, IllegalKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn validation_is_a_bad_request() {
    let app: AppError =
        DomainError::validation(ValidationKind::InvalidHoldMask, "hold mask has 6 dice").into();
    assert_eq!(app.code(), ErrorCode::ValidationFailed);
    assert_eq!(app.status().as_u16(), 400);
    assert_eq!(app.detail(), "hold mask has 6 dice");
}

#[test]
fn every_illegal_kind_shares_one_code() {
    for kind in [
        IllegalKind::WrongStage,
        IllegalKind::OutOfTurn,
        IllegalKind::CapExceeded,
        IllegalKind::NotHost,
    ] {
        let app: AppError = DomainError::illegal(kind, "nope").into();
        assert_eq!(app.code(), ErrorCode::IllegalAction);
        assert_eq!(app.status().as_u16(), 422);
        assert!(!app.is_retryable());
    }
}

#[test]
fn conflicts_keep_their_specific_codes() {
    let cases = [
        (ConflictKind::SeatTaken, ErrorCode::SeatTaken),
        (ConflictKind::MatchFull, ErrorCode::MatchFull),
        (ConflictKind::AlreadyJoined, ErrorCode::AlreadyJoined),
        (ConflictKind::OutOfOrder, ErrorCode::OutOfOrder),
        (ConflictKind::Other("X".into()), ErrorCode::Conflict),
    ];
    for (kind, code) in cases {
        let app: AppError = DomainError::conflict(kind, "conflict").into();
        assert_eq!(app.code(), code);
        assert_eq!(app.status().as_u16(), 409);
    }
}

#[test]
fn out_of_order_and_busy_are_retryable() {
    let ooo: AppError = DomainError::conflict(ConflictKind::OutOfOrder, "seq 7").into();
    assert!(ooo.is_retryable());
    let busy: AppError = DomainError::busy(3).into();
    assert!(busy.is_retryable());
    assert_eq!(busy.code(), ErrorCode::Busy);
}

#[test]
fn not_found_kinds() {
    let cases = [
        (NotFoundKind::Match, ErrorCode::MatchNotFound),
        (NotFoundKind::Player, ErrorCode::PlayerNotFound),
        (NotFoundKind::Snapshot, ErrorCode::SnapshotNotFound),
    ];
    for (kind, code) in cases {
        let app: AppError = DomainError::not_found(kind, "missing").into();
        assert_eq!(app.code(), code);
        assert_eq!(app.status().as_u16(), 404);
    }
}

#[test]
fn infra_failures() {
    let degraded: AppError = DomainError::infra(InfraErrorKind::Degraded, "match 4").into();
    assert_eq!(degraded.code(), ErrorCode::MatchDegraded);
    assert_eq!(degraded.status().as_u16(), 503);
    assert!(degraded.is_retryable());

    let corrupt: AppError = DomainError::infra(InfraErrorKind::DataCorruption, "seq gap").into();
    assert_eq!(corrupt.code(), ErrorCode::DataCorruption);
    assert_eq!(corrupt.status().as_u16(), 500);
    assert!(!corrupt.is_retryable());
}
