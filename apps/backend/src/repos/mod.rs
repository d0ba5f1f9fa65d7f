//! Domain-facing persistence. Every function maps `DbErr` into `DomainError`
//! and rows into domain types.

pub mod events;
pub mod ledger;
pub mod matches;
pub mod players;
pub mod snapshots;
pub mod stage_states;

use time::OffsetDateTime;

use crate::domain::types::Millis;
use crate::errors::domain::{DomainError, InfraErrorKind};

pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::infra(
        InfraErrorKind::DataCorruption,
        format!("stored {what} failed to decode: {err}"),
    )
}

pub(crate) fn millis_to_datetime(ms: Millis) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub(crate) fn datetime_to_millis(at: OffsetDateTime) -> Millis {
    (at.unix_timestamp_nanos() / 1_000_000) as Millis
}
