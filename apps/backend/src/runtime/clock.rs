use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::Instant;

use crate::domain::types::Millis;

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> Millis {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as Millis
}

/// Tokio instant at which the wall-clock `deadline` falls, never in the past.
pub fn instant_for(deadline: Millis, now: Millis) -> Instant {
    let wait = deadline.saturating_sub(now).max(0) as u64;
    Instant::now() + Duration::from_millis(wait)
}
