//! DTOs for the matches_sea adapter.

use crate::entities::matches::{MatchMode, MatchStatus};

#[derive(Debug, Clone)]
pub struct MatchCreate {
    pub mode: MatchMode,
    pub seed: i64,
    pub rules: serde_json::Value,
    pub host_user_id: i64,
}

/// Projection columns rewritten after every committed batch.
#[derive(Debug, Clone)]
pub struct MatchProgress {
    pub id: i64,
    pub status: MatchStatus,
    pub stage: String,
    pub last_seq: i64,
    /// Seq the row is expected to hold before this write.
    pub expected_last_seq: i64,
}
