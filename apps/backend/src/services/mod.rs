pub mod match_flow;
pub mod matches;
pub mod snapshots;
