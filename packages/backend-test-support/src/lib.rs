//! Helpers shared by the orchestrator's unit and integration tests.

pub mod logging;
pub mod problem_details;
