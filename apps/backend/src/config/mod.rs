pub mod db;
pub mod orchestrator;
