pub mod error_shape;
pub mod healthcheck;
pub mod matches_api;
pub mod trace_headers;
