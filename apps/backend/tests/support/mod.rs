pub mod app_builder;
pub mod matches;
pub mod server;
pub mod websocket_client;

// Re-export only what current tests actually import
pub use app_builder::create_test_app;
