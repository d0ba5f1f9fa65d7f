#![cfg(test)]

//! Unit-test logging hook; integration tests call the same init directly.

pub fn init() {
    backend_test_support::logging::init();
}
