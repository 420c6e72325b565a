#![allow(dead_code)]

pub mod fixtures;
pub mod strategies;

pub use fixtures::*;

/// Install structured logging once for the test binary
pub fn init_test_logging() {
    std::env::set_var("COMPONENT_REGISTRY_ENV", "test");
    component_registry::logging::init_structured_logging();
}
