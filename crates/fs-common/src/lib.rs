//! Shared utilities for the fixture seeder crates.

pub mod logging;

pub use logging::{init_default_logging, init_logging};
