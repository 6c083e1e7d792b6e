//! Configuration for the execution endpoints, polling and language table

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
