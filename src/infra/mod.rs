//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod fs;
pub mod store;
pub mod telemetry;
