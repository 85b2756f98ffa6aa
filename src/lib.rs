//! Content pipeline for the Yojitsu marketing blog.
//!
//! The binary wires these layers together; integration tests drive them
//! directly.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
