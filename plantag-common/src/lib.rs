//! # PLANTAG Common Library
//!
//! Shared code for the plant tag resolution workspace:
//! - Error type and result alias
//! - TOML configuration loading and store path resolution
//! - Tracing subscriber initialization
//! - Timestamp and identifier utilities

pub mod config;
pub mod error;
pub mod logging;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
