//! # Svetu Common
//!
//! Shared types, utilities, and common functionality for the Svetu translation tooling.
//!
//! This crate provides the application-wide error type, structured logging
//! setup, and small I/O helpers used across all other crates in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use logging::{init_logging, parse_filter, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
