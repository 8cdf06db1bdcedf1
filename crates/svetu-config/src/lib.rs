//! # Svetu Config
//!
//! Type-safe configuration for the Svetu translation loader.
//!
//! This crate provides configuration loading, validation, and caching:
//! supported locales, where message bundles live, the route to module
//! tables used to decide which translation modules a page needs, and
//! logging settings.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use cache::*;
pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
