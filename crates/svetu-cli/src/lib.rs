//! # Svetu CLI
//!
//! Command line front end for the Svetu translation loader: load and print
//! merged dictionaries, resolve routes, check completeness across locales
//! and repair double-namespaced bundles.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
pub use commands::{load_config, run, Outcome};
