//! Command line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect, load and repair Svetu translation bundles.
#[derive(Parser, Debug)]
#[command(name = "svetu-i18n", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (.yaml, .yml, .toml or .json)
    #[arg(short, long, env = "SVETU_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding <locale>/<module>.json bundles
    #[arg(short, long, global = true)]
    pub messages_dir: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load modules and print the merged dictionary as JSON
    Load {
        /// Locale code; defaults to the configured default locale
        #[arg(short = 'L', long)]
        locale: Option<String>,
        /// Modules to load after the base module
        modules: Vec<String>,
    },

    /// Print the modules a page needs
    Route {
        /// URL path, e.g. /sr/marketplace/42
        path: String,
    },

    /// Load everything a page needs and print it as JSON
    RouteLoad {
        /// Locale code; defaults to the configured default locale
        #[arg(short = 'L', long)]
        locale: Option<String>,
        /// URL path
        path: String,
    },

    /// Compare every locale with a reference locale
    Check {
        /// Reference locale; defaults to the configured default locale
        #[arg(short, long)]
        reference: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Repair bundles whose keys are nested twice under their module name
    FixNamespaces {
        /// Only report what would change
        #[arg(long)]
        dry_run: bool,
    },

    /// List the modules available for a locale
    Modules {
        /// Locale code; defaults to the configured default locale
        #[arg(short = 'L', long)]
        locale: Option<String>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file; the extension selects the format
        path: PathBuf,
    },
}
