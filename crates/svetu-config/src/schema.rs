//! Configuration schema definitions using serde.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use svetu_common::{LoggingConfig, Result};

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Translation loading configuration.
    pub i18n: I18nConfig,
    /// Route prefix to required modules table.
    pub routes: Vec<RouteModules>,
    /// Route prefix to modules worth preloading for the next navigation.
    pub preload_hints: Vec<RouteModules>,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Translation loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Locale used when none is requested.
    pub default_locale: String,
    /// Locales the application serves.
    pub locales: Vec<String>,
    /// Directory holding `<locale>/<module>.json` bundles.
    pub messages_dir: PathBuf,
    /// Module merged into every dictionary.
    pub base_module: String,
    /// Preloading configuration.
    pub preload: PreloadConfig,
}

/// Background preloading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    /// Whether route based preloading is performed.
    pub enabled: bool,
}

/// One row of a route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteModules {
    /// Path prefix, always starting with `/`.
    pub prefix: String,
    /// Module names associated with the prefix.
    pub modules: Vec<String>,
}

impl RouteModules {
    /// Creates a route row.
    pub fn new(prefix: &str, modules: &[&str]) -> Self {
        Self {
            prefix: prefix.to_string(),
            modules: modules.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing every problem found.
    pub fn validate(&self) -> Result<()> {
        crate::validator::ConfigValidator::validate(self)
    }

    /// Applies `SVETU_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from an arbitrary variable source.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(locale) = lookup("SVETU_DEFAULT_LOCALE") {
            tracing::debug!("Overriding default locale from environment: {}", locale);
            self.i18n.default_locale = locale;
        }

        if let Some(dir) = lookup("SVETU_MESSAGES_DIR") {
            tracing::debug!("Overriding messages directory from environment: {}", dir);
            self.i18n.messages_dir = PathBuf::from(dir);
        }

        if let Some(level) = lookup("SVETU_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
