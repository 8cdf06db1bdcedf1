//! Configuration loading and persistence with atomic file operations.

use crate::schema::Config;
use std::path::{Path, PathBuf};
use svetu_common::{write_atomic, Result, SvetuError};
use tracing::{debug, info};

/// File formats understood by the loader, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(SvetuError::config(format!(
                "unsupported configuration file extension: {}",
                path.display()
            ))),
        }
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text does not match the schema.
    pub fn parse(self, text: &str) -> Result<Config> {
        match self {
            Self::Yaml => serde_yaml::from_str(text).map_err(SvetuError::serialization),
            Self::Toml => toml::from_str(text).map_err(SvetuError::serialization),
            Self::Json => serde_json::from_str(text).map_err(SvetuError::serialization),
        }
    }

    /// Renders configuration text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the configuration cannot be encoded.
    pub fn render(self, config: &Config) -> Result<String> {
        match self {
            Self::Yaml => serde_yaml::to_string(config).map_err(SvetuError::serialization),
            Self::Toml => toml::to_string_pretty(config).map_err(SvetuError::serialization),
            Self::Json => serde_json::to_string_pretty(config).map_err(SvetuError::serialization),
        }
    }
}

/// Configuration loader with atomic file operations.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the loader reads from and writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, cannot be parsed, or does not validate.
    pub async fn load(&self) -> Result<Config> {
        let config = self.read().await?;
        config.validate()?;

        info!("Loaded configuration from {}", self.path.display());
        Ok(config)
    }

    /// Reads and parses the file without validating it, for callers that
    /// apply overrides before validation.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or cannot be parsed.
    pub async fn read(&self) -> Result<Config> {
        let format = ConfigFormat::from_path(&self.path)?;
        debug!("Reading configuration from {}", self.path.display());

        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SvetuError::config(format!("cannot read {}: {e}", self.path.display()))
        })?;
        format.parse(&text)
    }

    /// Saves configuration to file atomically.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate or cannot be written.
    pub async fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let format = ConfigFormat::from_path(&self.path)?;
        let text = format.render(config)?;
        write_atomic(&self.path, text).await?;

        info!("Saved configuration to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("svetu.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("svetu.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("svetu.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("svetu.ini")).is_err());
        assert!(ConfigFormat::from_path(Path::new("svetu")).is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ConfigFormat::Yaml
            .parse("i18n:\n  default_locale: sr\n")
            .unwrap();

        assert_eq!(config.i18n.default_locale, "sr");
        assert_eq!(config.i18n.base_module, "common");
        assert_eq!(config.routes, crate::default_routes());
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let loader = ConfigLoader::new("/nonexistent/svetu.yaml");
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, SvetuError::Config(_)));
    }

    #[tokio::test]
    async fn test_read_skips_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svetu.yaml");
        tokio::fs::write(&path, "i18n:\n  default_locale: de\n").await.unwrap();

        let loader = ConfigLoader::new(&path);
        let config = loader.read().await.unwrap();
        assert_eq!(config.i18n.default_locale, "de");
        assert!(loader.load().await.is_err());
    }
}
