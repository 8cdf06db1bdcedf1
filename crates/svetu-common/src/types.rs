//! Common type definitions and the application-wide error type.

/// Common result type for the application.
pub type Result<T> = std::result::Result<T, SvetuError>;

/// Application-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum SvetuError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Translation loading error.
    #[error("Translation error: {0}")]
    I18n(String),

    /// Logging setup error.
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SvetuError {
    /// Creates a configuration error from anything printable.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a serialization error from anything printable.
    pub fn serialization(message: impl std::fmt::Display) -> Self {
        Self::Serialization(message.to_string())
    }
}
