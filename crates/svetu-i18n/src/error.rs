//! Error types for translation loading.

use crate::locale::Locale;
use crate::module::ModuleName;
use svetu_common::SvetuError;
use thiserror::Error;

/// Errors that can occur while resolving and loading translation modules.
///
/// The type is `Clone` so a single failed load can be handed to every caller
/// that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// The locale code is not one of the supported locales.
    #[error("Unsupported locale: {code}")]
    UnknownLocale {
        /// The rejected code.
        code: String,
    },

    /// A module name is syntactically invalid.
    #[error("Invalid module name '{name}': {reason}")]
    InvalidModuleName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// No bundle is registered for the module in this locale.
    #[error("Unknown module '{module}' for locale {locale}")]
    UnknownModule {
        /// Requested locale.
        locale: Locale,
        /// Requested module.
        module: String,
    },

    /// Fetching or parsing a bundle failed.
    #[error("Failed to load module '{module}' for locale {locale}: {reason}")]
    ModuleLoad {
        /// Locale of the failed bundle.
        locale: Locale,
        /// Module of the failed bundle.
        module: ModuleName,
        /// Underlying cause.
        reason: String,
    },

    /// Bundle text is not a valid message tree.
    #[error("Invalid message bundle: {reason}")]
    InvalidBundle {
        /// What is wrong with the bundle.
        reason: String,
    },

    /// File system access failed.
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

impl I18nError {
    pub(crate) fn io(path: &std::path::Path, error: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<I18nError> for SvetuError {
    fn from(error: I18nError) -> Self {
        Self::I18n(error.to_string())
    }
}

/// Result type for i18n operations
pub type I18nResult<T> = Result<T, I18nError>;
