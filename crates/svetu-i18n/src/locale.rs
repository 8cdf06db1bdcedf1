//! Supported locales.

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

/// Supported locales. The set is closed and known at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locale {
    /// English
    #[serde(rename = "en")]
    English,
    /// Russian
    #[serde(rename = "ru")]
    Russian,
    /// Serbian
    #[serde(rename = "sr")]
    Serbian,
}

impl Default for Locale {
    fn default() -> Self {
        Self::English
    }
}

impl Locale {
    /// Every supported locale.
    pub const ALL: [Self; 3] = [Self::English, Self::Russian, Self::Serbian];

    /// Short code used in URLs and bundle directories.
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Russian => "ru",
            Self::Serbian => "sr",
        }
    }

    /// Region-qualified language tag.
    pub const fn language_tag(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Russian => "ru-RU",
            Self::Serbian => "sr-RS",
        }
    }

    /// Parse a locale from a short code or a language tag.
    ///
    /// Matching is case-insensitive and accepts `_` as a separator.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().replace('_', "-").to_ascii_lowercase();
        match normalized.as_str() {
            "en" | "en-us" | "en-gb" => Some(Self::English),
            "ru" | "ru-ru" => Some(Self::Russian),
            "sr" | "sr-rs" | "sr-latn" | "sr-latn-rs" => Some(Self::Serbian),
            _ => None,
        }
    }

    /// Convert to a `unic_langid` language identifier.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in tag table is malformed.
    pub fn to_language_identifier(self) -> I18nResult<LanguageIdentifier> {
        self.language_tag()
            .parse()
            .map_err(|_| I18nError::UnknownLocale {
                code: self.language_tag().to_string(),
            })
    }

    /// Get the display name for this locale, in its own language.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Russian => "Русский",
            Self::Serbian => "Srpski",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| I18nError::UnknownLocale { code: s.to_string() })
    }
}
