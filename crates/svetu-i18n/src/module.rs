//! Translation module names.

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of an independently loadable translation module, such as `common`
/// or `marketplace`.
///
/// Names start with an ASCII letter and contain only ASCII alphanumerics,
/// `-` and `_`, so they are safe to use as file stems and JSON keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleName(String);

impl ModuleName {
    /// Validates and wraps a module name.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::InvalidModuleName`] for empty or malformed names.
    pub fn new(name: impl Into<String>) -> I18nResult<Self> {
        let name = name.into();
        let mut chars = name.chars();

        let reason = match chars.next() {
            None => Some("name is empty"),
            Some(first) if !first.is_ascii_alphabetic() => Some("name must start with a letter"),
            Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') => {
                Some("only ASCII letters, digits, '-' and '_' are allowed")
            }
            Some(_) => None,
        };

        match reason {
            Some(reason) => Err(I18nError::InvalidModuleName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModuleName {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ModuleName {
    type Error = I18nError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModuleName> for String {
    fn from(value: ModuleName) -> Self {
        value.0
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ModuleName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ModuleName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
