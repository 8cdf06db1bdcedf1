//! Runtime validation of a loaded configuration.

use crate::schema::{Config, RouteModules};
use std::collections::HashSet;
use svetu_common::{parse_filter, Result, SvetuError};

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns [`SvetuError::Config`] when at least one issue is found.
    pub fn validate(config: &Config) -> Result<()> {
        let issues = Self::issues(config);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SvetuError::config(issues.join("; ")))
        }
    }

    /// Lists every problem found in the configuration.
    pub fn issues(config: &Config) -> Vec<String> {
        let mut issues = Vec::new();
        let i18n = &config.i18n;

        if i18n.locales.is_empty() {
            issues.push("i18n.locales must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for locale in &i18n.locales {
            if !seen.insert(locale.as_str()) {
                issues.push(format!("i18n.locales lists '{locale}' more than once"));
            }
        }

        if !i18n.locales.contains(&i18n.default_locale) {
            issues.push(format!(
                "i18n.default_locale '{}' is not listed in i18n.locales",
                i18n.default_locale
            ));
        }

        if i18n.base_module.trim().is_empty() {
            issues.push("i18n.base_module must not be empty".to_string());
        }

        if let Err(e) = parse_filter(&config.logging.level) {
            issues.push(format!("logging.level: {e}"));
        }

        check_table("routes", &config.routes, &mut issues);
        check_table("preload_hints", &config.preload_hints, &mut issues);

        issues
    }
}

fn check_table(name: &str, rows: &[RouteModules], issues: &mut Vec<String>) {
    let mut prefixes = HashSet::new();
    for row in rows {
        if !row.prefix.starts_with('/') {
            issues.push(format!("{name}: prefix '{}' must start with '/'", row.prefix));
        }
        if !prefixes.insert(row.prefix.as_str()) {
            issues.push(format!("{name}: prefix '{}' is listed more than once", row.prefix));
        }
        if row.modules.is_empty() {
            issues.push(format!("{name}: prefix '{}' has no modules", row.prefix));
        }
        if row.modules.iter().any(|m| m.trim().is_empty()) {
            issues.push(format!("{name}: prefix '{}' has an empty module name", row.prefix));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_every_issue() {
        let mut config = Config::default();
        config.i18n.default_locale = "de".to_string();
        config.i18n.base_module = String::new();
        config.routes.push(RouteModules::new("admin", &[]));

        let issues = ConfigValidator::issues(&config);
        assert_eq!(issues.len(), 4, "{issues:?}");
        assert!(issues.iter().any(|i| i.contains("'de'")));
        assert!(issues.iter().any(|i| i.contains("must start with '/'")));
        assert!(issues.iter().any(|i| i.contains("has no modules")));
    }

    #[test]
    fn test_duplicate_prefix_is_rejected() {
        let mut config = Config::default();
        config.preload_hints.push(RouteModules::new("/marketplace", &["cart"]));

        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("listed more than once"));
    }

    #[test]
    fn test_invalid_log_filter_is_reported() {
        let mut config = Config::default();
        config.logging.level = "svetu_i18n=[[bogus".to_string();

        let issues = ConfigValidator::issues(&config);
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert!(issues[0].starts_with("logging.level"));
    }
}
