//! Cross-locale completeness checks.
//!
//! Every locale is compared against a reference locale, module by module:
//! which modules exist, which message keys exist, and whether the same
//! message uses the same ICU arguments.

use crate::cache::ModuleCache;
use crate::dictionary::MessageDictionary;
use crate::error::I18nResult;
use crate::icu::placeholders;
use crate::locale::Locale;
use crate::module::ModuleName;
use crate::provider::ProviderRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// A message whose ICU arguments differ from the reference translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderMismatch {
    /// Dotted key path.
    pub key: String,
    /// Arguments used by the reference locale.
    pub expected: BTreeSet<String>,
    /// Arguments used by the checked locale.
    pub found: BTreeSet<String>,
}

/// Differences for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReport {
    /// The module compared.
    pub module: ModuleName,
    /// Keys present in the reference but not here.
    pub missing_keys: Vec<String>,
    /// Keys present here but not in the reference.
    pub extra_keys: Vec<String>,
    /// Keys whose arguments differ.
    pub placeholder_mismatches: Vec<PlaceholderMismatch>,
}

impl ModuleReport {
    /// Whether the module matches the reference.
    pub fn is_complete(&self) -> bool {
        self.missing_keys.is_empty() && self.extra_keys.is_empty() && self.placeholder_mismatches.is_empty()
    }

    fn issue_count(&self) -> usize {
        self.missing_keys.len() + self.extra_keys.len() + self.placeholder_mismatches.len()
    }
}

/// Differences for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleReport {
    /// The locale compared.
    pub locale: Locale,
    /// Modules the reference has and this locale lacks.
    pub missing_modules: Vec<ModuleName>,
    /// Modules only this locale has.
    pub extra_modules: Vec<ModuleName>,
    /// Per-module differences, only for modules with issues.
    pub modules: Vec<ModuleReport>,
}

impl LocaleReport {
    /// Whether the locale matches the reference.
    pub fn is_complete(&self) -> bool {
        self.missing_modules.is_empty() && self.extra_modules.is_empty() && self.modules.is_empty()
    }

    /// Number of individual problems.
    pub fn issue_count(&self) -> usize {
        self.missing_modules.len()
            + self.extra_modules.len()
            + self.modules.iter().map(ModuleReport::issue_count).sum::<usize>()
    }
}

/// Result of [`check_completeness`].
#[derive(Debug, Clone, Serialize)]
pub struct CompletenessReport {
    /// Locale every other locale was compared with.
    pub reference: Locale,
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
    /// One report per non-reference locale, in locale order.
    pub locales: Vec<LocaleReport>,
}

impl CompletenessReport {
    /// Whether every locale matches the reference.
    pub fn is_complete(&self) -> bool {
        self.locales.iter().all(LocaleReport::is_complete)
    }

    /// Total number of problems across locales.
    pub fn issue_count(&self) -> usize {
        self.locales.iter().map(LocaleReport::issue_count).sum()
    }

    /// Report for one locale.
    pub fn locale(&self, locale: Locale) -> Option<&LocaleReport> {
        self.locales.iter().find(|report| report.locale == locale)
    }
}

impl fmt::Display for CompletenessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Completeness against {} ({})",
            self.reference,
            self.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;

        for report in &self.locales {
            if report.is_complete() {
                writeln!(f, "  {}: complete", report.locale)?;
                continue;
            }
            writeln!(f, "  {}: {} issues", report.locale, report.issue_count())?;
            for module in &report.missing_modules {
                writeln!(f, "    missing module {module}")?;
            }
            for module in &report.extra_modules {
                writeln!(f, "    extra module {module}")?;
            }
            for module in &report.modules {
                for key in &module.missing_keys {
                    writeln!(f, "    missing key {key}")?;
                }
                for key in &module.extra_keys {
                    writeln!(f, "    extra key {key}")?;
                }
                for mismatch in &module.placeholder_mismatches {
                    writeln!(
                        f,
                        "    placeholders differ in {}: expected {:?}, found {:?}",
                        mismatch.key, mismatch.expected, mismatch.found
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Compares every registered locale with `reference`.
///
/// Bundles are loaded through a private cache, so running a check does not
/// affect any loader.
///
/// # Errors
///
/// Fails if any registered bundle cannot be loaded.
#[instrument(skip(registry))]
pub async fn check_completeness(
    registry: Arc<ProviderRegistry>,
    reference: Locale,
) -> I18nResult<CompletenessReport> {
    let cache = ModuleCache::shared();
    let reference_bundles = load_locale(&cache, &registry, reference).await?;

    let mut locales = Vec::new();
    for locale in Locale::ALL.into_iter().filter(|l| *l != reference) {
        let bundles = load_locale(&cache, &registry, locale).await?;
        locales.push(compare_locale(locale, &reference_bundles, &bundles));
    }

    let report = CompletenessReport {
        reference,
        checked_at: Utc::now(),
        locales,
    };
    info!(
        "Completeness check against {} found {} issues",
        reference,
        report.issue_count()
    );
    Ok(report)
}

async fn load_locale(
    cache: &Arc<ModuleCache>,
    registry: &ProviderRegistry,
    locale: Locale,
) -> I18nResult<BTreeMap<ModuleName, BTreeMap<String, String>>> {
    let mut bundles = BTreeMap::new();
    for module in registry.modules_for(locale) {
        if let Some(provider) = registry.get(locale, &module) {
            let dictionary = cache.get_or_load(locale, &module, provider).await?;
            bundles.insert(module, dictionary.flatten());
        }
    }
    Ok(bundles)
}

fn compare_locale(
    locale: Locale,
    reference: &BTreeMap<ModuleName, BTreeMap<String, String>>,
    bundles: &BTreeMap<ModuleName, BTreeMap<String, String>>,
) -> LocaleReport {
    let mut report = LocaleReport {
        locale,
        missing_modules: Vec::new(),
        extra_modules: bundles
            .keys()
            .filter(|module| !reference.contains_key(*module))
            .cloned()
            .collect(),
        modules: Vec::new(),
    };

    for (module, expected) in reference {
        let Some(found) = bundles.get(module) else {
            report.missing_modules.push(module.clone());
            continue;
        };
        let module_report = compare_module(module, expected, found);
        if !module_report.is_complete() {
            report.modules.push(module_report);
        }
    }

    report
}

fn compare_module(
    module: &ModuleName,
    expected: &BTreeMap<String, String>,
    found: &BTreeMap<String, String>,
) -> ModuleReport {
    let mut report = ModuleReport {
        module: module.clone(),
        missing_keys: Vec::new(),
        extra_keys: found
            .keys()
            .filter(|key| !expected.contains_key(*key))
            .cloned()
            .collect(),
        placeholder_mismatches: Vec::new(),
    };

    for (key, reference_message) in expected {
        let Some(message) = found.get(key) else {
            report.missing_keys.push(key.clone());
            continue;
        };
        let expected_args = placeholders(reference_message);
        let found_args = placeholders(message);
        if expected_args != found_args {
            report.placeholder_mismatches.push(PlaceholderMismatch {
                key: key.clone(),
                expected: expected_args,
                found: found_args,
            });
        }
    }

    report
}

/// Compares two already loaded dictionaries of the same module.
pub fn compare_dictionaries(
    module: &ModuleName,
    reference: &MessageDictionary,
    candidate: &MessageDictionary,
) -> ModuleReport {
    compare_module(module, &reference.flatten(), &candidate.flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(value: serde_json::Value) -> MessageDictionary {
        MessageDictionary::from_value(value).unwrap()
    }

    #[test]
    fn test_compare_dictionaries() {
        let module = ModuleName::new("cart").unwrap();
        let en = dict(json!({"cart": {"title": "Cart", "items": "{count} items", "empty": "Empty"}}));
        let sr = dict(json!({"cart": {"title": "Korpa", "items": "{total} stavki", "promo": "Promo"}}));

        let report = compare_dictionaries(&module, &en, &sr);

        assert_eq!(report.missing_keys, vec!["cart.empty"]);
        assert_eq!(report.extra_keys, vec!["cart.promo"]);
        assert_eq!(report.placeholder_mismatches.len(), 1);
        assert_eq!(report.placeholder_mismatches[0].key, "cart.items");
        assert!(report.placeholder_mismatches[0].expected.contains("count"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_plural_branch_wording_is_not_a_mismatch() {
        let module = ModuleName::new("common").unwrap();
        let en = dict(json!({"common": {"n": "{count, plural, one {# item} other {# items}}"}}));
        let ru = dict(json!({"common": {"n": "{count, plural, one {# товар} few {# товара} other {# товаров}}"}}));

        assert!(compare_dictionaries(&module, &en, &ru).is_complete());
    }

    #[tokio::test]
    async fn test_report_counts_and_display() {
        let mut registry = ProviderRegistry::new();
        registry
            .register_static(Locale::English, "common", r#"{"common":{"save":"Save"}}"#)
            .unwrap();
        registry
            .register_static(Locale::English, "chat", r#"{"chat":{"send":"Send"}}"#)
            .unwrap();
        registry
            .register_static(Locale::Russian, "common", r#"{"common":{"save":"Сохранить"}}"#)
            .unwrap();
        registry
            .register_static(Locale::Serbian, "common", r#"{"common":{"save":"Sačuvaj","extra":"X"}}"#)
            .unwrap();
        registry
            .register_static(Locale::Serbian, "chat", r#"{"chat":{"send":"Pošalji"}}"#)
            .unwrap();

        let report = check_completeness(Arc::new(registry), Locale::English).await.unwrap();

        let ru = report.locale(Locale::Russian).unwrap();
        assert_eq!(ru.missing_modules, vec![ModuleName::new("chat").unwrap()]);
        let sr = report.locale(Locale::Serbian).unwrap();
        assert_eq!(sr.modules[0].extra_keys, vec!["common.extra"]);
        assert_eq!(report.issue_count(), 2);
        assert!(!report.is_complete());

        let text = report.to_string();
        assert!(text.contains("missing module chat"));
        assert!(text.contains("extra key common.extra"));
    }
}
