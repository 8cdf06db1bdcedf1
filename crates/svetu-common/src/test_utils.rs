//! Test utilities and shared test helpers.
//!
//! This module provides logging setup, temporary directories, and message
//! bundle fixtures that can be used across all crates in the workspace.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Message bundle fixtures laid out as `<root>/<locale>/<module>.json`.
pub mod bundle_fixtures {
    use std::path::Path;

    /// Writes one bundle file, creating the locale directory as needed.
    pub fn write_bundle(root: &Path, locale: &str, module: &str, json: &str) {
        let dir = root.join(locale);
        std::fs::create_dir_all(&dir).expect("Failed to create locale directory");
        std::fs::write(dir.join(format!("{module}.json")), json).expect("Failed to write bundle");
    }

    /// Writes one bundle file from a JSON value.
    pub fn write_bundle_value(root: &Path, locale: &str, module: &str, value: &serde_json::Value) {
        let json = serde_json::to_string_pretty(value).expect("Failed to serialize bundle");
        write_bundle(root, locale, module, &json);
    }

    /// English bundles for the modules the marketplace pages use.
    pub fn english_bundles() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                "common",
                r#"{"common":{"save":"Save","cancel":"Cancel","loading":"Loading...","error":"Something went wrong","selectedCount":"{count, plural, one {# selected} other {# selected}}"}}"#,
            ),
            (
                "marketplace",
                r#"{"marketplace":{"title":"Marketplace","listingCount":"{count} listings"}}"#,
            ),
            ("admin", r#"{"admin":{"title":"Administration","users":"Users"}}"#),
            ("cart", r#"{"cart":{"title":"Cart","empty":"Your cart is empty"}}"#),
            ("chat", r#"{"chat":{"title":"Messages","send":"Send"}}"#),
        ]
    }

    /// Serbian bundles; `chat` is deliberately absent.
    pub fn serbian_bundles() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                "common",
                r#"{"common":{"save":"Sačuvaj","cancel":"Otkaži","loading":"Učitavanje...","error":"Nešto nije u redu","selectedCount":"{count, plural, one {# izabran} other {# izabrano}}"}}"#,
            ),
            (
                "marketplace",
                r#"{"marketplace":{"title":"Pijaca","listingCount":"{total} oglasa"}}"#,
            ),
            ("admin", r#"{"admin":{"title":"Administracija"}}"#),
            ("cart", r#"{"cart":{"title":"Korpa","empty":"Korpa je prazna"}}"#),
        ]
    }

    /// Populates `root` with the English and Serbian fixture bundles.
    pub fn write_sample_messages(root: &Path) {
        for (module, json) in english_bundles() {
            write_bundle(root, "en", module, json);
        }
        for (module, json) in serbian_bundles() {
            write_bundle(root, "sr", module, json);
        }
    }
}
