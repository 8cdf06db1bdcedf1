//! Default values, including the static route tables of the marketplace pages.

use crate::schema::{Config, I18nConfig, PreloadConfig, RouteModules};
use std::path::PathBuf;
use svetu_common::LoggingConfig;

/// Module merged into every dictionary unless configured otherwise.
pub const DEFAULT_BASE_MODULE: &str = "common";

/// Locale served when none is requested.
pub const DEFAULT_LOCALE: &str = "en";

impl Default for Config {
    fn default() -> Self {
        Self {
            i18n: I18nConfig::default(),
            routes: default_routes(),
            preload_hints: default_preload_hints(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            locales: vec!["en".to_string(), "ru".to_string(), "sr".to_string()],
            messages_dir: PathBuf::from("messages"),
            base_module: DEFAULT_BASE_MODULE.to_string(),
            preload: PreloadConfig::default(),
        }
    }
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Modules each page family needs, keyed by route prefix.
pub fn default_routes() -> Vec<RouteModules> {
    vec![
        RouteModules::new("/marketplace", &["marketplace", "filters", "map"]),
        RouteModules::new("/search", &["search", "filters", "marketplace"]),
        RouteModules::new("/listing", &["listing", "marketplace", "reviews"]),
        RouteModules::new("/create-listing", &["listing", "marketplace"]),
        RouteModules::new("/storefronts", &["storefronts", "marketplace", "reviews"]),
        RouteModules::new("/cart", &["cart", "checkout"]),
        RouteModules::new("/checkout", &["checkout", "cart", "delivery"]),
        RouteModules::new("/orders", &["orders", "delivery"]),
        RouteModules::new("/chat", &["chat"]),
        RouteModules::new("/profile", &["profile", "userContacts"]),
        RouteModules::new("/admin", &["admin"]),
        RouteModules::new("/map", &["map", "filters"]),
        RouteModules::new("/cars", &["cars", "filters", "calculator"]),
        RouteModules::new("/notifications", &["notifications"]),
    ]
}

/// Modules likely needed by the navigation following a page.
pub fn default_preload_hints() -> Vec<RouteModules> {
    vec![
        RouteModules::new("/marketplace", &["cart", "chat"]),
        RouteModules::new("/cart", &["checkout", "delivery"]),
        RouteModules::new("/listing", &["chat", "cart"]),
        RouteModules::new("/storefronts", &["cart", "chat"]),
        RouteModules::new("/search", &["listing"]),
    ]
}
