//! # Svetu I18n
//!
//! Modular translation loading for the Svetu marketplace.
//!
//! Translations are split into independently loadable modules (`common`,
//! `marketplace`, `admin`, ...) stored per locale as JSON bundles. This crate
//! provides:
//!
//! - Locale and module name types
//! - Message dictionaries with deterministic, last-writer-wins merging
//! - A provider registry resolving (locale, module) pairs to bundle sources
//! - An injectable module cache that coalesces concurrent loads
//! - Route to module tables and background preloading
//! - Double-namespace repair and cross-locale completeness checks
//!
//! # Example
//!
//! ```no_run
//! use svetu_i18n::{MessageLoader, ProviderRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProviderRegistry::from_directory("messages").await?;
//! let loader = MessageLoader::builder(registry).build()?;
//!
//! let messages = loader.load_messages("en", &["marketplace"]).await?;
//! println!("{:?}", messages.get_str("common.save"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod completeness;
pub mod dictionary;
pub mod error;
pub mod icu;
pub mod loader;
pub mod locale;
pub mod module;
pub mod namespace;
pub mod provider;
pub mod routes;

pub use cache::{CacheStats, ModuleCache};
pub use completeness::{
    check_completeness, compare_dictionaries, CompletenessReport, LocaleReport, ModuleReport, PlaceholderMismatch,
};
pub use dictionary::MessageDictionary;
pub use error::{I18nError, I18nResult};
pub use loader::{MessageLoader, MessageLoaderBuilder};
pub use locale::Locale;
pub use module::ModuleName;
pub use namespace::{fix_namespace_files, normalize_namespace};
pub use provider::{BundleProvider, FileProvider, ProviderRegistry, StaticProvider};
pub use routes::{RequiredModuleSet, RouteTable};
