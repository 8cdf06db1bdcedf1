//! Bundle providers and the registry mapping (locale, module) pairs to them.
//!
//! A provider is invoked lazily, the first time its module is requested for
//! its locale. Raw JSON text is returned; parsing happens in the cache so all
//! providers share the same validation.

use crate::error::{I18nError, I18nResult};
use crate::locale::Locale;
use crate::module::ModuleName;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of the raw JSON text of one message bundle.
#[async_trait]
pub trait BundleProvider: Send + Sync {
    /// Fetches the bundle text.
    async fn fetch(&self, locale: Locale, module: &ModuleName) -> I18nResult<String>;

    /// Short human readable description, used in logs.
    fn describe(&self) -> String {
        "custom provider".to_string()
    }
}

/// Bundle text held in memory, typically embedded with `include_str!`.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    json: Cow<'static, str>,
}

impl StaticProvider {
    /// Wraps static JSON text.
    pub const fn new(json: &'static str) -> Self {
        Self {
            json: Cow::Borrowed(json),
        }
    }

    /// Wraps owned JSON text.
    pub const fn from_string(json: String) -> Self {
        Self {
            json: Cow::Owned(json),
        }
    }
}

#[async_trait]
impl BundleProvider for StaticProvider {
    async fn fetch(&self, _locale: Locale, _module: &ModuleName) -> I18nResult<String> {
        Ok(self.json.to_string())
    }

    fn describe(&self) -> String {
        format!("static bundle ({} bytes)", self.json.len())
    }
}

/// Bundle stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    /// Reads from `path` on every fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file backing this provider.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BundleProvider for FileProvider {
    async fn fetch(&self, _locale: Locale, _module: &ModuleName) -> I18nResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| I18nError::io(&self.path, &e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

type FetchFn = dyn Fn(Locale, ModuleName) -> BoxFuture<'static, I18nResult<String>> + Send + Sync;

struct FnProvider {
    fetch: Box<FetchFn>,
}

#[async_trait]
impl BundleProvider for FnProvider {
    async fn fetch(&self, locale: Locale, module: &ModuleName) -> I18nResult<String> {
        (self.fetch)(locale, module.clone()).await
    }
}

/// Registry of bundle providers keyed by locale and module.
///
/// Which modules exist can differ per locale; a module is available for a
/// locale exactly when a provider is registered for that pair.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<(Locale, ModuleName), Arc<dyn BundleProvider>>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .providers
            .keys()
            .map(|(locale, module)| format!("{locale}/{module}"))
            .collect();
        keys.sort();
        f.debug_struct("ProviderRegistry").field("modules", &keys).finish()
    }
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider, returning the one it replaced.
    pub fn register(
        &mut self,
        locale: Locale,
        module: ModuleName,
        provider: impl BundleProvider + 'static,
    ) -> Option<Arc<dyn BundleProvider>> {
        self.providers.insert((locale, module), Arc::new(provider))
    }

    /// Registers in-memory JSON text for a module.
    ///
    /// # Errors
    ///
    /// Fails if `module` is not a valid module name.
    pub fn register_static(&mut self, locale: Locale, module: &str, json: &'static str) -> I18nResult<()> {
        self.register(locale, ModuleName::new(module)?, StaticProvider::new(json));
        Ok(())
    }

    /// Registers a closure returning a future of the bundle text.
    ///
    /// # Errors
    ///
    /// Fails if `module` is not a valid module name.
    pub fn register_fn<F, Fut>(&mut self, locale: Locale, module: &str, fetch: F) -> I18nResult<()>
    where
        F: Fn(Locale, ModuleName) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = I18nResult<String>> + Send + 'static,
    {
        let provider = FnProvider {
            fetch: Box::new(move |locale: Locale, module: ModuleName| fetch(locale, module).boxed()),
        };
        self.register(locale, ModuleName::new(module)?, provider);
        Ok(())
    }

    /// Builds a registry from a `<dir>/<locale>/<module>.json` layout.
    ///
    /// Directories that are not supported locales and files whose stem is
    /// not a valid module name are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Fails if `dir` or one of its locale directories cannot be read.
    pub async fn from_directory(dir: impl AsRef<Path>) -> I18nResult<Self> {
        let dir = dir.as_ref();
        let mut registry = Self::new();

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| I18nError::io(dir, &e))?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| I18nError::io(dir, &e))? {
            let locale_dir = entry.path();
            if !is_directory(&locale_dir).await {
                continue;
            }

            let Some(locale) = locale_dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(Locale::from_code)
            else {
                warn!("Skipping directory for unsupported locale: {}", locale_dir.display());
                continue;
            };

            registry.scan_locale_dir(locale, &locale_dir).await?;
        }

        info!(
            "Registered {} bundles for {} locales from {}",
            registry.len(),
            registry.locales().len(),
            dir.display()
        );
        Ok(registry)
    }

    async fn scan_locale_dir(&mut self, locale: Locale, locale_dir: &Path) -> I18nResult<()> {
        let mut files = tokio::fs::read_dir(locale_dir)
            .await
            .map_err(|e| I18nError::io(locale_dir, &e))?;

        while let Some(file) = files
            .next_entry()
            .await
            .map_err(|e| I18nError::io(locale_dir, &e))?
        {
            let path = file.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match ModuleName::new(stem) {
                Ok(module) => {
                    debug!("Registered {}/{} -> {}", locale, module, path.display());
                    self.register(locale, module, FileProvider::new(path));
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(())
    }

    /// Provider registered for the pair, if any.
    pub fn get(&self, locale: Locale, module: &ModuleName) -> Option<Arc<dyn BundleProvider>> {
        self.providers.get(&(locale, module.clone())).cloned()
    }

    /// Whether the module is available for the locale.
    pub fn contains(&self, locale: Locale, module: &ModuleName) -> bool {
        self.providers.contains_key(&(locale, module.clone()))
    }

    /// Modules available for a locale, sorted by name.
    pub fn modules_for(&self, locale: Locale) -> Vec<ModuleName> {
        let mut modules: Vec<ModuleName> = self
            .providers
            .keys()
            .filter(|(l, _)| *l == locale)
            .map(|(_, m)| m.clone())
            .collect();
        modules.sort();
        modules
    }

    /// Locales with at least one module, sorted.
    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = self.providers.keys().map(|(l, _)| *l).collect();
        locales.sort();
        locales.dedup();
        locales
    }

    /// Number of registered bundles.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no bundle is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Follows symlinks; unreadable entries count as not a directory.
pub(crate) async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|meta| meta.is_dir())
}
