//! The translation module loader.

use crate::cache::ModuleCache;
use crate::dictionary::MessageDictionary;
use crate::error::{I18nError, I18nResult};
use crate::locale::Locale;
use crate::module::ModuleName;
use crate::provider::{BundleProvider, ProviderRegistry};
use crate::routes::{RequiredModuleSet, RouteTable};
use futures::future::try_join_all;
use std::sync::Arc;
use svetu_config::{default_preload_hints, default_routes, Config, RouteModules, DEFAULT_BASE_MODULE};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Loads and merges translation modules on demand.
///
/// Cloning is cheap; clones share the registry, cache and tables.
#[derive(Debug, Clone)]
pub struct MessageLoader {
    inner: Arc<LoaderInner>,
}

#[derive(Debug)]
struct LoaderInner {
    registry: Arc<ProviderRegistry>,
    cache: Arc<ModuleCache>,
    routes: RouteTable,
    preload_hints: RouteTable,
    default_locale: Locale,
    preload_enabled: bool,
}

/// Builder for [`MessageLoader`].
#[derive(Debug)]
pub struct MessageLoaderBuilder {
    registry: Arc<ProviderRegistry>,
    cache: Option<Arc<ModuleCache>>,
    routes: Vec<RouteModules>,
    preload_hints: Vec<RouteModules>,
    base_module: String,
    default_locale: Locale,
    preload_enabled: bool,
}

impl MessageLoaderBuilder {
    fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            cache: None,
            routes: default_routes(),
            preload_hints: default_preload_hints(),
            base_module: DEFAULT_BASE_MODULE.to_string(),
            default_locale: Locale::default(),
            preload_enabled: true,
        }
    }

    /// Uses an existing cache instead of a fresh one.
    #[must_use]
    pub fn cache(mut self, cache: Arc<ModuleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the route to module table.
    #[must_use]
    pub fn routes(mut self, routes: Vec<RouteModules>) -> Self {
        self.routes = routes;
        self
    }

    /// Replaces the route to preload hint table.
    #[must_use]
    pub fn preload_hints(mut self, hints: Vec<RouteModules>) -> Self {
        self.preload_hints = hints;
        self
    }

    /// Sets the module merged into every dictionary.
    #[must_use]
    pub fn base_module(mut self, name: impl Into<String>) -> Self {
        self.base_module = name.into();
        self
    }

    /// Sets the locale used by callers that have none.
    #[must_use]
    pub fn default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Enables or disables route based preloading.
    #[must_use]
    pub fn preload_enabled(mut self, enabled: bool) -> Self {
        self.preload_enabled = enabled;
        self
    }

    /// Builds the loader.
    ///
    /// # Errors
    ///
    /// Fails if the base module or a module in either table is not a valid
    /// module name.
    pub fn build(self) -> I18nResult<MessageLoader> {
        let base = ModuleName::new(self.base_module)?;
        let routes = RouteTable::from_rows(base.clone(), &self.routes)?;
        let preload_hints = RouteTable::from_rows(base, &self.preload_hints)?;

        debug!(
            "Built message loader: {} bundles, {} routes, {} preload hints",
            self.registry.len(),
            routes.len(),
            preload_hints.len()
        );

        Ok(MessageLoader {
            inner: Arc::new(LoaderInner {
                registry: self.registry,
                cache: self.cache.unwrap_or_else(ModuleCache::shared),
                routes,
                preload_hints,
                default_locale: self.default_locale,
                preload_enabled: self.preload_enabled,
            }),
        })
    }
}

impl MessageLoader {
    /// Starts building a loader over `registry`.
    pub fn builder(registry: impl Into<Arc<ProviderRegistry>>) -> MessageLoaderBuilder {
        MessageLoaderBuilder::new(registry.into())
    }

    /// Builds a loader from application configuration.
    ///
    /// # Errors
    ///
    /// Fails if a configured locale is not supported, or on the same
    /// conditions as [`MessageLoaderBuilder::build`].
    pub fn from_config(
        config: &Config,
        registry: impl Into<Arc<ProviderRegistry>>,
        cache: Arc<ModuleCache>,
    ) -> I18nResult<Self> {
        for code in &config.i18n.locales {
            parse_locale(code)?;
        }
        let default_locale = parse_locale(&config.i18n.default_locale)?;

        Self::builder(registry)
            .cache(cache)
            .routes(config.routes.clone())
            .preload_hints(config.preload_hints.clone())
            .base_module(config.i18n.base_module.clone())
            .default_locale(default_locale)
            .preload_enabled(config.i18n.preload.enabled)
            .build()
    }

    /// Loads the base module and `modules` for a locale code and merges them.
    ///
    /// `modules` are merged in the given order and later modules win where
    /// key paths overlap. The base module is merged first unless `modules`
    /// lists it, in which case it takes its listed position. A repeated name
    /// is merged at its last position.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::UnknownLocale`] or [`I18nError::UnknownModule`]
    /// before any fetch if the request names something that does not exist,
    /// and [`I18nError::ModuleLoad`] if any module fails to load. No partial
    /// dictionary is returned.
    pub async fn load_messages<S: AsRef<str>>(
        &self,
        locale: &str,
        modules: &[S],
    ) -> I18nResult<MessageDictionary> {
        let locale = parse_locale(locale)?;
        let modules = modules
            .iter()
            .map(|name| self.resolve_module(locale, name.as_ref()))
            .collect::<I18nResult<Vec<_>>>()?;
        self.load(locale, &modules).await
    }

    /// Typed variant of [`MessageLoader::load_messages`].
    ///
    /// # Errors
    ///
    /// Same as [`MessageLoader::load_messages`].
    #[instrument(skip_all, fields(locale = %locale, requested = modules.len()))]
    pub async fn load(&self, locale: Locale, modules: &[ModuleName]) -> I18nResult<MessageDictionary> {
        let plan = self.merge_plan(modules);
        let providers = plan
            .iter()
            .map(|module| self.provider(locale, module))
            .collect::<I18nResult<Vec<_>>>()?;

        let cache = &self.inner.cache;
        let dictionaries = try_join_all(
            plan.iter()
                .zip(providers)
                .map(|(module, provider)| cache.get_or_load(locale, module, provider)),
        )
        .await?;

        let merged = MessageDictionary::merged(dictionaries.iter().map(|d| &**d));
        debug!(
            "Merged {} modules into {} messages",
            plan.len(),
            merged.leaf_count()
        );
        Ok(merged)
    }

    /// Modules the page at `pathname` needs, base module first.
    pub fn required_modules(&self, pathname: &str) -> RequiredModuleSet {
        self.inner.routes.required_modules(pathname)
    }

    /// Loads everything the page at `pathname` needs.
    ///
    /// # Errors
    ///
    /// Same as [`MessageLoader::load`].
    #[instrument(skip(self))]
    pub async fn load_for_route(&self, locale: Locale, pathname: &str) -> I18nResult<MessageDictionary> {
        let required = self.required_modules(pathname);
        self.load(locale, required.as_slice()).await
    }

    /// Warms the cache in the background. Failures are logged and dropped;
    /// the returned handle may be ignored.
    pub fn preload_modules<S: AsRef<str>>(&self, locale: &str, modules: &[S]) -> JoinHandle<()> {
        let loader = self.clone();
        let code = locale.to_string();
        let names: Vec<String> = modules.iter().map(|m| m.as_ref().to_string()).collect();

        tokio::spawn(async move {
            let locale = match parse_locale(&code) {
                Ok(locale) => locale,
                Err(e) => {
                    warn!("Preload skipped: {}", e);
                    return;
                }
            };
            loader.preload_each(locale, &names).await;
        })
    }

    /// Preloads the hinted modules for the page likely to follow
    /// `pathname`. Returns `None` when preloading is disabled or nothing is
    /// hinted.
    pub fn preload_for_route(&self, locale: Locale, pathname: &str) -> Option<JoinHandle<()>> {
        if !self.inner.preload_enabled {
            return None;
        }
        let hinted: Vec<String> = self
            .inner
            .preload_hints
            .matched(pathname)?
            .iter()
            .map(ToString::to_string)
            .collect();

        debug!("Preloading {:?} for {} ({})", hinted, pathname, locale);
        Some(self.preload_modules(locale.code(), &hinted))
    }

    /// The shared module cache.
    pub fn cache(&self) -> &Arc<ModuleCache> {
        &self.inner.cache
    }

    /// The provider registry.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.inner.registry
    }

    /// The route to module table.
    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }

    /// The base module.
    pub fn base_module(&self) -> &ModuleName {
        self.inner.routes.base()
    }

    /// Locale used by callers that have none.
    pub fn default_locale(&self) -> Locale {
        self.inner.default_locale
    }

    /// Modules loaded one at a time so a failure only skips that module.
    async fn preload_each(&self, locale: Locale, names: &[String]) {
        let mut loaded = 0usize;
        for name in names {
            let result = match self.resolve_module(locale, name) {
                Ok(module) => self.load_single(locale, &module).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => loaded += 1,
                Err(e) => warn!("Preload of {}/{} failed: {}", locale, name, e),
            }
        }
        info!("Preloaded {}/{} modules for {}", loaded, names.len(), locale);
    }

    async fn load_single(&self, locale: Locale, module: &ModuleName) -> I18nResult<()> {
        let provider = self.provider(locale, module)?;
        self.inner.cache.get_or_load(locale, module, provider).await?;
        Ok(())
    }

    /// `modules` in order, each name at its last position, with the base
    /// module in front when it was not requested.
    fn merge_plan(&self, modules: &[ModuleName]) -> Vec<ModuleName> {
        let mut plan: Vec<ModuleName> = modules
            .iter()
            .enumerate()
            .filter(|(i, module)| !modules[i + 1..].contains(module))
            .map(|(_, module)| module.clone())
            .collect();
        if !plan.contains(self.base_module()) {
            plan.insert(0, self.base_module().clone());
        }
        plan
    }

    fn resolve_module(&self, locale: Locale, name: &str) -> I18nResult<ModuleName> {
        let module = ModuleName::new(name).map_err(|_| I18nError::UnknownModule {
            locale,
            module: name.to_string(),
        })?;
        if self.inner.registry.contains(locale, &module) {
            Ok(module)
        } else {
            Err(I18nError::UnknownModule {
                locale,
                module: name.to_string(),
            })
        }
    }

    fn provider(&self, locale: Locale, module: &ModuleName) -> I18nResult<Arc<dyn BundleProvider>> {
        self.inner
            .registry
            .get(locale, module)
            .ok_or_else(|| I18nError::UnknownModule {
                locale,
                module: module.to_string(),
            })
    }
}

fn parse_locale(code: &str) -> I18nResult<Locale> {
    Locale::from_code(code).ok_or_else(|| I18nError::UnknownLocale {
        code: code.to_string(),
    })
}
