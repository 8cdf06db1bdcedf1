//! Per-(locale, module) dictionary cache with coalesced loading.
//!
//! The cache is an explicit object handed to the loader, so tests and
//! embedders can hold isolated instances. Entries are never evicted and
//! never replaced: the first successful load for a key is the only one
//! stored.
//!
//! Each load runs on its own tokio task. Callers await a shared handle to
//! that task, so concurrent requests for the same key wait on one fetch,
//! and a load whose callers have all gone away still completes and fills
//! the cache.

use crate::dictionary::MessageDictionary;
use crate::error::{I18nError, I18nResult};
use crate::locale::Locale;
use crate::module::ModuleName;
use crate::namespace::normalize_namespace;
use crate::provider::BundleProvider;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use svetu_common::truncate_string;
use tracing::{debug, error, info};

type CacheKey = (Locale, ModuleName);
type SharedLoad = Shared<BoxFuture<'static, I18nResult<Arc<MessageDictionary>>>>;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Requests answered from a stored dictionary.
    pub hits: u64,
    /// Requests that started a new load.
    pub misses: u64,
    /// Requests that joined a load already in flight.
    pub coalesced: u64,
    /// Provider fetches performed.
    pub fetches: u64,
    /// Loads that failed.
    pub failures: u64,
    /// Dictionaries currently stored.
    pub entries: u64,
}

#[derive(Debug, Default)]
struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

impl CacheMetrics {
    fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Append-only store of loaded dictionaries keyed by locale and module.
#[derive(Default)]
pub struct ModuleCache {
    ready: DashMap<CacheKey, Arc<MessageDictionary>>,
    in_flight: DashMap<CacheKey, SharedLoad>,
    metrics: CacheMetrics,
}

impl fmt::Debug for ModuleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCache")
            .field("entries", &self.ready.len())
            .field("in_flight", &self.in_flight.len())
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl ModuleCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache ready to be shared with a loader.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the stored dictionary, loading it through `provider` on a
    /// miss. Concurrent calls for the same key share a single load.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::ModuleLoad`] if the fetch or parse fails. Every
    /// caller waiting on that load receives the same error and nothing is
    /// stored, so a later call retries.
    pub async fn get_or_load(
        self: &Arc<Self>,
        locale: Locale,
        module: &ModuleName,
        provider: Arc<dyn BundleProvider>,
    ) -> I18nResult<Arc<MessageDictionary>> {
        if let Some(dictionary) = self.get(locale, module) {
            CacheMetrics::record(&self.metrics.hits);
            debug!("Cache hit for {}/{}", locale, module);
            return Ok(dictionary);
        }

        let key = (locale, module.clone());
        let load = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                CacheMetrics::record(&self.metrics.coalesced);
                debug!("Joining in-flight load for {}/{}", locale, module);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                // A load may have finished between the first lookup and
                // taking the entry lock.
                if let Some(dictionary) = self.ready.get(&key) {
                    CacheMetrics::record(&self.metrics.hits);
                    return Ok(Arc::clone(dictionary.value()));
                }
                CacheMetrics::record(&self.metrics.misses);
                debug!("Cache miss for {}/{}", locale, module);
                let load = self.spawn_load(key, provider);
                entry.insert(load.clone());
                load
            }
        };

        load.await
    }

    fn spawn_load(self: &Arc<Self>, key: CacheKey, provider: Arc<dyn BundleProvider>) -> SharedLoad {
        let cache = Arc::clone(self);
        let (locale, module) = key.clone();
        let task_module = module.clone();

        let task = tokio::spawn(async move {
            let module = task_module;
            CacheMetrics::record(&cache.metrics.fetches);
            let result = fetch_dictionary(locale, &module, provider.as_ref()).await;

            let outcome = match result {
                Ok(dictionary) => {
                    let stored = Arc::clone(
                        cache
                            .ready
                            .entry(key.clone())
                            .or_insert_with(|| Arc::new(dictionary))
                            .value(),
                    );
                    info!(
                        "Loaded {}/{} ({} messages) from {}",
                        locale,
                        module,
                        stored.leaf_count(),
                        provider.describe()
                    );
                    Ok(stored)
                }
                Err(e) => {
                    CacheMetrics::record(&cache.metrics.failures);
                    error!("{}", e);
                    Err(e)
                }
            };

            cache.in_flight.remove(&key);
            outcome
        });

        async move {
            task.await.unwrap_or_else(|join_error| {
                Err(I18nError::ModuleLoad {
                    locale,
                    module,
                    reason: format!("load task did not complete: {join_error}"),
                })
            })
        }
        .boxed()
        .shared()
    }

    /// Stored dictionary for the pair, without loading.
    pub fn get(&self, locale: Locale, module: &ModuleName) -> Option<Arc<MessageDictionary>> {
        self.ready
            .get(&(locale, module.clone()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a dictionary is stored for the pair.
    pub fn contains(&self, locale: Locale, module: &ModuleName) -> bool {
        self.ready.contains_key(&(locale, module.clone()))
    }

    /// Whether a load for the pair is currently running.
    pub fn is_loading(&self, locale: Locale, module: &ModuleName) -> bool {
        self.in_flight.contains_key(&(locale, module.clone()))
    }

    /// Modules stored for a locale, sorted.
    pub fn loaded_modules(&self, locale: Locale) -> Vec<ModuleName> {
        let mut modules: Vec<ModuleName> = self
            .ready
            .iter()
            .filter(|entry| entry.key().0 == locale)
            .map(|entry| entry.key().1.clone())
            .collect();
        modules.sort();
        modules
    }

    /// Number of stored dictionaries.
    pub fn len(&self) -> usize {
        self.ready.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            coalesced: self.metrics.coalesced.load(Ordering::Relaxed),
            fetches: self.metrics.fetches.load(Ordering::Relaxed),
            failures: self.metrics.failures.load(Ordering::Relaxed),
            entries: self.ready.len() as u64,
        }
    }
}

async fn fetch_dictionary(
    locale: Locale,
    module: &ModuleName,
    provider: &dyn BundleProvider,
) -> I18nResult<MessageDictionary> {
    let load_error = |reason: String| I18nError::ModuleLoad {
        locale,
        module: module.clone(),
        reason,
    };

    let raw = provider
        .fetch(locale, module)
        .await
        .map_err(|e| load_error(e.to_string()))?;

    let mut dictionary = MessageDictionary::from_json_str(&raw).map_err(|e| {
        debug!(
            "Rejected bundle {}/{}: {}",
            locale,
            module,
            truncate_string(raw.trim(), 120)
        );
        load_error(e.to_string())
    })?;

    if normalize_namespace(module, &mut dictionary) {
        debug!("Collapsed doubled '{}' namespace in {} bundle", module, locale);
    }

    Ok(dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn module(name: &str) -> ModuleName {
        ModuleName::new(name).unwrap()
    }

    struct SlowProvider {
        calls: Arc<AtomicUsize>,
        delay: Duration,
        json: &'static str,
    }

    #[async_trait::async_trait]
    impl BundleProvider for SlowProvider {
        async fn fetch(&self, _locale: Locale, _module: &ModuleName) -> I18nResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.json.to_string())
        }
    }

    #[tokio::test]
    async fn test_second_request_is_a_hit() {
        let cache = ModuleCache::shared();
        let provider: Arc<dyn BundleProvider> =
            Arc::new(StaticProvider::new(r#"{"common":{"save":"Save"}}"#));

        let first = cache
            .get_or_load(Locale::English, &module("common"), Arc::clone(&provider))
            .await
            .unwrap();
        let second = cache
            .get_or_load(Locale::English, &module("common"), provider)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce() {
        let cache = ModuleCache::shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let provider: Arc<dyn BundleProvider> = Arc::new(SlowProvider {
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(50),
            json: r#"{"admin":{"title":"Admin"}}"#,
        });

        let admin = module("admin");
        let results = futures::future::join_all((0..8).map(|_| {
            cache.get_or_load(Locale::English, &admin, Arc::clone(&provider))
        }))
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in &results {
            assert_eq!(result.as_ref().unwrap().get_str("admin.title"), Some("Admin"));
        }
        assert_eq!(cache.stats().coalesced, 7);
        assert!(!cache.is_loading(Locale::English, &admin));
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_not_cached() {
        let cache = ModuleCache::shared();
        let provider: Arc<dyn BundleProvider> = Arc::new(StaticProvider::new("not json"));

        let err = cache
            .get_or_load(Locale::Serbian, &module("cart"), Arc::clone(&provider))
            .await
            .unwrap_err();

        match err {
            I18nError::ModuleLoad { locale, module: m, .. } => {
                assert_eq!(locale, Locale::Serbian);
                assert_eq!(m, "cart");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(cache.is_empty());
        assert!(!cache.is_loading(Locale::Serbian, &module("cart")));

        // No failure marker is kept: the next request fetches again.
        let _ = cache
            .get_or_load(Locale::Serbian, &module("cart"), provider)
            .await;
        assert_eq!(cache.stats().fetches, 2);
        assert_eq!(cache.stats().failures, 2);
    }

    #[tokio::test]
    async fn test_abandoned_load_still_populates_cache() {
        let cache = ModuleCache::shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let provider: Arc<dyn BundleProvider> = Arc::new(SlowProvider {
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(30),
            json: r#"{"chat":{"send":"Send"}}"#,
        });

        let chat = module("chat");
        let abandoned = tokio::time::timeout(
            Duration::from_millis(1),
            cache.get_or_load(Locale::English, &chat, Arc::clone(&provider)),
        )
        .await;
        assert!(abandoned.is_err(), "load should still be running");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.contains(Locale::English, &chat));

        let dictionary = cache
            .get_or_load(Locale::English, &chat, provider)
            .await
            .unwrap();
        assert_eq!(dictionary.get_str("chat.send"), Some("Send"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_double_namespace_is_collapsed_on_load() {
        let cache = ModuleCache::shared();
        let provider: Arc<dyn BundleProvider> =
            Arc::new(StaticProvider::new(r#"{"admin":{"admin":{"title":"Admin"}}}"#));

        let dictionary = cache
            .get_or_load(Locale::Russian, &module("admin"), provider)
            .await
            .unwrap();

        assert_eq!(dictionary.get_str("admin.title"), Some("Admin"));
        assert_eq!(cache.loaded_modules(Locale::Russian), vec![module("admin")]);
    }
}
