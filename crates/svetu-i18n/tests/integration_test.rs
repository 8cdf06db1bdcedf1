//! End-to-end tests for loading, merging, coalescing and route resolution.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use svetu_common::test_utils::{bundle_fixtures, create_temp_dir, init_test_logging};
use svetu_i18n::{
    check_completeness, I18nError, Locale, MessageLoader, ModuleCache, ModuleName, ProviderRegistry,
};
use tokio::sync::Semaphore;

type Counters = HashMap<&'static str, Arc<AtomicUsize>>;

/// Registry whose English providers count their fetches. Fetches of gated
/// modules wait for a permit on `gate`.
fn counting_registry(gate: Option<(&'static str, Arc<Semaphore>)>) -> (ProviderRegistry, Counters) {
    let mut registry = ProviderRegistry::new();
    let mut counters = Counters::new();

    for (module, json) in bundle_fixtures::english_bundles() {
        let calls = Arc::new(AtomicUsize::new(0));
        counters.insert(module, Arc::clone(&calls));
        let gate = gate
            .as_ref()
            .filter(|(gated, _)| *gated == module)
            .map(|(_, semaphore)| Arc::clone(semaphore));

        registry
            .register_fn(Locale::English, module, move |_, _| {
                let calls = Arc::clone(&calls);
                let gate = gate.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    if let Some(gate) = gate {
                        let _permit = gate.acquire().await;
                    }
                    Ok(json.to_string())
                }
            })
            .unwrap();
    }

    (registry, counters)
}

fn fetches(counters: &Counters, module: &str) -> usize {
    counters[module].load(Ordering::SeqCst)
}

#[tokio::test]
async fn test_repeated_loads_fetch_each_module_once() {
    init_test_logging();
    let (registry, counters) = counting_registry(None);
    let loader = MessageLoader::builder(registry).build().unwrap();

    for _ in 0..3 {
        loader.load_messages("en", &["marketplace", "cart"]).await.unwrap();
    }
    loader.load_messages("en", &["cart"]).await.unwrap();

    assert_eq!(fetches(&counters, "common"), 1);
    assert_eq!(fetches(&counters, "marketplace"), 1);
    assert_eq!(fetches(&counters, "cart"), 1);
    assert_eq!(fetches(&counters, "admin"), 0);
}

#[tokio::test]
async fn test_last_listed_module_wins() {
    let mut registry = ProviderRegistry::new();
    registry
        .register_static(Locale::English, "common", r#"{"common":{"save":"Save"}}"#)
        .unwrap();
    registry
        .register_static(
            Locale::English,
            "listing",
            r#"{"shared":{"title":"From listing","only_listing":"L"}}"#,
        )
        .unwrap();
    registry
        .register_static(Locale::English, "reviews", r#"{"shared":{"title":"From reviews"}}"#)
        .unwrap();
    let loader = MessageLoader::builder(registry).build().unwrap();

    let forward = loader.load_messages("en", &["listing", "reviews"]).await.unwrap();
    assert_eq!(forward.get_str("shared.title"), Some("From reviews"));
    assert_eq!(forward.get_str("shared.only_listing"), Some("L"));

    let reverse = loader.load_messages("en", &["reviews", "listing"]).await.unwrap();
    assert_eq!(reverse.get_str("shared.title"), Some("From listing"));
}

#[tokio::test]
async fn test_base_module_listed_last_wins() {
    let mut registry = ProviderRegistry::new();
    registry
        .register_static(Locale::English, "common", r#"{"shared":{"k":"from common"},"common":{"cancel":"Cancel"}}"#)
        .unwrap();
    registry
        .register_static(Locale::English, "cart", r#"{"shared":{"k":"from cart"}}"#)
        .unwrap();
    let loader = MessageLoader::builder(registry).build().unwrap();

    let messages = loader.load_messages("en", &["cart", "common"]).await.unwrap();
    assert_eq!(messages.get_str("shared.k"), Some("from common"));
    assert_eq!(messages.get_str("common.cancel"), Some("Cancel"));

    let implicit_base = loader.load_messages("en", &["cart"]).await.unwrap();
    assert_eq!(implicit_base.get_str("shared.k"), Some("from cart"));

    let repeated = loader.load_messages("en", &["common", "cart", "common"]).await.unwrap();
    assert_eq!(repeated.get_str("shared.k"), Some("from common"));
}

#[test]
fn test_marketplace_route_requires_base_and_marketplace_modules() {
    let loader = MessageLoader::builder(ProviderRegistry::new()).build().unwrap();
    let required = loader.required_modules("/marketplace/anything");

    assert_eq!(required.as_slice()[0], "common");
    assert!(required.contains("marketplace"));
    assert!(required.contains("filters"));
}

#[test]
fn test_root_route_is_base_only_and_stable() {
    let loader = MessageLoader::builder(ProviderRegistry::new()).build().unwrap();
    let first = loader.required_modules("/");
    let second = loader.required_modules("/");

    assert_eq!(first.names(), vec!["common"]);
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loads_share_one_fetch() {
    init_test_logging();
    let gate = Arc::new(Semaphore::new(0));
    let (registry, counters) = counting_registry(Some(("admin", Arc::clone(&gate))));
    let loader = MessageLoader::builder(registry).build().unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load_messages("en", &["admin"]).await })
        })
        .collect();

    while fetches(&counters, "admin") == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.add_permits(1);

    for task in tasks {
        let messages = task.await.unwrap().unwrap();
        assert_eq!(messages.get_str("admin.users"), Some("Users"));
    }
    assert_eq!(fetches(&counters, "admin"), 1);
    assert_eq!(fetches(&counters, "common"), 1);
}

#[tokio::test]
async fn test_loaded_dictionary_contains_base_keys() {
    let dir = create_temp_dir();
    bundle_fixtures::write_sample_messages(dir.path());
    let registry = ProviderRegistry::from_directory(dir.path()).await.unwrap();
    let loader = MessageLoader::builder(registry).build().unwrap();

    let messages = loader.load_messages("en", &["common"]).await.unwrap();
    assert_eq!(messages.get_str("common.save"), Some("Save"));

    let serbian = loader.load_messages("sr", &["cart"]).await.unwrap();
    assert_eq!(serbian.get_str("cart.title"), Some("Korpa"));
    assert_eq!(serbian.get_str("common.save"), Some("Sačuvaj"));
}

#[tokio::test]
async fn test_unknown_module_and_locale_fail() {
    let (registry, counters) = counting_registry(None);
    let loader = MessageLoader::builder(registry).build().unwrap();

    let err = loader.load_messages("en", &["doesNotExist"]).await.unwrap_err();
    assert!(matches!(err, I18nError::UnknownModule { ref module, .. } if module == "doesNotExist"));

    let err = loader.load_messages("xx", &["common"]).await.unwrap_err();
    assert!(matches!(err, I18nError::UnknownLocale { .. }));

    // Registered for English only.
    let err = loader.load_messages("ru", &["cart"]).await.unwrap_err();
    assert!(matches!(err, I18nError::UnknownModule { locale: Locale::Russian, .. }));

    assert_eq!(fetches(&counters, "common"), 0);
}

#[tokio::test]
async fn test_failed_bundle_fails_whole_call_and_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let mut registry = ProviderRegistry::new();
    registry
        .register_static(Locale::Serbian, "common", r#"{"common":{"save":"Sačuvaj"}}"#)
        .unwrap();
    let counter = Arc::clone(&attempts);
    registry
        .register_fn(Locale::Serbian, "cart", move |_, _| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Ok(r#"{"cart": ["not", "a", "message"]}"#.to_string())
                } else {
                    Ok(r#"{"cart":{"title":"Korpa"}}"#.to_string())
                }
            }
        })
        .unwrap();
    let loader = MessageLoader::builder(registry).build().unwrap();

    let err = loader.load_messages("sr", &["cart"]).await.unwrap_err();
    match &err {
        I18nError::ModuleLoad { locale, module, .. } => {
            assert_eq!(*locale, Locale::Serbian);
            assert_eq!(module, &"cart");
        }
        other => panic!("expected a module load error, got {other:?}"),
    }
    let text = err.to_string();
    assert!(text.contains("cart") && text.contains("sr"));

    let cart = ModuleName::new("cart").unwrap();
    assert!(!loader.cache().contains(Locale::Serbian, &cart));

    let messages = loader.load_messages("sr", &["cart"]).await.unwrap();
    assert_eq!(messages.get_str("cart.title"), Some("Korpa"));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_abandoned_load_still_populates_cache() {
    let gate = Arc::new(Semaphore::new(0));
    let (registry, counters) = counting_registry(Some(("chat", Arc::clone(&gate))));
    let loader = MessageLoader::builder(registry).build().unwrap();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        loader.load_messages("en", &["chat"]),
    )
    .await;
    assert!(abandoned.is_err());

    gate.add_permits(1);
    let chat = ModuleName::new("chat").unwrap();
    for _ in 0..100 {
        if loader.cache().contains(Locale::English, &chat) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(loader.cache().contains(Locale::English, &chat));

    loader.load_messages("en", &["chat"]).await.unwrap();
    assert_eq!(fetches(&counters, "chat"), 1);
}

#[tokio::test]
async fn test_preload_errors_are_swallowed() {
    init_test_logging();
    let (registry, counters) = counting_registry(None);
    let loader = MessageLoader::builder(registry).build().unwrap();

    loader
        .preload_modules("en", &["doesNotExist", "cart"])
        .await
        .unwrap();
    loader.preload_modules("xx", &["cart"]).await.unwrap();

    assert!(loader
        .cache()
        .contains(Locale::English, &ModuleName::new("cart").unwrap()));
    assert_eq!(fetches(&counters, "cart"), 1);
}

#[tokio::test]
async fn test_preload_for_route_warms_hinted_modules() {
    let (registry, counters) = counting_registry(None);
    let loader = MessageLoader::builder(registry).build().unwrap();

    loader
        .preload_for_route(Locale::English, "/en/marketplace?page=2")
        .unwrap()
        .await
        .unwrap();

    assert_eq!(fetches(&counters, "cart"), 1);
    assert_eq!(fetches(&counters, "chat"), 1);
    assert_eq!(fetches(&counters, "marketplace"), 0);
}

#[tokio::test]
async fn test_shared_cache_between_loaders() {
    let cache = ModuleCache::shared();
    let registry = Arc::new(counting_registry(None).0);

    let first = MessageLoader::builder(Arc::clone(&registry))
        .cache(Arc::clone(&cache))
        .build()
        .unwrap();
    let second = MessageLoader::builder(registry).cache(Arc::clone(&cache)).build().unwrap();

    first.load_messages("en", &["cart"]).await.unwrap();
    second.load_messages("en", &["cart"]).await.unwrap();

    let stats = cache.stats();
    assert_eq!(stats.fetches, 2);
    assert_eq!(stats.entries, 2);
    assert!(stats.hits >= 2);
}

#[tokio::test]
async fn test_double_namespace_is_normalized_on_load() {
    let dir = create_temp_dir();
    bundle_fixtures::write_bundle(dir.path(), "ru", "common", r#"{"common":{"save":"Сохранить"}}"#);
    bundle_fixtures::write_bundle(
        dir.path(),
        "ru",
        "admin",
        r#"{"admin":{"admin":{"title":"Администрирование"}}}"#,
    );
    let registry = ProviderRegistry::from_directory(dir.path()).await.unwrap();
    let loader = MessageLoader::builder(registry).build().unwrap();

    let messages = loader.load_messages("ru", &["admin"]).await.unwrap();
    assert_eq!(messages.get_str("admin.title"), Some("Администрирование"));
    assert!(!messages.contains("admin.admin"));
}

#[tokio::test]
async fn test_completeness_of_fixture_bundles() {
    let dir = create_temp_dir();
    bundle_fixtures::write_sample_messages(dir.path());
    let registry = Arc::new(ProviderRegistry::from_directory(dir.path()).await.unwrap());

    let report = check_completeness(registry, Locale::English).await.unwrap();
    assert!(!report.is_complete());

    let serbian = report.locale(Locale::Serbian).unwrap();
    assert_eq!(serbian.missing_modules, vec![ModuleName::new("chat").unwrap()]);

    let admin = serbian.modules.iter().find(|m| m.module == "admin").unwrap();
    assert_eq!(admin.missing_keys, vec!["admin.users"]);

    let marketplace = serbian.modules.iter().find(|m| m.module == "marketplace").unwrap();
    assert_eq!(marketplace.placeholder_mismatches.len(), 1);
    assert_eq!(marketplace.placeholder_mismatches[0].key, "marketplace.listingCount");

    // No Russian bundles at all.
    let russian = report.locale(Locale::Russian).unwrap();
    assert_eq!(russian.missing_modules.len(), 5);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["reference"], "en");
}
