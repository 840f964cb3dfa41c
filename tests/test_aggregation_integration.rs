// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

use std::sync::Arc;

use mysurian_core::auth::StaticProvider;
use mysurian_core::core::Config;
use mysurian_core::services::CacheState;
use mysurian_core::store::{DocumentStore, MemoryStore, CATEGORIES_COLLECTION};
use mysurian_core::Mysurian;

fn fields(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("fields must be an object"),
    }
}

async fn seed_category(store: &MemoryStore, slug: &str) {
    store
        .upsert_document(
            CATEGORIES_COLLECTION,
            slug,
            fields(serde_json::json!({"name": slug, "fields": []})),
        )
        .await
        .unwrap();
}

async fn seed_listing(store: &MemoryStore, category: &str, id: &str, name: &str) {
    store
        .upsert_document(
            category,
            id,
            fields(serde_json::json!({"name": name, "description": "in Mysuru"})),
        )
        .await
        .unwrap();
}

async fn seeded_store() -> Arc<MemoryStore> {
    mysurian_core::init_tracing();
    let store = Arc::new(MemoryStore::new());
    seed_category(&store, "hotels").await;
    seed_category(&store, "gyms").await;
    seed_listing(&store, "hotels", "h1", "Lake View Hotel").await;
    seed_listing(&store, "gyms", "g1", "PowerHouse Gym").await;
    store
}

#[tokio::test]
async fn fetch_all_tags_items_with_their_category() {
    let store = seeded_store().await;
    let app = Mysurian::new(Config::default(), store, Arc::new(StaticProvider::new()));

    let categories = vec!["hotels".to_string(), "gyms".to_string()];
    let items = app.fetcher().fetch_all(&categories).await;

    assert_eq!(items.len(), 2);
    for item in &items {
        assert!(categories.contains(&item.key.category));
    }
    assert!(items.iter().any(|i| i.key.category == "hotels" && i.key.id == "h1"));
    assert!(items.iter().any(|i| i.key.category == "gyms" && i.key.id == "g1"));
}

#[tokio::test]
async fn cache_serves_repeat_consumers_from_one_fetch() {
    let store = seeded_store().await;
    let app = Mysurian::new(Config::default(), store, Arc::new(StaticProvider::new()));

    assert_eq!(app.cache().state().await, CacheState::Empty);

    let first = app.cache().aggregate().await.unwrap();
    let second = app.cache().aggregate().await.unwrap();

    assert_eq!(app.cache().state().await, CacheState::Populated);
    assert_eq!(app.cache().load_count(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn concurrent_consumers_trigger_a_single_fetch() {
    let store = seeded_store().await;
    let app = Arc::new(Mysurian::new(
        Config::default(),
        store,
        Arc::new(StaticProvider::new()),
    ));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.cache().aggregate().await.unwrap().len()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 2);
    }

    assert_eq!(app.cache().load_count(), 1);
}

#[tokio::test]
async fn invalidate_forces_a_refetch_that_sees_new_data() {
    let store = seeded_store().await;
    let app = Mysurian::new(Config::default(), store.clone(), Arc::new(StaticProvider::new()));

    assert_eq!(app.cache().aggregate().await.unwrap().len(), 2);

    seed_listing(&store, "hotels", "h2", "Palace Stay").await;
    // Still the cached aggregate: no TTL.
    assert_eq!(app.cache().aggregate().await.unwrap().len(), 2);

    app.cache().invalidate().await;
    assert_eq!(app.cache().state().await, CacheState::Empty);
    assert_eq!(app.cache().aggregate().await.unwrap().len(), 3);
    assert_eq!(app.cache().load_count(), 2);
}

#[tokio::test]
async fn snapshot_carries_the_aggregate_across_instances() {
    let dir = tempfile::TempDir::new().unwrap();
    let snapshot = dir.path().join("aggregate.json");
    let mut config = Config::default();
    config.cache.snapshot_path = Some(snapshot.clone());

    let store = seeded_store().await;
    let first = Mysurian::new(config.clone(), store.clone(), Arc::new(StaticProvider::new()));
    assert_eq!(first.cache().aggregate().await.unwrap().len(), 2);
    assert!(snapshot.exists());

    // A fresh instance reads the snapshot eagerly and skips the network.
    let second = Mysurian::new(config, store, Arc::new(StaticProvider::new()));
    assert_eq!(second.cache().state().await, CacheState::Populated);
    assert_eq!(second.cache().aggregate().await.unwrap().len(), 2);
    assert_eq!(second.cache().load_count(), 0);
}

#[tokio::test]
async fn missing_category_collection_is_a_partial_failure() {
    let store = Arc::new(MemoryStore::new());
    seed_category(&store, "hotels").await;
    seed_category(&store, "phantom").await;
    seed_listing(&store, "hotels", "h1", "Lake View Hotel").await;

    let app = Mysurian::new(Config::default(), store, Arc::new(StaticProvider::new()));
    let aggregate = app.cache().aggregate().await.unwrap();

    assert_eq!(aggregate.len(), 1);
    assert_eq!(aggregate[0].key.category, "hotels");
}
