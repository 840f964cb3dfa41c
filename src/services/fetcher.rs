// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Multi-collection fetcher.
//!
//! Fans reads out across category collections concurrently and concatenates
//! the results, tagging each document with its source category. A category
//! whose collection cannot be read contributes zero items; the failure is
//! logged here and the fetch continues. Deduplication is the caller's
//! concern, not this layer's.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{AggregateItem, CategoryId};
use crate::store::DocumentStore;

pub struct Fetcher {
    store: Arc<dyn DocumentStore>,
}

impl Fetcher {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Read every document of every given category. Result order is
    /// per-category completion order and is not stable across runs.
    pub async fn fetch_all(&self, categories: &[CategoryId]) -> Vec<AggregateItem> {
        self.fetch(categories, None).await
    }

    /// Bounded variant for the interactive path: caps each category's read.
    pub async fn fetch_bounded(&self, categories: &[CategoryId], limit: usize) -> Vec<AggregateItem> {
        self.fetch(categories, Some(limit)).await
    }

    async fn fetch(&self, categories: &[CategoryId], limit: Option<usize>) -> Vec<AggregateItem> {
        let reads = categories.iter().map(|category| {
            let store = self.store.clone();
            async move {
                let result = match limit {
                    Some(limit) => store.list_documents_limited(category, limit).await,
                    None => store.list_documents(category).await,
                };
                (category, result)
            }
        });

        let mut items = Vec::new();
        for (category, result) in join_all(reads).await {
            match result {
                Ok(documents) => {
                    debug!("🔍 Fetched {} documents from '{}'", documents.len(), category);
                    items.extend(
                        documents
                            .into_iter()
                            .map(|doc| AggregateItem::new(category.clone(), doc.id, doc.fields)),
                    );
                }
                Err(e) => {
                    // Partial failure is tolerated: the category contributes
                    // zero items and the aggregate stays usable.
                    warn!("⚠️ Skipping unreadable category '{}': {}", category, e);
                }
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn seed(store: &MemoryStore, category: &str, names: &[&str]) {
        for name in names {
            let fields = match json!({"name": name, "description": "x"}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            };
            store.create_document(category, fields).await.unwrap();
        }
    }

    #[tokio::test]
    async fn items_carry_their_source_category() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "hotels", &["Lake View Hotel"]).await;
        seed(&store, "gyms", &["PowerHouse Gym"]).await;

        let fetcher = Fetcher::new(store);
        let categories = vec!["hotels".to_string(), "gyms".to_string()];
        let items = fetcher.fetch_all(&categories).await;

        assert_eq!(items.len(), 2);
        for item in &items {
            assert!(categories.contains(&item.key.category));
        }
    }

    #[tokio::test]
    async fn unreadable_category_contributes_zero_items() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "hotels", &["Lake View Hotel"]).await;

        let fetcher = Fetcher::new(store);
        let items = fetcher
            .fetch_all(&["hotels".to_string(), "phantom".to_string()])
            .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key.category, "hotels");
    }

    #[tokio::test]
    async fn bounded_fetch_caps_each_category() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "hotels", &["a", "b", "c", "d", "e"]).await;
        seed(&store, "gyms", &["f", "g"]).await;

        let fetcher = Fetcher::new(store);
        let items = fetcher
            .fetch_bounded(&["hotels".to_string(), "gyms".to_string()], 3)
            .await;

        let hotels = items.iter().filter(|i| i.key.category == "hotels").count();
        assert_eq!(hotels, 3);
        assert_eq!(items.len(), 5);
    }
}
