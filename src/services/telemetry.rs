// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Search telemetry sink.
//!
//! Every submitted search appends one immutable log entry and bumps a
//! per-category counter through the store's atomic increment. Counts are
//! cumulative for the application's lifetime; the read path orders them
//! descending to surface trending categories.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::core::{Result, SearchLogEntry};
use crate::store::{DocumentStore, SEARCH_COUNTERS_COLLECTION, SEARCH_LOG_COLLECTION};

pub struct TelemetrySink {
    store: Arc<dyn DocumentStore>,
}

impl TelemetrySink {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append one log entry and increment the category counter. The counter
    /// goes through the store's atomic primitive, never read-then-write.
    pub async fn record(&self, term: &str, category: &str) -> Result<()> {
        let category_key = category.to_lowercase();
        let entry = SearchLogEntry {
            category: category_key.clone(),
            term: term.to_string(),
            at: chrono::Utc::now(),
        };

        let fields = match serde_json::to_value(&entry) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(crate::core::MysurianError::Internal(
                    "log entry did not serialize".to_string(),
                ))
            }
        };
        self.store
            .create_document(SEARCH_LOG_COLLECTION, fields)
            .await?;

        let count = self
            .store
            .atomic_increment(SEARCH_COUNTERS_COLLECTION, &category_key, "count", 1)
            .await?;
        debug!("📊 Search logged: '{}' in '{}' (count {})", term, category_key, count);
        Ok(())
    }

    /// Counters ordered by count descending, at most `limit` of them.
    pub async fn top_searches(&self, limit: usize) -> Result<Vec<(String, i64)>> {
        let documents = match self.store.list_documents(SEARCH_COUNTERS_COLLECTION).await {
            Ok(docs) => docs,
            // Nothing recorded yet.
            Err(crate::core::StoreError::CollectionNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut counters: Vec<(String, i64)> = documents
            .into_iter()
            .map(|doc| {
                let count = doc.fields.get("count").and_then(Value::as_i64).unwrap_or(0);
                (doc.id, count)
            })
            .collect();
        counters.sort_by(|a, b| b.1.cmp(&a.1));
        counters.truncate(limit);
        Ok(counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn record_appends_log_and_bumps_counter() {
        let store = Arc::new(MemoryStore::new());
        let sink = TelemetrySink::new(store.clone());

        sink.record("lake view", "Hotels").await.unwrap();
        sink.record("pool", "hotels").await.unwrap();

        let logs = store.list_documents(SEARCH_LOG_COLLECTION).await.unwrap();
        assert_eq!(logs.len(), 2);

        let counter = store
            .get_document(SEARCH_COUNTERS_COLLECTION, "hotels")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counter.fields.get("count"), Some(&serde_json::json!(2)));
    }

    #[tokio::test]
    async fn top_searches_orders_descending() {
        let store = Arc::new(MemoryStore::new());
        let sink = TelemetrySink::new(store);

        for _ in 0..3 {
            sink.record("x", "gyms").await.unwrap();
        }
        sink.record("x", "hotels").await.unwrap();

        let top = sink.top_searches(10).await.unwrap();
        assert_eq!(top[0], ("gyms".to_string(), 3));
        assert_eq!(top[1], ("hotels".to_string(), 1));
    }

    #[tokio::test]
    async fn top_searches_empty_before_first_record() {
        let store = Arc::new(MemoryStore::new());
        let sink = TelemetrySink::new(store);
        assert!(sink.top_searches(5).await.unwrap().is_empty());
    }
}
