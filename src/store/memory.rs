// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! In-memory document store.
//!
//! Fast, non-durable backend used for development and the test suite.
//! Collections materialize on first write; listing a collection that was
//! never written is a [`StoreError::CollectionNotFound`], which the fetcher
//! tolerates as a partial failure.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::core::{DocumentId, StoreError};
use super::{CollectionSnapshot, Document, DocumentStore};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

pub struct MemoryStore {
    /// collection -> id -> fields. BTreeMap keyed by id so listing order is
    /// stable across calls within one process.
    collections: Arc<RwLock<HashMap<String, BTreeMap<DocumentId, Map<String, Value>>>>>,

    /// One broadcast channel per subscribed collection.
    watchers: Arc<RwLock<HashMap<String, broadcast::Sender<CollectionSnapshot>>>>,

    /// Operation counter, for diagnostics.
    operations: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            watchers: Arc::new(RwLock::new(HashMap::new())),
            operations: AtomicU64::new(0),
        }
    }

    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }

    /// Notify subscribers of a collection's new state. Lagging or dropped
    /// receivers are ignored.
    async fn notify(&self, collection: &str) {
        let sender = {
            let watchers = self.watchers.read().await;
            watchers.get(collection).cloned()
        };
        let Some(sender) = sender else { return };

        let documents = {
            let collections = self.collections.read().await;
            collections
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .map(|(id, fields)| Document {
                            id: id.clone(),
                            fields: fields.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        let _ = sender.send(CollectionSnapshot {
            collection: collection.to_string(),
            documents,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn store_name(&self) -> &'static str {
        "memory"
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.record_operation();
        let collections = self.collections.read().await;
        let docs = collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let result: Vec<Document> = docs
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect();

        tracing::debug!("📋 Listed {} documents from '{}'", result.len(), collection);
        Ok(result)
    }

    async fn list_documents_limited(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let mut documents = self.list_documents(collection).await?;
        documents.truncate(limit);
        Ok(documents)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.record_operation();
        let collections = self.collections.read().await;
        let doc = collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            });
        Ok(doc)
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, StoreError> {
        self.record_operation();
        let id = Uuid::new_v4().to_string();
        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), fields);
        }
        self.notify(collection).await;

        tracing::debug!("📝 Created document {}/{}", collection, id);
        Ok(id)
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.record_operation();
        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }
        self.notify(collection).await;

        tracing::debug!("📝 Upserted document {}/{}", collection, id);
        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        partial: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.record_operation();
        {
            let mut collections = self.collections.write().await;
            let docs = collections
                .get_mut(collection)
                .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;
            let fields = docs.get_mut(id).ok_or_else(|| {
                StoreError::DocumentNotFound(collection.to_string(), id.to_string())
            })?;
            for (key, value) in partial {
                fields.insert(key, value);
            }
        }
        self.notify(collection).await;

        tracing::debug!("📝 Merged update into {}/{}", collection, id);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.record_operation();
        let removed = {
            let mut collections = self.collections.write().await;
            collections
                .get_mut(collection)
                .map(|docs| docs.remove(id).is_some())
                .unwrap_or(false)
        };
        if removed {
            self.notify(collection).await;
            tracing::debug!("🗑️ Deleted document {}/{}", collection, id);
        }
        Ok(removed)
    }

    async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<i64, StoreError> {
        self.record_operation();
        let new_value = {
            let mut collections = self.collections.write().await;
            let fields = collections
                .entry(collection.to_string())
                .or_default()
                .entry(id.to_string())
                .or_default();
            let current = fields.get(field).and_then(Value::as_i64).unwrap_or(0);
            let next = current + delta;
            fields.insert(field.to_string(), Value::from(next));
            next
        };
        self.notify(collection).await;

        tracing::debug!(
            "📊 {}/{}.{} incremented by {:+} to {}",
            collection,
            id,
            field,
            delta,
            new_value
        );
        Ok(new_value)
    }

    async fn subscribe(
        &self,
        collection: &str,
    ) -> Result<broadcast::Receiver<CollectionSnapshot>, StoreError> {
        let mut watchers = self.watchers.write().await;
        let sender = watchers
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY).0);
        Ok(sender.subscribe())
    }
}
