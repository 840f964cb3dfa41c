// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Document store abstraction.
//!
//! Everything the core consumes from the managed document database is behind
//! the [`DocumentStore`] trait: collection listing, document CRUD with merge
//! semantics, an atomic counter increment, and a snapshot subscription used
//! by the review feature. The in-memory backend in [`memory`] is the default
//! implementation and the one the test suite runs against.

pub mod flags;
pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::core::{DocumentId, StoreError};

/// Well-known collection names.
pub const CATEGORIES_COLLECTION: &str = "categories";
pub const SEARCH_LOG_COLLECTION: &str = "searchlogs";
pub const SEARCH_COUNTERS_COLLECTION: &str = "searchcounters";
pub const USERS_COLLECTION: &str = "users";

/// Reviews live in one flat collection per (category, listing) pair.
pub fn reviews_collection(category: &str, listing_id: &str) -> String {
    format!("reviews_{}_{}", category, listing_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Map<String, Value>,
}

/// Snapshot pushed to subscribers after every mutation of a collection.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for identification.
    fn store_name(&self) -> &'static str;

    /// Read every document in a collection. No ordering guarantee beyond
    /// what the backend documents for itself.
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Bounded variant used by the interactive search path.
    async fn list_documents_limited(
        &self,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError>;

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Create a document with a store-assigned id.
    async fn create_document(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, StoreError>;

    /// Create or wholesale-replace a document with a caller-chosen id.
    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Merge semantics: fields absent from `partial` keep their stored value.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        partial: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Returns whether a document was actually removed.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Atomic increment-or-initialize of a numeric field; returns the new
    /// value. Counters must go through this, never read-then-write.
    async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<i64, StoreError>;

    /// Push stream of collection snapshots, emitted after each mutation.
    async fn subscribe(
        &self,
        collection: &str,
    ) -> Result<broadcast::Receiver<CollectionSnapshot>, StoreError>;
}
