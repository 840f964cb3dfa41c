// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Reviews.
//!
//! One review per (listing, author): the review document is keyed by the
//! author's principal id, so a second submission overwrites the first.
//! Consumers that render live review lists subscribe to the collection's
//! snapshot stream instead of polling.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::auth::IdentityProvider;
use crate::core::{AuthError, MysurianError, Result, Review, ValidationError};
use crate::store::{reviews_collection, CollectionSnapshot, DocumentStore};

pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Create or replace the signed-in author's review of a listing.
    pub async fn upsert_review(
        &self,
        category: &str,
        listing_id: &str,
        comment: &str,
    ) -> Result<Review> {
        let principal = self
            .identity
            .current_principal()
            .ok_or(AuthError::SignInRequired)?;
        if comment.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "comment".to_string(),
            }
            .into());
        }

        let review = Review {
            author_name: principal.display_name.clone(),
            author_id: principal.id.clone(),
            comment: comment.trim().to_string(),
            created_at: chrono::Utc::now(),
        };
        let fields = match serde_json::to_value(&review) {
            Ok(Value::Object(map)) => map,
            _ => return Err(MysurianError::Internal("review did not serialize".into())),
        };

        let collection = reviews_collection(category, listing_id);
        self.store
            .upsert_document(&collection, &principal.id, fields)
            .await?;

        info!("✅ Review saved for {}/{} by {}", category, listing_id, principal.id);
        Ok(review)
    }

    /// Remove the signed-in author's review, if any.
    pub async fn delete_review(&self, category: &str, listing_id: &str) -> Result<bool> {
        let principal = self
            .identity
            .current_principal()
            .ok_or(AuthError::SignInRequired)?;
        let collection = reviews_collection(category, listing_id);
        let deleted = self.store.delete_document(&collection, &principal.id).await?;
        if deleted {
            info!("🗑️ Review removed for {}/{} by {}", category, listing_id, principal.id);
        }
        Ok(deleted)
    }

    /// All reviews of a listing, newest first. A listing nobody has reviewed
    /// yet has no collection; that reads as empty, not as an error.
    pub async fn list_reviews(&self, category: &str, listing_id: &str) -> Result<Vec<Review>> {
        let collection = reviews_collection(category, listing_id);
        let documents = match self.store.list_documents(&collection).await {
            Ok(docs) => docs,
            Err(crate::core::StoreError::CollectionNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reviews: Vec<Review> = documents
            .into_iter()
            .filter_map(|doc| serde_json::from_value(Value::Object(doc.fields)).ok())
            .collect();
        reviews.sort_by(|a: &Review, b: &Review| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    /// Push stream of snapshots for a listing's review collection.
    pub async fn watch_reviews(
        &self,
        category: &str,
        listing_id: &str,
    ) -> Result<broadcast::Receiver<CollectionSnapshot>> {
        let collection = reviews_collection(category, listing_id);
        Ok(self.store.subscribe(&collection).await?)
    }

    /// Decode a pushed snapshot into reviews, newest first.
    pub fn snapshot_reviews(snapshot: &CollectionSnapshot) -> Vec<Review> {
        let mut reviews: Vec<Review> = snapshot
            .documents
            .iter()
            .filter_map(|doc| serde_json::from_value(Value::Object(doc.fields.clone())).ok())
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }
}
