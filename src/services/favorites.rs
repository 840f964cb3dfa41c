// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Users and favorites.
//!
//! A user record is created on first sign-in, keyed by the provider
//! identity. Favorites are stored as composite identity pairs, not item
//! snapshots; hydration re-fetches the listing so the display never shows
//! stale data. The favorites list is replaced wholesale on every mutation.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::IdentityProvider;
use crate::core::{AggregateItem, AuthError, ItemKey, Principal, Result};
use crate::store::{DocumentStore, USERS_COLLECTION};

pub struct FavoritesService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Ensure a user record exists for the signed-in principal. Safe to call
    /// on every sign-in; an existing record is left untouched.
    pub async fn register(&self) -> Result<Principal> {
        let principal = self.require_principal()?;
        let existing = self
            .store
            .get_document(USERS_COLLECTION, &principal.id)
            .await?;
        if existing.is_none() {
            let mut fields = Map::new();
            fields.insert("displayName".to_string(), Value::from(principal.display_name.clone()));
            fields.insert("email".to_string(), Value::from(principal.email.clone()));
            fields.insert("favorites".to_string(), Value::Array(Vec::new()));
            self.store
                .upsert_document(USERS_COLLECTION, &principal.id, fields)
                .await?;
            info!("✅ User record created for {}", principal.id);
        }
        Ok(principal)
    }

    /// Idempotent: favoriting an already-favorited pair changes nothing.
    pub async fn add_favorite(&self, key: &ItemKey) -> Result<()> {
        let principal = self.register().await?;
        let mut favorites = self.load_favorites(&principal).await?;
        if !favorites.contains(key) {
            favorites.push(key.clone());
            self.save_favorites(&principal, &favorites).await?;
            debug!("⭐ {} favorited {}", principal.id, key);
        }
        Ok(())
    }

    /// Idempotent: removing a non-member changes nothing.
    pub async fn remove_favorite(&self, key: &ItemKey) -> Result<()> {
        let principal = self.register().await?;
        let mut favorites = self.load_favorites(&principal).await?;
        let before = favorites.len();
        favorites.retain(|k| k != key);
        if favorites.len() != before {
            self.save_favorites(&principal, &favorites).await?;
            debug!("⭐ {} unfavorited {}", principal.id, key);
        }
        Ok(())
    }

    pub async fn favorites(&self) -> Result<Vec<ItemKey>> {
        let principal = self.require_principal()?;
        self.load_favorites(&principal).await
    }

    /// Favorites re-fetched from the store. Pairs whose listing has since
    /// been deleted are skipped.
    pub async fn favorites_hydrated(&self) -> Result<Vec<AggregateItem>> {
        let keys = self.favorites().await?;
        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(doc) = self.store.get_document(&key.category, &key.id).await? {
                items.push(AggregateItem::new(key.category, doc.id, doc.fields));
            }
        }
        Ok(items)
    }

    fn require_principal(&self) -> Result<Principal> {
        self.identity
            .current_principal()
            .ok_or_else(|| AuthError::SignInRequired.into())
    }

    async fn load_favorites(&self, principal: &Principal) -> Result<Vec<ItemKey>> {
        let doc = self
            .store
            .get_document(USERS_COLLECTION, &principal.id)
            .await?;
        let keys = doc
            .and_then(|d| d.fields.get("favorites").cloned())
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Ok(keys)
    }

    async fn save_favorites(&self, principal: &Principal, favorites: &[ItemKey]) -> Result<()> {
        let mut partial = Map::new();
        partial.insert(
            "favorites".to_string(),
            serde_json::to_value(favorites).unwrap_or(Value::Array(Vec::new())),
        );
        self.store
            .update_document(USERS_COLLECTION, &principal.id, partial)
            .await?;
        Ok(())
    }
}
