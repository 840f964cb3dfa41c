// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! # Mysurian Core
//!
//! Aggregation and search core of the Mysuru city directory: categorized
//! listings live in per-category document collections, and this crate owns
//! the logic that fans reads out across them, merges and deduplicates the
//! results, caches the aggregate, and answers live and submitted searches.
//! Reviews, favorites and search telemetry ride along on the same store.
//!
//! The presentation layer, routing and SEO are external collaborators; the
//! crate exposes services, not pages.

pub mod auth;
pub mod core;
pub mod services;
pub mod store;

pub use self::core::{Config, MysurianError, Result};

use std::sync::Arc;

use crate::auth::{IdentityProvider, StaticProvider};
use crate::services::{
    AggregateCache, CatalogService, FavoritesService, Fetcher, ReviewService, SearchEngine,
    TelemetrySink,
};
use crate::store::{DocumentStore, MemoryStore};

/// Install a tracing subscriber honoring `RUST_LOG`. Safe to call more than
/// once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Main application instance: wires a document store and identity provider
/// into the service set the presentation layer consumes.
pub struct Mysurian {
    catalog: Arc<CatalogService>,
    fetcher: Arc<Fetcher>,
    cache: Arc<AggregateCache>,
    search: Arc<SearchEngine>,
    telemetry: Arc<TelemetrySink>,
    reviews: Arc<ReviewService>,
    favorites: Arc<FavoritesService>,
}

impl Mysurian {
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        tracing::info!("🚀 Mysurian core starting on '{}' store", store.store_name());

        let catalog = Arc::new(CatalogService::new(store.clone(), identity.clone()));
        let fetcher = Arc::new(Fetcher::new(store.clone()));
        let telemetry = Arc::new(TelemetrySink::new(store.clone()));
        let cache = Arc::new(AggregateCache::new(
            catalog.clone(),
            fetcher.clone(),
            &config.cache,
        ));
        let search = Arc::new(SearchEngine::new(
            catalog.clone(),
            fetcher.clone(),
            telemetry.clone(),
            config.search.clone(),
        ));
        let reviews = Arc::new(ReviewService::new(store.clone(), identity.clone()));
        let favorites = Arc::new(FavoritesService::new(store, identity));

        Self {
            catalog,
            fetcher,
            cache,
            search,
            telemetry,
            reviews,
            favorites,
        }
    }

    /// In-memory store plus a static identity provider; the configuration
    /// used by tests and local development.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(StaticProvider::new()),
        )
    }

    pub fn catalog(&self) -> &Arc<CatalogService> {
        &self.catalog
    }

    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    pub fn cache(&self) -> &Arc<AggregateCache> {
        &self.cache
    }

    pub fn search(&self) -> &Arc<SearchEngine> {
        &self.search
    }

    pub fn telemetry(&self) -> &Arc<TelemetrySink> {
        &self.telemetry
    }

    pub fn reviews(&self) -> &Arc<ReviewService> {
        &self.reviews
    }

    pub fn favorites(&self) -> &Arc<FavoritesService> {
        &self.favorites
    }

    /// Convenience passthrough for the category directory.
    pub async fn list_categories(&self) -> Result<Vec<self::core::CategoryId>> {
        self.catalog.list_categories().await
    }
}
