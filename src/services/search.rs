// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Search/filter engine.
//!
//! Live typing filters a small per-category sample held in memory; once the
//! term is long enough, a bounded store fetch widens the candidate set. The
//! two result lists are merged with preloaded matches first and deduplicated
//! on composite identity. Submitted searches scan every category in scope,
//! match the summary fields only, and feed the telemetry sink.

use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::{AggregateItem, CategoryId, ItemKey, Result, SearchConfig};
use super::catalog::CatalogService;
use super::fetcher::Fetcher;
use super::telemetry::TelemetrySink;

/// Scope label used for telemetry when searching across all categories.
pub const ALL_SCOPE: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Category(CategoryId),
}

impl Scope {
    fn telemetry_key(&self) -> String {
        match self {
            Scope::All => ALL_SCOPE.to_string(),
            Scope::Category(id) => id.to_lowercase(),
        }
    }
}

struct SearchState {
    scope: Scope,
    categories: Vec<CategoryId>,
    preloaded: Vec<AggregateItem>,
}

pub struct SearchEngine {
    catalog: Arc<CatalogService>,
    fetcher: Arc<Fetcher>,
    telemetry: Arc<TelemetrySink>,
    config: SearchConfig,
    state: tokio::sync::Mutex<SearchState>,
}

impl SearchEngine {
    pub fn new(
        catalog: Arc<CatalogService>,
        fetcher: Arc<Fetcher>,
        telemetry: Arc<TelemetrySink>,
        config: SearchConfig,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            telemetry,
            config,
            state: tokio::sync::Mutex::new(SearchState {
                scope: Scope::All,
                categories: Vec::new(),
                preloaded: Vec::new(),
            }),
        }
    }

    /// Switch scope and rebuild the preloaded sample for it. Also used to
    /// (re)build the initial sample for the default all-categories scope.
    pub async fn set_scope(&self, scope: Scope) -> Result<()> {
        let categories = self.resolve_categories(&scope).await?;
        let preloaded = self.build_sample(&categories).await;
        debug!(
            "🔄 Scope set to {:?}: {} categories, {} sampled items",
            scope,
            categories.len(),
            preloaded.len()
        );

        let mut state = self.state.lock().await;
        state.scope = scope;
        state.categories = categories;
        state.preloaded = preloaded;
        Ok(())
    }

    pub async fn scope(&self) -> Scope {
        self.state.lock().await.scope.clone()
    }

    /// The live-typing path. An empty term returns the preloaded sample,
    /// never an empty list for a populated scope, and touches no network.
    pub async fn live_search(&self, term: &str) -> Result<Vec<AggregateItem>> {
        let state = self.state.lock().await;

        if term.is_empty() {
            return Ok(state.preloaded.clone());
        }

        let mut results: Vec<AggregateItem> = state
            .preloaded
            .iter()
            .filter(|item| item.matches_any_field(term))
            .cloned()
            .collect();

        if term.chars().count() > self.config.live_fetch_threshold {
            let fetched = self
                .fetcher
                .fetch_bounded(&state.categories, self.config.bounded_fetch_limit)
                .await;
            results.extend(fetched.into_iter().filter(|item| item.matches_any_field(term)));
        }

        Ok(dedup_by_key(results))
    }

    /// The submission path: full unbounded scan of every category in scope,
    /// summary-field matching only, one telemetry record. Read errors
    /// surface as an empty result with the condition logged.
    pub async fn submit_search(&self, term: &str) -> Result<Vec<AggregateItem>> {
        let (scope, categories) = {
            let state = self.state.lock().await;
            (state.scope.clone(), state.categories.clone())
        };

        let scope_key = scope.telemetry_key();
        if let Err(e) = self.telemetry.record(term, &scope_key).await {
            warn!("⚠️ Search telemetry not recorded: {}", e);
        }

        let scanned = self.fetcher.fetch_all(&categories).await;
        let results: Vec<AggregateItem> = scanned
            .into_iter()
            .filter(|item| item.matches_summary_fields(term))
            .collect();

        info!(
            "🔍 Submitted search '{}' in scope '{}': {} results",
            term,
            scope_key,
            results.len()
        );
        Ok(dedup_by_key(results))
    }

    async fn resolve_categories(&self, scope: &Scope) -> Result<Vec<CategoryId>> {
        match scope {
            Scope::All => self.catalog.list_categories().await,
            Scope::Category(id) => Ok(vec![id.clone()]),
        }
    }

    /// Pseudo-randomly pick a few documents per category so live typing has
    /// something to filter without a full fetch.
    async fn build_sample(&self, categories: &[CategoryId]) -> Vec<AggregateItem> {
        let candidates = self
            .fetcher
            .fetch_bounded(categories, self.config.bounded_fetch_limit)
            .await;

        let mut rng = rand::thread_rng();
        let mut sample = Vec::new();
        for category in categories {
            let of_category: Vec<&AggregateItem> = candidates
                .iter()
                .filter(|item| &item.key.category == category)
                .collect();
            sample.extend(
                of_category
                    .choose_multiple(&mut rng, self.config.preload_per_category)
                    .map(|item| (*item).clone()),
            );
        }
        sample
    }
}

/// Keep the first occurrence of each composite identity, preserving order.
pub fn dedup_by_key(items: Vec<AggregateItem>) -> Vec<AggregateItem> {
    let mut seen: HashSet<ItemKey> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.key.clone()))
        .collect()
}

/// Best-effort locality: items of the aggregate sharing the reference item's
/// comma-delimited area token. Not a geographic computation.
pub fn nearby(reference: &AggregateItem, aggregate: &[AggregateItem]) -> Vec<AggregateItem> {
    let Some(area) = reference.area_hint() else {
        return Vec::new();
    };
    aggregate
        .iter()
        .filter(|item| item.key != reference.key)
        .filter(|item| item.area_hint().as_deref() == Some(area.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(category: &str, id: &str, fields: serde_json::Value) -> AggregateItem {
        match fields {
            serde_json::Value::Object(map) => AggregateItem::new(category, id, map),
            _ => panic!("fields must be an object"),
        }
    }

    #[test]
    fn dedup_keys_on_category_and_id() {
        let first = item("hotels", "abc123", json!({"name": "Lake View"}));
        let duplicate = item("hotels", "abc123", json!({"name": "Lake View"}));
        // Same document id in a different category is a different item.
        let other_category = item("gyms", "abc123", json!({"name": "PowerHouse"}));

        let merged = dedup_by_key(vec![first.clone(), duplicate, other_category.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], first);
        assert_eq!(merged[1], other_category);
    }

    #[test]
    fn dedup_preserves_first_seen_order() {
        let preloaded = item("hotels", "h1", json!({"name": "Sample copy"}));
        let fetched = item("hotels", "h1", json!({"name": "Fetched copy"}));
        let merged = dedup_by_key(vec![preloaded.clone(), fetched]);
        assert_eq!(merged, vec![preloaded]);
    }

    #[test]
    fn nearby_matches_area_token() {
        let reference = item("hotels", "h1", json!({"address": "12 Main Rd, Gokulam, Mysuru"}));
        let same_area = item("gyms", "g1", json!({"address": "4 Cross, Gokulam"}));
        let other_area = item("gyms", "g2", json!({"address": "9 Cross, Vijayanagar"}));
        let no_comma = item("gyms", "g3", json!({"address": "somewhere"}));

        let aggregate = vec![reference.clone(), same_area.clone(), other_area, no_comma];
        assert_eq!(nearby(&reference, &aggregate), vec![same_area]);
    }
}
