// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Aggregate cache.
//!
//! Single-slot cache over the full cross-category aggregate with three
//! states: EMPTY, LOADING, POPULATED. The EMPTY→LOADING claim happens under
//! one lock acquisition, so concurrent consumers can never start a second
//! fetch; late arrivals wait on a shared watch channel and every consumer
//! receives the same `Arc` once populated. There is no TTL: within one
//! process lifetime the aggregate is fetched at most once unless explicitly
//! invalidated. An optional JSON snapshot on disk carries the aggregate
//! across a session restart and is read eagerly at construction.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::core::{AggregateItem, CacheConfig, MysurianError, Result};
use super::catalog::CatalogService;
use super::fetcher::Fetcher;

pub type SharedAggregate = Arc<Vec<AggregateItem>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Loading,
    Populated,
}

type LoadOutcome = std::result::Result<SharedAggregate, String>;

enum Slot {
    Empty,
    Loading(watch::Receiver<Option<LoadOutcome>>),
    Populated(SharedAggregate),
}

pub struct AggregateCache {
    catalog: Arc<CatalogService>,
    fetcher: Arc<Fetcher>,
    snapshot_path: Option<PathBuf>,
    slot: Mutex<Slot>,
    loads: AtomicU64,
}

impl AggregateCache {
    pub fn new(catalog: Arc<CatalogService>, fetcher: Arc<Fetcher>, config: &CacheConfig) -> Self {
        let slot = match config.snapshot_path.as_deref().and_then(read_snapshot) {
            Some(items) => {
                info!("💾 Aggregate restored from snapshot: {} items", items.len());
                Slot::Populated(Arc::new(items))
            }
            None => Slot::Empty,
        };
        Self {
            catalog,
            fetcher,
            snapshot_path: config.snapshot_path.clone(),
            slot: Mutex::new(slot),
            loads: AtomicU64::new(0),
        }
    }

    pub async fn state(&self) -> CacheState {
        match &*self.slot.lock().await {
            Slot::Empty => CacheState::Empty,
            Slot::Loading(_) => CacheState::Loading,
            Slot::Populated(_) => CacheState::Populated,
        }
    }

    /// Number of underlying full fetches performed so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// The full aggregate, fetching it if this is the first request.
    pub async fn aggregate(&self) -> Result<SharedAggregate> {
        let waiter = {
            let mut slot = self.slot.lock().await;
            match &*slot {
                Slot::Populated(items) => return Ok(items.clone()),
                Slot::Loading(rx) => rx.clone(),
                Slot::Empty => {
                    // Claim the load while still holding the lock.
                    let (tx, rx) = watch::channel(None);
                    *slot = Slot::Loading(rx);
                    drop(slot);
                    return self.load_and_publish(tx).await;
                }
            }
        };
        self.wait(waiter).await
    }

    /// Reset to EMPTY so the next consumer re-fetches. A load already in
    /// flight is left to finish; its result simply lands as usual.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if !matches!(&*slot, Slot::Loading(_)) {
            *slot = Slot::Empty;
        }
    }

    async fn wait(&self, mut rx: watch::Receiver<Option<LoadOutcome>>) -> Result<SharedAggregate> {
        loop {
            let outcome = rx.borrow_and_update().clone();
            if let Some(outcome) = outcome {
                return outcome.map_err(MysurianError::Internal);
            }
            if rx.changed().await.is_err() {
                // The loading consumer was dropped mid-fetch. Reopen the
                // slot, unless a newer load has already claimed it.
                let mut slot = self.slot.lock().await;
                if let Slot::Loading(current) = &*slot {
                    if current.same_channel(&rx) {
                        *slot = Slot::Empty;
                    }
                }
                return Err(MysurianError::Internal(
                    "aggregate load abandoned".to_string(),
                ));
            }
        }
    }

    async fn load_and_publish(
        &self,
        tx: watch::Sender<Option<LoadOutcome>>,
    ) -> Result<SharedAggregate> {
        let result = self.load().await;

        {
            let mut slot = self.slot.lock().await;
            match &result {
                Ok(items) => *slot = Slot::Populated(items.clone()),
                // A failed load reopens the slot so a later user action can
                // retry; nothing here is fatal.
                Err(_) => *slot = Slot::Empty,
            }
        }

        let outcome = match &result {
            Ok(items) => Ok(items.clone()),
            Err(e) => Err(e.to_string()),
        };
        let _ = tx.send(Some(outcome));
        result
    }

    async fn load(&self) -> Result<SharedAggregate> {
        info!("🚀 Building full aggregate");
        let categories = self.catalog.list_categories().await?;
        let items = self.fetcher.fetch_all(&categories).await;
        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(
            "✅ Aggregate populated: {} items across {} categories",
            items.len(),
            categories.len()
        );

        let shared = Arc::new(items);
        if let Some(path) = &self.snapshot_path {
            match serde_json::to_vec(shared.as_ref()) {
                Ok(bytes) => {
                    if let Err(e) = std::fs::write(path, bytes) {
                        warn!("⚠️ Could not write aggregate snapshot: {}", e);
                    }
                }
                Err(e) => warn!("⚠️ Could not serialize aggregate snapshot: {}", e),
            }
        }
        Ok(shared)
    }
}

fn read_snapshot(path: &std::path::Path) -> Option<Vec<AggregateItem>> {
    let bytes = std::fs::read(path).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!("⚠️ Ignoring unreadable aggregate snapshot: {}", e);
            None
        }
    }
}
