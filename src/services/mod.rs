// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Business logic over the document store: the fan-out/merge aggregation
//! pipeline and the listing-adjacent features built around it.

pub mod cache;
pub mod catalog;
pub mod favorites;
pub mod fetcher;
pub mod reviews;
pub mod search;
pub mod telemetry;

pub use cache::{AggregateCache, CacheState, SharedAggregate};
pub use catalog::CatalogService;
pub use favorites::FavoritesService;
pub use fetcher::Fetcher;
pub use reviews::ReviewService;
pub use search::{dedup_by_key, nearby, Scope, SearchEngine};
pub use telemetry::TelemetrySink;
