// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::{MysurianError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Documents sampled per category for the live-typing path.
    pub preload_per_category: usize,
    /// Term length above which live search adds a bounded store fetch.
    pub live_fetch_threshold: usize,
    /// Per-category document cap for the bounded fetch variant.
    pub bounded_fetch_limit: usize,
    /// Hard ceiling on aggregate size. Substring scans are only viable at
    /// small scale; exceeding this without a real index is a non-goal.
    pub max_corpus_documents: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Optional durable snapshot of the aggregate, read eagerly at cache
    /// construction so a session restart skips the network fetch.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            preload_per_category: 3,
            live_fetch_threshold: 3,
            bounded_fetch_limit: 5000,
            max_corpus_documents: 50_000,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MysurianError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&raw).map_err(|e| MysurianError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = Config::default();
        assert_eq!(config.search.preload_per_category, 3);
        assert_eq!(config.search.live_fetch_threshold, 3);
        assert_eq!(config.search.bounded_fetch_limit, 5000);
        assert!(config.cache.snapshot_path.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[search]\npreload_per_category = 5\nlive_fetch_threshold = 3\nbounded_fetch_limit = 100\nmax_corpus_documents = 1000\n").unwrap();
        assert_eq!(config.search.preload_per_category, 5);
        assert!(config.cache.snapshot_path.is_none());
    }
}
