//! Discovery configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the discovery and enrichment subsystems.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum directory depth below a grove root. Default: 5.
    pub max_depth: Option<usize>,
    /// Concurrent enrichment tasks. Default: 10.
    pub enrichment_workers: Option<usize>,
    /// How long `fetch_all` waits for stragglers, in milliseconds. Default: 5000.
    pub enrichment_timeout_ms: Option<u64>,
    /// Interval between background refreshes, in milliseconds. Default: 10000.
    pub refresh_interval_ms: Option<u64>,
    /// Directory names skipped during the walk, on top of the built-in list.
    #[serde(default)]
    pub extra_ignore: Vec<String>,
}

impl DiscoveryConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 5;
    pub const DEFAULT_ENRICHMENT_WORKERS: usize = 10;

    /// Returns the effective walk depth, defaulting to 5.
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(Self::DEFAULT_MAX_DEPTH)
    }

    /// Returns the effective worker count, defaulting to 10. Never zero.
    pub fn effective_enrichment_workers(&self) -> usize {
        self.enrichment_workers
            .unwrap_or(Self::DEFAULT_ENRICHMENT_WORKERS)
            .max(1)
    }

    pub fn effective_enrichment_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.enrichment_timeout_ms.unwrap_or(5_000))
    }

    pub fn effective_refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refresh_interval_ms.unwrap_or(10_000))
    }

    /// Overlay `other` on top of `self`: set fields win, ignore lists append.
    pub fn merge(&mut self, other: &DiscoveryConfig) {
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if other.enrichment_workers.is_some() {
            self.enrichment_workers = other.enrichment_workers;
        }
        if other.enrichment_timeout_ms.is_some() {
            self.enrichment_timeout_ms = other.enrichment_timeout_ms;
        }
        if other.refresh_interval_ms.is_some() {
            self.refresh_interval_ms = other.refresh_interval_ms;
        }
        for name in &other.extra_ignore {
            if !self.extra_ignore.contains(name) {
                self.extra_ignore.push(name.clone());
            }
        }
    }
}
