//! Enrichment: bounded concurrent fetch of per-node auxiliary data.
//!
//! Purely additive. Results are keyed by node path and never feed back into
//! classification. One task per node runs on a dedicated rayon pool whose
//! size bounds concurrency; completions are written into a shared map behind
//! an `RwLock` and signalled over a crossbeam channel so `fetch_all` can stop
//! waiting at a deadline without cancelling anything.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use grove_core::errors::error_code;
use grove_core::{DiscoveryConfig, FxHashMap, FxHashSet, GroveErrorCode, WorkspaceNode};
use serde::Serialize;

use crate::git::{HeadInfo, StatusSummary, WorktreeProvider};

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Failed to build enrichment pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl GroveErrorCode for EnrichmentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Pool(_) => error_code::ENRICHMENT_POOL_ERROR,
        }
    }
}

/// Auxiliary data for one node. Fields the enricher could not fill stay
/// `None` and the failure is described in `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<HeadInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Produces the enrichment for a single node. Called from pool threads.
pub trait Enricher: Send + Sync {
    fn enrich(&self, node: &WorkspaceNode) -> EnrichmentResult;
}

/// Branch, short head, and working-tree counts through a [`WorktreeProvider`].
pub struct GitStatusEnricher {
    provider: Arc<dyn WorktreeProvider>,
}

impl GitStatusEnricher {
    pub fn new(provider: Arc<dyn WorktreeProvider>) -> Self {
        Self { provider }
    }
}

impl Enricher for GitStatusEnricher {
    fn enrich(&self, node: &WorkspaceNode) -> EnrichmentResult {
        let mut result = EnrichmentResult::default();
        match self.provider.head(&node.path) {
            Ok(head) => result.head = Some(head),
            Err(e) => {
                result.error = Some(e.to_string());
                return result;
            }
        }
        match self.provider.status(&node.path) {
            Ok(status) => result.status = Some(status),
            Err(e) => result.error = Some(e.to_string()),
        }
        result
    }
}

/// Run `enricher`, turning a panic into an error result for the node.
fn enrich_guarded(enricher: &dyn Enricher, node: &WorkspaceNode) -> EnrichmentResult {
    match panic::catch_unwind(AssertUnwindSafe(|| enricher.enrich(node))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(path = %node.path.display(), %message, "enricher panicked");
            EnrichmentResult {
                error: Some(format!("enricher panicked: {message}")),
                ..Default::default()
            }
        }
    }
}

#[derive(Default)]
struct Shared {
    results: RwLock<FxHashMap<PathBuf, EnrichmentResult>>,
    live: RwLock<FxHashSet<PathBuf>>,
}

impl Shared {
    /// Lock order is `live` then `results`, here and in `retain_live`.
    fn store(&self, path: PathBuf, result: EnrichmentResult) {
        let Ok(live) = self.live.read() else {
            return;
        };
        if !live.contains(&path) {
            tracing::debug!(path = %path.display(), "dropping enrichment for retired node");
            return;
        }
        if let Ok(mut results) = self.results.write() {
            results.insert(path, result);
        }
    }
}

/// Owns the worker pool and the result map for one consumer (a CLI run or a
/// long-lived TUI session).
pub struct EnrichmentContext {
    pool: rayon::ThreadPool,
    shared: Arc<Shared>,
    enricher: Arc<dyn Enricher>,
}

impl EnrichmentContext {
    pub fn new(enricher: Arc<dyn Enricher>, workers: usize) -> Result<Self, EnrichmentError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("grove-enrich-{i}"))
            .panic_handler(|_| tracing::error!("enrichment task panicked"))
            .build()?;
        Ok(Self {
            pool,
            shared: Arc::new(Shared::default()),
            enricher,
        })
    }

    pub fn from_config(
        config: &DiscoveryConfig,
        enricher: Arc<dyn Enricher>,
    ) -> Result<Self, EnrichmentError> {
        Self::new(enricher, config.effective_enrichment_workers())
    }

    /// Enrich every node, waiting at most `timeout`.
    ///
    /// Returns whatever results exist when all tasks finished or the deadline
    /// passed. Tasks still running keep going in the background and their
    /// results land in the map later if their node is still live.
    pub fn fetch_all(
        &self,
        nodes: &[WorkspaceNode],
        timeout: Duration,
    ) -> FxHashMap<PathBuf, EnrichmentResult> {
        self.retain_live(nodes);
        let started = Instant::now();
        let deadline = started + timeout;

        let (tx, rx) = crossbeam_channel::unbounded::<()>();
        for node in nodes {
            let node = node.clone();
            let shared = Arc::clone(&self.shared);
            let enricher = Arc::clone(&self.enricher);
            let tx = tx.clone();
            self.pool.spawn(move || {
                let result = enrich_guarded(enricher.as_ref(), &node);
                shared.store(node.path, result);
                // The waiter may have given up already.
                let _ = tx.send(());
            });
        }
        drop(tx);

        let mut done = 0;
        while done < nodes.len() {
            if rx.recv_deadline(deadline).is_err() {
                break;
            }
            done += 1;
        }

        tracing::debug!(
            nodes = nodes.len(),
            completed = done,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enrichment fetch"
        );
        self.snapshot()
    }

    /// Make `nodes` the live set and forget results for anything else.
    pub fn retain_live(&self, nodes: &[WorkspaceNode]) {
        let live: FxHashSet<PathBuf> = nodes.iter().map(|n| n.path.clone()).collect();
        if let Ok(mut guard) = self.shared.live.write() {
            if let Ok(mut results) = self.shared.results.write() {
                results.retain(|path, _| live.contains(path));
            }
            *guard = live;
        }
    }

    pub fn get(&self, path: &Path) -> Option<EnrichmentResult> {
        self.shared
            .results
            .read()
            .ok()
            .and_then(|results| results.get(path).cloned())
    }

    pub fn snapshot(&self) -> FxHashMap<PathBuf, EnrichmentResult> {
        self.shared
            .results
            .read()
            .map(|results| results.clone())
            .unwrap_or_default()
    }
}
