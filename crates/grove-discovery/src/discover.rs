//! Discovery facade: registry → scanner → worktree expansion → hierarchy.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use grove_core::{
    ConfigProvider, FxHashSet, Grove, LookupError, Warning, WarningKind, Warnings, WorkspaceKind,
    WorkspaceNode, WORKTREES_DIR,
};
use serde::Serialize;

use crate::git::WorktreeProvider;
use crate::hierarchy::HierarchyBuilder;
use crate::lookup::LookupResolver;
use crate::registry::{resolve_groves, GroveSet};
use crate::scanner::{inspect_dir, Candidate, MarkerScanner};

/// Result of one discovery run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    /// Every classified node, in display order.
    pub nodes: Vec<WorkspaceNode>,
    pub warnings: Vec<Warning>,
    pub groves: Vec<Grove>,
    pub duration_ms: u64,
}

impl DiscoveryReport {
    pub fn find_by_path(&self, path: &Path) -> Option<&WorkspaceNode> {
        self.nodes.iter().find(|n| n.path == path)
    }

    /// All nodes with this name. Worktrees share their project's name.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a WorkspaceNode> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    /// Nodes displayed directly under `path`.
    pub fn children_of<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a WorkspaceNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.display_parent() == Some(path))
    }

    pub fn ecosystems(&self) -> impl Iterator<Item = &WorkspaceNode> {
        self.nodes.iter().filter(|n| n.kind == WorkspaceKind::EcosystemRoot)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.nodes)
    }
}

/// Entry point for consumers. Cheap to clone; clones share the providers.
#[derive(Clone)]
pub struct Discovery {
    config: Arc<dyn ConfigProvider>,
    provider: Arc<dyn WorktreeProvider>,
}

impl Discovery {
    pub fn new(config: Arc<dyn ConfigProvider>, provider: Arc<dyn WorktreeProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    pub fn provider(&self) -> Arc<dyn WorktreeProvider> {
        Arc::clone(&self.provider)
    }

    /// Run a full discovery over every enabled grove.
    ///
    /// Never fails: unusable groves and structural problems are reported in
    /// `warnings` and the rest of the tree is still returned.
    pub fn discover(&self) -> DiscoveryReport {
        let started = Instant::now();
        let config = self.config.as_ref();
        let groves = resolve_groves(config.config());

        let mut warnings = Warnings::new();
        warnings.extend(groves.warnings.iter().cloned());

        let candidates = self.collect_candidates(&groves, &mut warnings);
        let (nodes, build_warnings) =
            HierarchyBuilder::new(config, self.provider.as_ref()).build(candidates);
        // Build warnings were logged as they were recorded.
        let mut all = warnings.into_vec();
        all.extend(build_warnings);

        let report = DiscoveryReport {
            nodes,
            warnings: dedupe(all),
            groves: groves.groves,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            groves = report.groves.len(),
            nodes = report.nodes.len(),
            warnings = report.warnings.len(),
            duration_ms = report.duration_ms,
            "discovery complete"
        );
        report
    }

    /// Find the workspace owning `path`, limited to the enabled groves.
    pub fn resolve_cwd(&self, path: &Path) -> Result<WorkspaceNode, LookupError> {
        let groves = resolve_groves(self.config.config());
        LookupResolver::new(self.config.as_ref(), self.provider.as_ref(), groves.scope())
            .resolve_cwd(path)
    }

    /// Re-run discovery every `interval` on a background thread.
    pub fn spawn_refresh(&self, interval: Duration) -> std::io::Result<RefreshHandle> {
        let (report_tx, report_rx) = bounded(1);
        let (stop_tx, stop_rx) = bounded(1);
        let discovery = self.clone();
        let handle = thread::Builder::new()
            .name("grove-refresh".to_string())
            .spawn(move || refresh_loop(discovery, interval, report_tx, stop_rx))?;
        Ok(RefreshHandle {
            reports: report_rx,
            stop: stop_tx,
            handle: Some(handle),
        })
    }

    fn collect_candidates(&self, groves: &GroveSet, warnings: &mut Warnings) -> Vec<Candidate> {
        let config = self.config.as_ref();
        let scanner = MarkerScanner::new(config);
        let max_depth = config.config().discovery.effective_max_depth();

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut owners: Vec<PathBuf> = Vec::new();
        let mut queue: VecDeque<Candidate> = VecDeque::new();

        let mut absorb = |found: Vec<Candidate>, queue: &mut VecDeque<Candidate>| {
            for candidate in found {
                if seen.insert(candidate.path.clone()) {
                    queue.push_back(candidate.clone());
                    candidates.push(candidate);
                }
            }
        };

        for grove in &groves.groves {
            match scanner.scan(&grove.path, max_depth) {
                Ok(outcome) => {
                    owners.extend(outcome.worktree_owners);
                    absorb(outcome.candidates, &mut queue);
                }
                Err(e) => warnings.record(
                    WarningKind::GroveUnavailable,
                    e.path(),
                    format!("grove '{}': {e}", grove.name),
                ),
            }
        }

        // Worktrees live outside the normal walk. Expand them until no new
        // worktree roots turn up.
        let mut stale_reported: FxHashSet<PathBuf> = FxHashSet::default();
        let mut scanned_roots: FxHashSet<PathBuf> = FxHashSet::default();
        while let Some(candidate) = queue.pop_front() {
            let mut roots = Vec::new();
            if candidate.has_git_dir {
                roots.extend(self.listed_worktrees(&candidate.path, &mut stale_reported, warnings));
            }
            roots.extend(swept_worktrees(&candidate.path));

            for root in roots {
                if root == candidate.path
                    || !groves.contains(&root)
                    || !scanned_roots.insert(root.clone())
                {
                    continue;
                }
                match scanner.scan(&root, max_depth) {
                    Ok(outcome) => {
                        owners.extend(outcome.worktree_owners);
                        absorb(outcome.candidates, &mut queue);
                    }
                    Err(e) => tracing::debug!(path = %root.display(), error = %e, "worktree root unreadable"),
                }
            }
        }

        report_orphans(config, &owners, &seen, warnings);
        candidates
    }

    fn listed_worktrees(
        &self,
        repo: &Path,
        stale_reported: &mut FxHashSet<PathBuf>,
        warnings: &mut Warnings,
    ) -> Vec<PathBuf> {
        let entries = match self.provider.list_worktrees(repo) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(path = %repo.display(), error = %e, "cannot list worktrees");
                return Vec::new();
            }
        };
        let mut roots = Vec::new();
        for entry in entries.into_iter().filter(|e| !e.is_primary) {
            match std::fs::canonicalize(&entry.path) {
                Ok(path) => roots.push(path),
                Err(_) => {
                    if stale_reported.insert(entry.path.clone()) {
                        warnings.record(
                            WarningKind::StaleWorktree,
                            &entry.path,
                            format!("listed by {} but missing on disk", repo.display()),
                        );
                    }
                }
            }
        }
        roots
    }
}

/// Children of `<dir>/.grove-worktrees`.
fn swept_worktrees(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir.join(WORKTREES_DIR)) else {
        return Vec::new();
    };
    let mut roots: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir() || t.is_symlink()))
        .filter_map(|e| std::fs::canonicalize(e.path()).ok())
        .filter(|p| p.is_dir())
        .collect();
    roots.sort();
    roots
}

/// Warn about marked worktree directories whose owner is not a project.
fn report_orphans(
    config: &dyn ConfigProvider,
    owners: &[PathBuf],
    candidates: &FxHashSet<PathBuf>,
    warnings: &mut Warnings,
) {
    for owner in owners {
        if candidates.contains(owner) {
            continue;
        }
        for child in swept_worktrees(owner) {
            if inspect_dir(config, &child).is_some() {
                warnings.record(
                    WarningKind::OrphanedWorktree,
                    &child,
                    format!("owning project {} has no markers", owner.display()),
                );
            }
        }
    }
}

/// Drop repeats of an identical warning. Distinct problems on one path,
/// such as several rejected declarations of one ecosystem, all survive.
fn dedupe(warnings: Vec<Warning>) -> Vec<Warning> {
    let mut seen = FxHashSet::default();
    warnings
        .into_iter()
        .filter(|w| seen.insert((w.kind, w.path.clone(), w.message.clone())))
        .collect()
}

fn refresh_loop(
    discovery: Discovery,
    interval: Duration,
    reports: Sender<DiscoveryReport>,
    stop: Receiver<()>,
) {
    loop {
        if reports.send(discovery.discover()).is_err() {
            break;
        }
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::debug!("refresh loop stopped");
}

/// Background refresh. Dropping the handle stops the loop.
pub struct RefreshHandle {
    reports: Receiver<DiscoveryReport>,
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Reports in publication order. At most one is buffered.
    pub fn reports(&self) -> &Receiver<DiscoveryReport> {
        &self.reports
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop.try_send(());
        // Unblock a pending send of a report nobody will read.
        while self.reports.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("refresh thread panicked");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
