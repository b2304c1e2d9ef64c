//! Marker scanner: bounded walk of a grove root using the `ignore` crate's `WalkBuilder`.
//!
//! A directory is a candidate when it holds a project descriptor or a `.git`
//! entry. The walk follows symlinks, so a visited set of canonical paths
//! keeps aliases from being reported twice. `.grove-worktrees` directories
//! are never walked; worktrees are expanded separately from their owners.

use std::path::{Path, PathBuf};

use grove_core::errors::DiscoveryError;
use grove_core::{ConfigProvider, DescriptorState, FxHashSet, WORKTREES_DIR};

/// Directory names never descended into.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    ".git",
    WORKTREES_DIR,
    "node_modules",
    "target",
    "dist",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    ".next",
    ".nuxt",
];

/// A directory carrying at least one workspace marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Canonical absolute path.
    pub path: PathBuf,
    pub descriptor: DescriptorState,
    pub has_git_dir: bool,
}

/// Everything one walk produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: Vec<Candidate>,
    /// Directories that contain a `.grove-worktrees` directory, whether or
    /// not they are candidates themselves.
    pub worktree_owners: Vec<PathBuf>,
    /// Directories skipped because of per-entry errors.
    pub skipped: usize,
}

/// Read a single directory's markers. `dir` must already be canonical.
pub fn inspect_dir(config: &dyn ConfigProvider, dir: &Path) -> Option<Candidate> {
    let descriptor = config.load_descriptor(dir);
    let has_git_dir = std::fs::symlink_metadata(dir.join(".git")).is_ok();
    if !descriptor.is_present() && !has_git_dir {
        return None;
    }
    Some(Candidate {
        path: dir.to_path_buf(),
        descriptor,
        has_git_dir,
    })
}

pub struct MarkerScanner<'a> {
    config: &'a dyn ConfigProvider,
    skip_dirs: Vec<String>,
}

impl<'a> MarkerScanner<'a> {
    pub fn new(config: &'a dyn ConfigProvider) -> Self {
        let mut skip_dirs: Vec<String> = DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect();
        for extra in &config.config().discovery.extra_ignore {
            if !skip_dirs.contains(extra) {
                skip_dirs.push(extra.clone());
            }
        }
        Self { config, skip_dirs }
    }

    /// Walk `root` to `max_depth` levels (the root itself is depth 0) and
    /// collect candidates sorted by path.
    ///
    /// Only a root that cannot be walked at all is an error. Unreadable or
    /// broken entries below it are skipped.
    pub fn scan(&self, root: &Path, max_depth: usize) -> Result<ScanOutcome, DiscoveryError> {
        check_root(root)?;

        let skip_dirs = self.skip_dirs.clone();
        let mut builder = ignore::WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(true)
            .max_depth(Some(max_depth))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                if !is_dir {
                    return false;
                }
                // The root is always walked even if its own name is on the list.
                entry.depth() == 0
                    || !skip_dirs
                        .iter()
                        .any(|skip| entry.file_name() == std::ffi::OsStr::new(skip))
            });

        let mut outcome = ScanOutcome::default();
        let mut visited = FxHashSet::default();

        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    // Permission denied, broken symlink, or a symlink loop.
                    tracing::debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                    outcome.skipped += 1;
                    continue;
                }
            };

            let canonical = match std::fs::canonicalize(entry.path()) {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "cannot canonicalize");
                    outcome.skipped += 1;
                    continue;
                }
            };
            if !visited.insert(canonical.clone()) {
                continue;
            }

            if canonical.join(WORKTREES_DIR).is_dir() {
                outcome.worktree_owners.push(canonical.clone());
            }
            if let Some(candidate) = inspect_dir(self.config, &canonical) {
                outcome.candidates.push(candidate);
            }
        }

        outcome.candidates.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(
            root = %root.display(),
            candidates = outcome.candidates.len(),
            skipped = outcome.skipped,
            "scan complete"
        );
        Ok(outcome)
    }
}

fn check_root(root: &Path) -> Result<(), DiscoveryError> {
    let metadata = std::fs::metadata(root).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DiscoveryError::RootMissing {
                path: root.to_path_buf(),
            }
        } else {
            DiscoveryError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;
    if !metadata.is_dir() {
        return Err(DiscoveryError::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }
    std::fs::read_dir(root).map_err(|source| DiscoveryError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}
