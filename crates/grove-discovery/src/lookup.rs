//! Lookup resolver: "which workspace owns this path?" without a full scan.
//!
//! Walks upward from the path to the nearest directory carrying a marker and
//! classifies it with the same [`Classifier`] discovery uses, so the node it
//! returns matches the node discovery produces for that directory.

use std::path::Path;

use grove_core::{ConfigProvider, LookupError, Warning, WorkspaceNode};

use crate::classifier::Classifier;
use crate::git::WorktreeProvider;
use crate::registry::Scope;

/// Resolves paths against a snapshot of the filesystem. Marker reads and
/// classifications are cached for the resolver's lifetime; build a new one
/// to observe later changes.
pub struct LookupResolver<'a> {
    classifier: Classifier<'a>,
    provider: &'a dyn WorktreeProvider,
    scope: Scope,
}

impl<'a> LookupResolver<'a> {
    /// A resolver whose answers are limited to what discovery over `scope`
    /// would report.
    pub fn new(
        config: &'a dyn ConfigProvider,
        provider: &'a dyn WorktreeProvider,
        scope: Scope,
    ) -> Self {
        Self {
            classifier: Classifier::new(config, provider),
            provider,
            scope,
        }
    }

    /// A resolver that considers every directory up to the filesystem root.
    pub fn unscoped(config: &'a dyn ConfigProvider, provider: &'a dyn WorktreeProvider) -> Self {
        Self::new(config, provider, Scope::Unrestricted)
    }

    /// Find the workspace owning `path`. The returned node has an empty
    /// `tree_prefix`.
    pub fn resolve_cwd(&mut self, path: &Path) -> Result<WorkspaceNode, LookupError> {
        let canonical = std::fs::canonicalize(path).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        for dir in canonical.ancestors() {
            if !self.classifier.has_marker(dir) {
                continue;
            }
            if !self.admits(dir) {
                break;
            }
            if let Some(owner) = self.classifier.orphan_owner(dir) {
                return Err(LookupError::OrphanedWorktree {
                    path: dir.to_path_buf(),
                    owner,
                });
            }
            match self.classifier.classify(dir) {
                Some(classification) => {
                    tracing::debug!(
                        path = %canonical.display(),
                        owner = %dir.display(),
                        kind = classification.node.kind.as_str(),
                        "resolved"
                    );
                    return Ok(classification.node);
                }
                // Marked but unclassifiable (a link cycle); keep climbing.
                None => continue,
            }
        }

        Err(LookupError::NotInWorkspace { path: canonical })
    }

    /// Whether discovery over the scope would report the marked directory
    /// `dir`: it lies inside a grove, sits above a grove root (an ecosystem
    /// or project owning grove contents), or has a git worktree inside one.
    fn admits(&self, dir: &Path) -> bool {
        if self.scope.contains(dir) || self.scope.encloses_root(dir) {
            return true;
        }
        match self.provider.list_worktrees(dir) {
            Ok(entries) => entries.iter().filter(|e| !e.is_primary).any(|e| {
                std::fs::canonicalize(&e.path).is_ok_and(|p| self.scope.contains(&p))
            }),
            Err(_) => false,
        }
    }

    /// Warnings recorded while resolving, e.g. a malformed descriptor on the
    /// owning directory.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        self.classifier.take_warnings()
    }
}
