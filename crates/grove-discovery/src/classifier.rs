//! Classifier: derives one [`WorkspaceNode`] per marked directory.
//!
//! Classification of a directory can depend on other directories: a worktree
//! inherits its parent project's ecosystem membership, and a sub-project
//! needs its ecosystem's resolved declarations. The classifier resolves these
//! on demand and memoizes every result, so each directory is classified once
//! per run no matter how many nodes refer to it. Re-entering a directory that
//! is still being classified is a configuration cycle.

use std::path::{Path, PathBuf};

use grove_core::errors::GitError;
use grove_core::{
    ConfigProvider, DescriptorState, EcosystemContext, FxHashMap, FxHashSet, KindFacts, Warning,
    WarningKind, Warnings, WorkspaceKind, WorkspaceNode, WORKTREES_DIR,
};

use crate::declarations;
use crate::git::WorktreeProvider;
use crate::index::MarkerIndex;
use crate::scanner::Candidate;

/// How a worktree is tied to the project it was checked out from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorktreeLink {
    /// Directly inside `<owner>/.grove-worktrees/`.
    Located { owner: PathBuf },
    /// Reported by git as a linked worktree of `primary`.
    Git { primary: PathBuf },
}

impl WorktreeLink {
    pub fn parent(&self) -> &Path {
        match self {
            Self::Located { owner } => owner,
            Self::Git { primary } => primary,
        }
    }
}

/// A classified directory plus the facts other classifications build on.
#[derive(Debug, Clone)]
pub struct Classification {
    pub node: WorkspaceNode,
    /// Ecosystem membership; worktrees of this node inherit it.
    pub membership: EcosystemContext,
    /// Resolved declared sub-projects. Empty unless the kind is an ecosystem.
    pub sub_projects: Vec<PathBuf>,
}

enum Slot {
    InProgress,
    Done(Option<Classification>),
}

enum Linkage {
    Unlinked,
    Linked(WorktreeLink),
    Orphaned { owner: PathBuf },
}

/// If `path` sits directly inside a `.grove-worktrees` directory, the
/// directory that owns it.
pub fn located_owner(path: &Path) -> Option<&Path> {
    let parent = path.parent()?;
    if parent.file_name()? != WORKTREES_DIR {
        return None;
    }
    parent.parent()
}

pub struct Classifier<'a> {
    index: MarkerIndex<'a>,
    provider: &'a dyn WorktreeProvider,
    memo: FxHashMap<PathBuf, Slot>,
    cycles_reported: FxHashSet<PathBuf>,
    warnings: Warnings,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a dyn ConfigProvider, provider: &'a dyn WorktreeProvider) -> Self {
        Self {
            index: MarkerIndex::new(config),
            provider,
            memo: FxHashMap::default(),
            cycles_reported: FxHashSet::default(),
            warnings: Warnings::new(),
        }
    }

    pub fn seed(&mut self, candidates: impl IntoIterator<Item = Candidate>) {
        self.index.seed(candidates);
    }

    pub fn has_marker(&mut self, path: &Path) -> bool {
        self.index.has_marker(path)
    }

    /// The owner a worktree directory is orphaned from, if it is one.
    pub fn orphan_owner(&mut self, path: &Path) -> Option<PathBuf> {
        let owner = located_owner(path)?;
        if self.index.has_marker(owner) {
            None
        } else {
            Some(owner.to_path_buf())
        }
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings).into_vec()
    }

    /// Classify the directory at canonical `path`.
    ///
    /// `None` when the path carries no marker, is an orphaned worktree, or
    /// closes a cycle.
    pub fn classify(&mut self, path: &Path) -> Option<Classification> {
        match self.memo.get(path) {
            Some(Slot::Done(result)) => return result.clone(),
            Some(Slot::InProgress) => {
                if self.cycles_reported.insert(path.to_path_buf()) {
                    self.warnings.record(
                        WarningKind::ConfigCycle,
                        path,
                        "workspace links lead back to this directory",
                    );
                }
                return None;
            }
            None => {}
        }

        self.memo.insert(path.to_path_buf(), Slot::InProgress);
        let result = self.compute(path);
        self.memo
            .insert(path.to_path_buf(), Slot::Done(result.clone()));
        result
    }

    fn compute(&mut self, path: &Path) -> Option<Classification> {
        let candidate = self.index.get(path)?;

        let link = match self.linkage(&candidate) {
            Linkage::Unlinked => None,
            Linkage::Linked(link) => Some(link),
            Linkage::Orphaned { owner } => {
                self.warnings.record(
                    WarningKind::OrphanedWorktree,
                    path,
                    format!("owning project {} has no markers", owner.display()),
                );
                return None;
            }
        };

        if let DescriptorState::Malformed { reason } = &candidate.descriptor {
            self.warnings.record(
                WarningKind::MalformedDescriptor,
                path,
                format!("using directory name: {reason}"),
            );
        }

        let parent = link
            .as_ref()
            .and_then(|l| self.classify(l.parent()));

        // Membership through an enclosing ecosystem's declarations wins;
        // otherwise a worktree carries its parent project's membership.
        let (membership, parent_ecosystem, inherited_root) = match self.declaring_ecosystem(path) {
            Some(eco) => (
                eco.node.kind.context_for_members(),
                Some(eco.node.path.clone()),
                eco.node.root_ecosystem_path.clone(),
            ),
            None => match &parent {
                Some(p) => (
                    p.membership,
                    p.node.parent_ecosystem_path.clone(),
                    p.node.root_ecosystem_path.clone(),
                ),
                None => (EcosystemContext::None, None, None),
            },
        };

        let kind = WorkspaceKind::from_facts(KindFacts {
            declares_sub_projects: candidate.descriptor.declares_sub_projects(),
            is_worktree: link.is_some(),
            ecosystem: membership,
            has_descriptor: candidate.descriptor.is_present(),
            has_git_dir: candidate.has_git_dir,
        });

        let root = match kind {
            WorkspaceKind::EcosystemRoot => Some(path.to_path_buf()),
            WorkspaceKind::EcosystemWorktree => parent
                .as_ref()
                .filter(|p| p.node.kind.is_ecosystem())
                .and_then(|p| p.node.root_ecosystem_path.clone())
                .or_else(|| Some(path.to_path_buf())),
            k if k.is_sub_project() => inherited_root,
            _ => None,
        };

        let mut node = WorkspaceNode::new(display_name(&candidate), path, kind);
        node.parent_project_path = link.as_ref().map(|l| l.parent().to_path_buf());
        node.parent_ecosystem_path = if kind.is_sub_project() {
            parent_ecosystem
        } else {
            None
        };
        node.root_ecosystem_path = root;

        let sub_projects = match (kind.is_ecosystem(), candidate.descriptor.descriptor()) {
            (true, Some(descriptor)) => {
                let resolved = declarations::resolve(&mut self.index, path, descriptor);
                self.warnings.extend(resolved.warnings);
                resolved.members
            }
            _ => Vec::new(),
        };

        tracing::debug!(path = %path.display(), kind = kind.as_str(), "classified");
        Some(Classification {
            node,
            membership,
            sub_projects,
        })
    }

    fn linkage(&mut self, candidate: &Candidate) -> Linkage {
        let path = candidate.path.as_path();
        if let Some(owner) = located_owner(path) {
            return if self.index.has_marker(owner) {
                Linkage::Linked(WorktreeLink::Located {
                    owner: owner.to_path_buf(),
                })
            } else {
                Linkage::Orphaned {
                    owner: owner.to_path_buf(),
                }
            };
        }

        if !candidate.has_git_dir {
            return Linkage::Unlinked;
        }
        let primary = self
            .provider
            .is_worktree(path)
            .and_then(|linked| {
                if linked {
                    self.provider.resolve_repo_root(path).map(Some)
                } else {
                    Ok(None)
                }
            });
        match primary {
            Ok(Some(primary)) if primary != path => Linkage::Linked(WorktreeLink::Git { primary }),
            Ok(_) => Linkage::Unlinked,
            Err(GitError::NotARepository { .. }) => {
                tracing::debug!(path = %path.display(), ".git entry is not a repository");
                Linkage::Unlinked
            }
            Err(e) => {
                self.warnings
                    .record(WarningKind::GitUnavailable, path, e.to_string());
                Linkage::Unlinked
            }
        }
    }

    /// The nearest enclosing ecosystem whose resolved declarations include
    /// `path`.
    fn declaring_ecosystem(&mut self, path: &Path) -> Option<Classification> {
        for ancestor in path.ancestors().skip(1) {
            let declares = self
                .index
                .get(ancestor)
                .is_some_and(|c| c.descriptor.declares_sub_projects());
            if !declares {
                continue;
            }
            if let Some(eco) = self.classify(ancestor) {
                if eco.node.kind.is_ecosystem() && eco.sub_projects.iter().any(|m| m == path) {
                    return Some(eco);
                }
            }
        }
        None
    }
}

fn display_name(candidate: &Candidate) -> String {
    candidate
        .descriptor
        .descriptor()
        .and_then(|d| d.declared_name())
        .map(str::to_string)
        .or_else(|| {
            candidate
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| candidate.path.display().to_string())
}
