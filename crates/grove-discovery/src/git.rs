//! Git worktree provider: the seam between discovery and git.
//!
//! Discovery only asks four questions of git: which worktrees a repository
//! has, whether a directory is a linked worktree, where a worktree's primary
//! checkout lives, and what HEAD and the working tree look like (for
//! enrichment). [`Git2WorktreeProvider`] answers them with libgit2.

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, StatusOptions};
use grove_core::errors::GitError;
use serde::{Deserialize, Serialize};

/// One entry of a repository's worktree list. The primary checkout comes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadInfo {
    /// Short branch name; `None` when detached or unborn.
    pub branch: Option<String>,
    /// Abbreviated commit id; `None` on an unborn branch.
    pub commit: Option<String>,
    pub detached: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub staged: usize,
    pub modified: usize,
    pub untracked: usize,
    pub conflicted: usize,
}

impl StatusSummary {
    pub fn is_dirty(&self) -> bool {
        self.staged + self.modified + self.untracked + self.conflicted > 0
    }
}

pub trait WorktreeProvider: Send + Sync {
    /// All worktrees of the repository containing `repo_root`, primary first.
    fn list_worktrees(&self, repo_root: &Path) -> Result<Vec<WorktreeEntry>, GitError>;

    /// Whether `path` is itself a linked (secondary) worktree.
    fn is_worktree(&self, path: &Path) -> Result<bool, GitError>;

    /// The primary checkout's working directory for the repository owning
    /// `path`. For a linked worktree this is the checkout it was created from.
    fn resolve_repo_root(&self, path: &Path) -> Result<PathBuf, GitError>;

    fn head(&self, path: &Path) -> Result<HeadInfo, GitError>;

    fn status(&self, path: &Path) -> Result<StatusSummary, GitError>;
}

/// Provider for trees without git, or for tests: nothing is a repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWorktreeProvider;

impl WorktreeProvider for NullWorktreeProvider {
    fn list_worktrees(&self, _repo_root: &Path) -> Result<Vec<WorktreeEntry>, GitError> {
        Ok(Vec::new())
    }

    fn is_worktree(&self, _path: &Path) -> Result<bool, GitError> {
        Ok(false)
    }

    fn resolve_repo_root(&self, path: &Path) -> Result<PathBuf, GitError> {
        Err(GitError::NotARepository {
            path: path.to_path_buf(),
        })
    }

    fn head(&self, path: &Path) -> Result<HeadInfo, GitError> {
        Err(GitError::NotARepository {
            path: path.to_path_buf(),
        })
    }

    fn status(&self, path: &Path) -> Result<StatusSummary, GitError> {
        Err(GitError::NotARepository {
            path: path.to_path_buf(),
        })
    }
}

/// libgit2-backed provider. Stateless; every call opens the repository fresh
/// so concurrent enrichment tasks never share a handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2WorktreeProvider;

impl Git2WorktreeProvider {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Result<Repository, GitError> {
        Repository::open(path).map_err(|e| map_err("open", path, e))
    }
}

fn map_err(operation: &'static str, path: &Path, e: git2::Error) -> GitError {
    if e.code() == ErrorCode::NotFound && operation == "open" {
        return GitError::NotARepository {
            path: path.to_path_buf(),
        };
    }
    GitError::OperationFailed {
        operation,
        path: path.to_path_buf(),
        message: e.message().to_string(),
    }
}

/// Working directory of the primary checkout, derived from the common dir.
fn primary_workdir(repo: &Repository, path: &Path) -> Result<PathBuf, GitError> {
    let common = repo.commondir();
    if common.file_name().is_some_and(|n| n == ".git") {
        if let Some(parent) = common.parent() {
            return Ok(canonical_or_raw(parent));
        }
    }
    // A linked worktree of a bare repository has no primary checkout.
    Err(GitError::BareRepository {
        path: path.to_path_buf(),
    })
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn head_of(repo: &Repository) -> HeadInfo {
    let detached = repo.head_detached().unwrap_or(false);
    match repo.head() {
        Ok(head) => HeadInfo {
            branch: if head.is_branch() {
                head.shorthand().map(str::to_string)
            } else {
                None
            },
            commit: head.target().map(|oid| short_oid(&oid.to_string())),
            detached,
        },
        // Unborn branch or corrupted HEAD; report what we can.
        Err(_) => HeadInfo {
            branch: None,
            commit: None,
            detached,
        },
    }
}

fn short_oid(full: &str) -> String {
    full.chars().take(8).collect()
}

impl WorktreeProvider for Git2WorktreeProvider {
    fn list_worktrees(&self, repo_root: &Path) -> Result<Vec<WorktreeEntry>, GitError> {
        let repo = Self::open(repo_root)?;
        let mut entries = Vec::new();

        if let Ok(primary) = primary_workdir(&repo, repo_root) {
            let head = Repository::open(&primary)
                .map(|r| head_of(&r))
                .unwrap_or_default();
            entries.push(WorktreeEntry {
                path: primary,
                branch: head.branch,
                commit: head.commit,
                is_primary: true,
            });
        }

        let names = repo
            .worktrees()
            .map_err(|e| map_err("worktree list", repo_root, e))?;
        for name in names.iter().flatten() {
            let worktree = match repo.find_worktree(name) {
                Ok(wt) => wt,
                Err(e) => {
                    tracing::debug!(repo = %repo_root.display(), worktree = name, error = %e, "unreadable worktree metadata");
                    continue;
                }
            };
            // A worktree whose directory vanished still gets listed; callers
            // decide what a stale entry means.
            let head = Repository::open_from_worktree(&worktree)
                .map(|r| head_of(&r))
                .unwrap_or_default();
            entries.push(WorktreeEntry {
                path: worktree.path().to_path_buf(),
                branch: head.branch,
                commit: head.commit,
                is_primary: false,
            });
        }

        Ok(entries)
    }

    fn is_worktree(&self, path: &Path) -> Result<bool, GitError> {
        Ok(Self::open(path)?.is_worktree())
    }

    fn resolve_repo_root(&self, path: &Path) -> Result<PathBuf, GitError> {
        let repo = Repository::discover(path).map_err(|e| map_err("discover", path, e))?;
        if repo.is_worktree() {
            return primary_workdir(&repo, path);
        }
        match repo.workdir() {
            Some(workdir) => Ok(canonical_or_raw(workdir)),
            None => Err(GitError::BareRepository {
                path: path.to_path_buf(),
            }),
        }
    }

    fn head(&self, path: &Path) -> Result<HeadInfo, GitError> {
        Ok(head_of(&Self::open(path)?))
    }

    fn status(&self, path: &Path) -> Result<StatusSummary, GitError> {
        let repo = Self::open(path)?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(false)
            .exclude_submodules(true);
        let statuses = repo
            .statuses(Some(&mut options))
            .map_err(|e| map_err("status", path, e))?;

        let mut summary = StatusSummary::default();
        for entry in statuses.iter() {
            let s = entry.status();
            if s.is_conflicted() {
                summary.conflicted += 1;
                continue;
            }
            if s.is_wt_new() {
                summary.untracked += 1;
                continue;
            }
            if s.is_index_new()
                || s.is_index_modified()
                || s.is_index_deleted()
                || s.is_index_renamed()
                || s.is_index_typechange()
            {
                summary.staged += 1;
            }
            if s.is_wt_modified() || s.is_wt_deleted() || s.is_wt_renamed() || s.is_wt_typechange() {
                summary.modified += 1;
            }
        }
        Ok(summary)
    }
}
