//! Shared fixtures: temp groves, descriptors, and real git repositories.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{IndexAddOption, Repository, Signature};
use grove_core::{FileConfigProvider, GroveConfig, GroveEntry};
use grove_discovery::{Discovery, Git2WorktreeProvider, NullWorktreeProvider, WorktreeProvider};
use tempfile::TempDir;

/// A temp directory with its canonical path.
pub struct Sandbox {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        grove_core::tracing::init_tracing_with_default("warn");
        let tmp = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(tmp.path()).unwrap();
        Self { _tmp: tmp, root }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Create `rel` with a `grove.yml` holding `yaml`.
    pub fn project(&self, rel: &str, yaml: &str) -> PathBuf {
        let dir = self.path(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("grove.yml"), yaml).unwrap();
        dir
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let dir = self.path(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}

pub fn config(groves: &[(&str, &Path, bool)]) -> GroveConfig {
    let mut config = GroveConfig::default();
    for (name, path, enabled) in groves {
        let mut entry = GroveEntry::new(path.to_string_lossy());
        if !enabled {
            entry.enabled = Some(false);
        }
        config.groves.insert(name.to_string(), entry);
    }
    config
}

pub fn discovery_with(config: GroveConfig, provider: Arc<dyn WorktreeProvider>) -> Discovery {
    Discovery::new(Arc::new(FileConfigProvider::new(config)), provider)
}

/// Discovery over plain directories, no git.
pub fn plain_discovery(groves: &[(&str, &Path, bool)]) -> Discovery {
    discovery_with(config(groves), Arc::new(NullWorktreeProvider))
}

pub fn git_discovery(groves: &[(&str, &Path, bool)]) -> Discovery {
    discovery_with(config(groves), Arc::new(Git2WorktreeProvider::new()))
}

// ─── Git fixtures ──────────────────────────────────────────────────

/// Init a repository at `dir`, write files, and commit them.
pub fn init_repo(dir: &Path, files: &[(&str, &str)]) -> Repository {
    fs::create_dir_all(dir).unwrap();
    let repo = Repository::init(dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    commit_all(&repo, "initial");
    repo
}

pub fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Grove Test", "grove@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

/// `git worktree add <path>` on a new branch called `name`.
pub fn add_worktree(repo: &Repository, name: &str, path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    repo.worktree(name, path, None).unwrap();
    fs::canonicalize(path).unwrap()
}
