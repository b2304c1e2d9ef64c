//! Single-path lookup outcomes that are not a workspace node.

use std::path::PathBuf;

use super::error_code::{self, GroveErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No marker between the path and the filesystem root. An expected
    /// outcome for commands run outside any workspace.
    #[error("Not inside a workspace: {}", path.display())]
    NotInWorkspace { path: PathBuf },

    /// The nearest marker is a worktree whose owning project is gone.
    #[error("Worktree {} is orphaned; its owning project {} has no markers", path.display(), owner.display())]
    OrphanedWorktree { path: PathBuf, owner: PathBuf },

    #[error("Cannot resolve {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LookupError {
    pub fn is_not_in_workspace(&self) -> bool {
        matches!(self, Self::NotInWorkspace { .. })
    }
}

impl GroveErrorCode for LookupError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInWorkspace { .. } => error_code::NOT_IN_WORKSPACE,
            Self::OrphanedWorktree { .. } => error_code::ORPHANED_WORKTREE,
            Self::Io { .. } => error_code::LOOKUP_IO_ERROR,
        }
    }
}
