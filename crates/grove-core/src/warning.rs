//! Non-fatal discovery diagnostics.
//!
//! Anything structurally wrong with one workspace becomes a [`Warning`] and
//! discovery carries on. Callers decide whether to surface them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A grove root is missing or unreadable; it contributed no nodes.
    GroveUnavailable,
    /// Two grove names resolve to the same directory.
    DuplicateGrove,
    /// Descriptor present but unparsable; directory-name fallback used.
    MalformedDescriptor,
    /// Declared sub-project escapes its ecosystem directory.
    SubProjectOutsideEcosystem,
    /// Declared sub-project does not exist or carries no marker.
    SubProjectNotFound,
    /// An ecosystem declares itself, directly or through a link chain.
    ConfigCycle,
    /// Git lists a worktree whose directory is gone.
    StaleWorktree,
    /// A worktree directory whose owning project lost its markers.
    OrphanedWorktree,
    /// The git provider failed for a path; worktree facts degraded.
    GitUnavailable,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroveUnavailable => "grove_unavailable",
            Self::DuplicateGrove => "duplicate_grove",
            Self::MalformedDescriptor => "malformed_descriptor",
            Self::SubProjectOutsideEcosystem => "sub_project_outside_ecosystem",
            Self::SubProjectNotFound => "sub_project_not_found",
            Self::ConfigCycle => "config_cycle",
            Self::StaleWorktree => "stale_worktree",
            Self::OrphanedWorktree => "orphaned_worktree",
            Self::GitUnavailable => "git_unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub path: PathBuf,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.path.display(), self.message)
    }
}

/// Collects warnings and mirrors each one to the log as it is recorded.
#[derive(Debug, Default)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(
            kind = warning.kind.as_str(),
            path = %warning.path.display(),
            "{}",
            warning.message
        );
        self.items.push(warning);
    }

    pub fn record(&mut self, kind: WarningKind, path: impl AsRef<Path>, message: impl Into<String>) {
        self.push(Warning::new(kind, path, message));
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.push(warning);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}
