//! The classified representation of one discovered directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::kind::WorkspaceKind;

/// One discovered workspace. `path` is the identity key within a run.
///
/// Cross references are plain paths resolved through a path-keyed map, so a
/// node set is trivially cloneable and serializable. Every field is always
/// present in JSON; an absent link is `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceNode {
    pub name: String,
    pub path: PathBuf,
    pub kind: WorkspaceKind,
    #[serde(default)]
    pub parent_project_path: Option<PathBuf>,
    #[serde(default)]
    pub parent_ecosystem_path: Option<PathBuf>,
    #[serde(default)]
    pub root_ecosystem_path: Option<PathBuf>,
    /// Rendering connector, computed once in display order. Empty for nodes
    /// produced by a single-path lookup.
    #[serde(default)]
    pub tree_prefix: String,
}

impl WorkspaceNode {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: WorkspaceKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            parent_project_path: None,
            parent_ecosystem_path: None,
            root_ecosystem_path: None,
            tree_prefix: String::new(),
        }
    }

    /// The nearest linked node that is also an ancestor directory of this one.
    ///
    /// This is where the node hangs in the display tree. A sub-project
    /// worktree inside an ecosystem worktree is displayed under that
    /// ecosystem worktree, not under its primary checkout elsewhere on disk.
    pub fn display_parent(&self) -> Option<&Path> {
        let contains_self = |p: &&PathBuf| self.path.starts_with(p) && self.path != **p;
        self.parent_project_path
            .as_ref()
            .filter(contains_self)
            .or_else(|| self.parent_ecosystem_path.as_ref().filter(contains_self))
            .or(self.parent_ecosystem_path.as_ref())
            .or(self.parent_project_path.as_ref())
            .map(PathBuf::as_path)
    }

    /// Whether two nodes agree on everything except rendering.
    pub fn same_classification(&self, other: &WorkspaceNode) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.kind == other.kind
            && self.parent_project_path == other.parent_project_path
            && self.parent_ecosystem_path == other.parent_ecosystem_path
            && self.root_ecosystem_path == other.root_ecosystem_path
    }
}
