//! Groves: the configured root directories discovery walks.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A named, enabled root directory. Identity is the normalized path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Grove {
    pub name: String,
    pub path: PathBuf,
    pub enabled: bool,
}

impl Grove {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            enabled: true,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.path)
    }
}
