//! Path-keyed marker cache shared by classification and lookup.
//!
//! Seeded with scanner output, then reads the filesystem lazily for any
//! directory the classifier asks about. Both discovery and single-path lookup
//! read markers through this one type, so they agree on what exists. Lookups
//! are not limited to the groves: an ecosystem or owning project above a
//! grove root still counts.

use std::path::{Path, PathBuf};

use grove_core::{ConfigProvider, FxHashMap};

use crate::scanner::{inspect_dir, Candidate};

pub struct MarkerIndex<'a> {
    config: &'a dyn ConfigProvider,
    cache: FxHashMap<PathBuf, Option<Candidate>>,
}

impl<'a> MarkerIndex<'a> {
    pub fn new(config: &'a dyn ConfigProvider) -> Self {
        Self {
            config,
            cache: FxHashMap::default(),
        }
    }

    /// Record scanner output. The first candidate seen for a path wins.
    pub fn seed(&mut self, candidates: impl IntoIterator<Item = Candidate>) {
        for candidate in candidates {
            self.cache
                .entry(candidate.path.clone())
                .or_insert(Some(candidate));
        }
    }

    /// The marker candidate at `path`, probing disk on first access.
    /// `path` must be canonical.
    pub fn get(&mut self, path: &Path) -> Option<Candidate> {
        if let Some(cached) = self.cache.get(path) {
            return cached.clone();
        }
        let found = inspect_dir(self.config, path);
        self.cache.insert(path.to_path_buf(), found.clone());
        found
    }

    pub fn has_marker(&mut self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    pub fn config(&self) -> &'a dyn ConfigProvider {
        self.config
    }
}
