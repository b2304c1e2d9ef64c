//! Grove registry: turns configured grove entries into the set of enabled,
//! normalized, de-aliased root directories for one run.

use std::path::{Path, PathBuf};

use grove_core::config::expand_home;
use grove_core::{FxHashMap, Grove, GroveConfig, Warning, WarningKind};

/// The resolved groves for one run.
#[derive(Debug, Clone, Default)]
pub struct GroveSet {
    /// Enabled groves in config order (names sorted), aliases removed.
    pub groves: Vec<Grove>,
    /// `(outer, inner)` name pairs where one grove lies inside another.
    /// Both stay registered; overlapping scans are merged downstream.
    pub nested_pairs: Vec<(String, String)>,
    pub warnings: Vec<Warning>,
}

/// Which directories may own a looked-up path.
///
/// Grove membership decides discoverability only: classification still reads
/// markers outside the scope so a project gets the same node whichever grove
/// reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every directory up to the filesystem root.
    Unrestricted,
    /// Directories under one of these roots. No roots admits nothing.
    Roots(Vec<PathBuf>),
}

impl Scope {
    pub fn contains(&self, path: &Path) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Roots(roots) => roots.iter().any(|root| path.starts_with(root)),
        }
    }

    /// Whether `path` is a strict ancestor of one of the roots.
    pub fn encloses_root(&self, path: &Path) -> bool {
        match self {
            Self::Unrestricted => false,
            Self::Roots(roots) => roots.iter().any(|root| root != path && root.starts_with(path)),
        }
    }
}

impl GroveSet {
    /// The enabled grove roots as a lookup scope.
    pub fn scope(&self) -> Scope {
        Scope::Roots(self.groves.iter().map(|g| g.path.clone()).collect())
    }

    /// Whether `path` lies inside any enabled grove.
    pub fn contains(&self, path: &Path) -> bool {
        self.groves.iter().any(|g| g.contains(path))
    }

    pub fn is_empty(&self) -> bool {
        self.groves.is_empty()
    }
}

/// Resolve every enabled grove in `config`.
///
/// Disabled entries are skipped before any filesystem access. A grove whose
/// path cannot be expanded is reported and skipped; a grove whose directory
/// does not exist is kept so the scanner reports it per grove.
pub fn resolve_groves(config: &GroveConfig) -> GroveSet {
    let mut set = GroveSet::default();
    let mut by_path: FxHashMap<PathBuf, String> = FxHashMap::default();

    for (name, entry) in &config.groves {
        if !entry.is_enabled() {
            tracing::debug!(grove = %name, "grove disabled, skipping");
            continue;
        }

        let path = match normalize(&entry.path) {
            Ok(p) => p,
            Err(message) => {
                set.warnings.push(Warning::new(
                    WarningKind::GroveUnavailable,
                    &entry.path,
                    format!("grove '{name}': {message}"),
                ));
                continue;
            }
        };

        if let Some(first) = by_path.get(&path) {
            set.warnings.push(Warning::new(
                WarningKind::DuplicateGrove,
                &path,
                format!("grove '{name}' resolves to the same directory as '{first}'"),
            ));
            continue;
        }
        by_path.insert(path.clone(), name.clone());
        set.groves.push(Grove::new(name.clone(), path));
    }

    for outer in &set.groves {
        for inner in &set.groves {
            if outer.path != inner.path && inner.path.starts_with(&outer.path) {
                tracing::debug!(outer = %outer.name, inner = %inner.name, "nested groves");
                set.nested_pairs.push((outer.name.clone(), inner.name.clone()));
            }
        }
    }

    tracing::debug!(
        groves = set.groves.len(),
        nested = set.nested_pairs.len(),
        "groves resolved"
    );
    set
}

/// Expand `~`, absolutize, and resolve symlinks and case when the path exists.
fn normalize(raw: &str) -> Result<PathBuf, String> {
    if raw.trim().is_empty() {
        return Err("empty path".to_string());
    }
    let expanded = expand_home(raw.trim()).map_err(|e| e.to_string())?;
    let absolute = std::path::absolute(&expanded).map_err(|e| e.to_string())?;
    match std::fs::canonicalize(&absolute) {
        Ok(canonical) => Ok(normalize_case(canonical)),
        // Missing roots are reported by the scanner, per grove.
        Err(_) => Ok(absolute),
    }
}

/// Rebuild `path` from the names actually stored on disk, so two spellings
/// of one directory on a case-insensitive filesystem compare equal.
#[cfg(any(target_os = "macos", target_os = "windows"))]
fn normalize_case(path: PathBuf) -> PathBuf {
    use std::path::Component;

    let mut rebuilt = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => {
                let wanted = name.to_string_lossy().to_lowercase();
                let on_disk = std::fs::read_dir(&rebuilt).ok().and_then(|entries| {
                    entries
                        .flatten()
                        .map(|e| e.file_name())
                        .find(|n| n.to_string_lossy().to_lowercase() == wanted)
                });
                rebuilt.push(on_disk.unwrap_or_else(|| name.to_os_string()));
            }
            other => rebuilt.push(other.as_os_str()),
        }
    }
    rebuilt
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn normalize_case(path: PathBuf) -> PathBuf {
    path
}
