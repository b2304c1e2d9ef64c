//! Resolution of an ecosystem's declared sub-project entries.
//!
//! Every entry is sandboxed to the ecosystem directory. Escapes, absolute
//! paths elsewhere, symlinks leaving the tree, self-declarations, and entries
//! without a marker are dropped with a warning; the rest resolve to canonical
//! paths.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use grove_core::{Descriptor, FxHashSet, Warning, WarningKind, WORKTREES_DIR};

use crate::index::MarkerIndex;

/// Path components a declaration may never pass through.
const RESERVED: &[&str] = &[".git", WORKTREES_DIR];

#[derive(Debug, Default)]
pub struct Resolved {
    /// Canonical member paths, sorted and deduplicated.
    pub members: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

/// Resolve `descriptor`'s entries relative to `ecosystem` (canonical).
pub fn resolve(index: &mut MarkerIndex<'_>, ecosystem: &Path, descriptor: &Descriptor) -> Resolved {
    let mut resolved = Resolved::default();
    let mut seen = FxHashSet::default();

    for entry in descriptor.sub_project_entries() {
        let accepted = if is_glob(entry) {
            resolve_glob(index, ecosystem, entry, &mut resolved.warnings)
        } else {
            resolve_literal(index, ecosystem, entry, &mut resolved.warnings)
                .into_iter()
                .collect()
        };
        for member in accepted {
            if seen.insert(member.clone()) {
                resolved.members.push(member);
            }
        }
    }

    resolved.members.sort();
    resolved
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

/// Lexically resolve `entry` against `ecosystem`, returning the path relative
/// to it. `..` may not climb above the ecosystem.
fn sandboxed_relative(ecosystem: &Path, entry: &str) -> Result<PathBuf, Rejection> {
    let raw = Path::new(entry);
    let relative = if raw.is_absolute() {
        raw.strip_prefix(ecosystem)
            .map_err(|_| Rejection::Outside("absolute path outside the ecosystem"))?
            .to_path_buf()
    } else {
        raw.to_path_buf()
    };

    let mut normalized = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(Rejection::Outside("path escapes the ecosystem"));
                }
            }
            Component::Normal(name) => {
                if RESERVED.iter().any(|r| name == std::ffi::OsStr::new(r)) {
                    return Err(Rejection::Outside("path enters a reserved directory"));
                }
                normalized.push(name);
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Rejection::Outside("path is not relative to the ecosystem"));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Rejection::SelfDeclared);
    }
    Ok(normalized)
}

/// Check a canonical target against the ecosystem after symlinks resolved.
fn check_canonical(ecosystem: &Path, canonical: &Path) -> Result<(), Rejection> {
    if canonical == ecosystem {
        return Err(Rejection::SelfDeclared);
    }
    if !canonical.starts_with(ecosystem) {
        return Err(Rejection::Outside("resolves outside the ecosystem"));
    }
    let inner = canonical.strip_prefix(ecosystem).unwrap_or(canonical);
    if inner
        .components()
        .any(|c| RESERVED.iter().any(|r| c.as_os_str() == std::ffi::OsStr::new(r)))
    {
        return Err(Rejection::Outside("resolves into a reserved directory"));
    }
    Ok(())
}

enum Rejection {
    Outside(&'static str),
    SelfDeclared,
}

impl Rejection {
    fn into_warning(self, ecosystem: &Path, entry: &str) -> Warning {
        match self {
            Self::Outside(reason) => Warning::new(
                WarningKind::SubProjectOutsideEcosystem,
                ecosystem,
                format!("sub-project '{entry}': {reason}"),
            ),
            Self::SelfDeclared => Warning::new(
                WarningKind::ConfigCycle,
                ecosystem,
                format!("sub-project '{entry}' is the ecosystem itself"),
            ),
        }
    }
}

fn not_found(ecosystem: &Path, entry: &str, reason: &str) -> Warning {
    Warning::new(
        WarningKind::SubProjectNotFound,
        ecosystem,
        format!("sub-project '{entry}': {reason}"),
    )
}

fn resolve_literal(
    index: &mut MarkerIndex<'_>,
    ecosystem: &Path,
    entry: &str,
    warnings: &mut Vec<Warning>,
) -> Option<PathBuf> {
    let relative = match sandboxed_relative(ecosystem, entry) {
        Ok(r) => r,
        Err(rejection) => {
            warnings.push(rejection.into_warning(ecosystem, entry));
            return None;
        }
    };

    let canonical = match std::fs::canonicalize(ecosystem.join(&relative)) {
        Ok(c) => c,
        Err(_) => {
            warnings.push(not_found(ecosystem, entry, "does not exist"));
            return None;
        }
    };
    if let Err(rejection) = check_canonical(ecosystem, &canonical) {
        warnings.push(rejection.into_warning(ecosystem, entry));
        return None;
    }
    if !canonical.is_dir() || !index.has_marker(&canonical) {
        warnings.push(not_found(ecosystem, entry, "no workspace marker"));
        return None;
    }
    Some(canonical)
}

/// Expand a pattern relative to the ecosystem. Matches without a marker are
/// skipped quietly; a pattern that yields nothing is a warning.
fn resolve_glob(
    index: &mut MarkerIndex<'_>,
    ecosystem: &Path,
    entry: &str,
    warnings: &mut Vec<Warning>,
) -> Vec<PathBuf> {
    let relative = match sandboxed_relative(ecosystem, entry) {
        Ok(r) => r,
        Err(rejection) => {
            warnings.push(rejection.into_warning(ecosystem, entry));
            return Vec::new();
        }
    };

    let pattern = format!(
        "{}/{}",
        Pattern::escape(&ecosystem.to_string_lossy()),
        relative.to_string_lossy()
    );
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let paths = match glob::glob_with(&pattern, options) {
        Ok(paths) => paths,
        Err(e) => {
            warnings.push(not_found(ecosystem, entry, &format!("invalid pattern: {e}")));
            return Vec::new();
        }
    };

    let mut members = Vec::new();
    for path in paths.flatten() {
        if !path.is_dir() {
            continue;
        }
        let Ok(canonical) = std::fs::canonicalize(&path) else {
            continue;
        };
        if let Err(rejection) = check_canonical(ecosystem, &canonical) {
            warnings.push(rejection.into_warning(ecosystem, entry));
            continue;
        }
        if index.has_marker(&canonical) {
            members.push(canonical);
        }
    }

    if members.is_empty() {
        warnings.push(not_found(ecosystem, entry, "pattern matched no projects"));
    }
    members
}
