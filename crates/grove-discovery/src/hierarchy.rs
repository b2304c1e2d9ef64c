//! Hierarchy builder: classifies every candidate, closes the link graph,
//! and lays the nodes out in display order with tree connectors.

use std::path::{Path, PathBuf};

use grove_core::{
    ConfigProvider, FxHashMap, FxHashSet, Warning, WarningKind, Warnings, WorkspaceNode,
};

use crate::classifier::Classifier;
use crate::git::WorktreeProvider;
use crate::scanner::Candidate;

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const SPACE: &str = "   ";

pub struct HierarchyBuilder<'a> {
    classifier: Classifier<'a>,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(config: &'a dyn ConfigProvider, provider: &'a dyn WorktreeProvider) -> Self {
        Self {
            classifier: Classifier::new(config, provider),
        }
    }

    /// Turn scanner candidates into the final node set, in display order.
    ///
    /// Every node a candidate links to is included, even when it lies outside
    /// the groves that were scanned. Structural problems never fail the
    /// build; they come back as warnings.
    pub fn build(mut self, candidates: Vec<Candidate>) -> (Vec<WorkspaceNode>, Vec<Warning>) {
        let mut seen = FxHashSet::default();
        let mut unique = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if seen.insert(candidate.path.clone()) {
                unique.push(candidate);
            }
        }
        let paths: Vec<PathBuf> = unique.iter().map(|c| c.path.clone()).collect();
        self.classifier.seed(unique);

        let mut arena: FxHashMap<PathBuf, WorkspaceNode> = FxHashMap::default();
        let mut queue = paths;
        while let Some(path) = queue.pop() {
            if arena.contains_key(&path) {
                continue;
            }
            let Some(classification) = self.classifier.classify(&path) else {
                continue;
            };
            // Pull in every node this one links to so links never dangle.
            let node = classification.node;
            for link in [
                &node.parent_project_path,
                &node.parent_ecosystem_path,
                &node.root_ecosystem_path,
            ]
            .into_iter()
            .flatten()
            {
                if !arena.contains_key(link) {
                    queue.push(link.clone());
                }
            }
            arena.insert(path, node);
        }

        let mut warnings = self.classifier.take_warnings();
        check_roots(&mut arena);

        let (nodes, order_warnings) = display_order(arena.into_values().collect());
        warnings.extend(order_warnings);
        tracing::debug!(nodes = nodes.len(), warnings = warnings.len(), "hierarchy built");
        (nodes, warnings)
    }
}

/// Drop root links that do not name an ecosystem node in the set.
fn check_roots(arena: &mut FxHashMap<PathBuf, WorkspaceNode>) {
    let valid: FxHashSet<PathBuf> = arena
        .values()
        .filter(|n| n.kind.is_ecosystem())
        .map(|n| n.path.clone())
        .collect();
    for node in arena.values_mut() {
        if let Some(root) = &node.root_ecosystem_path {
            if !valid.contains(root) {
                tracing::debug!(path = %node.path.display(), root = %root.display(), "root ecosystem not in node set");
                node.root_ecosystem_path = None;
            }
        }
    }
}

/// Order nodes depth-first under their display parents, siblings sorted by
/// path, and fill in `tree_prefix`.
///
/// Nodes whose display parent is absent from the set are top level. Nodes
/// unreachable from any top-level node sit on a display cycle; they are
/// promoted to top level with a warning.
pub fn display_order(nodes: Vec<WorkspaceNode>) -> (Vec<WorkspaceNode>, Vec<Warning>) {
    let mut arena: FxHashMap<PathBuf, WorkspaceNode> =
        nodes.into_iter().map(|n| (n.path.clone(), n)).collect();

    let mut children: FxHashMap<PathBuf, Vec<PathBuf>> = FxHashMap::default();
    let mut top: Vec<PathBuf> = Vec::new();
    for node in arena.values() {
        match node.display_parent().filter(|p| arena.contains_key(*p)) {
            Some(parent) if parent != node.path => children
                .entry(parent.to_path_buf())
                .or_default()
                .push(node.path.clone()),
            _ => top.push(node.path.clone()),
        }
    }
    for list in children.values_mut() {
        list.sort();
    }
    top.sort();

    let mut ordered = Vec::with_capacity(arena.len());
    let mut visited = FxHashSet::default();
    for path in &top {
        emit(path, "", None, &children, &mut arena, &mut visited, &mut ordered);
    }

    let mut warnings = Warnings::new();
    let mut stranded: Vec<PathBuf> = arena
        .keys()
        .filter(|p| !visited.contains(*p))
        .cloned()
        .collect();
    stranded.sort();
    for path in stranded {
        if visited.contains(&path) {
            continue;
        }
        warnings.record(
            WarningKind::ConfigCycle,
            &path,
            "display parents form a cycle; shown at top level",
        );
        emit(&path, "", None, &children, &mut arena, &mut visited, &mut ordered);
    }

    (ordered, warnings.into_vec())
}

/// `is_last` is `None` for top-level nodes.
fn emit(
    path: &Path,
    indent: &str,
    is_last: Option<bool>,
    children: &FxHashMap<PathBuf, Vec<PathBuf>>,
    arena: &mut FxHashMap<PathBuf, WorkspaceNode>,
    visited: &mut FxHashSet<PathBuf>,
    ordered: &mut Vec<WorkspaceNode>,
) {
    if !visited.insert(path.to_path_buf()) {
        return;
    }
    let Some(mut node) = arena.remove(path) else {
        return;
    };

    let (prefix, child_indent) = match is_last {
        None => (String::new(), String::new()),
        Some(true) => (format!("{indent}{LAST_BRANCH}"), format!("{indent}{SPACE}")),
        Some(false) => (format!("{indent}{BRANCH}"), format!("{indent}{PIPE}")),
    };
    node.tree_prefix = prefix;
    ordered.push(node);

    let Some(kids) = children.get(path) else {
        return;
    };
    let pending: Vec<&PathBuf> = kids.iter().filter(|k| !visited.contains(*k)).collect();
    for (i, kid) in pending.iter().enumerate() {
        let last = i + 1 == pending.len();
        emit(kid, &child_indent, Some(last), children, arena, visited, ordered);
    }
}
