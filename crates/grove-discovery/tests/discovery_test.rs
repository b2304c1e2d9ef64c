//! End-to-end discovery over real directory trees.

mod support;

use std::path::PathBuf;

use grove_core::{FxHashSet, WarningKind, WorkspaceKind};
use support::{add_worktree, git_discovery, init_repo, plain_discovery, Sandbox};

// ─── Helpers ───────────────────────────────────────────────────────

fn kinds(report: &grove_discovery::DiscoveryReport) -> Vec<(PathBuf, WorkspaceKind)> {
    let mut v: Vec<_> = report.nodes.iter().map(|n| (n.path.clone(), n.kind)).collect();
    v.sort();
    v
}

/// eco (ecosystem root) with two declared sub-projects, plus a standalone.
fn ecosystem_grove(sb: &Sandbox) {
    sb.project("eco", "name: eco\nworkspaces:\n  - api\n  - web\n");
    sb.project("eco/api", "name: api\n");
    sb.project("eco/web", "name: web\n");
    sb.project("solo", "name: solo\n");
}

// ─── Uniqueness and determinism ────────────────────────────────────

#[test]
fn every_path_appears_once() {
    let sb = Sandbox::new();
    ecosystem_grove(&sb);
    sb.project("eco/.grove-worktrees/feat", "name: eco\nworkspaces: [api, web]\n");
    sb.project("eco/.grove-worktrees/feat/api", "name: api\n");

    let report = plain_discovery(&[("g", &sb.root, true)]).discover();
    let unique: FxHashSet<_> = report.nodes.iter().map(|n| n.path.clone()).collect();
    assert_eq!(unique.len(), report.nodes.len());
    assert_eq!(report.nodes.len(), 6);
}

#[test]
fn repeated_runs_agree() {
    let sb = Sandbox::new();
    ecosystem_grove(&sb);
    let discovery = plain_discovery(&[("g", &sb.root, true)]);
    let first = discovery.discover();
    let second = discovery.discover();
    assert_eq!(first.nodes, second.nodes);
}

#[test]
fn overlapping_groves_do_not_duplicate() {
    let sb = Sandbox::new();
    ecosystem_grove(&sb);

    let single = plain_discovery(&[("all", &sb.root, true)]).discover();
    let nested = plain_discovery(&[
        ("all", &sb.root, true),
        ("eco", &sb.path("eco"), true),
        ("api", &sb.path("eco/api"), true),
    ])
    .discover();

    assert_eq!(kinds(&single), kinds(&nested));
    assert_eq!(single.nodes, nested.nodes);

    // The inner grove alone still sees api as a member of eco.
    let inner = plain_discovery(&[("api", &sb.path("eco/api"), true)]).discover();
    let api = inner.find_by_path(&sb.path("eco/api")).unwrap();
    let expected = single.find_by_path(&sb.path("eco/api")).unwrap();
    assert!(api.same_classification(expected), "{api:?} vs {expected:?}");
}

#[test]
fn project_classification_ignores_which_grove_reached_it() {
    let sb = Sandbox::new();
    sb.project("eco", "name: eco\nworkspaces: [libs/core, app]\n");
    sb.project("eco/libs/core", "name: core\n");
    sb.project("eco/app", "name: app\n");
    let core = sb.path("eco/libs/core");

    let outer = plain_discovery(&[("a", &sb.root, true)]).discover();
    let both = plain_discovery(&[
        ("a", &sb.root, true),
        ("b", &sb.path("eco/libs"), true),
    ])
    .discover();
    let inner = plain_discovery(&[("b", &sb.path("eco/libs"), true)]).discover();

    let expected = outer.find_by_path(&core).unwrap();
    assert_eq!(expected.kind, WorkspaceKind::EcosystemSubProject);
    for report in [&both, &inner] {
        let node = report.find_by_path(&core).unwrap();
        assert!(node.same_classification(expected), "{node:?} vs {expected:?}");
    }

    // The ecosystem a member links to is part of the node set; its other
    // members outside the grove are not.
    let eco = inner.find_by_path(&sb.path("eco")).unwrap();
    assert_eq!(eco.kind, WorkspaceKind::EcosystemRoot);
    assert!(inner.find_by_path(&sb.path("eco/app")).is_none());
    for node in &inner.nodes {
        if let Some(root) = &node.root_ecosystem_path {
            assert!(inner.find_by_path(root).is_some_and(|r| r.kind.is_ecosystem()));
        }
    }
}

// ─── Classification ────────────────────────────────────────────────

#[test]
fn ecosystem_members_link_to_their_root() {
    let sb = Sandbox::new();
    ecosystem_grove(&sb);
    let report = plain_discovery(&[("g", &sb.root, true)]).discover();

    let eco = sb.path("eco");
    let api = report.find_by_path(&sb.path("eco/api")).unwrap();
    assert_eq!(api.kind, WorkspaceKind::EcosystemSubProject);
    assert_eq!(api.parent_ecosystem_path.as_ref(), Some(&eco));
    assert_eq!(api.root_ecosystem_path.as_ref(), Some(&eco));

    let solo = report.find_by_path(&sb.path("solo")).unwrap();
    assert_eq!(solo.kind, WorkspaceKind::StandaloneProject);
    assert_eq!(solo.root_ecosystem_path, None);

    let rendered: Vec<_> = report
        .nodes
        .iter()
        .map(|n| format!("{}{}", n.tree_prefix, n.name))
        .collect();
    assert_eq!(rendered, vec!["eco", "├─ api", "└─ web", "solo"]);
}

#[test]
fn declarations_are_sandboxed() {
    let sb = Sandbox::new();
    sb.project(
        "eco",
        "workspaces: ['../outside', '/abs/path', 'does-not-exist', 'valid']\n",
    );
    sb.project("eco/valid", "name: valid\n");
    sb.project("outside", "name: outside\n");

    let report = plain_discovery(&[("g", &sb.root, true)]).discover();
    let eco = sb.path("eco");

    let members: Vec<_> = report
        .nodes
        .iter()
        .filter(|n| n.parent_ecosystem_path.as_ref() == Some(&eco))
        .collect();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].path, sb.path("eco/valid"));

    let eco_warnings: Vec<_> = report.warnings.iter().filter(|w| w.path == eco).collect();
    assert_eq!(eco_warnings.len(), 3);

    let outside = report.find_by_path(&sb.path("outside")).unwrap();
    assert_eq!(outside.kind, WorkspaceKind::StandaloneProject);
}

#[test]
fn disabled_groves_contribute_nothing() {
    let sb = Sandbox::new();
    sb.project("on/app", "name: app\n");
    sb.project("off/hidden", "name: hidden\n");

    let report = plain_discovery(&[
        ("on", &sb.path("on"), true),
        ("off", &sb.path("off"), false),
    ])
    .discover();
    assert_eq!(report.nodes.len(), 1);
    assert_eq!(report.nodes[0].name, "app");
    assert_eq!(report.groves.len(), 1);
}

#[test]
fn malformed_descriptor_falls_back() {
    let sb = Sandbox::new();
    sb.project("broken-eco", "name: [oops\nworkspaces: [a]\n");
    sb.project("broken-eco/a", "name: a\n");

    let report = plain_discovery(&[("g", &sb.root, true)]).discover();
    let broken = report.find_by_path(&sb.path("broken-eco")).unwrap();
    assert_eq!(broken.name, "broken-eco");
    assert_eq!(broken.kind, WorkspaceKind::StandaloneProject);

    let a = report.find_by_path(&sb.path("broken-eco/a")).unwrap();
    assert_eq!(a.kind, WorkspaceKind::StandaloneProject);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::MalformedDescriptor && w.path == sb.path("broken-eco")));
}

#[test]
fn bare_git_checkout_is_a_non_grove_repo() {
    let sb = Sandbox::new();
    init_repo(&sb.path("vendor-lib"), &[("README.md", "hi\n")]);

    let report = git_discovery(&[("g", &sb.root, true)]).discover();
    assert_eq!(report.nodes.len(), 1);
    assert_eq!(report.nodes[0].kind, WorkspaceKind::NonGroveRepo);
    assert_eq!(report.nodes[0].name, "vendor-lib");
}

// ─── Worktrees ─────────────────────────────────────────────────────

#[test]
fn deepest_worktree_nesting_is_classified() {
    let sb = Sandbox::new();
    let eco_path = sb.path("eco");
    let eco = init_repo(
        &eco_path,
        &[
            ("grove.yml", "name: eco\nworkspaces: [svc]\n"),
            (".gitignore", "svc/\n.grove-worktrees/\n"),
        ],
    );
    let svc = init_repo(&eco_path.join("svc"), &[("grove.yml", "name: svc\n")]);

    let eco_wt = add_worktree(&eco, "feat", &eco_path.join(".grove-worktrees/feat"));
    let svc_wt = add_worktree(&svc, "feat", &eco_wt.join("svc"));

    let report = git_discovery(&[("g", &sb.root, true)]).discover();

    let w = report.find_by_path(&eco_wt).unwrap();
    assert_eq!(w.kind, WorkspaceKind::EcosystemWorktree);
    assert_eq!(w.parent_project_path.as_ref(), Some(&eco_path));
    assert_eq!(w.root_ecosystem_path.as_ref(), Some(&eco_path));

    let deep = report.find_by_path(&svc_wt).unwrap();
    assert_eq!(deep.kind, WorkspaceKind::EcosystemWorktreeSubProjectWorktree);
    assert_eq!(deep.parent_project_path.as_ref(), Some(&eco_path.join("svc")));
    assert_eq!(deep.parent_ecosystem_path.as_ref(), Some(&eco_wt));
    assert_eq!(deep.root_ecosystem_path.as_ref(), Some(&eco_path));

    let svc_node = report.find_by_path(&eco_path.join("svc")).unwrap();
    assert_eq!(svc_node.kind, WorkspaceKind::EcosystemSubProject);

    // The nested worktree is displayed under the ecosystem worktree.
    assert_eq!(report.children_of(&eco_wt).count(), 1);
    assert_eq!(report.nodes.len(), 4);
}

#[test]
fn worktrees_of_a_standalone_project() {
    let sb = Sandbox::new();
    let app_path = sb.path("app");
    let app = init_repo(
        &app_path,
        &[("grove.yml", "name: app\n"), (".gitignore", ".grove-worktrees/\n")],
    );
    let wt = add_worktree(&app, "fix", &app_path.join(".grove-worktrees/fix"));

    let report = git_discovery(&[("g", &sb.root, true)]).discover();
    let node = report.find_by_path(&wt).unwrap();
    assert_eq!(node.kind, WorkspaceKind::StandaloneProjectWorktree);
    assert_eq!(node.parent_project_path.as_ref(), Some(&app_path));
    assert_eq!(node.tree_prefix, "└─ ");
}

#[test]
fn stale_worktree_entries_are_reported() {
    let sb = Sandbox::new();
    let app_path = sb.path("app");
    let app = init_repo(
        &app_path,
        &[("grove.yml", "name: app\n"), (".gitignore", ".grove-worktrees/\n")],
    );
    let wt = add_worktree(&app, "gone", &app_path.join(".grove-worktrees/gone"));
    std::fs::remove_dir_all(&wt).unwrap();

    let report = git_discovery(&[("g", &sb.root, true)]).discover();
    assert_eq!(report.nodes.len(), 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::StaleWorktree));
}

#[test]
fn orphaned_worktree_never_crashes_discovery() {
    let sb = Sandbox::new();
    sb.project("keep", "name: keep\n");
    sb.project("deleted/.grove-worktrees/feat", "name: deleted\n");

    let report = plain_discovery(&[("g", &sb.root, true)]).discover();
    assert_eq!(report.nodes.len(), 1);
    assert_eq!(report.nodes[0].name, "keep");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::OrphanedWorktree);
}
