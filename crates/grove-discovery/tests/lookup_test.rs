//! Lookup resolver against full discovery.

mod support;

use grove_core::{FileConfigProvider, GroveErrorCode, LookupError, WorkspaceKind};
use grove_discovery::{LookupResolver, NullWorktreeProvider};
use support::{add_worktree, git_discovery, init_repo, plain_discovery, Sandbox};

#[test]
fn lookup_matches_discovery_for_every_node() {
    let sb = Sandbox::new();
    sb.project("eco", "name: eco\nworkspaces: ['libs/*', app]\n");
    sb.project("eco/app", "name: app\n");
    sb.project("eco/libs/core", "name: core\n");
    sb.project("eco/libs/util", "name: util\n");
    sb.project("eco/.grove-worktrees/next", "name: eco\nworkspaces: [app]\n");
    sb.project("eco/.grove-worktrees/next/app", "name: app\n");
    sb.project("eco/app/.grove-worktrees/hotfix", "name: app\n");
    sb.project("tools/cli", "name: cli\n");

    let discovery = plain_discovery(&[("g", &sb.root, true)]);
    let report = discovery.discover();
    assert_eq!(report.nodes.len(), 8);

    for node in &report.nodes {
        let found = discovery.resolve_cwd(&node.path).unwrap();
        assert!(
            found.same_classification(node),
            "lookup disagrees for {}: {found:?} vs {node:?}",
            node.path.display()
        );
        assert!(found.tree_prefix.is_empty());
    }
}

#[test]
fn lookup_matches_discovery_with_git_worktrees() {
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
    std::fs::create_dir_all(svc_wt.join("src/handlers")).unwrap();

    let discovery = git_discovery(&[("g", &sb.root, true)]);
    let report = discovery.discover();
    for node in &report.nodes {
        let found = discovery.resolve_cwd(&node.path).unwrap();
        assert!(found.same_classification(node), "{}", node.path.display());
    }

    let deep = discovery.resolve_cwd(&svc_wt.join("src/handlers")).unwrap();
    assert_eq!(deep.path, svc_wt);
    assert_eq!(deep.kind, WorkspaceKind::EcosystemWorktreeSubProjectWorktree);
}

#[test]
fn nearest_enclosing_marker_wins() {
    let sb = Sandbox::new();
    sb.project("outer", "name: outer\n");
    sb.project("outer/inner", "name: inner\n");
    let deep = sb.dir("outer/inner/a/b/c");

    let discovery = plain_discovery(&[("g", &sb.root, true)]);
    let node = discovery.resolve_cwd(&deep).unwrap();
    assert_eq!(node.path, sb.path("outer/inner"));
    assert_eq!(node.name, "inner");

    let node = discovery.resolve_cwd(&sb.dir("outer/docs")).unwrap();
    assert_eq!(node.path, sb.path("outer"));
}

#[test]
fn outside_every_grove_is_not_in_workspace() {
    let sb = Sandbox::new();
    sb.project("grove/app", "name: app\n");
    sb.project("elsewhere/proj", "name: proj\n");

    let discovery = plain_discovery(&[("g", &sb.path("grove"), true)]);
    let err = discovery.resolve_cwd(&sb.path("elsewhere/proj")).unwrap_err();
    assert!(err.is_not_in_workspace());
    assert_eq!(err.error_code(), "NOT_IN_WORKSPACE");

    // Without a grove scope the same directory resolves.
    let config = FileConfigProvider::default();
    let provider = NullWorktreeProvider;
    let node = LookupResolver::unscoped(&config, &provider)
        .resolve_cwd(&sb.path("elsewhere/proj"))
        .unwrap();
    assert_eq!(node.name, "proj");
}

#[test]
fn only_disabled_groves_means_nothing_resolves() {
    let sb = Sandbox::new();
    let app = sb.project("off/app", "name: app\n");

    let discovery = plain_discovery(&[("off", &sb.path("off"), false)]);
    assert!(discovery.discover().nodes.is_empty());
    let err = discovery.resolve_cwd(&app).unwrap_err();
    assert!(err.is_not_in_workspace());

    let discovery = plain_discovery(&[]);
    assert!(discovery.resolve_cwd(&app).unwrap_err().is_not_in_workspace());
}

#[test]
fn lookup_matches_discovery_from_an_inner_grove() {
    let sb = Sandbox::new();
    sb.project("eco", "name: eco\nworkspaces: ['libs/*']\n");
    sb.project("eco/libs/core", "name: core\n");
    sb.project("eco/libs/util", "name: util\n");
    let deep = sb.dir("eco/libs/core/src");

    let discovery = plain_discovery(&[("libs", &sb.path("eco/libs"), true)]);
    let report = discovery.discover();
    assert_eq!(report.nodes.len(), 3);
    for node in &report.nodes {
        let found = discovery.resolve_cwd(&node.path).unwrap();
        assert!(found.same_classification(node), "{}", node.path.display());
    }

    let node = discovery.resolve_cwd(&deep).unwrap();
    assert_eq!(node.kind, WorkspaceKind::EcosystemSubProject);
    assert_eq!(node.root_ecosystem_path, Some(sb.path("eco")));
}

#[test]
fn orphaned_worktree_lookup_is_an_error_not_a_panic() {
    let sb = Sandbox::new();
    let wt = sb.project("deleted/.grove-worktrees/feat", "name: deleted\n");
    let src = sb.dir("deleted/.grove-worktrees/feat/src");

    let discovery = plain_discovery(&[("g", &sb.root, true)]);
    let err = discovery.resolve_cwd(&src).unwrap_err();
    match err {
        LookupError::OrphanedWorktree { path, owner } => {
            assert_eq!(path, wt);
            assert_eq!(owner, sb.path("deleted"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn symlinked_cwd_resolves_to_canonical_node() {
    let sb = Sandbox::new();
    let app = sb.project("app", "name: app\n");
    sb.dir("app/src");
    std::os::unix::fs::symlink(app.join("src"), sb.path("shortcut")).unwrap();

    let discovery = plain_discovery(&[("g", &sb.root, true)]);
    let node = discovery.resolve_cwd(&sb.path("shortcut")).unwrap();
    assert_eq!(node.path, app);
}
