//! Workspace kinds and the decision table that selects them.
//!
//! A node's kind is never assigned piecemeal. The classifier gathers the
//! independent facts about a directory into [`KindFacts`] and calls
//! [`WorkspaceKind::from_facts`], a total function with one answer per
//! combination.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The nine workspace kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkspaceKind {
    EcosystemRoot,
    EcosystemSubProject,
    EcosystemWorktree,
    EcosystemSubProjectWorktree,
    EcosystemWorktreeSubProject,
    EcosystemWorktreeSubProjectWorktree,
    StandaloneProject,
    StandaloneProjectWorktree,
    NonGroveRepo,
}

/// Which kind of ecosystem, if any, a directory belongs to as a sub-project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EcosystemContext {
    /// Not a member of any ecosystem.
    #[default]
    None,
    /// Member of an ecosystem's primary checkout.
    Root,
    /// Member of an ecosystem worktree.
    Worktree,
}

/// The independent facts that fully determine a [`WorkspaceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindFacts {
    /// Descriptor parsed and declares at least one sub-project.
    pub declares_sub_projects: bool,
    /// Checked out as a secondary working directory of another project.
    pub is_worktree: bool,
    /// Ecosystem membership, inherited by worktrees from their parent project.
    pub ecosystem: EcosystemContext,
    /// A descriptor file exists on disk (parseable or not).
    pub has_descriptor: bool,
    /// A `.git` directory or file exists.
    pub has_git_dir: bool,
}

impl WorkspaceKind {
    pub const ALL: [WorkspaceKind; 9] = [
        Self::EcosystemRoot,
        Self::EcosystemSubProject,
        Self::EcosystemWorktree,
        Self::EcosystemSubProjectWorktree,
        Self::EcosystemWorktreeSubProject,
        Self::EcosystemWorktreeSubProjectWorktree,
        Self::StandaloneProject,
        Self::StandaloneProjectWorktree,
        Self::NonGroveRepo,
    ];

    /// Select the kind for a set of facts.
    ///
    /// Membership in an ecosystem wins over the directory's own declarations:
    /// a sub-project that happens to declare sub-projects is still a
    /// sub-project, and its declarations are not followed.
    pub fn from_facts(facts: KindFacts) -> Self {
        match (facts.ecosystem, facts.is_worktree, facts.declares_sub_projects) {
            (EcosystemContext::Root, false, _) => Self::EcosystemSubProject,
            (EcosystemContext::Root, true, _) => Self::EcosystemSubProjectWorktree,
            (EcosystemContext::Worktree, false, _) => Self::EcosystemWorktreeSubProject,
            (EcosystemContext::Worktree, true, _) => Self::EcosystemWorktreeSubProjectWorktree,
            (EcosystemContext::None, false, true) => Self::EcosystemRoot,
            (EcosystemContext::None, true, true) => Self::EcosystemWorktree,
            (EcosystemContext::None, true, false) => Self::StandaloneProjectWorktree,
            (EcosystemContext::None, false, false) => {
                if facts.has_git_dir && !facts.has_descriptor {
                    Self::NonGroveRepo
                } else {
                    Self::StandaloneProject
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EcosystemRoot => "EcosystemRoot",
            Self::EcosystemSubProject => "EcosystemSubProject",
            Self::EcosystemWorktree => "EcosystemWorktree",
            Self::EcosystemSubProjectWorktree => "EcosystemSubProjectWorktree",
            Self::EcosystemWorktreeSubProject => "EcosystemWorktreeSubProject",
            Self::EcosystemWorktreeSubProjectWorktree => "EcosystemWorktreeSubProjectWorktree",
            Self::StandaloneProject => "StandaloneProject",
            Self::StandaloneProjectWorktree => "StandaloneProjectWorktree",
            Self::NonGroveRepo => "NonGroveRepo",
        }
    }

    /// Kinds whose descriptor declarations are resolved into sub-projects.
    pub fn is_ecosystem(&self) -> bool {
        matches!(self, Self::EcosystemRoot | Self::EcosystemWorktree)
    }

    pub fn is_worktree(&self) -> bool {
        matches!(
            self,
            Self::EcosystemWorktree
                | Self::EcosystemSubProjectWorktree
                | Self::EcosystemWorktreeSubProjectWorktree
                | Self::StandaloneProjectWorktree
        )
    }

    pub fn is_sub_project(&self) -> bool {
        matches!(
            self,
            Self::EcosystemSubProject
                | Self::EcosystemSubProjectWorktree
                | Self::EcosystemWorktreeSubProject
                | Self::EcosystemWorktreeSubProjectWorktree
        )
    }

    /// The ecosystem context this kind hands down to the sub-projects it
    /// declares. Worktrees do not use this; they inherit their parent
    /// project's own membership.
    pub fn context_for_members(&self) -> EcosystemContext {
        match self {
            Self::EcosystemRoot => EcosystemContext::Root,
            Self::EcosystemWorktree => EcosystemContext::Worktree,
            _ => EcosystemContext::None,
        }
    }
}

impl fmt::Display for WorkspaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(declares: bool, worktree: bool, ecosystem: EcosystemContext) -> KindFacts {
        KindFacts {
            declares_sub_projects: declares,
            is_worktree: worktree,
            ecosystem,
            has_descriptor: true,
            has_git_dir: true,
        }
    }

    #[test]
    fn decision_table_is_exhaustive() {
        use EcosystemContext::*;
        use WorkspaceKind::*;

        let table = [
            (true, false, None, EcosystemRoot),
            (true, true, None, EcosystemWorktree),
            (false, false, None, StandaloneProject),
            (false, true, None, StandaloneProjectWorktree),
            (false, false, Root, EcosystemSubProject),
            (true, false, Root, EcosystemSubProject),
            (false, true, Root, EcosystemSubProjectWorktree),
            (true, true, Root, EcosystemSubProjectWorktree),
            (false, false, Worktree, EcosystemWorktreeSubProject),
            (true, false, Worktree, EcosystemWorktreeSubProject),
            (false, true, Worktree, EcosystemWorktreeSubProjectWorktree),
            (true, true, Worktree, EcosystemWorktreeSubProjectWorktree),
        ];

        for (declares, worktree, ecosystem, expected) in table {
            assert_eq!(
                WorkspaceKind::from_facts(facts(declares, worktree, ecosystem)),
                expected,
                "declares={declares} worktree={worktree} ecosystem={ecosystem:?}"
            );
        }
    }

    #[test]
    fn bare_git_repo_is_non_grove() {
        let kind = WorkspaceKind::from_facts(KindFacts {
            has_git_dir: true,
            ..Default::default()
        });
        assert_eq!(kind, WorkspaceKind::NonGroveRepo);
    }

    #[test]
    fn malformed_descriptor_with_git_is_still_a_grove_project() {
        let kind = WorkspaceKind::from_facts(KindFacts {
            has_git_dir: true,
            has_descriptor: true,
            ..Default::default()
        });
        assert_eq!(kind, WorkspaceKind::StandaloneProject);
    }

    #[test]
    fn git_worktree_without_descriptor_is_not_non_grove() {
        let kind = WorkspaceKind::from_facts(KindFacts {
            has_git_dir: true,
            is_worktree: true,
            ..Default::default()
        });
        assert_eq!(kind, WorkspaceKind::StandaloneProjectWorktree);
    }

    #[test]
    fn serializes_as_variant_name() {
        for kind in WorkspaceKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn member_context_only_from_ecosystem_kinds() {
        for kind in WorkspaceKind::ALL {
            let ctx = kind.context_for_members();
            assert_eq!(ctx != EcosystemContext::None, kind.is_ecosystem(), "{kind}");
        }
    }
}
