//! # grove-core
//!
//! Foundation crate for the Grove workspace discovery engine.
//! Defines the node model, the kind decision table, descriptors, warnings,
//! errors, config, and tracing setup. `grove-discovery` builds on it.

pub mod collections;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod grove;
pub mod kind;
pub mod node;
pub mod tracing;
pub mod warning;

// Re-export the most commonly used types at the crate root.
pub use collections::{FxHashMap, FxHashSet};
pub use config::{ConfigProvider, DiscoveryConfig, FileConfigProvider, GroveConfig, GroveEntry};
pub use descriptor::{Descriptor, DescriptorState, DESCRIPTOR_FILES};
pub use errors::{ConfigError, DiscoveryError, GitError, GroveErrorCode, LookupError};
pub use grove::Grove;
pub use kind::{EcosystemContext, KindFacts, WorkspaceKind};
pub use node::WorkspaceNode;
pub use warning::{Warning, WarningKind, Warnings};

/// Directory holding a project's secondary worktrees.
pub const WORKTREES_DIR: &str = ".grove-worktrees";
