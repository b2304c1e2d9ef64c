//! # grove-discovery
//!
//! Workspace discovery and classification. Walks the configured groves,
//! classifies every marked directory into one of the nine
//! [`grove_core::WorkspaceKind`]s, links worktrees and sub-projects to their
//! owners, and answers which workspace owns a given path.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use grove_core::FileConfigProvider;
//! use grove_discovery::{Discovery, Git2WorktreeProvider};
//!
//! let config = FileConfigProvider::load_default()?;
//! let discovery = Discovery::new(Arc::new(config), Arc::new(Git2WorktreeProvider::new()));
//! let report = discovery.discover();
//! for node in &report.nodes {
//!     println!("{}{} ({})", node.tree_prefix, node.name, node.kind);
//! }
//! # Ok::<(), grove_core::ConfigError>(())
//! ```

pub mod classifier;
pub mod declarations;
pub mod discover;
pub mod enrichment;
pub mod git;
pub mod hierarchy;
pub mod index;
pub mod lookup;
pub mod registry;
pub mod scanner;

pub use classifier::{Classification, Classifier, WorktreeLink};
pub use discover::{Discovery, DiscoveryReport, RefreshHandle};
pub use enrichment::{
    Enricher, EnrichmentContext, EnrichmentError, EnrichmentResult, GitStatusEnricher,
};
pub use git::{
    Git2WorktreeProvider, HeadInfo, NullWorktreeProvider, StatusSummary, WorktreeEntry,
    WorktreeProvider,
};
pub use hierarchy::{display_order, HierarchyBuilder};
pub use lookup::LookupResolver;
pub use registry::{resolve_groves, GroveSet, Scope};
pub use scanner::{Candidate, MarkerScanner, ScanOutcome};
