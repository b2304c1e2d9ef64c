//! Error types, one enum per concern.
//!
//! Structural problems inside a single workspace are not errors at all; they
//! are [`crate::warning::Warning`]s. These enums cover the failures a caller
//! has to branch on.

pub mod config_error;
pub mod discovery_error;
pub mod error_code;
pub mod git_error;
pub mod lookup_error;

pub use config_error::ConfigError;
pub use discovery_error::DiscoveryError;
pub use error_code::GroveErrorCode;
pub use git_error::GitError;
pub use lookup_error::LookupError;
