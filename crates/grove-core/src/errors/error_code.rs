//! Stable machine-readable codes for every error enum.

/// Maps an error to a stable code for JSON output and scripting.
pub trait GroveErrorCode {
    fn error_code(&self) -> &'static str;
}

// Config
pub const CONFIG_NOT_FOUND: &str = "CONFIG_NOT_FOUND";
pub const CONFIG_READ_ERROR: &str = "CONFIG_READ_ERROR";
pub const CONFIG_PARSE_ERROR: &str = "CONFIG_PARSE_ERROR";
pub const CONFIG_INVALID_VALUE: &str = "CONFIG_INVALID_VALUE";
pub const CONFIG_NO_HOME: &str = "CONFIG_NO_HOME";

// Grove roots
pub const GROVE_ROOT_MISSING: &str = "GROVE_ROOT_MISSING";
pub const GROVE_ROOT_NOT_DIRECTORY: &str = "GROVE_ROOT_NOT_DIRECTORY";
pub const GROVE_ROOT_UNREADABLE: &str = "GROVE_ROOT_UNREADABLE";

// Git
pub const GIT_NOT_A_REPOSITORY: &str = "GIT_NOT_A_REPOSITORY";
pub const GIT_BARE_REPOSITORY: &str = "GIT_BARE_REPOSITORY";
pub const GIT_OPERATION_FAILED: &str = "GIT_OPERATION_FAILED";

// Lookup
pub const NOT_IN_WORKSPACE: &str = "NOT_IN_WORKSPACE";
pub const ORPHANED_WORKTREE: &str = "ORPHANED_WORKTREE";
pub const LOOKUP_IO_ERROR: &str = "LOOKUP_IO_ERROR";

// Enrichment
pub const ENRICHMENT_POOL_ERROR: &str = "ENRICHMENT_POOL_ERROR";
