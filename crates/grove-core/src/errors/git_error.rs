//! Git provider errors.
//!
//! Providers wrap their backend's error text so this crate stays free of any
//! particular git library.

use std::path::PathBuf;

use super::error_code::{self, GroveErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GitError {
    #[error("Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("Bare repository has no working directory: {}", path.display())]
    BareRepository { path: PathBuf },

    #[error("Git operation '{operation}' failed for {}: {message}", path.display())]
    OperationFailed {
        operation: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl GroveErrorCode for GitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotARepository { .. } => error_code::GIT_NOT_A_REPOSITORY,
            Self::BareRepository { .. } => error_code::GIT_BARE_REPOSITORY,
            Self::OperationFailed { .. } => error_code::GIT_OPERATION_FAILED,
        }
    }
}
