//! Grove-level discovery failures.
//!
//! Only a grove root that cannot be walked at all is an error; it is reported
//! for that grove and the remaining groves are still scanned.

use std::path::PathBuf;

use super::error_code::{self, GroveErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Grove root {} does not exist", path.display())]
    RootMissing { path: PathBuf },

    #[error("Grove root {} is not a directory", path.display())]
    RootNotDirectory { path: PathBuf },

    #[error("Grove root {} is unreadable: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::RootMissing { path }
            | Self::RootNotDirectory { path }
            | Self::RootUnreadable { path, .. } => path,
        }
    }
}

impl GroveErrorCode for DiscoveryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RootMissing { .. } => error_code::GROVE_ROOT_MISSING,
            Self::RootNotDirectory { .. } => error_code::GROVE_ROOT_NOT_DIRECTORY,
            Self::RootUnreadable { .. } => error_code::GROVE_ROOT_UNREADABLE,
        }
    }
}
