//! Configuration loading errors.

use std::path::PathBuf;

use super::error_code::{self, GroveErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Cannot determine home directory for '~' expansion")]
    NoHomeDirectory,

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GroveErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::CONFIG_NOT_FOUND,
            Self::Read { .. } => error_code::CONFIG_READ_ERROR,
            Self::Parse { .. } | Self::Yaml(_) => error_code::CONFIG_PARSE_ERROR,
            Self::InvalidValue { .. } => error_code::CONFIG_INVALID_VALUE,
            Self::NoHomeDirectory => error_code::CONFIG_NO_HOME,
        }
    }
}
