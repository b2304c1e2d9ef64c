//! Grove configuration and the provider seam discovery reads it through.
//!
//! The config file is YAML:
//!
//! ```yaml
//! groves:
//!   work:
//!     path: ~/code/work
//!   scratch:
//!     path: ~/scratch
//!     enabled: false
//! discovery:
//!   max_depth: 4
//! ```

pub mod discovery_config;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorState;
use crate::errors::ConfigError;

pub use discovery_config::DiscoveryConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GROVE_CONFIG";

/// One grove definition as written in config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroveEntry {
    pub path: String,
    /// Absent means enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GroveEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            enabled: None,
            description: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GroveConfig {
    pub groves: BTreeMap<String, GroveEntry>,
    pub discovery: DiscoveryConfig,
}

impl GroveConfig {
    /// Parse config from a YAML string, falling back to defaults for missing fields.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a global config and overlay an optional override file.
    ///
    /// A missing global file yields defaults; a missing override is skipped.
    /// Grove entries merge by name, with the override winning.
    pub fn load_layered(global: &Path, override_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::load(global) {
            Ok(c) => c,
            Err(ConfigError::NotFound { .. }) => Self::default(),
            Err(e) => return Err(e),
        };
        if let Some(path) = override_path {
            match Self::load(path) {
                Ok(layer) => config.merge(layer),
                Err(ConfigError::NotFound { .. }) => {
                    tracing::debug!(path = %path.display(), "override config not found, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(config)
    }

    pub fn merge(&mut self, other: GroveConfig) {
        self.discovery.merge(&other.discovery);
        self.groves.extend(other.groves);
    }

    /// `$GROVE_CONFIG`, else `$XDG_CONFIG_HOME/grove/grove.yml`, else
    /// `~/.config/grove/grove.yml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(explicit));
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(xdg).join("grove").join("grove.yml"));
        }
        Ok(home_dir()?.join(".config").join("grove").join("grove.yml"))
    }
}

pub fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Expand a leading `~` in a configured path.
pub fn expand_home(raw: &str) -> Result<PathBuf, ConfigError> {
    if raw == "~" {
        return home_dir();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Read-only source of grove definitions and project descriptors.
///
/// Discovery treats whatever this returns as a snapshot for the duration of
/// one run.
pub trait ConfigProvider: Send + Sync {
    fn config(&self) -> &GroveConfig;

    fn load_descriptor(&self, dir: &Path) -> DescriptorState {
        DescriptorState::load(dir)
    }
}

/// Provider backed by an already-loaded config and on-disk descriptors.
#[derive(Debug, Clone, Default)]
pub struct FileConfigProvider {
    config: GroveConfig,
}

impl FileConfigProvider {
    pub fn new(config: GroveConfig) -> Self {
        Self { config }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(GroveConfig::load(path)?))
    }

    /// Load from [`GroveConfig::default_path`], defaulting when absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = GroveConfig::default_path()?;
        Ok(Self::new(GroveConfig::load_layered(&path, None)?))
    }
}

impl ConfigProvider for FileConfigProvider {
    fn config(&self) -> &GroveConfig {
        &self.config
    }
}
