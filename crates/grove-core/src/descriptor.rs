//! Project descriptor (`grove.yml`) parsing.
//!
//! Parsing is best-effort. A descriptor that fails to parse is recorded as
//! [`DescriptorState::Malformed`] so the classifier can still produce a node
//! with the directory-name fallback.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Descriptor file names, in lookup order.
pub const DESCRIPTOR_FILES: &[&str] = &["grove.yml", "grove.yaml"];

/// The parts of a project descriptor discovery cares about. Unknown keys are
/// ignored so descriptors written for other tools still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Declared sub-project paths or glob patterns, relative to the
    /// descriptor's directory.
    pub workspaces: Vec<String>,
}

impl Descriptor {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Non-blank name, if declared.
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Declared sub-project entries with blanks removed.
    pub fn sub_project_entries(&self) -> impl Iterator<Item = &str> {
        self.workspaces
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
    }

    pub fn declares_sub_projects(&self) -> bool {
        self.sub_project_entries().next().is_some()
    }
}

/// Outcome of loading a directory's descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorState {
    /// No descriptor file present.
    Missing,
    Parsed(Descriptor),
    /// A descriptor file exists but could not be read or parsed.
    Malformed { reason: String },
}

impl DescriptorState {
    /// Read the first descriptor file found in `dir`.
    pub fn load(dir: &Path) -> Self {
        for file_name in DESCRIPTOR_FILES {
            let path = dir.join(file_name);
            if !path.is_file() {
                continue;
            }
            return match std::fs::read_to_string(&path) {
                Ok(content) => Self::parse(&content),
                Err(e) => Self::Malformed {
                    reason: format!("unreadable {}: {e}", path.display()),
                },
            };
        }
        Self::Missing
    }

    pub fn parse(content: &str) -> Self {
        match Descriptor::from_yaml(content) {
            Ok(descriptor) => Self::Parsed(descriptor),
            Err(e) => Self::Malformed {
                reason: e.to_string(),
            },
        }
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        match self {
            Self::Parsed(d) => Some(d),
            _ => None,
        }
    }

    /// A descriptor file exists, whether or not it parsed.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    pub fn declares_sub_projects(&self) -> bool {
        self.descriptor().is_some_and(Descriptor::declares_sub_projects)
    }
}
