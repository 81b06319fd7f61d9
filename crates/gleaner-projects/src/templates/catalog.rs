//! YAML catalog parsing and structure definitions.
//!
//! Parses the spider and project catalogs into strongly-typed Rust
//! structures. Catalogs are only parsed here; compilation and placeholder
//! validation happen when they are added to the registry.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Catalog of spider templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiderCatalog {
    pub version: String,
    #[serde(default)]
    pub templates: Vec<SpiderTemplate>,
}

/// A named template producing one spider module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiderTemplate {
    /// Key used with `--template`
    pub key: String,
    #[serde(default)]
    pub description: String,
    /// Placeholders the body is allowed to reference
    #[serde(default)]
    pub placeholders: Vec<String>,
    /// Raw template text
    pub body: String,
}

/// Catalog describing the files of a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCatalog {
    pub version: String,
    /// Placeholders paths and bodies are allowed to reference
    #[serde(default)]
    pub placeholders: Vec<String>,
    pub files: Vec<ProjectFileTemplate>,
}

/// One file of the project skeleton
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFileTemplate {
    /// Relative path template
    pub path: String,
    /// Content template
    pub body: String,
    /// Mark the written file executable
    #[serde(default)]
    pub executable: bool,
}

impl SpiderCatalog {
    /// Parse a spider catalog from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

impl ProjectCatalog {
    /// Parse a project catalog from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}
