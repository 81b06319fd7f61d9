//! Tool configuration
//!
//! Loaded with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Global config (~/.gleaner/config.yaml) or an explicit `--config` file
//! 3. Environment variables (GLEANER_* prefix)
//! 4. CLI flags (handled by caller)

mod loader;

pub use loader::{ConfigLoader, ENGINE_ENV, TEMPLATES_DIR_ENV};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Resolved gleaner configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GleanerConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// External crawl engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Command line used to invoke the engine; `None` selects the built-in engine
    #[serde(default)]
    pub command: Option<String>,
}

impl EngineConfig {
    /// The engine command split into program and arguments
    pub fn argv(&self) -> Option<Vec<String>> {
        let argv: Vec<String> = self
            .command
            .as_deref()?
            .split_whitespace()
            .map(String::from)
            .collect();

        if argv.is_empty() {
            None
        } else {
            Some(argv)
        }
    }
}

/// Spider template settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Directory of additional template catalogs
    #[serde(default)]
    pub dir: Option<Utf8PathBuf>,

    /// Template key used when none is given
    #[serde(default = "default_template_key")]
    pub default: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            default: default_template_key(),
        }
    }
}

fn default_template_key() -> String {
    "basic".to_string()
}
