//! Hierarchical configuration loading

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use tracing::debug;

use super::GleanerConfig;
use crate::error::{Error, Result};

/// Embedded default configuration
const DEFAULTS_YAML: &str = include_str!("defaults.yaml");

/// Global configuration file name inside the config directory
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable overriding the engine command line
pub const ENGINE_ENV: &str = "GLEANER_ENGINE";

/// Environment variable overriding the template overlay directory
pub const TEMPLATES_DIR_ENV: &str = "GLEANER_TEMPLATES_DIR";

/// Partial configuration as found in a user file; unset keys keep lower layers
#[derive(Debug, Default, Deserialize)]
struct ConfigOverlay {
    #[serde(default)]
    engine: Option<EngineOverlay>,
    #[serde(default)]
    templates: Option<TemplatesOverlay>,
}

#[derive(Debug, Default, Deserialize)]
struct EngineOverlay {
    #[serde(default)]
    command: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TemplatesOverlay {
    #[serde(default)]
    dir: Option<Utf8PathBuf>,
    #[serde(default)]
    default: Option<String>,
}

/// Configuration loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Directory holding the global config file, if one could be determined
    config_dir: Option<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Loader using the standard config directory (~/.gleaner)
    pub fn new() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
        }
    }

    /// Loader with a custom config directory
    pub fn with_dir(config_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_dir: Some(config_dir.into()),
        }
    }

    /// Standard config directory, preferring `HOME` over the passwd entry
    fn default_config_dir() -> Option<Utf8PathBuf> {
        let home = std::env::var("HOME")
            .ok()
            .map(std::path::PathBuf::from)
            .or_else(dirs::home_dir)?;

        Utf8PathBuf::from_path_buf(home)
            .ok()
            .map(|home| home.join(".gleaner"))
    }

    /// Load configuration from the process environment
    pub fn load(&self, explicit: Option<&Utf8Path>) -> Result<GleanerConfig> {
        self.load_with_env(explicit, |key| std::env::var(key).ok())
    }

    /// Load configuration with an arbitrary environment lookup
    pub fn load_with_env<F>(&self, explicit: Option<&Utf8Path>, lookup: F) -> Result<GleanerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: GleanerConfig = serde_yaml_ng::from_str(DEFAULTS_YAML)
            .map_err(|e| Error::invalid_config(format!("Embedded defaults: {}", e)))?;

        if let Some(overlay) = self.read_overlay(explicit)? {
            config = Self::merge(config, overlay);
        }

        Ok(Self::apply_env_overrides(config, lookup))
    }

    /// Read the explicit file (must exist) or the global file (optional)
    fn read_overlay(&self, explicit: Option<&Utf8Path>) -> Result<Option<ConfigOverlay>> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::config_not_found(path.as_str()));
                }
                path.to_owned()
            }
            None => match &self.config_dir {
                Some(dir) if dir.join(CONFIG_FILE_NAME).is_file() => dir.join(CONFIG_FILE_NAME),
                _ => return Ok(None),
            },
        };

        debug!("Loading configuration from {}", path);
        let content = fs::read_to_string(&path)?;

        // An empty file deserializes to unit, not to an empty mapping
        if content.trim().is_empty() {
            return Ok(Some(ConfigOverlay::default()));
        }

        let overlay = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;

        Ok(Some(overlay))
    }

    /// Merge a file overlay into the base configuration
    fn merge(mut base: GleanerConfig, overlay: ConfigOverlay) -> GleanerConfig {
        if let Some(engine) = overlay.engine {
            if engine.command.is_some() {
                base.engine.command = engine.command;
            }
        }

        if let Some(templates) = overlay.templates {
            if templates.dir.is_some() {
                base.templates.dir = templates.dir;
            }
            if let Some(default) = templates.default {
                base.templates.default = default;
            }
        }

        base
    }

    /// Apply GLEANER_* environment variable overrides
    fn apply_env_overrides<F>(mut config: GleanerConfig, lookup: F) -> GleanerConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(command) = lookup(ENGINE_ENV).filter(|c| !c.trim().is_empty()) {
            config.engine.command = Some(command);
        }

        if let Some(dir) = lookup(TEMPLATES_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            config.templates.dir = Some(Utf8PathBuf::from(dir));
        }

        config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_embedded_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigLoader::with_dir(utf8_dir(&temp))
            .load_with_env(None, no_env)
            .unwrap();

        assert_eq!(config, GleanerConfig::default());
    }

    #[test]
    fn test_global_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        fs::write(
            dir.join("config.yaml"),
            "engine:\n  command: python -m gleaner.cmdline\ntemplates:\n  default: crawl\n",
        )
        .unwrap();

        let config = ConfigLoader::with_dir(dir).load_with_env(None, no_env).unwrap();
        assert_eq!(
            config.engine.command.as_deref(),
            Some("python -m gleaner.cmdline")
        );
        assert_eq!(config.templates.default, "crawl");
        assert_eq!(config.templates.dir, None);
    }

    #[test]
    fn test_empty_file_is_accepted() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        fs::write(dir.join("config.yaml"), "\n").unwrap();

        let config = ConfigLoader::with_dir(dir).load_with_env(None, no_env).unwrap();
        assert_eq!(config, GleanerConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        fs::write(dir.join("config.yaml"), "engine: [unterminated").unwrap();

        let err = ConfigLoader::with_dir(dir)
            .load_with_env(None, no_env)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        let missing = dir.join("missing.yaml");

        let err = ConfigLoader::with_dir(dir)
            .load_with_env(Some(&missing), no_env)
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        fs::write(dir.join("config.yaml"), "engine:\n  command: from-file\n").unwrap();

        let config = ConfigLoader::with_dir(dir)
            .load_with_env(None, |key| match key {
                ENGINE_ENV => Some("from-env --flag".to_string()),
                TEMPLATES_DIR_ENV => Some("/opt/templates".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.engine.command.as_deref(), Some("from-env --flag"));
        assert_eq!(config.templates.dir, Some(Utf8PathBuf::from("/opt/templates")));
    }

    #[test]
    #[serial]
    fn test_load_reads_process_env() {
        let temp = TempDir::new().unwrap();
        std::env::set_var(ENGINE_ENV, "process-engine");

        let config = ConfigLoader::with_dir(utf8_dir(&temp)).load(None).unwrap();
        assert_eq!(config.engine.command.as_deref(), Some("process-engine"));

        std::env::remove_var(ENGINE_ENV);
    }
}
