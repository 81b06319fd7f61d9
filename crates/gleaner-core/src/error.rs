//! Error types for gleaner-core

use thiserror::Error;

/// Result type alias using gleaner-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for gleaner
#[derive(Error, Debug)]
pub enum Error {
    /// Name is not a usable module identifier
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// No enclosing project could be located
    #[error("No gleaner project found (searched upward from {start})")]
    NoProjectFound { start: String },

    /// Settings context resolution is switched off by the environment
    #[error("Project settings are disabled (GLEANER_SETTINGS_DISABLED is set)")]
    SettingsDisabled,

    /// Malformed settings module reference
    #[error("Invalid settings module reference: {reference}")]
    InvalidSettingsModule { reference: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a no project found error
    pub fn no_project_found(start: impl Into<String>) -> Self {
        Self::NoProjectFound {
            start: start.into(),
        }
    }

    /// Create an invalid settings module error
    pub fn invalid_settings_module(reference: impl Into<String>) -> Self {
        Self::InvalidSettingsModule {
            reference: reference.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error means "no project context is available"
    pub fn is_no_project(&self) -> bool {
        matches!(
            self,
            Self::NoProjectFound { .. } | Self::SettingsDisabled | Self::InvalidSettingsModule { .. }
        )
    }
}
