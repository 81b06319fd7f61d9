//! Error types for gleaner-projects

use thiserror::Error;

/// Result type alias using gleaner-projects's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Scaffolding and generation error types
#[derive(Error, Debug)]
pub enum Error {
    /// Project directory already exists
    #[error("Project directory already exists: {path}")]
    ProjectExists { path: String },

    /// Spider module already exists
    #[error("Spider '{name}' already exists at {path}")]
    SpiderExists { name: String, path: String },

    /// Another spider already targets the domain
    #[error("Spider '{existing}' already exists for domain {domain}")]
    DomainTaken { domain: String, existing: String },

    /// Template key not in the registry
    #[error("Unknown template: {key}. Available templates: {available}")]
    UnknownTemplate { key: String, available: String },

    /// A template catalog failed validation while the registry was built
    #[error("Invalid template '{template}': {message}")]
    TemplateConfig { template: String, message: String },

    /// Template rendering error
    #[error("Template rendering failed: {message}")]
    TemplateRender { message: String },

    /// Target domain cannot be used
    #[error("Invalid domain '{domain}'")]
    InvalidDomain { domain: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error
    #[error(transparent)]
    Core(#[from] gleaner_core::Error),
}

impl Error {
    /// Create a project exists error
    pub fn project_exists(path: impl Into<String>) -> Self {
        Self::ProjectExists { path: path.into() }
    }

    /// Create a spider exists error
    pub fn spider_exists(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::SpiderExists {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a domain taken error
    pub fn domain_taken(domain: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::DomainTaken {
            domain: domain.into(),
            existing: existing.into(),
        }
    }

    /// Create an unknown template error
    pub fn unknown_template(key: impl Into<String>, available: impl Into<String>) -> Self {
        Self::UnknownTemplate {
            key: key.into(),
            available: available.into(),
        }
    }

    /// Create a template config error
    pub fn template_config(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateConfig {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a template render error
    pub fn template_render(message: impl Into<String>) -> Self {
        Self::TemplateRender {
            message: message.into(),
        }
    }

    /// Create an invalid domain error
    pub fn invalid_domain(domain: impl Into<String>) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
        }
    }

    /// Whether the target of a create operation already exists
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::ProjectExists { .. } | Self::SpiderExists { .. } | Self::DomainTaken { .. }
        )
    }

    /// Whether a proposed name was rejected
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, Self::Core(gleaner_core::Error::InvalidName { .. }))
    }
}

/// Flatten a Tera error and its sources into one line
pub(crate) fn tera_message(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
