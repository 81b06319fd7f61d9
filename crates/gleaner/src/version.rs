//! Version information for the gleaner CLI

use serde::{Deserialize, Serialize};

/// Version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Semantic version
    pub version: String,

    /// Git commit SHA (short), when provided at build time
    pub commit: Option<String>,

    /// Configured engine command line; `None` means the builtin engine
    pub engine: Option<String>,

    /// Active project, when run inside one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl VersionInfo {
    /// Version info for the current build
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            engine: None,
            project: None,
        }
    }

    pub fn with_engine(mut self, engine: Option<String>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project;
        self
    }

    /// Banner line, e.g. `gleaner 0.1.0 (abc1234) - active project: shop`
    pub fn banner(&self) -> String {
        let mut banner = format!("gleaner {}", self.version);

        if let Some(commit) = &self.commit {
            banner.push_str(&format!(" ({})", commit));
        }

        match &self.project {
            Some(project) => banner.push_str(&format!(" - active project: {}", project)),
            None => banner.push_str(" - no active project"),
        }

        banner
    }
}
