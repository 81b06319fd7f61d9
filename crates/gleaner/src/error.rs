//! Failures raised by the CLI layer itself
//!
//! Library failures arrive as `gleaner_core::Error` / `gleaner_projects::Error`
//! inside an `anyhow::Error`; only the dispatcher and the engine adapter add
//! kinds of their own.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// First positional token names no known command
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    /// `crawl <spider>` named a spider the project does not have
    #[error("Spider not found: {name}")]
    SpiderNotFound { name: String },

    /// Configured engine program is not on PATH
    #[error("Engine not found: {program}")]
    EngineNotFound { program: String },

    /// Engine ran and reported failure
    #[error("Engine exited with {}", status_text(*.code))]
    EngineFailed { code: Option<i32> },

    /// `settings --get` asked for an unknown key
    #[error("Unknown setting: {name} (available: {available})")]
    UnknownSetting { name: String, available: String },
}

impl CliError {
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self::UnknownCommand { name: name.into() }
    }

    pub fn spider_not_found(name: impl Into<String>) -> Self {
        Self::SpiderNotFound { name: name.into() }
    }

    pub fn engine_not_found(program: impl Into<String>) -> Self {
        Self::EngineNotFound {
            program: program.into(),
        }
    }

    pub fn engine_failed(code: Option<i32>) -> Self {
        Self::EngineFailed { code }
    }

    pub fn unknown_setting(name: impl Into<String>, available: impl Into<String>) -> Self {
        Self::UnknownSetting {
            name: name.into(),
            available: available.into(),
        }
    }
}

fn status_text(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
