//! # gleaner-core
//!
//! Core library for the gleaner CLI providing:
//! - Identifier validation for project and spider names
//! - Project context resolution (walking up to the enclosing project)
//! - Hierarchical tool configuration

pub mod config;
pub mod context;
pub mod error;
pub mod identifier;

pub use config::{ConfigLoader, GleanerConfig};
pub use context::{ContextResolver, MemoryFs, OsFs, ProjectContext, ProjectFs, SettingsEnv};
pub use error::{Error, Result};
pub use identifier::{is_valid_identifier, validate_identifier};
