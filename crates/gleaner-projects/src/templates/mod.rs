//! Template system for project scaffolding and spider generation.
//!
//! # Architecture
//!
//! - `catalog`: YAML structure parsing into strongly-typed Rust
//! - `renderer`: template variables and Tera contexts
//! - `registry`: compiled templates, validated when the registry is built
//!
//! # Catalog Format
//!
//! Spider templates are defined in `templates/spiders.yaml`:
//!
//! ```yaml
//! version: "1.0"
//! templates:
//!   - key: basic
//!     description: "Minimal spider with a single parse callback"
//!     placeholders: [name, domain, classname]
//!     body: |
//!       class {{ classname }}(Spider):
//!           name = "{{ name }}"
//!           allowed_domains = ["{{ domain }}"]
//! ```
//!
//! The project skeleton is defined in `templates/project.yaml` as an ordered
//! list of `path`/`body` pairs, both templated on the project name.
//!
//! # Example Usage
//!
//! ```no_run
//! use gleaner_projects::templates::{SpiderVars, TemplateRegistry};
//!
//! let registry = TemplateRegistry::builtin().unwrap();
//! let vars = SpiderVars::new("example", "example.com", "myproject");
//! let source = registry.render_spider("basic", &vars).unwrap();
//! println!("{}", source);
//! ```

pub mod catalog;
pub mod registry;
pub mod renderer;

pub use catalog::{ProjectCatalog, ProjectFileTemplate, SpiderCatalog, SpiderTemplate};
pub use registry::{ProjectSkeleton, SkeletonFile, TemplateRegistry};
pub use renderer::{class_name, ProjectVars, SpiderVars};

/// Template used when none is requested
pub const DEFAULT_TEMPLATE: &str = "basic";
