//! # gleaner-projects
//!
//! Project management library for the gleaner CLI providing:
//! - The template registry (spider templates and the project skeleton)
//! - Project scaffolding (`startproject`)
//! - Spider generation (`genspider`)
//! - Discovery of the spiders a project already contains
//!
//! # Examples
//!
//! ## Create a project and add a spider
//!
//! ```no_run
//! use camino::Utf8Path;
//! use gleaner_core::ProjectContext;
//! use gleaner_projects::{Scaffolder, SpiderGenerator, SpiderRequest, TemplateRegistry};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TemplateRegistry::builtin()?;
//! let root = Scaffolder::new(&registry).create_project("shop", Utf8Path::new("/tmp"))?;
//!
//! let ctx = ProjectContext::new(root, "shop");
//! let request = SpiderRequest::new("products", "shop.example.com").with_template("crawl");
//! SpiderGenerator::new(&registry).create_spider(&ctx, &request)?;
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod error;
pub mod scaffold;
pub mod spider;
pub mod templates;

pub use error::{Error, Result};

pub use discovery::{discover_spiders, SpiderInfo};
pub use scaffold::Scaffolder;
pub use spider::{normalize_domain, SpiderGenerator, SpiderRequest};
pub use templates::{SpiderVars, TemplateRegistry, DEFAULT_TEMPLATE};
