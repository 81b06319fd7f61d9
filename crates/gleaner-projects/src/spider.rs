//! Spider generation (`genspider`).
//!
//! Every precondition is checked before anything is written, and the spider
//! module is opened with `create_new`, so an existing module is never
//! touched, not even by a concurrent invocation.

use camino::Utf8PathBuf;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use gleaner_core::context::ProjectContext;
use gleaner_core::identifier::validate_identifier;

use crate::discovery::discover_spiders;
use crate::error::{Error, Result};
use crate::templates::{SpiderVars, TemplateRegistry, DEFAULT_TEMPLATE};

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9.\-]*[A-Za-z0-9])?(?::[0-9]+)?$")
        .expect("domain regex is valid")
});

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiderRequest {
    pub name: String,
    pub domain: String,
    /// Template key; the generator's default when `None`
    pub template: Option<String>,
}

impl SpiderRequest {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            template: None,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// Generates spider modules inside a project
#[derive(Debug)]
pub struct SpiderGenerator<'a> {
    registry: &'a TemplateRegistry,
    default_template: String,
}

impl<'a> SpiderGenerator<'a> {
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self {
            registry,
            default_template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Use `key` when a request names no template
    pub fn with_default_template(mut self, key: impl Into<String>) -> Self {
        self.default_template = key.into();
        self
    }

    /// Template key a request resolves to
    pub fn template_key<'r>(&'r self, request: &'r SpiderRequest) -> &'r str {
        request.template.as_deref().unwrap_or(&self.default_template)
    }

    /// Create the spider module, returning its path
    pub fn create_spider(&self, ctx: &ProjectContext, request: &SpiderRequest) -> Result<Utf8PathBuf> {
        validate_identifier(&request.name)?;
        if request.name == ctx.name() {
            return Err(gleaner_core::Error::invalid_name(
                &request.name,
                "spider name cannot be the same as the project name",
            )
            .into());
        }

        let domain = normalize_domain(&request.domain)?;
        let key = self.template_key(request);
        self.registry.get(key)?;

        let path = ctx.spider_path(&request.name);
        if fs::symlink_metadata(&path).is_ok() {
            return Err(Error::spider_exists(&request.name, path.as_str()));
        }

        if let Some(existing) = discover_spiders(ctx)?.into_iter().find(|s| s.covers(&domain)) {
            return Err(Error::domain_taken(&domain, existing.name));
        }

        let vars = SpiderVars::new(&request.name, &domain, ctx.name());
        let source = self.registry.render_spider(key, &vars)?;

        fs::create_dir_all(ctx.spiders_dir())?;
        write_new(&path, &source).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::spider_exists(&request.name, path.as_str()),
            _ => Error::Io(e),
        })?;

        info!(
            "Created spider {} using template {} in module {}.spiders.{}",
            request.name,
            key,
            ctx.name(),
            request.name
        );
        Ok(path)
    }
}

/// Write `content` to a file that must not exist yet; remove it if the write fails
fn write_new(path: &Utf8PathBuf, content: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    debug!("Opened {} for writing", path);

    if let Err(e) = file.write_all(content.as_bytes()).and_then(|_| file.sync_all()) {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!("Failed to remove partial spider {}: {}", path, cleanup);
        }
        return Err(e);
    }

    Ok(())
}

/// Reduce a domain or URL to a bare host (`http://www.a.com/x` -> `www.a.com`)
pub fn normalize_domain(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    if DOMAIN_RE.is_match(host) {
        Ok(host.to_ascii_lowercase())
    } else {
        Err(Error::invalid_domain(input))
    }
}
