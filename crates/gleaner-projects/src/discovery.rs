//! Discovery of the spiders a project already has.
//!
//! Spider modules are scanned textually: the `name` and `allowed_domains`
//! class attributes that every template writes are enough to list spiders
//! and to detect a second spider for an already-covered domain.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use gleaner_core::context::{ProjectContext, MODULE_EXTENSION, PACKAGE_MARKER};

use crate::error::Result;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s+name\s*=\s*['"]([^'"]+)['"]"#).expect("name regex is valid")
});

static DOMAINS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s+allowed_domains\s*=\s*[\[(]([^\])]*)[\])]"#)
        .expect("domains regex is valid")
});

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("quoted regex is valid"));

/// A spider module found in a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiderInfo {
    /// Spider name (the `name` attribute, or the module name)
    pub name: String,
    /// Module name (file stem)
    pub module: String,
    pub domains: Vec<String>,
    pub path: Utf8PathBuf,
}

impl SpiderInfo {
    /// Parse a spider module's source
    pub fn parse(path: &Utf8Path, source: &str) -> Option<Self> {
        let module = path.file_stem()?.to_string();

        let name = NAME_RE
            .captures(source)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| module.clone());

        let domains = DOMAINS_RE
            .captures(source)
            .map(|caps| {
                QUOTED_RE
                    .captures_iter(&caps[1])
                    .map(|d| d[1].to_string())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            name,
            module,
            domains,
            path: path.to_owned(),
        })
    }

    /// Whether this spider targets `domain`
    pub fn covers(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }
}

/// All spiders in the project, sorted by name
pub fn discover_spiders(ctx: &ProjectContext) -> Result<Vec<SpiderInfo>> {
    let dir = ctx.spiders_dir();
    if !dir.is_dir() {
        debug!("No spiders package at {}", dir);
        return Ok(Vec::new());
    }

    // One unreadable module must not hide the others
    let mut spiders = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let path = match entry {
            Ok(entry) => entry.into_path(),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir, e);
                continue;
            }
        };
        if path.extension() != Some(MODULE_EXTENSION)
            || path.file_name() == Some(PACKAGE_MARKER)
            || !path.is_file()
        {
            continue;
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping spider module {}: {}", path, e);
                continue;
            }
        };

        // Modules need not be UTF-8; the attributes scanned for are ASCII
        let source = String::from_utf8_lossy(&bytes);
        if let Some(info) = SpiderInfo::parse(&path, &source) {
            spiders.push(info);
        }
    }

    spiders.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(spiders)
}
