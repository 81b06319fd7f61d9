//! Project context resolution.
//!
//! A project is recognised by its launcher script (`gleaner-ctl.py`) sitting
//! next to a package directory that holds the project's `settings.py`. The
//! resolver walks upward from a start directory until it finds one, and
//! derives the dotted settings-module reference the crawl engine imports.
//!
//! The process environment is only consulted at the boundary:
//! [`SettingsEnv::from_process`] captures the two relevant variables once,
//! and [`ProjectContext::child_env`] produces the variables to hand to a
//! spawned engine process, which re-resolves the project on its own.

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{Error, Result};

/// Launcher script written at the root of every project
pub const LAUNCHER_SCRIPT: &str = "gleaner-ctl.py";

/// Package marker file
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Settings module file inside the project package
pub const SETTINGS_FILE: &str = "settings.py";

/// Subpackage holding generated spiders
pub const SPIDERS_PACKAGE: &str = "spiders";

/// Source file extension of generated modules
pub const MODULE_EXTENSION: &str = "py";

/// Environment variable carrying the dotted settings-module reference
pub const SETTINGS_MODULE_ENV: &str = "GLEANER_SETTINGS_MODULE";

/// Environment variable that disables settings resolution when set
pub const SETTINGS_DISABLED_ENV: &str = "GLEANER_SETTINGS_DISABLED";

static LAUNCHER_MODULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"GLEANER_SETTINGS_MODULE['"]\s*,\s*['"]([A-Za-z_][A-Za-z0-9_.]*)['"]"#)
        .expect("launcher regex is valid")
});

static MODULE_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("segment regex is valid"));

/// Filesystem queries needed by the resolver
pub trait ProjectFs {
    /// Whether `path` is an existing regular file
    fn is_file(&self, path: &Utf8Path) -> bool;

    /// Whether `path` is an existing directory
    fn is_dir(&self, path: &Utf8Path) -> bool;

    /// Read a file to a string
    fn read_to_string(&self, path: &Utf8Path) -> std::io::Result<String>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl ProjectFs for OsFs {
    fn is_file(&self, path: &Utf8Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Utf8Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory filesystem for deterministic resolver tests
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<Utf8PathBuf, String>,
    dirs: BTreeSet<Utf8PathBuf>,
}

impl MemoryFs {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, registering all of its ancestors as directories
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        for ancestor in path.ancestors().skip(1) {
            self.dirs.insert(ancestor.to_owned());
        }
        self.files.insert(path, content.into());
        self
    }

    /// Add an empty directory
    pub fn with_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        for ancestor in path.ancestors() {
            self.dirs.insert(ancestor.to_owned());
        }
        self
    }
}

impl ProjectFs for MemoryFs {
    fn is_file(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Utf8Path) -> bool {
        self.dirs.contains(path)
    }

    fn read_to_string(&self, path: &Utf8Path) -> std::io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{path} not found"))
        })
    }
}

/// Settings-related environment captured at the process boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsEnv {
    /// Explicit settings-module reference (`GLEANER_SETTINGS_MODULE`)
    pub module: Option<String>,

    /// Whether settings resolution is disabled (`GLEANER_SETTINGS_DISABLED`)
    pub disabled: bool,
}

impl SettingsEnv {
    /// Capture the settings environment of the current process
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let module = lookup(SETTINGS_MODULE_ENV)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        // Read as a boolean: present with a falsy value ("", "0", "false",
        // "no") leaves resolution enabled, so `VAR=0` can undo an inherited `VAR=1`
        let disabled = lookup(SETTINGS_DISABLED_ENV)
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no"))
            .unwrap_or(false);

        Self { module, disabled }
    }

    /// Settings environment with an explicit module reference
    pub fn with_module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            disabled: false,
        }
    }
}

/// A resolved project: where it lives and how its settings are imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    root: Utf8PathBuf,
    name: String,
    settings_module: String,
}

impl ProjectContext {
    /// Build a context for a project rooted at `root` with package `name`
    pub fn new(root: impl Into<Utf8PathBuf>, name: impl Into<String>) -> Self {
        let name = name.into();
        let settings_module = format!("{}.settings", name);
        Self {
            root: root.into(),
            name,
            settings_module,
        }
    }

    /// Project root directory (holds the launcher script)
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Project package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted settings-module reference, e.g. `testproject.settings`
    pub fn settings_module(&self) -> &str {
        &self.settings_module
    }

    /// Project package directory
    pub fn package_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.name)
    }

    /// Path of the settings module file
    pub fn settings_path(&self) -> Utf8PathBuf {
        module_path(&self.root, &self.settings_module)
    }

    /// Directory holding generated spiders
    pub fn spiders_dir(&self) -> Utf8PathBuf {
        self.package_dir().join(SPIDERS_PACKAGE)
    }

    /// Path a spider module named `spider` lives at
    pub fn spider_path(&self, spider: &str) -> Utf8PathBuf {
        self.spiders_dir()
            .join(format!("{}.{}", spider, MODULE_EXTENSION))
    }

    /// Environment variables a child process needs to find this project
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        vec![(SETTINGS_MODULE_ENV, self.settings_module.clone())]
    }

    /// Configure a command to run inside this project's context
    pub fn apply_to(&self, command: &mut std::process::Command) {
        command.current_dir(self.root.as_std_path());
        command.env_remove(SETTINGS_DISABLED_ENV);
        for (key, value) in self.child_env() {
            command.env(key, value);
        }
    }
}

/// Locates the enclosing project by walking up the directory tree
#[derive(Debug, Clone)]
pub struct ContextResolver<F = OsFs> {
    fs: F,
    ceiling: Option<Utf8PathBuf>,
}

impl ContextResolver<OsFs> {
    /// Resolver over the real filesystem
    pub fn os() -> Self {
        Self::new(OsFs)
    }
}

impl<F: ProjectFs> ContextResolver<F> {
    /// Create a resolver over the given filesystem
    pub fn new(fs: F) -> Self {
        Self { fs, ceiling: None }
    }

    /// Stop the upward walk at `ceiling` (inclusive)
    pub fn with_ceiling(mut self, ceiling: impl Into<Utf8PathBuf>) -> Self {
        self.ceiling = Some(ceiling.into());
        self
    }

    /// Resolve the project enclosing `start`
    pub fn resolve(&self, start: &Utf8Path, env: &SettingsEnv) -> Result<ProjectContext> {
        if env.disabled {
            debug!("Settings resolution disabled by {}", SETTINGS_DISABLED_ENV);
            return Err(Error::SettingsDisabled);
        }

        match &env.module {
            Some(module) => self.resolve_explicit(start, module),
            None => self.resolve_by_launcher(start),
        }
    }

    /// Find the directory from which `module` is importable
    fn resolve_explicit(&self, start: &Utf8Path, module: &str) -> Result<ProjectContext> {
        let package = package_of(module)?;

        for dir in self.walk(start) {
            if self.fs.is_file(&module_path(dir, module)) {
                debug!("Resolved settings module {} under {}", module, dir);
                return Ok(ProjectContext {
                    root: dir.to_owned(),
                    name: package.to_string(),
                    settings_module: module.to_string(),
                });
            }
        }

        Err(Error::no_project_found(start.as_str()))
    }

    /// Find the nearest directory holding a launcher script and its package
    fn resolve_by_launcher(&self, start: &Utf8Path) -> Result<ProjectContext> {
        for dir in self.walk(start) {
            let launcher = dir.join(LAUNCHER_SCRIPT);
            if !self.fs.is_file(&launcher) {
                continue;
            }

            let Some(module) = self.launcher_module(&launcher, dir) else {
                debug!("Launcher at {} names no usable settings module", launcher);
                continue;
            };

            let Ok(package) = package_of(&module) else {
                continue;
            };

            if self.fs.is_dir(&dir.join(package)) && self.fs.is_file(&module_path(dir, &module)) {
                debug!("Found project {} at {}", package, dir);
                return Ok(ProjectContext {
                    root: dir.to_owned(),
                    name: package.to_string(),
                    settings_module: module,
                });
            }

            debug!("Launcher at {} has no settings module {}", launcher, module);
        }

        Err(Error::no_project_found(start.as_str()))
    }

    /// Settings module declared by the launcher, or derived from the directory name
    fn launcher_module(&self, launcher: &Utf8Path, dir: &Utf8Path) -> Option<String> {
        if let Ok(content) = self.fs.read_to_string(launcher) {
            if let Some(caps) = LAUNCHER_MODULE_RE.captures(&content) {
                return Some(caps[1].to_string());
            }
        }

        dir.file_name().map(|name| format!("{}.settings", name))
    }

    /// Ancestors of `start`, stopping at the ceiling if one is set
    fn walk<'a>(&'a self, start: &'a Utf8Path) -> impl Iterator<Item = &'a Utf8Path> + 'a {
        let mut done = false;
        start.ancestors().take_while(move |dir| {
            if done {
                return false;
            }
            if self.ceiling.as_deref() == Some(*dir) {
                done = true;
            }
            true
        })
    }
}

/// First segment of a dotted module reference, validating every segment
fn package_of(module: &str) -> Result<&str> {
    let segments: Vec<&str> = module.split('.').collect();

    if segments.len() < 2 || !segments.iter().all(|s| MODULE_SEGMENT_RE.is_match(s)) {
        return Err(Error::invalid_settings_module(module));
    }

    Ok(segments[0])
}

/// File implementing dotted `module`, relative to `root`
fn module_path(root: &Utf8Path, module: &str) -> Utf8PathBuf {
    let mut path = root.to_owned();
    for segment in module.split('.') {
        path.push(segment);
    }
    path.set_extension(MODULE_EXTENSION);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAUNCHER: &str = "#!/usr/bin/env python\nimport os\nos.environ.setdefault('GLEANER_SETTINGS_MODULE', 'testproject.settings')\n";

    fn project_fs(root: &str) -> MemoryFs {
        MemoryFs::new()
            .with_file(format!("{root}/gleaner-ctl.py"), LAUNCHER)
            .with_file(format!("{root}/testproject/__init__.py"), "")
            .with_file(format!("{root}/testproject/settings.py"), "BOT_NAME = 'testproject'\n")
            .with_file(format!("{root}/testproject/spiders/__init__.py"), "")
    }

    #[test]
    fn test_resolves_from_project_root() {
        let resolver = ContextResolver::new(project_fs("/work/testproject"));
        let ctx = resolver
            .resolve(Utf8Path::new("/work/testproject"), &SettingsEnv::default())
            .unwrap();

        assert_eq!(ctx.root(), Utf8Path::new("/work/testproject"));
        assert_eq!(ctx.name(), "testproject");
        assert_eq!(ctx.settings_module(), "testproject.settings");
        assert_eq!(
            ctx.settings_path(),
            Utf8PathBuf::from("/work/testproject/testproject/settings.py")
        );
    }

    #[test]
    fn test_resolves_from_nested_directory() {
        let resolver = ContextResolver::new(project_fs("/work/testproject"));
        let ctx = resolver
            .resolve(
                Utf8Path::new("/work/testproject/testproject/spiders"),
                &SettingsEnv::default(),
            )
            .unwrap();

        assert_eq!(ctx.root(), Utf8Path::new("/work/testproject"));
        assert_eq!(
            ctx.spider_path("example"),
            Utf8PathBuf::from("/work/testproject/testproject/spiders/example.py")
        );
    }

    #[test]
    fn test_no_project_outside_tree() {
        let resolver = ContextResolver::new(project_fs("/work/testproject"));
        let err = resolver
            .resolve(Utf8Path::new("/work/elsewhere"), &SettingsEnv::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoProjectFound { .. }));
        assert!(err.is_no_project());
    }

    #[test]
    fn test_disabled_suppresses_resolution() {
        let resolver = ContextResolver::new(project_fs("/work/testproject"));
        let env = SettingsEnv {
            module: Some("testproject.settings".to_string()),
            disabled: true,
        };
        let err = resolver
            .resolve(Utf8Path::new("/work/testproject"), &env)
            .unwrap_err();
        assert!(matches!(err, Error::SettingsDisabled));
    }

    #[test]
    fn test_launcher_without_settings_is_skipped() {
        let fs = project_fs("/work/outer")
            .with_file("/work/outer/inner/gleaner-ctl.py", LAUNCHER);
        let resolver = ContextResolver::new(fs);

        // The inner launcher has no package next to it, so the walk continues
        // up to the outer project.
        let ctx = resolver
            .resolve(Utf8Path::new("/work/outer/inner"), &SettingsEnv::default())
            .unwrap();
        assert_eq!(ctx.root(), Utf8Path::new("/work/outer"));
    }

    #[test]
    fn test_launcher_falls_back_to_directory_name() {
        let fs = MemoryFs::new()
            .with_file("/srv/shop/gleaner-ctl.py", "# custom launcher\n")
            .with_file("/srv/shop/shop/settings.py", "");
        let ctx = ContextResolver::new(fs)
            .resolve(Utf8Path::new("/srv/shop"), &SettingsEnv::default())
            .unwrap();
        assert_eq!(ctx.settings_module(), "shop.settings");
    }

    #[test]
    fn test_explicit_module_short_circuits_launcher_lookup() {
        let fs = MemoryFs::new().with_file("/code/news/settings.py", "");
        let resolver = ContextResolver::new(fs);
        let ctx = resolver
            .resolve(
                Utf8Path::new("/code/news"),
                &SettingsEnv::with_module("news.settings"),
            )
            .unwrap();

        // Importable from /code, no launcher required
        assert_eq!(ctx.root(), Utf8Path::new("/code"));
        assert_eq!(ctx.name(), "news");
    }

    #[test]
    fn test_explicit_module_must_exist() {
        let resolver = ContextResolver::new(project_fs("/work/testproject"));
        let err = resolver
            .resolve(
                Utf8Path::new("/work/testproject"),
                &SettingsEnv::with_module("otherproject.settings"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NoProjectFound { .. }));
    }

    #[test]
    fn test_explicit_module_rejects_garbage() {
        let resolver = ContextResolver::new(MemoryFs::new());
        let err = resolver
            .resolve(Utf8Path::new("/"), &SettingsEnv::with_module("not a module"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSettingsModule { .. }));
    }

    #[test]
    fn test_ceiling_stops_walk() {
        let resolver = ContextResolver::new(project_fs("/work")).with_ceiling("/work/sandbox");
        let err = resolver
            .resolve(Utf8Path::new("/work/sandbox/deep"), &SettingsEnv::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoProjectFound { .. }));
    }

    #[test]
    fn test_settings_env_from_lookup() {
        let env = SettingsEnv::from_lookup(|key| match key {
            SETTINGS_MODULE_ENV => Some("testproject.settings".to_string()),
            SETTINGS_DISABLED_ENV => Some("1".to_string()),
            _ => None,
        });
        assert_eq!(env.module.as_deref(), Some("testproject.settings"));
        assert!(env.disabled);

        let env = SettingsEnv::from_lookup(|key| match key {
            SETTINGS_MODULE_ENV => Some("   ".to_string()),
            SETTINGS_DISABLED_ENV => Some("false".to_string()),
            _ => None,
        });
        assert_eq!(env, SettingsEnv::default());
    }

    #[test]
    fn test_settings_disabled_is_read_as_boolean() {
        let disabled = |value: &str| {
            let value = value.to_string();
            SettingsEnv::from_lookup(move |key| (key == SETTINGS_DISABLED_ENV).then(|| value.clone()))
                .disabled
        };

        for truthy in ["1", "true", "yes", "TRUE", "anything"] {
            assert!(disabled(truthy), "{truthy}");
        }
        for falsy in ["", "0", "false", "no", " No "] {
            assert!(!disabled(falsy), "{falsy:?}");
        }
    }

    #[test]
    fn test_child_env_carries_settings_module() {
        let ctx = ProjectContext::new("/work/testproject", "testproject");
        assert_eq!(
            ctx.child_env(),
            vec![(SETTINGS_MODULE_ENV, "testproject.settings".to_string())]
        );
    }
}
