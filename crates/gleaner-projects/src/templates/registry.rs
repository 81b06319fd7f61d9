//! Template registry: compiled, validated spider templates and the project
//! skeleton.
//!
//! Everything that can go wrong with a template (syntax errors, references
//! to placeholders the template did not declare, skeleton paths escaping
//! the project root) is detected when the registry is built, not when a
//! user asks for a render.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use tera::Tera;
use tracing::debug;

use super::catalog::{ProjectCatalog, ProjectFileTemplate, SpiderCatalog, SpiderTemplate};
use super::renderer::{probe_context, ProjectVars, SpiderVars};
use crate::error::{tera_message, Error, Result};

/// Embedded spider catalog
const SPIDERS_YAML: &str = include_str!("../../templates/spiders.yaml");

/// Embedded project skeleton catalog
const PROJECT_YAML: &str = include_str!("../../templates/project.yaml");

/// A rendered file of a new project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonFile {
    /// Path relative to the project root
    pub path: Utf8PathBuf,
    pub content: String,
    pub executable: bool,
}

/// The rendered files of a new project, in write order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSkeleton {
    pub files: Vec<SkeletonFile>,
}

impl ProjectSkeleton {
    /// Relative paths of all files
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files.iter().map(|f| f.path.as_path())
    }
}

/// Registry of spider templates and the project skeleton
#[derive(Debug)]
pub struct TemplateRegistry {
    spiders: Vec<SpiderTemplate>,
    skeleton: ProjectCatalog,
    tera: Tera,
}

impl TemplateRegistry {
    /// Build the registry from the embedded catalogs
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(SPIDERS_YAML, PROJECT_YAML)
    }

    /// Build the registry from catalog YAML
    pub fn from_yaml(spiders_yaml: &str, project_yaml: &str) -> Result<Self> {
        let mut registry = Self {
            spiders: Vec::new(),
            skeleton: ProjectCatalog::from_yaml(project_yaml)?,
            tera: new_tera(),
        };

        registry.compile_skeleton()?;

        for template in SpiderCatalog::from_yaml(spiders_yaml)?.templates {
            registry.add_spider_template(template)?;
        }

        Ok(registry)
    }

    /// Layer every `*.yaml` catalog found in `dir` over the current templates.
    ///
    /// Entries with an existing key replace that template; new keys are
    /// appended in file-name order.
    pub fn with_overlay_dir(mut self, dir: &Utf8Path) -> Result<Self> {
        let mut catalogs: Vec<Utf8PathBuf> = dir
            .read_dir_utf8()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension() == Some("yaml") && path.is_file())
            .collect();
        catalogs.sort();

        for path in catalogs {
            debug!("Loading spider templates from {}", path);
            let yaml = std::fs::read_to_string(&path)?;
            let catalog = SpiderCatalog::from_yaml(&yaml).map_err(|e| {
                Error::template_config(path.as_str(), e.to_string())
            })?;
            for template in catalog.templates {
                self.add_spider_template(template)?;
            }
        }

        Ok(self)
    }

    /// Compile, validate and register one spider template
    pub fn add_spider_template(&mut self, template: SpiderTemplate) -> Result<()> {
        check_declared(&template.key, &template.placeholders, SpiderVars::PLACEHOLDERS)?;

        // Validate on a scratch instance so a rejected replacement leaves the
        // registered version intact
        let name = spider_template_name(&template.key);
        let invalid = |e: tera::Error| Error::template_config(&template.key, tera_message(&e));
        let mut scratch = new_tera();
        scratch
            .add_raw_template(&name, &template.body)
            .map_err(invalid)?;
        scratch
            .render(&name, &probe_context(&template.placeholders))
            .map_err(invalid)?;

        self.tera
            .add_raw_template(&name, &template.body)
            .map_err(invalid)?;

        match self.spiders.iter_mut().find(|t| t.key == template.key) {
            Some(existing) => {
                debug!("Replacing spider template {}", template.key);
                *existing = template;
            }
            None => self.spiders.push(template),
        }

        Ok(())
    }

    /// Compile and validate every skeleton path and body
    fn compile_skeleton(&mut self) -> Result<()> {
        check_declared("project", &self.skeleton.placeholders, ProjectVars::PLACEHOLDERS)?;
        let probe = probe_context(&self.skeleton.placeholders);

        for (index, file) in self.skeleton.files.iter().enumerate() {
            let path_name = skeleton_path_name(index);
            let body_name = skeleton_body_name(index);
            let invalid = |e: tera::Error| Error::template_config(&file.path, tera_message(&e));

            self.tera
                .add_raw_template(&path_name, &file.path)
                .map_err(invalid)?;
            self.tera
                .add_raw_template(&body_name, &file.body)
                .map_err(invalid)?;

            let probed = self.tera.render(&path_name, &probe).map_err(invalid)?;
            self.tera.render(&body_name, &probe).map_err(invalid)?;

            check_relative(&file.path, Utf8Path::new(probed.trim()))?;
        }

        Ok(())
    }

    /// Template keys in registry order
    pub fn keys(&self) -> Vec<&str> {
        self.spiders.iter().map(|t| t.key.as_str()).collect()
    }

    /// All spider templates in registry order
    pub fn templates(&self) -> &[SpiderTemplate] {
        &self.spiders
    }

    /// Whether `key` names a registered template
    pub fn contains(&self, key: &str) -> bool {
        self.spiders.iter().any(|t| t.key == key)
    }

    /// Look up a spider template
    pub fn get(&self, key: &str) -> Result<&SpiderTemplate> {
        self.spiders
            .iter()
            .find(|t| t.key == key)
            .ok_or_else(|| Error::unknown_template(key, self.keys().join(", ")))
    }

    /// Raw, unrendered text of a spider template
    pub fn dump(&self, key: &str) -> Result<&str> {
        Ok(self.get(key)?.body.as_str())
    }

    /// Render a spider template
    pub fn render_spider(&self, key: &str, vars: &SpiderVars) -> Result<String> {
        let template = self.get(key)?;
        self.tera
            .render(&spider_template_name(&template.key), &vars.to_context())
            .map_err(|e| Error::template_render(tera_message(&e)))
    }

    /// Render the project skeleton for `project_name`
    pub fn render_skeleton(&self, project_name: &str) -> Result<ProjectSkeleton> {
        let context = ProjectVars::new(project_name).to_context();
        let mut files = Vec::with_capacity(self.skeleton.files.len());

        for (index, file) in self.skeleton.files.iter().enumerate() {
            let path = self.render_skeleton_part(&skeleton_path_name(index), &context)?;
            let path = Utf8PathBuf::from(path.trim());
            check_relative(&file.path, &path)?;

            files.push(SkeletonFile {
                content: self.render_skeleton_part(&skeleton_body_name(index), &context)?,
                path,
                executable: file.executable,
            });
        }

        Ok(ProjectSkeleton { files })
    }

    /// The raw skeleton catalog entries
    pub fn skeleton_templates(&self) -> &[ProjectFileTemplate] {
        &self.skeleton.files
    }

    fn render_skeleton_part(&self, name: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| Error::template_render(tera_message(&e)))
    }
}

/// Tera instance without HTML autoescaping; generated files are source code
fn new_tera() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    tera
}

fn spider_template_name(key: &str) -> String {
    format!("spider/{}", key)
}

fn skeleton_path_name(index: usize) -> String {
    format!("project/{}/path", index)
}

fn skeleton_body_name(index: usize) -> String {
    format!("project/{}/body", index)
}

/// Every declared placeholder must be one the template kind provides
fn check_declared(template: &str, declared: &[String], known: &[&str]) -> Result<()> {
    for placeholder in declared {
        if !known.contains(&placeholder.as_str()) {
            return Err(Error::template_config(
                template,
                format!(
                    "unknown placeholder '{}' (expected one of: {})",
                    placeholder,
                    known.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

/// Skeleton paths must be relative and stay inside the project root
fn check_relative(template: &str, path: &Utf8Path) -> Result<()> {
    let escapes = path.as_str().is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));

    if escapes {
        return Err(Error::template_config(
            template,
            format!("path '{}' must be relative and inside the project", path),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
version: "1.0"
placeholders: [project_name]
files:
  - path: "{{ project_name }}/settings.py"
    body: "BOT_NAME = '{{ project_name }}'"
"#;

    fn spiders(body: &str, placeholders: &str) -> String {
        format!(
            "version: \"1.0\"\ntemplates:\n  - key: custom\n    placeholders: {}\n    body: \"{}\"\n",
            placeholders, body
        )
    }

    #[test]
    fn test_builtin_registry_builds() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert_eq!(registry.keys(), vec!["basic", "crawl", "csvfeed", "xmlfeed"]);
    }

    #[test]
    fn test_undeclared_placeholder_fails_at_construction() {
        let yaml = spiders("name = {{ name }} domain = {{ domain }}", "[name]");
        let err = TemplateRegistry::from_yaml(&yaml, PROJECT).unwrap_err();
        match err {
            Error::TemplateConfig { template, .. } => assert_eq!(template, "custom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_declared_placeholder_fails() {
        let yaml = spiders("{{ colour }}", "[colour]");
        let err = TemplateRegistry::from_yaml(&yaml, PROJECT).unwrap_err();
        assert!(err.to_string().contains("unknown placeholder 'colour'"));
    }

    #[test]
    fn test_syntax_error_fails_at_construction() {
        let yaml = spiders("{{ name ", "[name]");
        assert!(matches!(
            TemplateRegistry::from_yaml(&yaml, PROJECT),
            Err(Error::TemplateConfig { .. })
        ));
    }

    #[test]
    fn test_escaping_skeleton_path_is_rejected() {
        let project = r#"
version: "1.0"
placeholders: [project_name]
files:
  - path: "../{{ project_name }}.py"
    body: ""
"#;
        let err = TemplateRegistry::from_yaml(&spiders("x", "[]"), project).unwrap_err();
        assert!(err.to_string().contains("must be relative"));
    }

    #[test]
    fn test_absolute_skeleton_path_is_rejected() {
        let project = r#"
version: "1.0"
files:
  - path: "/etc/passwd"
    body: ""
"#;
        assert!(TemplateRegistry::from_yaml(&spiders("x", "[]"), project).is_err());
    }

    #[test]
    fn test_get_unknown_lists_available() {
        let registry = TemplateRegistry::builtin().unwrap();
        let err = registry.get("rss").unwrap_err();
        match err {
            Error::UnknownTemplate { key, available } => {
                assert_eq!(key, "rss");
                assert_eq!(available, "basic, crawl, csvfeed, xmlfeed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dump_returns_raw_text() {
        let registry = TemplateRegistry::builtin().unwrap();
        let raw = registry.dump("basic").unwrap();
        assert!(raw.contains("{{ classname }}"));
        assert!(raw.contains("{{ domain }}"));
    }

    #[test]
    fn test_render_spider_substitutes_variables() {
        let registry = TemplateRegistry::builtin().unwrap();
        let vars = SpiderVars::new("testspider", "test.com", "testproject");
        let rendered = registry.render_spider("crawl", &vars).unwrap();

        assert!(rendered.contains("class TestspiderSpider(CrawlSpider):"));
        assert!(rendered.contains(r#"name = "testspider""#));
        assert!(rendered.contains(r#"allowed_domains = ["test.com"]"#));
        assert!(rendered.contains("from testproject.items import TestprojectItem"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_render_skeleton_paths() {
        let registry = TemplateRegistry::builtin().unwrap();
        let skeleton = registry.render_skeleton("testproject").unwrap();
        let paths: Vec<&str> = skeleton.paths().map(|p| p.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "gleaner-ctl.py",
                "testproject/__init__.py",
                "testproject/items.py",
                "testproject/pipelines.py",
                "testproject/settings.py",
                "testproject/spiders/__init__.py",
            ]
        );
        assert!(skeleton.files[0].executable);
        assert!(skeleton.files[0]
            .content
            .contains("'GLEANER_SETTINGS_MODULE', 'testproject.settings'"));
    }

    #[test]
    fn test_later_template_replaces_earlier_key() {
        let mut registry = TemplateRegistry::builtin().unwrap();
        registry
            .add_spider_template(SpiderTemplate {
                key: "basic".to_string(),
                description: "Replacement".to_string(),
                placeholders: vec!["name".to_string()],
                body: "# {{ name }}\n".to_string(),
            })
            .unwrap();

        assert_eq!(registry.keys(), vec!["basic", "crawl", "csvfeed", "xmlfeed"]);
        assert_eq!(registry.dump("basic").unwrap(), "# {{ name }}\n");
    }
}
