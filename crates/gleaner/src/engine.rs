//! Crawl engine adapter
//!
//! `crawl` and `list` hand the resolved project to an [`Engine`]. When an
//! engine command is configured it runs as a child process inside the
//! project root with the settings module exported; otherwise the builtin
//! engine answers from the spider modules on disk.

use anyhow::{Context, Result};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use gleaner_core::config::EngineConfig;
use gleaner_core::ProjectContext;
use gleaner_projects::discover_spiders;

use crate::error::CliError;
use crate::output;

/// What the CLI needs from a crawl engine
pub trait Engine {
    /// Run one spider, or every spider when `spider` is `None`
    fn crawl(&self, ctx: &ProjectContext, spider: Option<&str>) -> Result<()>;

    /// Names of the spiders the engine can run
    fn list(&self, ctx: &ProjectContext) -> Result<Vec<String>>;
}

/// Pick the engine described by the configuration
pub fn from_config(config: &EngineConfig) -> Box<dyn Engine> {
    match config.argv() {
        Some(mut argv) => {
            let program = argv.remove(0);
            debug!("Using engine command {} {:?}", program, argv);
            Box::new(ProcessEngine::new(program, argv))
        }
        None => {
            debug!("No engine configured; using builtin engine");
            Box::new(BuiltinEngine)
        }
    }
}

/// Engine running as an external program: `<program> <args…> crawl|list`
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, ctx: &ProjectContext, action: &str) -> Result<Command> {
        let program = which::which(&self.program)
            .map_err(|_| CliError::engine_not_found(&self.program))?;

        let mut command = Command::new(program);
        command.args(&self.args).arg(action);
        ctx.apply_to(&mut command);
        Ok(command)
    }
}

impl Engine for ProcessEngine {
    fn crawl(&self, ctx: &ProjectContext, spider: Option<&str>) -> Result<()> {
        let mut command = self.command(ctx, "crawl")?;
        if let Some(spider) = spider {
            command.arg(spider);
        }

        debug!("Running {:?}", command);
        let status = command
            .status()
            .with_context(|| format!("Failed to run engine {}", self.program))?;
        check_status(status)
    }

    fn list(&self, ctx: &ProjectContext) -> Result<Vec<String>> {
        let mut command = self.command(ctx, "list")?;
        command.stderr(Stdio::inherit());

        debug!("Running {:?}", command);
        let output = command
            .output()
            .with_context(|| format!("Failed to run engine {}", self.program))?;
        check_status(output.status)?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

fn check_status(status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(CliError::engine_failed(status.code()).into())
    }
}

/// Engine used when none is configured: reads the project's spider modules
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngine;

impl Engine for BuiltinEngine {
    fn crawl(&self, ctx: &ProjectContext, spider: Option<&str>) -> Result<()> {
        let spiders = discover_spiders(ctx)?;

        let selected: Vec<_> = match spider {
            Some(name) => {
                let found = spiders
                    .into_iter()
                    .find(|s| s.name == name)
                    .ok_or_else(|| CliError::spider_not_found(name))?;
                vec![found]
            }
            None => spiders,
        };

        if selected.is_empty() {
            output::warning(&format!("Project {} has no spiders yet", ctx.name()));
            output::hint("Create one with: gleaner genspider <name> <domain>");
            return Ok(());
        }

        for spider in &selected {
            output::info(&format!(
                "Spider {} ({}.{}.{}) covers {}",
                spider.name,
                ctx.name(),
                gleaner_core::context::SPIDERS_PACKAGE,
                spider.module,
                if spider.domains.is_empty() {
                    "any domain".to_string()
                } else {
                    spider.domains.join(", ")
                }
            ));
        }
        output::hint("No engine configured; set GLEANER_ENGINE or engine.command to run crawls");

        Ok(())
    }

    fn list(&self, ctx: &ProjectContext) -> Result<Vec<String>> {
        Ok(discover_spiders(ctx)?.into_iter().map(|s| s.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use gleaner_projects::{Scaffolder, SpiderGenerator, SpiderRequest, TemplateRegistry};
    use tempfile::TempDir;

    fn project_with_spider(temp: &TempDir) -> ProjectContext {
        let parent = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let registry = TemplateRegistry::builtin().unwrap();
        let root = Scaffolder::new(&registry)
            .create_project("testproject", &parent)
            .unwrap();
        let ctx = ProjectContext::new(root, "testproject");
        SpiderGenerator::new(&registry)
            .create_spider(&ctx, &SpiderRequest::new("testspider", "test.com"))
            .unwrap();
        ctx
    }

    #[test]
    fn test_from_config_selects_engine() {
        // Only the builtin engine answers without a program on PATH
        let temp = TempDir::new().unwrap();
        let ctx = project_with_spider(&temp);

        let builtin = from_config(&EngineConfig::default());
        assert_eq!(builtin.list(&ctx).unwrap(), vec!["testspider"]);

        let process = from_config(&EngineConfig {
            command: Some("gleaner-engine-that-does-not-exist --flag".to_string()),
        });
        assert!(process.list(&ctx).is_err());
    }

    #[test]
    fn test_builtin_crawl() {
        let temp = TempDir::new().unwrap();
        let ctx = project_with_spider(&temp);

        BuiltinEngine.crawl(&ctx, None).unwrap();
        BuiltinEngine.crawl(&ctx, Some("testspider")).unwrap();

        let err = BuiltinEngine.crawl(&ctx, Some("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::SpiderNotFound { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_missing_program() {
        let temp = TempDir::new().unwrap();
        let ctx = project_with_spider(&temp);

        let err = ProcessEngine::new("gleaner-engine-that-does-not-exist", Vec::new())
            .crawl(&ctx, None)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::EngineNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_engine_status_passes_through() {
        let temp = TempDir::new().unwrap();
        let ctx = project_with_spider(&temp);
        let engine = ProcessEngine::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);

        let err = engine.crawl(&ctx, Some("testspider")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::EngineFailed { code: Some(3) })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_engine_runs_in_project() {
        let temp = TempDir::new().unwrap();
        let ctx = project_with_spider(&temp);
        let script = r#"test -f gleaner-ctl.py && echo "$GLEANER_SETTINGS_MODULE" && echo "$0""#;
        let engine = ProcessEngine::new("sh", vec!["-c".to_string(), script.to_string()]);

        let lines = engine.list(&ctx).unwrap();
        assert_eq!(lines, vec!["testproject.settings", "list"]);
    }
}
