//! `gleaner settings` command handler

use anyhow::Result;
use clap::{ArgMatches, FromArgMatches, Parser};

use gleaner_core::{GleanerConfig, ProjectContext};

use crate::dispatch::Invocation;
use crate::error::CliError;
use crate::output;

/// Names accepted by `--get`, in display order
const KEYS: &[&str] = &[
    "project_name",
    "project_root",
    "settings_module",
    "spiders_dir",
    "engine",
    "templates_dir",
    "default_template",
];

#[derive(Parser, Debug)]
pub struct SettingsArgs {
    /// Print a single value
    #[arg(long, value_name = "NAME")]
    pub get: Option<String>,
}

pub fn run(matches: &ArgMatches, inv: &Invocation<'_>) -> Result<()> {
    let args = SettingsArgs::from_arg_matches(matches)?;
    let project = inv.require_project()?;

    if let Some(name) = args.get {
        let value = lookup(&name, project, inv.config)
            .ok_or_else(|| CliError::unknown_setting(&name, KEYS.join(", ")))?;
        println!("{}", value);
        return Ok(());
    }

    output::header("Project");
    for key in KEYS {
        if let Some(value) = lookup(key, project, inv.config) {
            output::kv(key, &value);
        }
    }

    Ok(())
}

fn lookup(name: &str, project: &ProjectContext, config: &GleanerConfig) -> Option<String> {
    let value = match name {
        "project_name" => project.name().to_string(),
        "project_root" => project.root().to_string(),
        "settings_module" => project.settings_module().to_string(),
        "spiders_dir" => project.spiders_dir().to_string(),
        "engine" => config
            .engine
            .command
            .clone()
            .unwrap_or_else(|| "builtin".to_string()),
        "templates_dir" => config
            .templates
            .dir
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        "default_template" => config.templates.default.clone(),
        _ => return None,
    };
    Some(value)
}
