//! `gleaner startproject` command handler

use anyhow::Result;
use clap::{ArgMatches, FromArgMatches, Parser};

use gleaner_projects::{Scaffolder, TemplateRegistry};

use crate::dispatch::Invocation;
use crate::output;

#[derive(Parser, Debug)]
pub struct StartprojectArgs {
    /// Project name (letters, numbers and underscores; not starting with a number)
    pub name: String,
}

/// Create a new project in the current directory
pub fn run(matches: &ArgMatches, inv: &Invocation<'_>) -> Result<()> {
    let args = StartprojectArgs::from_arg_matches(matches)?;

    let registry = TemplateRegistry::builtin()?;
    let root = Scaffolder::new(&registry).create_project(&args.name, inv.cwd)?;

    output::success(&format!("New project '{}' created in:", args.name));
    output::hint(root.as_str());
    eprintln!();
    output::info("You can start your first spider with:");
    output::hint(&format!("cd {}", args.name));
    output::hint("gleaner genspider example example.com");

    Ok(())
}
