//! Command dispatch
//!
//! Commands live in a static table of [`CommandDescriptor`]s. For one
//! invocation the dispatcher looks the command up by name, lets clap parse
//! the command's own arguments, resolves the project context the command
//! asks for, runs the handler and turns the outcome into an exit code.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use std::process::ExitCode;
use tracing::debug;

use gleaner_core::{ConfigLoader, ContextResolver, GleanerConfig, ProjectContext, SettingsEnv};

use crate::cli::Cli;
use crate::error::CliError;
use crate::output;
use crate::version::VersionInfo;

/// How much of a project a command needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextRequirement {
    /// Runs anywhere; no resolution
    None,
    /// Uses the project when there is one
    Optional,
    /// Fails before running when no project encloses the working directory
    Project,
}

/// One entry of the command table
pub struct CommandDescriptor {
    pub name: &'static str,
    pub summary: &'static str,
    pub requirement: ContextRequirement,
    /// clap definition of the command's arguments
    pub args: fn() -> clap::Command,
    pub run: fn(&ArgMatches, &Invocation<'_>) -> Result<()>,
}

/// Everything a command handler receives
#[derive(Debug)]
pub struct Invocation<'a> {
    pub config: &'a GleanerConfig,
    /// Directory the command was started from
    pub cwd: &'a Utf8Path,
    /// Resolved project; always `Some` for project-scoped commands
    pub project: Option<&'a ProjectContext>,
}

impl Invocation<'_> {
    /// The project, or the error explaining why there is none
    pub fn require_project(&self) -> Result<&ProjectContext> {
        self.project
            .ok_or_else(|| gleaner_core::Error::no_project_found(self.cwd.as_str()).into())
    }
}

/// Parse the global command line, rendering the command table into the help
pub fn parse_cli<I, T>(argv: I, commands: &[CommandDescriptor]) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = Cli::command()
        .after_help(command_table(commands))
        .try_get_matches_from(argv)?;
    Cli::from_arg_matches(&matches)
}

/// Runs commands from a descriptor table
pub struct Dispatcher<'t> {
    commands: &'t [CommandDescriptor],
}

impl<'t> Dispatcher<'t> {
    pub fn new(commands: &'t [CommandDescriptor]) -> Self {
        Self { commands }
    }

    /// Look a command up by name
    pub fn find(&self, name: &str) -> Option<&'t CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Run the parsed invocation to completion
    pub fn run(&self, cli: &Cli) -> ExitCode {
        match self.execute(cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => report(&err),
        }
    }

    fn execute(&self, cli: &Cli) -> Result<()> {
        let cwd = current_dir()?;

        let Some(raw) = &cli.command else {
            let project = resolve(&cwd).ok();
            print_usage(self.commands, project.as_ref());
            return Ok(());
        };

        let (name, args) = raw.split();
        let descriptor = self
            .find(name)
            .ok_or_else(|| CliError::unknown_command(name))?;

        let matches = (descriptor.args)()
            .name(descriptor.name)
            .bin_name(format!("gleaner {}", descriptor.name))
            .about(descriptor.summary)
            .try_get_matches_from(std::iter::once(name.to_string()).chain(args.iter().cloned()))?;

        let config = ConfigLoader::new()
            .load(cli.config.as_deref())
            .context("Failed to load configuration")?;

        let project = match descriptor.requirement {
            ContextRequirement::None => None,
            ContextRequirement::Optional => resolve(&cwd)
                .inspect_err(|e| debug!("No project for {}: {}", name, e))
                .ok(),
            ContextRequirement::Project => Some(resolve(&cwd)?),
        };

        let invocation = Invocation {
            config: &config,
            cwd: &cwd,
            project: project.as_ref(),
        };

        debug!("Running {} (project: {:?})", name, project.as_ref().map(|p| p.name()));
        (descriptor.run)(&matches, &invocation)
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("Current directory is not valid UTF-8: {}", p.display()))
}

fn resolve(cwd: &Utf8Path) -> gleaner_core::Result<ProjectContext> {
    ContextResolver::os().resolve(cwd, &SettingsEnv::from_process())
}

/// Exit code for a failed invocation
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
        // 0 for --help, 2 for usage errors
        return u8::try_from(clap_err.exit_code()).unwrap_or(2);
    }

    match err.downcast_ref::<CliError>() {
        Some(CliError::EngineFailed { code: Some(code) }) => {
            u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
        }
        _ => 1,
    }
}

/// Print a failure and pick its exit code
fn report(err: &anyhow::Error) -> ExitCode {
    if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
        // Help and usage errors carry their own formatting
        let _ = clap_err.print();
    } else {
        output::error(&format!("{:#}", err));
        if let Some(hint) = hint_for(err) {
            output::hint(hint);
        }
    }

    ExitCode::from(exit_code(err))
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(CliError::UnknownCommand { .. }) = err.downcast_ref::<CliError>() {
        return Some("Run 'gleaner' without arguments to see the available commands");
    }

    let core = err.downcast_ref::<gleaner_core::Error>().or_else(|| {
        match err.downcast_ref::<gleaner_projects::Error>() {
            Some(gleaner_projects::Error::Core(core)) => Some(core),
            _ => None,
        }
    })?;

    if core.is_no_project() {
        Some("Run this command inside a project created with 'gleaner startproject <name>'")
    } else {
        None
    }
}

/// The `Available commands:` block shared by help and the bare invocation
pub fn command_table(commands: &[CommandDescriptor]) -> String {
    let width = commands.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut table = String::from("Available commands:\n");
    for command in commands {
        table.push_str(&format!("  {:width$}  {}\n", command.name, command.summary));
    }
    table.push_str("\nUse \"gleaner <command> -h\" to see more info about a command");
    table
}

fn print_usage(commands: &[CommandDescriptor], project: Option<&ProjectContext>) {
    let info = VersionInfo::current().with_project(project.map(|p| p.name().to_string()));
    println!("{}\n", info.banner());
    println!("Usage:\n  gleaner [options] <command> [args]\n");
    println!("{}", command_table(commands));
}
