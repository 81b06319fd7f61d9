//! Command handlers and the command table

pub mod crawl;
pub mod genspider;
pub mod list;
pub mod settings;
pub mod startproject;
pub mod version;

use clap::CommandFactory;

use crate::dispatch::{CommandDescriptor, ContextRequirement};

/// Every command the CLI knows, in help order
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "startproject",
        summary: "Create new project",
        requirement: ContextRequirement::None,
        args: startproject::StartprojectArgs::command,
        run: startproject::run,
    },
    CommandDescriptor {
        name: "genspider",
        summary: "Generate new spider using pre-defined templates",
        requirement: ContextRequirement::Optional,
        args: genspider::GenspiderArgs::command,
        run: genspider::run,
    },
    CommandDescriptor {
        name: "crawl",
        summary: "Run a spider",
        requirement: ContextRequirement::Project,
        args: crawl::CrawlArgs::command,
        run: crawl::run,
    },
    CommandDescriptor {
        name: "list",
        summary: "List available spiders",
        requirement: ContextRequirement::Project,
        args: list::ListArgs::command,
        run: list::run,
    },
    CommandDescriptor {
        name: "settings",
        summary: "Show the resolved project settings",
        requirement: ContextRequirement::Project,
        args: settings::SettingsArgs::command,
        run: settings::run,
    },
    CommandDescriptor {
        name: "version",
        summary: "Print gleaner version",
        requirement: ContextRequirement::None,
        args: version::VersionArgs::command,
        run: version::run,
    },
];
