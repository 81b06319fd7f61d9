//! CLI argument parsing with clap
//!
//! Only the global options are parsed here. The first positional token and
//! everything after it are captured raw and handed to the dispatcher, which
//! looks the command up in its table and lets the command parse the rest.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Gleaner - scaffold and run web crawling projects
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_value_name = "COMMAND")]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a gleaner config file (default: ~/.gleaner/config.yaml)
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Option<RawCommand>,
}

/// A command name followed by its unparsed arguments
#[derive(Subcommand, Debug)]
pub enum RawCommand {
    #[command(external_subcommand)]
    External(Vec<String>),
}

impl RawCommand {
    /// Command name and its arguments
    pub fn split(&self) -> (&str, &[String]) {
        let RawCommand::External(argv) = self;
        match argv.split_first() {
            Some((name, args)) => (name.as_str(), args),
            None => ("", &[]),
        }
    }
}
