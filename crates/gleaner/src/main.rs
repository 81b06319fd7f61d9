//! Gleaner CLI - scaffold and run web crawling projects
//!
//! This is the main entry point for the gleaner command-line interface.

mod cli;
mod commands;
mod dispatch;
mod engine;
mod error;
mod output;
mod version;

use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dispatch::Dispatcher;

/// Environment variable holding a tracing filter that overrides -v/-q
const LOG_ENV: &str = "GLEANER_LOG";

fn main() -> ExitCode {
    let cli = match dispatch::parse_cli(std::env::args_os(), commands::COMMANDS) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2));
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    Dispatcher::new(commands::COMMANDS).run(&cli)
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                // Warnings only by default; stdout carries command output
                0 => EnvFilter::new("warn"),
                1 => EnvFilter::new("info"),
                2 => EnvFilter::new("debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
