//! `gleaner list` command handler

use anyhow::Result;
use clap::{ArgMatches, FromArgMatches, Parser};

use crate::dispatch::Invocation;
use crate::engine;

#[derive(Parser, Debug)]
pub struct ListArgs {}

/// Print one spider name per line
pub fn run(matches: &ArgMatches, inv: &Invocation<'_>) -> Result<()> {
    ListArgs::from_arg_matches(matches)?;
    let project = inv.require_project()?;

    for name in engine::from_config(&inv.config.engine).list(project)? {
        println!("{}", name);
    }

    Ok(())
}
