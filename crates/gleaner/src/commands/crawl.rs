//! `gleaner crawl` command handler

use anyhow::Result;
use clap::{ArgMatches, FromArgMatches, Parser};

use crate::dispatch::Invocation;
use crate::engine;

#[derive(Parser, Debug)]
pub struct CrawlArgs {
    /// Spider to run (default: every spider in the project)
    pub spider: Option<String>,
}

pub fn run(matches: &ArgMatches, inv: &Invocation<'_>) -> Result<()> {
    let args = CrawlArgs::from_arg_matches(matches)?;
    let project = inv.require_project()?;

    engine::from_config(&inv.config.engine).crawl(project, args.spider.as_deref())
}
