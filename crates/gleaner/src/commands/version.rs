//! `gleaner version` command handler

use anyhow::Result;
use clap::{ArgMatches, FromArgMatches, Parser};

use crate::dispatch::Invocation;
use crate::version::VersionInfo;

#[derive(Parser, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(matches: &ArgMatches, inv: &Invocation<'_>) -> Result<()> {
    let args = VersionArgs::from_arg_matches(matches)?;
    let info = VersionInfo::current().with_engine(inv.config.engine.command.clone());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("gleaner {}", info.version);
        if let Some(commit) = &info.commit {
            println!("Commit:     {}", commit);
        }
        println!(
            "Engine:     {}",
            info.engine.as_deref().unwrap_or("builtin")
        );
    }

    Ok(())
}
