//! `gleaner genspider` command handler
//!
//! Listing and dumping templates work anywhere; creating a spider needs a
//! project.

use anyhow::{Context, Result};
use clap::{ArgMatches, FromArgMatches, Parser};
use tracing::warn;

use gleaner_core::GleanerConfig;
use gleaner_projects::{SpiderGenerator, SpiderRequest, TemplateRegistry};

use crate::dispatch::Invocation;
use crate::output;

#[derive(Parser, Debug)]
pub struct GenspiderArgs {
    /// Spider name
    #[arg(
        required_unless_present_any = ["list", "dump"],
        conflicts_with_all = ["list", "dump"]
    )]
    pub name: Option<String>,

    /// Domain the spider is allowed to crawl
    #[arg(
        required_unless_present_any = ["list", "dump"],
        conflicts_with_all = ["list", "dump"]
    )]
    pub domain: Option<String>,

    /// Template to use
    #[arg(short, long)]
    pub template: Option<String>,

    /// List available templates
    #[arg(short, long, conflicts_with = "dump")]
    pub list: bool,

    /// Print a template's raw text (default: the default template)
    #[arg(short, long, value_name = "TEMPLATE", num_args = 0..=1)]
    pub dump: Option<Option<String>>,
}

pub fn run(matches: &ArgMatches, inv: &Invocation<'_>) -> Result<()> {
    let args = GenspiderArgs::from_arg_matches(matches)?;
    let registry = load_registry(inv.config)?;

    if args.list {
        println!("Available templates:");
        let width = registry.keys().iter().map(|k| k.len()).max().unwrap_or(0);
        for template in registry.templates() {
            println!("  {:width$}  {}", template.key, template.description);
        }
        return Ok(());
    }

    if let Some(dump) = &args.dump {
        let key = dump
            .as_deref()
            .or(args.template.as_deref())
            .unwrap_or(&inv.config.templates.default);
        print!("{}", registry.dump(key)?);
        return Ok(());
    }

    // clap guarantees both positionals when neither --list nor --dump is given
    let (Some(name), Some(domain)) = (args.name, args.domain) else {
        anyhow::bail!("genspider needs a spider name and a domain");
    };

    let project = inv.require_project()?;
    let mut request = SpiderRequest::new(name, domain);
    if let Some(template) = args.template {
        request = request.with_template(template);
    }

    let generator =
        SpiderGenerator::new(&registry).with_default_template(&inv.config.templates.default);
    let path = generator.create_spider(project, &request)?;

    output::success(&format!(
        "Created spider '{}' using template '{}' in module:",
        request.name,
        generator.template_key(&request)
    ));
    output::hint(&format!(
        "{}.{}.{}",
        project.name(),
        gleaner_core::context::SPIDERS_PACKAGE,
        request.name
    ));
    output::hint(path.as_str());

    Ok(())
}

/// Builtin templates plus the configured overlay directory, if any
fn load_registry(config: &GleanerConfig) -> Result<TemplateRegistry> {
    let registry = TemplateRegistry::builtin()?;

    match &config.templates.dir {
        Some(dir) if dir.is_dir() => registry
            .with_overlay_dir(dir)
            .with_context(|| format!("Failed to load templates from {}", dir)),
        Some(dir) => {
            warn!("Template directory {} does not exist; using builtin templates", dir);
            Ok(registry)
        }
        None => Ok(registry),
    }
}
