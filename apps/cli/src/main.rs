//! friendly - expand or collapse model references in a JSON document
//!
//! Models come from a JSON definitions file and are served from fixture
//! tables, which makes the CLI useful for trying out model layouts and for
//! shrinking or hydrating documents offline.

mod fixtures;
mod logging;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use friendly_hydrate::{HydrateConfig, Hydrator, ProviderErrorPolicy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "friendly", version, about = "Expand and collapse model references in JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Emit debug traversal events
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace references with the entities they identify
    Expand(RunArgs),
    /// Reduce resolved entities back to key stubs
    Collapse(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON array of model definitions
    #[arg(long)]
    models: PathBuf,

    /// Document to process
    #[arg(long)]
    input: PathBuf,

    /// Model the document (or the value at --path) belongs to
    #[arg(long)]
    model: String,

    /// Dotted path to the substructure to process, e.g. `inner.book` or `shelves[0].books`
    #[arg(long)]
    path: Option<String>,

    /// JSON object of model name -> { key -> entity }
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// JSON file with hydration settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to do when a lookup fails: skip or abort
    #[arg(long)]
    on_provider_error: Option<ProviderErrorPolicy>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.json_logs);

    let output = match &cli.command {
        Command::Expand(args) => {
            let hydrator = build_hydrator(args, cli.verbose)?;
            hydrator
                .expand(&args.model, &fixtures::read_json(&args.input)?, args.path.as_deref())
                .await
                .context("Expansion failed")?
        }
        Command::Collapse(args) => {
            let hydrator = build_hydrator(args, cli.verbose)?;
            hydrator
                .collapse(&args.model, &fixtures::read_json(&args.input)?, args.path.as_deref())
                .context("Collapse failed")?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn build_hydrator(args: &RunArgs, verbose: bool) -> anyhow::Result<Hydrator> {
    let config = load_config(args, verbose)?;
    let registry = fixtures::load_registry(&args.models, args.fixtures.as_deref(), &config)
        .context("Failed to load models")?;
    Ok(Hydrator::with_config(registry, config))
}

fn load_config(args: &RunArgs, verbose: bool) -> anyhow::Result<HydrateConfig> {
    resolve_config(args, verbose, |name| std::env::var(name).ok())
}

/// Defaults, then the config file, then `FRIENDLY_*` variables, then
/// command-line flags; each layer overrides the ones before it.
fn resolve_config(
    args: &RunArgs,
    verbose: bool,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<HydrateConfig> {
    let base: HydrateConfig = match &args.config {
        Some(path) => serde_json::from_value(fixtures::read_json(path)?)
            .with_context(|| format!("Invalid hydration config in {}", path.display()))?,
        None => HydrateConfig::default(),
    };
    let mut config = base.with_overrides(env);

    if verbose {
        config.verbose = true;
    }
    if let Some(policy) = args.on_provider_error {
        config.on_provider_error = policy;
    }

    tracing::debug!(?config, "Hydration config");
    Ok(config)
}
