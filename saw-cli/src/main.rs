use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use saw_selection::{records, Session, SessionPolicy};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rank alternatives with simple additive weighting.
#[derive(Parser, Debug)]
#[command(name = "saw")]
struct Args {
    /// Criterion records, one `name,weight,cost|benefit` per line.
    #[arg(long)]
    criteria: PathBuf,

    /// Alternative records, one `name,value,...` per line with a value per criterion.
    #[arg(long)]
    alternatives: PathBuf,

    /// Configuration file (TOML, YAML or JSON) with a `policy` section.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the loaded criteria and alternatives back as records.
    #[arg(long)]
    export: bool,
}

/// Settings come from the optional config file, then from `SAW__*` environment variables, e.g.
/// `SAW__POLICY__BATCH_MODE=atomic`.
#[derive(Debug, Default, Deserialize)]
struct CliConfig {
    #[serde(default)]
    policy: SessionPolicy,
}

impl CliConfig {
    fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(
                config::Environment::default()
                    .prefix("SAW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = CliConfig::load(args.config.as_deref()).context("loading configuration")?;
    info!(policy = ?config.policy, "session policy");
    let session = Session::new(config.policy);

    let criteria = read(&args.criteria)?;
    let added = records::ingest_criteria(&session, &criteria)
        .with_context(|| format!("ingesting {}", args.criteria.display()))?;
    info!(criteria = added.len(), "criteria loaded");

    let alternatives = read(&args.alternatives)?;
    let added = records::ingest_alternatives(&session, &alternatives)
        .with_context(|| format!("ingesting {}", args.alternatives.display()))?;
    info!(alternatives = added.len(), "alternatives loaded");

    if args.export {
        print!("{}", records::export_criteria(&session.criteria()));
        println!();
        print!("{}", records::export_alternatives(&session.alternatives()));
        println!();
    }

    let board = session.scoreboard()?;
    for (rank, entry) in board.ranking().into_iter().enumerate() {
        println!("{:>3}. {:<24} {}", rank + 1, entry.name, entry.score);
    }
    let best = board.best();
    println!(
        "The best alternative is: Alternative {} ({})",
        best.index + 1,
        best.name
    );
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
