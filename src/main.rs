use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use feedloom::build::{self, Pipeline};
use feedloom::config::{Config, SourceConfig};

#[derive(Parser, Debug)]
#[command(
    name = "feedloom",
    about = "Normalize RSS, RDF and Atom feeds into JSON Feed"
)]
struct Args {
    /// Config file listing feed sources (missing file means no configured sources)
    #[arg(long, short, value_name = "FILE", default_value = "feedloom.toml")]
    config: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Feed documents to normalize after the configured sources
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config
        .sources
        .extend(args.files.into_iter().map(SourceConfig::from_path));

    if config.sources.is_empty() {
        eprintln!("Error: No feed sources given");
        eprintln!();
        eprintln!("Pass feed files directly:");
        eprintln!("  feedloom feed.xml other.xml");
        eprintln!();
        eprintln!("Or list them under [[sources]] in {}", args.config.display());
        std::process::exit(2);
    }

    let output = build::run(&config, &Pipeline::default()).await;

    let json = if args.pretty || config.pretty {
        serde_json::to_string_pretty(&output.feeds)
    } else {
        serde_json::to_string(&output.feeds)
    }
    .context("Failed to serialize feeds")?;
    println!("{json}");

    for error in &output.errors {
        eprintln!("Error: {error}");
    }
    if !output.errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
