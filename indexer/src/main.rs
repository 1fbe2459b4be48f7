use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::persist::{load_snapshot, read_event_file, save_snapshot, IndexPaths};
use engine::{Engine, Event, Snapshot};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect event snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate seed events and write a snapshot directory
    Build {
        /// Input path (.json / .jsonl file or a directory of them)
        #[arg(long)]
        input: PathBuf,
        /// Output snapshot directory
        #[arg(long)]
        output: PathBuf,
    },
    /// Print what a snapshot directory holds
    Inspect {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_snapshot(&input, &output),
        Commands::Inspect { index } => inspect(&index),
    }
}

fn build_snapshot(input: &Path, output: &Path) -> Result<()> {
    let files = input_files(input)?;
    let mut events: Vec<Event> = Vec::new();
    for file in &files {
        let batch = read_event_file(file)?;
        tracing::info!(file = %file.display(), events = batch.len(), "read seed file");
        events.extend(batch);
    }

    // Build every index once so a corpus that would fail to load is never written.
    let snapshot = Snapshot::build(events.clone(), 0).context("seed corpus rejected")?;
    tracing::info!(
        num_docs = snapshot.num_docs(),
        num_terms = snapshot.text.num_terms(),
        categories = snapshot.facets.categories.len(),
        "corpus validated"
    );

    let meta = save_snapshot(&IndexPaths::new(output), &events)?;
    tracing::info!(output = %output.display(), num_docs = meta.num_docs, "snapshot written");
    Ok(())
}

fn input_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input {} does not exist", input.display());
    }
    Ok(files)
}

fn inspect(index: &Path) -> Result<()> {
    let (events, meta) = load_snapshot(&IndexPaths::new(index))?;
    let engine = Engine::default();
    engine.load(events)?;
    let stats = engine.stats_overview()?;

    println!("snapshot   {}", index.display());
    println!("version    {}", meta.version);
    println!("created    {}", meta.created_at);
    println!("events     {}", stats.total);
    println!("avg price  {:.2}", stats.avg_price);
    println!("categories");
    for c in engine.list_categories()? {
        println!("  {:<24} {}", c.name, c.count);
    }
    println!("top cities");
    for c in stats.top_cities {
        println!("  {:<24} {}", c.name, c.count);
    }
    Ok(())
}
