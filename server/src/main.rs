use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use engine::persist::{load_snapshot, read_event_file, IndexPaths};
use engine::{Engine, EngineConfig};
use server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Snapshot directory written by `indexer build`
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Seed file (.json or .jsonl) to load instead of a snapshot
    #[arg(long)]
    seed: Option<PathBuf>,
    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = Arc::new(Engine::new(config));

    let events = match &args.seed {
        Some(seed) => read_event_file(seed)?,
        None => {
            let (events, meta) = load_snapshot(&IndexPaths::new(&args.index))
                .with_context(|| format!("loading snapshot from {}", args.index.display()))?;
            tracing::info!(created_at = %meta.created_at, "snapshot read");
            events
        }
    };
    engine.load(events)?;

    let app: Router = build_app(engine)?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
