//! CLI entry point for the diamond-ingest loader.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use diamond_graph::{GraphClient, MemoryGraph};
use diamond_ingest::config::load_config;
use diamond_ingest::run_pipeline;
use diamond_ingest::sources::SourceSet;

#[derive(Parser)]
#[command(name = "diamond-ingest")]
#[command(about = "Load college sports CSV sources into the Diamond knowledge graph")]
struct Cli {
    /// Config file prefix (default: diamond).
    #[arg(short, long, default_value = "diamond")]
    config: String,

    /// Directory holding the CSV sources (overrides ingest.data_dir).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Target database (overrides neo4j.database).
    #[arg(long)]
    database: Option<String>,

    /// Delete every node before rebuilding.
    #[arg(long)]
    reset: bool,

    /// Load into an in-memory graph instead of Neo4j.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.ingest.data_dir = dir;
    }
    if let Some(database) = cli.database {
        config.neo4j.database = database;
    }

    // Sources are read in full before the store is touched.
    let sources = SourceSet::load(&config.ingest.source_paths())?;
    let retry = config.ingest.retry_policy();

    let report = if cli.dry_run {
        tracing::info!("Dry run: loading into in-memory graph");
        let graph = MemoryGraph::new();
        run_pipeline(&graph, &config.neo4j.database, retry, &sources, cli.reset).await?
    } else {
        config.validate_store()?;
        let client = GraphClient::connect(&config.neo4j).await?;
        let result = run_pipeline(&client, &config.neo4j.database, retry, &sources, cli.reset).await;
        drop(client);
        tracing::info!("Neo4j connection released");
        result?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
