use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use semdex_embedder::{
    EmbeddingMode, EmbeddingProvider, OpenAiEmbedder, OpenAiEmbedderConfig, StubEmbedder,
    DEFAULT_DIMENSION,
};
use semdex_indexer::DocumentIndexer;
use semdex_search::SearchEngine;
use semdex_vector_store::EmbeddingStore;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "semdex")]
#[command(about = "Semantic document index and similarity search", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// Override embedding backend in this process (http|stub)
    #[arg(long, global = true)]
    embed_mode: Option<String>,

    /// Override embedding model id
    #[arg(long, global = true)]
    embed_model: Option<String>,

    /// Override embedding vector width
    #[arg(long, global = true)]
    dimension: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a directory of JSON documents for similarity search
    Index(IndexArgs),

    /// Search for documents matching a query
    Search(SearchArgs),

    /// Show store statistics
    Stats(StatsArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Directory of source documents
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Store file path
    #[arg(long, default_value = ".semdex/index.json")]
    store: PathBuf,

    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Query text
    query: String,

    /// Maximum number of results
    #[arg(short = 'k', long, default_value_t = 10)]
    limit: usize,

    /// Store file path
    #[arg(long, default_value = ".semdex/index.json")]
    store: PathBuf,

    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatsArgs {
    /// Store file path
    #[arg(long, default_value = ".semdex/index.json")]
    store: PathBuf,

    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    if let Some(mode) = &cli.embed_mode {
        env::set_var("SEMDEX_EMBEDDING_MODE", mode);
    }
    if let Some(model) = &cli.embed_model {
        env::set_var("SEMDEX_EMBEDDING_MODEL", model);
    }
    if let Some(dimension) = cli.dimension {
        env::set_var("SEMDEX_DIMENSION", dimension.to_string());
    }

    // Auto-enable quiet mode when --json is used (to keep stdout clean for
    // JSON parsing)
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Search(args) => args.json,
        Commands::Stats(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Index(args) => run_index(args).await,
        Commands::Search(args) => run_search(args).await,
        Commands::Stats(args) => run_stats(args).await,
    }
}

fn resolve_embedder() -> Result<Arc<dyn EmbeddingProvider>> {
    match EmbeddingMode::from_env()? {
        EmbeddingMode::Stub => Ok(Arc::new(StubEmbedder::new(configured_dimension()?))),
        EmbeddingMode::Http => {
            let config = OpenAiEmbedderConfig::from_env()?;
            Ok(Arc::new(OpenAiEmbedder::new(config)?))
        }
    }
}

fn configured_dimension() -> Result<usize> {
    match env::var("SEMDEX_DIMENSION") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("Invalid SEMDEX_DIMENSION '{raw}'")),
        Err(_) => Ok(DEFAULT_DIMENSION),
    }
}

async fn open_existing_store(path: &Path) -> Result<EmbeddingStore> {
    EmbeddingStore::load(path).await.with_context(|| {
        format!(
            "Failed to open store {} (run `semdex index` first)",
            path.display()
        )
    })
}

async fn run_index(args: IndexArgs) -> Result<()> {
    let embedder = resolve_embedder()?;
    let store = EmbeddingStore::open(&args.store, embedder.dimension())
        .await
        .with_context(|| format!("Failed to open store {}", args.store.display()))?;

    let mut indexer = DocumentIndexer::new(store, embedder)?;
    let stats = indexer.index_directory(&args.data_dir).await?;

    if args.json {
        let payload = serde_json::json!({
            "indexed": stats.indexed,
            "failures": stats.failures,
            "time_ms": stats.time_ms,
            "total_records": indexer.store().count(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for identity in &stats.indexed {
        println!("✓ {identity}");
    }
    for failure in &stats.failures {
        println!("✗ {}: {}", failure.identity, failure.error);
    }
    println!();
    println!(
        "Indexed {} documents ({} failed) in {}ms",
        stats.documents(),
        stats.failures.len(),
        stats.time_ms
    );
    println!("Total records: {}", indexer.store().count());
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let embedder = resolve_embedder()?;
    let store = open_existing_store(&args.store).await?;

    if embedder.dimension() != store.dimension() {
        anyhow::bail!(
            "Store {} holds vectors of dimension {} but the embedder is configured for {}",
            args.store.display(),
            store.dimension(),
            embedder.dimension()
        );
    }

    let engine = SearchEngine::new(&store, embedder);
    let hits = engine.search(&args.query, args.limit).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results");
        return Ok(());
    }
    for hit in &hits {
        println!("{}  {:.4}", hit.identity, hit.distance);
    }
    Ok(())
}

async fn run_stats(args: StatsArgs) -> Result<()> {
    let store = open_existing_store(&args.store).await?;

    if args.json {
        let payload = serde_json::json!({
            "records": store.count(),
            "dimension": store.dimension(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Store: {}", args.store.display());
    println!("Records: {}", store.count());
    println!("Dimension: {}", store.dimension());
    Ok(())
}
