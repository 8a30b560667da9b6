//! Servebot CLI entry point.

use clap::{Parser, Subcommand};
use servebot_core::config::ServebotConfig;

#[derive(Parser)]
#[command(
    name = "servebot",
    version,
    about = "RAG-powered support chatbot for a home-services catalog"
)]
struct Cli {
    /// Path to the config file (default: ~/.servebot/config.toml)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway server
    Serve,
    /// Run one query through the pipeline and print the result
    Ask { query: String },
    /// Raw similarity search, bypassing classification and generation
    Search {
        query: String,
        /// Comma-separated collection names (default: all)
        #[arg(long)]
        collections: Option<String>,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Index a catalog batch from a JSON file
    Populate { file: std::path::PathBuf },
    /// Show per-collection document counts
    Stats,
    /// Empty all collections and persist the empty state
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ServebotConfig::load_from(path)?,
        None => ServebotConfig::load()?,
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            servebot_gateway::start(&config).await?;
        }
        Command::Ask { query } => {
            let engine = servebot_gateway::build_engine(&config)?;
            let outcome = engine.process(&query).await?;
            println!("Intent: {}", outcome.intent);
            println!("\n{}\n", outcome.response);
            if !outcome.sources.is_empty() {
                println!("Sources ({}):", outcome.num_sources);
                for source in &outcome.sources {
                    println!("  [{:.3}] {}", source.relevance_score, source.content);
                }
            }
        }
        Command::Search { query, collections, limit } => {
            let engine = servebot_gateway::build_engine(&config)?;
            let scope = collections
                .map(|names| {
                    names
                        .split(',')
                        .map(|name| servebot_core::types::Collection::from_name(name.trim()))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?;
            let hits = engine.index().search(&query, scope.as_deref(), limit).await?;
            for hit in &hits {
                println!("[{}] {:.3} {}", hit.collection, hit.similarity, hit.content);
            }
            if hits.is_empty() {
                println!("No matches");
            }
        }
        Command::Populate { file } => {
            let engine = servebot_gateway::build_engine(&config)?;
            let content = std::fs::read_to_string(&file)?;
            let batch = serde_json::from_str(&content)?;
            let stats = engine.populate(&batch).await?;
            tracing::info!("📚 Catalog batch indexed from {}", file.display());
            println!("Vector store updated:");
            for (name, count) in &stats {
                println!("  {name}: {count} document(s)");
            }
        }
        Command::Stats => {
            let engine = servebot_gateway::build_engine(&config)?;
            let stats = engine.stats();
            let total: usize = stats.values().sum();
            println!("Collections ({total} document(s) total):");
            for (name, count) in &stats {
                println!("  {name}: {count}");
            }
        }
        Command::Clear => {
            let engine = servebot_gateway::build_engine(&config)?;
            engine.clear()?;
            println!("All collections cleared");
        }
    }

    Ok(())
}
