//! pgrag CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use pgrag::{
    commands::{
        cmd_check, cmd_init, cmd_load, cmd_query, print_connection_report, print_load_stats,
        print_query_answer, LoadOptions,
    },
    completion::create_completion_client,
    config::Config,
    embed::create_embedder,
    error::Result,
    progress::LogWriterFactory,
    store::PgVectorStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pgrag")]
#[command(version, about = "PDF retrieval-augmented generation on PostgreSQL + pgvector", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "PGRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Load a directory of PDFs into the database
    Load {
        /// Directory containing PDF files
        #[arg(default_value = "data")]
        dir: PathBuf,

        /// Drop the chunk table before loading
        #[arg(long)]
        reset: bool,
    },

    /// Answer a question from the stored chunks
    Query {
        /// The question to answer
        question: String,

        /// Number of chunks used as context
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Check that the database is reachable
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => {
            let base_dir = cli.config.as_deref().and_then(|p| p.parent()).map(PathBuf::from);
            let path = cmd_init(base_dir, force)?;
            println!("✓ pgrag initialized");
            println!("  Config: {}", path.display());
            println!("\nNext steps:");
            println!("  1. Edit the config file (database, embedding and completion settings)");
            println!("  2. Export DB_PASS and OPENAI_API_KEY");
            println!("  3. Check the database: pgrag check");
            println!("  4. Load PDFs: pgrag load ./data");
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "pgrag", &mut std::io::stdout());
        }

        Commands::Check => {
            let config = Config::load_or_default(cli.config.as_deref())?;
            let report = cmd_check(&config.database).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_connection_report(&report);
            }

            if !report.connected {
                std::process::exit(1);
            }
        }

        Commands::Load { dir, reset } => {
            let config = Config::load_or_default(cli.config.as_deref())?;
            let embedder = create_embedder(&config.embedding)?;
            let store = PgVectorStore::connect(&config).await?;

            let options = LoadOptions {
                dir,
                reset,
                show_progress: !cli.json,
            };
            let result = cmd_load(&config, &store, embedder.as_ref(), &options).await;
            store.close().await;
            let stats = result?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_load_stats(&stats);
            }
        }

        Commands::Query { question, limit } => {
            let config = Config::load_or_default(cli.config.as_deref())?;
            let embedder = create_embedder(&config.embedding)?;
            let completion = create_completion_client(&config.completion)?;
            let store = PgVectorStore::connect(&config).await?;

            let result = cmd_query(
                &config,
                &store,
                embedder.as_ref(),
                completion.as_ref(),
                &question,
                limit,
            )
            .await;
            store.close().await;
            let answer = result?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print_query_answer(&answer);
            }
        }
    }

    Ok(())
}
