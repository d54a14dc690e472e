//! # Movie Pipeline CLI (`mpipe`)
//!
//! Loads a MovieLens catalog (`movies.csv`, `links.csv`, `ratings.csv`),
//! enriches it with OMDb metadata, and writes a normalized SQLite database.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mpipe init` | Create the SQLite database and its tables |
//! | `mpipe run` | Extract, enrich, normalize and load |
//! | `mpipe stats` | Print row counts of the loaded tables |
//!
//! ## Examples
//!
//! ```bash
//! mpipe init --config ./config/pipeline.toml
//! OMDB_API_KEY=... mpipe run --concurrency 8
//! mpipe run --no-enrich
//! mpipe stats
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_pipeline::config;
use movie_pipeline::pipeline::{self, RunOptions};
use movie_pipeline::progress::ProgressMode;
use movie_pipeline::schema;
use movie_pipeline::stats;

/// Movie Pipeline — batch loader for MovieLens catalogs.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with `[db]`, `[inputs]` and `[enrichment]` sections.
#[derive(Parser)]
#[command(
    name = "mpipe",
    about = "Load MovieLens CSVs, enriched with OMDb metadata, into a normalized SQLite database",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pipeline.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the database file and the movies, ratings, genres and
    /// movie_genres tables. Safe to run repeatedly.
    Init,

    /// Run the full pipeline.
    ///
    /// Re-running against unchanged input leaves the database unchanged.
    Run {
        /// Skip OMDb enrichment even if an API key is configured.
        #[arg(long)]
        no_enrich: bool,

        /// Maximum number of OMDb lookups in flight (overrides config).
        #[arg(long)]
        concurrency: Option<usize>,

        /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Show row counts of the loaded tables.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mpipe=info,movie_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            schema::run_init(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Run {
            no_enrich,
            concurrency,
            progress,
        } => {
            if concurrency == Some(0) {
                anyhow::bail!("--concurrency must be > 0");
            }
            let opts = RunOptions {
                skip_enrichment: no_enrich,
                concurrency,
                progress: progress.unwrap_or_else(ProgressMode::default_for_tty),
            };
            pipeline::run_pipeline(&cfg, opts).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
