//! Pipeline orchestration.
//!
//! Runs schema initialization → CSV extraction → enrichment → normalization
//! → load. Setup, extraction and load failures abort the run; enrichment
//! problems only degrade the affected movies.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::db;
use crate::enrich::{self, MetadataSource, OmdbClient};
use crate::load::{self, LoadSummary};
use crate::normalize;
use crate::progress::ProgressMode;
use crate::schema;
use crate::source;

/// Per-run overrides coming from the command line.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Skip enrichment even when a credential is configured.
    pub skip_enrichment: bool,
    /// Overrides `enrichment.concurrency`.
    pub concurrency: Option<usize>,
    pub progress: ProgressMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            skip_enrichment: false,
            concurrency: None,
            progress: ProgressMode::Off,
        }
    }
}

/// Counts describing one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub movies_extracted: usize,
    pub ratings_extracted: usize,
    pub enriched: bool,
    pub genres: usize,
    pub load: LoadSummary,
}

/// `mpipe run`: build the OMDb client from config and run every step.
pub async fn run_pipeline(config: &Config, opts: RunOptions) -> Result<RunSummary> {
    let client = if opts.skip_enrichment {
        None
    } else {
        OmdbClient::from_config(&config.enrichment)?
    };
    let metadata = client.as_ref().map(|c| c as &dyn MetadataSource);

    let summary = run_pipeline_with_source(config, metadata, opts).await?;

    println!("run");
    println!("  movies extracted: {}", summary.movies_extracted);
    println!("  ratings extracted: {}", summary.ratings_extracted);
    println!(
        "  enrichment: {}",
        if summary.enriched { "omdb" } else { "skipped" }
    );
    println!("  genres: {}", summary.genres);
    println!("  genres inserted: {}", summary.load.genres_inserted);
    println!("  movies inserted: {}", summary.load.movies_inserted);
    println!("  movie_genres written: {}", summary.load.movie_genres_written);
    println!("  ratings written: {}", summary.load.ratings_written);
    println!("ok");

    Ok(summary)
}

/// Run every step against an explicit metadata source (`None` skips
/// enrichment).
pub async fn run_pipeline_with_source(
    config: &Config,
    metadata: Option<&dyn MetadataSource>,
    opts: RunOptions,
) -> Result<RunSummary> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool)
        .await
        .context("Schema initialization failed")?;
    tracing::info!(db = %config.db.path.display(), "Schema ready");

    let extracted =
        source::read_sources(&config.inputs).context("Failed to extract source data")?;
    let movies_extracted = extracted.movies.len();
    let ratings_extracted = extracted.ratings.len();

    let concurrency = opts.concurrency.unwrap_or(config.enrichment.concurrency);
    let reporter = opts.progress.reporter();
    let enriched = enrich::enrich_movies(extracted.movies, metadata, concurrency, reporter.as_ref())
        .await;

    let existing = load::existing_genres(&pool).await?;
    let tables = normalize::normalize(&enriched, extracted.ratings, &existing);
    tracing::info!(
        movies = tables.movies.len(),
        genres = tables.genres.len(),
        movie_genres = tables.movie_genres.len(),
        ratings = tables.ratings.len(),
        "Transformation complete"
    );

    let loaded = load::load_tables(&pool, &tables).await?;
    tracing::info!(?loaded, "Load complete");

    pool.close().await;

    Ok(RunSummary {
        movies_extracted,
        ratings_extracted,
        enriched: metadata.is_some(),
        genres: tables.genres.len(),
        load: loaded,
    })
}
