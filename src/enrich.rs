//! Metadata enrichment via the OMDb API.
//!
//! Every movie gets exactly one lookup keyed by its formatted IMDb id
//! (`tt` + at least seven digits). A lookup that reports "not found" or fails
//! in transport yields the all-[`UNAVAILABLE`] record for that movie only, so
//! the output always has one entry per input movie, in input order.
//!
//! Lookups are issued through the [`MetadataSource`] trait with a bounded
//! number in flight at once. When no credential is configured the whole step
//! is skipped and movies pass through with `enrichment: None`.
//!
//! # Response handling
//!
//! | OMDb reply | Result |
//! |------------|--------|
//! | `Response: "True"` | [`Lookup::Found`], absent fields become `"N/A"` |
//! | `Response: "False"` | [`Lookup::NotFound`] |
//! | HTTP error status / network error | `Err`, logged, sentinel used |

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::EnrichmentConfig;
use crate::models::{EnrichedMovie, Enrichment, MovieRecord, UNAVAILABLE};
use crate::progress::{EnrichProgressEvent, ProgressReporter};

/// Prefix of every IMDb title id.
pub const IMDB_PREFIX: &str = "tt";

/// Minimum digit count of an IMDb title id.
pub const IMDB_DIGITS: usize = 7;

/// Format a raw numeric IMDb id: `114709` → `"tt0114709"`.
///
/// Ids wider than seven digits are kept whole.
pub fn format_imdb_id(raw: u64) -> String {
    format!("{}{:0width$}", IMDB_PREFIX, raw, width = IMDB_DIGITS)
}

/// Outcome of a successful round trip to the metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Enrichment),
    NotFound,
}

/// A remote source of movie metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up one movie by its formatted IMDb id.
    ///
    /// `Err` means the service could not be reached or replied with garbage;
    /// a clean "no such title" answer is `Ok(Lookup::NotFound)`.
    async fn lookup(&self, imdb_id: &str) -> Result<Lookup>;
}

/// HTTP client for `GET {base_url}?apikey=..&i=tt..`.
pub struct OmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when no credential is configured, which callers
    /// treat as "skip enrichment".
    pub fn from_config(config: &EnrichmentConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.credential() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Some(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: api_key.to_string(),
        }))
    }
}

#[async_trait]
impl MetadataSource for OmdbClient {
    async fn lookup(&self, imdb_id: &str) -> Result<Lookup> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("i", imdb_id)])
            .send()
            .await?
            .error_for_status()?;

        let json: Value = response.json().await?;
        Ok(parse_omdb_response(&json))
    }
}

/// Interpret an OMDb JSON reply.
pub fn parse_omdb_response(json: &Value) -> Lookup {
    if json.get("Response").and_then(Value::as_str) != Some("True") {
        return Lookup::NotFound;
    }

    let field = |name: &str| {
        json.get(name)
            .and_then(Value::as_str)
            .unwrap_or(UNAVAILABLE)
            .to_string()
    };

    Lookup::Found(Enrichment {
        director: field("Director"),
        plot: field("Plot"),
        box_office: field("BoxOffice"),
    })
}

/// Enrich every movie, or pass them through untouched when `source` is `None`.
pub async fn enrich_movies(
    movies: Vec<MovieRecord>,
    source: Option<&dyn MetadataSource>,
    concurrency: usize,
    reporter: &dyn ProgressReporter,
) -> Vec<EnrichedMovie> {
    let Some(source) = source else {
        tracing::warn!("No OMDb API key configured, skipping enrichment");
        return movies
            .into_iter()
            .map(|movie| EnrichedMovie {
                imdb_id: format_imdb_id(movie.imdb_id),
                movie,
                enrichment: None,
            })
            .collect();
    };

    let total = movies.len() as u64;
    reporter.report(EnrichProgressEvent::Started { total });

    let started = Instant::now();
    let completed = AtomicU64::new(0);

    let enriched: Vec<EnrichedMovie> = stream::iter(movies)
        .map(|movie| {
            let completed = &completed;
            async move {
                let imdb_id = format_imdb_id(movie.imdb_id);
                let enrichment = lookup_or_sentinel(source, &imdb_id).await;

                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                let elapsed = started.elapsed().as_secs_f64().max(1e-3);
                reporter.report(EnrichProgressEvent::Lookup {
                    n,
                    total,
                    rate: n as f64 / elapsed,
                });

                EnrichedMovie {
                    movie,
                    imdb_id,
                    enrichment: Some(enrichment),
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    tracing::info!(
        movies = enriched.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Enrichment complete"
    );

    enriched
}

async fn lookup_or_sentinel(source: &dyn MetadataSource, imdb_id: &str) -> Enrichment {
    match source.lookup(imdb_id).await {
        Ok(Lookup::Found(enrichment)) => enrichment,
        Ok(Lookup::NotFound) => {
            tracing::debug!(imdb_id, "Title not found");
            Enrichment::unavailable()
        }
        Err(e) => {
            tracing::warn!(imdb_id, error = %e, "Metadata lookup failed");
            Enrichment::unavailable()
        }
    }
}
