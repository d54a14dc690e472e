//! TOML configuration parsing.
//!
//! The whole run is described by one [`Config`] value that is built once in
//! [`load_config`] and passed by reference into every pipeline stage. The OMDb
//! credential may come from the file or, as a fallback, from the
//! `OMDB_API_KEY` environment variable; the fallback is resolved here and
//! nowhere else.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted when `enrichment.api_key` is not set.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Locations of the three MovieLens CSV files.
#[derive(Debug, Deserialize, Clone)]
pub struct InputsConfig {
    #[serde(default = "default_movies_path")]
    pub movies: PathBuf,
    #[serde(default = "default_ratings_path")]
    pub ratings: PathBuf,
    #[serde(default = "default_links_path")]
    pub links: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            movies: default_movies_path(),
            ratings: default_ratings_path(),
            links: default_links_path(),
        }
    }
}

fn default_movies_path() -> PathBuf {
    PathBuf::from("./data/movies.csv")
}
fn default_ratings_path() -> PathBuf {
    PathBuf::from("./data/ratings.csv")
}
fn default_links_path() -> PathBuf {
    PathBuf::from("./data/links.csv")
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichmentConfig {
    /// OMDb API key. Enrichment is skipped when this is absent or empty.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum number of lookups in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://www.omdbapi.com/".to_string()
}
fn default_concurrency() -> usize {
    4
}
fn default_timeout_secs() -> u64 {
    10
}

impl EnrichmentConfig {
    /// The credential, if one is configured and non-empty.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.credential().is_some()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;

    if config.enrichment.credential().is_none() {
        config.enrichment.api_key = std::env::var(API_KEY_ENV).ok();
    }

    Ok(config)
}

/// Parse and validate configuration text without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.enrichment.concurrency == 0 {
        anyhow::bail!("enrichment.concurrency must be > 0");
    }

    if config.enrichment.timeout_secs == 0 {
        anyhow::bail!("enrichment.timeout_secs must be > 0");
    }

    if config.enrichment.base_url.trim().is_empty() {
        anyhow::bail!("enrichment.base_url must not be empty");
    }

    Ok(config)
}
