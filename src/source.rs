//! CSV extraction.
//!
//! Reads `movies.csv`, `links.csv` and `ratings.csv`, then inner-joins movies
//! with links on `movieId` so each surviving movie carries its IMDb id.
//! Movies without a link row are dropped. Any unreadable or malformed file is
//! fatal and the error names the file.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::config::InputsConfig;
use crate::models::{MovieRecord, Rating};

#[derive(Debug, Deserialize)]
struct MovieCsvRow {
    #[serde(rename = "movieId")]
    movie_id: i64,
    title: String,
    #[serde(default)]
    genres: String,
}

#[derive(Debug, Deserialize)]
struct LinkCsvRow {
    #[serde(rename = "movieId")]
    movie_id: i64,
    #[serde(rename = "imdbId")]
    imdb_id: u64,
}

/// Output of the extraction step.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub movies: Vec<MovieRecord>,
    pub ratings: Vec<Rating>,
}

/// Read all three inputs and join movies with their IMDb ids.
pub fn read_sources(inputs: &InputsConfig) -> Result<Extracted> {
    let movie_rows: Vec<MovieCsvRow> = read_csv(&inputs.movies, "movies")?;
    let link_rows: Vec<LinkCsvRow> = read_csv(&inputs.links, "links")?;
    let ratings: Vec<Rating> = read_csv(&inputs.ratings, "ratings")?;

    let movies = join_links(movie_rows, &link_rows);

    tracing::info!(
        movies = movies.len(),
        ratings = ratings.len(),
        "Extracted source data"
    );

    Ok(Extracted { movies, ratings })
}

fn read_csv<T: DeserializeOwned>(path: &Path, label: &str) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {} file: {}", label, path.display()))?;

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<T>().enumerate() {
        // +2: one for the header line, one for 1-based numbering
        let row: T = record.with_context(|| {
            format!(
                "Failed to parse {} file {} at line {}",
                label,
                path.display(),
                idx + 2
            )
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Inner join on `movieId`, keeping movie order. If a movie has several link
/// rows the first one wins.
fn join_links(movies: Vec<MovieCsvRow>, links: &[LinkCsvRow]) -> Vec<MovieRecord> {
    let mut imdb_by_movie: HashMap<i64, u64> = HashMap::with_capacity(links.len());
    for link in links {
        if imdb_by_movie.contains_key(&link.movie_id) {
            tracing::warn!(movie_id = link.movie_id, "Duplicate link row ignored");
            continue;
        }
        imdb_by_movie.insert(link.movie_id, link.imdb_id);
    }

    movies
        .into_iter()
        .filter_map(|row| {
            imdb_by_movie.get(&row.movie_id).map(|&imdb_id| MovieRecord {
                movie_id: row.movie_id,
                imdb_id,
                title: row.title,
                genres: row.genres,
            })
        })
        .collect()
}
