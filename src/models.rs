//! Core data models flowing through the pipeline.
//!
//! Records are read from CSV, optionally enriched, normalized into the four
//! output relations ([`MovieRow`], [`Rating`], [`Genre`], [`MovieGenre`]) and
//! written to SQLite. `None` is the data layer's missing-value marker and is
//! stored as SQL `NULL`; [`UNAVAILABLE`] is a real value meaning "the metadata
//! service could not supply this".

use serde::Deserialize;

/// Placeholder for metadata the enrichment service could not provide.
pub const UNAVAILABLE: &str = "N/A";

/// A movie joined with its cross-reference entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub movie_id: i64,
    /// Raw numeric IMDb id as found in `links.csv`.
    pub imdb_id: u64,
    /// Display title, usually ending in `(yyyy)`.
    pub title: String,
    /// Pipe-delimited genre list.
    pub genres: String,
}

/// Supplemental attributes from the metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub director: String,
    pub plot: String,
    pub box_office: String,
}

impl Enrichment {
    /// The all-sentinel record used for not-found and failed lookups.
    pub fn unavailable() -> Self {
        Self {
            director: UNAVAILABLE.to_string(),
            plot: UNAVAILABLE.to_string(),
            box_office: UNAVAILABLE.to_string(),
        }
    }
}

/// A movie after the enrichment step.
///
/// `enrichment` is `None` when enrichment was skipped for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMovie {
    pub movie: MovieRecord,
    pub imdb_id: String,
    pub enrichment: Option<Enrichment>,
}

/// Final projection of a movie, one row of the `movies` table.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRow {
    pub movie_id: i64,
    pub imdb_id: String,
    pub title: String,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub box_office: Option<String>,
}

/// One row of `ratings.csv` and of the `ratings` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rating {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub rating: Option<f64>,
    pub timestamp: Option<i64>,
}

/// A row of the genre dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub genre_id: i64,
    pub genre_name: String,
}

/// A row of the movie/genre junction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovieGenre {
    pub movie_id: i64,
    pub genre_id: i64,
}

/// The four relations produced by normalization, ready to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub movies: Vec<MovieRow>,
    pub ratings: Vec<Rating>,
    pub genres: Vec<Genre>,
    pub movie_genres: Vec<MovieGenre>,
}
