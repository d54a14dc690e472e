//! Normalization of enriched movies into the four output relations.
//!
//! ```text
//!  EnrichedMovie ──┬─▶ project_movies ─────────────────────────▶ movies
//!                  └─▶ explode_genres ──┬─▶ build_genres ──────▶ genres
//!                                       └─▶ build_movie_genres ▶ movie_genres
//!  Rating ────────────────────────────────────────────────────▶ ratings
//! ```
//!
//! Everything here is pure and total: malformed input degrades to `None`
//! rather than an error.
//!
//! Genre ids are stable across runs. Names already present in the store keep
//! their stored id; new names are numbered after the largest known id in
//! order of first appearance, which on an empty store is `1, 2, 3, ...`.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::models::{EnrichedMovie, Genre, MovieGenre, MovieRow, Rating, Tables, UNAVAILABLE};

/// Separator of the `genres` column.
pub const GENRE_DELIMITER: char = '|';

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("valid year regex"));

static TRAILING_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \(\d{4}\)$").expect("valid trailing year regex"));

/// First `(dddd)` in the title, as a year.
pub fn extract_year(title: &str) -> Option<i32> {
    YEAR_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Strip a trailing ` (dddd)` from the title. Anything else is left alone.
pub fn clean_title(title: &str) -> String {
    TRAILING_YEAR_RE.replace(title, "").into_owned()
}

/// One `(movie_id, token)` per delimiter-separated token, duplicates kept.
pub fn explode_genres(movies: &[EnrichedMovie]) -> Vec<(i64, String)> {
    movies
        .iter()
        .flat_map(|m| {
            m.movie
                .genres
                .split(GENRE_DELIMITER)
                .map(move |token| (m.movie.movie_id, token.to_string()))
        })
        .collect()
}

/// Build the genre dimension from exploded tokens.
///
/// `existing` maps names already stored to their ids. Every distinct token
/// appears exactly once in the result, in first-appearance order.
pub fn build_genres(exploded: &[(i64, String)], existing: &HashMap<String, i64>) -> Vec<Genre> {
    let mut next_id = existing.values().copied().max().unwrap_or(0) + 1;
    let mut seen: HashSet<&str> = HashSet::new();
    let mut genres = Vec::new();

    for (_, name) in exploded {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let genre_id = match existing.get(name) {
            Some(&id) => id,
            None => {
                let id = next_id;
                next_id += 1;
                id
            }
        };
        genres.push(Genre {
            genre_id,
            genre_name: name.clone(),
        });
    }

    genres
}

/// Resolve tokens to genre ids and drop duplicate pairs, keeping first-seen order.
pub fn build_movie_genres(exploded: &[(i64, String)], genres: &[Genre]) -> Vec<MovieGenre> {
    let id_by_name: HashMap<&str, i64> = genres
        .iter()
        .map(|g| (g.genre_name.as_str(), g.genre_id))
        .collect();

    let mut seen = HashSet::new();
    exploded
        .iter()
        .filter_map(|(movie_id, name)| {
            id_by_name.get(name.as_str()).map(|&genre_id| MovieGenre {
                movie_id: *movie_id,
                genre_id,
            })
        })
        .filter(|pair| seen.insert(*pair))
        .collect()
}

/// Final `movies` projection. Movies that were never enriched get `"N/A"` for
/// director, plot and box office.
pub fn project_movies(movies: &[EnrichedMovie]) -> Vec<MovieRow> {
    movies
        .iter()
        .map(|m| {
            let (director, plot, box_office) = match &m.enrichment {
                Some(e) => (e.director.clone(), e.plot.clone(), e.box_office.clone()),
                None => (
                    UNAVAILABLE.to_string(),
                    UNAVAILABLE.to_string(),
                    UNAVAILABLE.to_string(),
                ),
            };
            MovieRow {
                movie_id: m.movie.movie_id,
                imdb_id: m.imdb_id.clone(),
                title: clean_title(&m.movie.title),
                release_year: extract_year(&m.movie.title),
                director: Some(director),
                plot: Some(plot),
                box_office: Some(box_office),
            }
        })
        .collect()
}

/// Run every normalization step.
pub fn normalize(
    movies: &[EnrichedMovie],
    ratings: Vec<Rating>,
    existing_genres: &HashMap<String, i64>,
) -> Tables {
    let exploded = explode_genres(movies);
    let genres = build_genres(&exploded, existing_genres);
    let movie_genres = build_movie_genres(&exploded, &genres);

    Tables {
        movies: project_movies(movies),
        ratings,
        genres,
        movie_genres,
    }
}
