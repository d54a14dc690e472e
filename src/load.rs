//! Loading normalized tables into SQLite.
//!
//! Two write policies:
//!
//! | Table | Policy |
//! |-------|--------|
//! | `genres`, `movies` | insert-if-absent by primary key (`INSERT OR IGNORE`); existing rows are never updated |
//! | `movie_genres`, `ratings` | full replace: delete every row, then insert the current run's rows |
//!
//! All four writes share one transaction. If any statement fails the
//! transaction is rolled back and the store is left exactly as it was.
//! `None` fields are bound as SQL `NULL`.

use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;

use crate::models::{Genre, MovieGenre, MovieRow, Rating, Tables};

/// Rows written per table by one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub genres_inserted: u64,
    pub movies_inserted: u64,
    pub movie_genres_written: u64,
    pub ratings_written: u64,
}

/// Genre name → id as currently stored.
pub async fn existing_genres(pool: &SqlitePool) -> Result<HashMap<String, i64>> {
    let rows: Vec<(i64, Option<String>)> =
        sqlx::query_as("SELECT genreId, genre_name FROM genres")
            .fetch_all(pool)
            .await
            .context("Failed to read existing genres")?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, name)| name.map(|n| (n, id)))
        .collect())
}

/// Write all four tables atomically.
pub async fn load_tables(pool: &SqlitePool, tables: &Tables) -> Result<LoadSummary> {
    let mut tx = pool.begin().await?;

    let summary = LoadSummary {
        genres_inserted: insert_genres(&mut tx, &tables.genres)
            .await
            .context("Failed to load genres")?,
        movies_inserted: insert_movies(&mut tx, &tables.movies)
            .await
            .context("Failed to load movies")?,
        movie_genres_written: replace_movie_genres(&mut tx, &tables.movie_genres)
            .await
            .context("Failed to load movie_genres")?,
        ratings_written: replace_ratings(&mut tx, &tables.ratings)
            .await
            .context("Failed to load ratings")?,
    };

    tx.commit().await.context("Failed to commit load")?;
    Ok(summary)
}

async fn insert_genres(tx: &mut Transaction<'_, Sqlite>, genres: &[Genre]) -> Result<u64> {
    let mut inserted = 0;
    for genre in genres {
        let result =
            sqlx::query("INSERT OR IGNORE INTO genres (genreId, genre_name) VALUES (?, ?)")
                .bind(genre.genre_id)
                .bind(&genre.genre_name)
                .execute(&mut **tx)
                .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

async fn insert_movies(tx: &mut Transaction<'_, Sqlite>, movies: &[MovieRow]) -> Result<u64> {
    let mut inserted = 0;
    for movie in movies {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO movies (movieId, imdbId, title, release_year, director, plot, box_office)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(movie.movie_id)
        .bind(&movie.imdb_id)
        .bind(&movie.title)
        .bind(movie.release_year)
        .bind(&movie.director)
        .bind(&movie.plot)
        .bind(&movie.box_office)
        .execute(&mut **tx)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

async fn replace_movie_genres(
    tx: &mut Transaction<'_, Sqlite>,
    links: &[MovieGenre],
) -> Result<u64> {
    sqlx::query("DELETE FROM movie_genres")
        .execute(&mut **tx)
        .await?;

    for link in links {
        sqlx::query("INSERT INTO movie_genres (movieId, genreId) VALUES (?, ?)")
            .bind(link.movie_id)
            .bind(link.genre_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(links.len() as u64)
}

async fn replace_ratings(tx: &mut Transaction<'_, Sqlite>, ratings: &[Rating]) -> Result<u64> {
    sqlx::query("DELETE FROM ratings").execute(&mut **tx).await?;

    for rating in ratings {
        sqlx::query("INSERT INTO ratings (userId, movieId, rating, timestamp) VALUES (?, ?, ?, ?)")
            .bind(rating.user_id)
            .bind(rating.movie_id)
            .bind(rating.rating)
            .bind(rating.timestamp)
            .execute(&mut **tx)
            .await?;
    }
    Ok(ratings.len() as u64)
}
