//! Idempotent creation of the four target tables.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Table definitions, applied in order. Every statement is a no-op when the
/// object already exists.
const SCHEMA: &[(&str, &str)] = &[
    (
        "movies",
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            movieId INTEGER PRIMARY KEY,
            imdbId TEXT NOT NULL,
            title TEXT NOT NULL,
            release_year INTEGER,
            director TEXT,
            plot TEXT,
            box_office TEXT
        )
        "#,
    ),
    (
        "ratings",
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            userId INTEGER NOT NULL,
            movieId INTEGER NOT NULL,
            rating REAL,
            timestamp INTEGER
        )
        "#,
    ),
    (
        "genres",
        r#"
        CREATE TABLE IF NOT EXISTS genres (
            genreId INTEGER PRIMARY KEY,
            genre_name TEXT UNIQUE
        )
        "#,
    ),
    (
        "movie_genres",
        r#"
        CREATE TABLE IF NOT EXISTS movie_genres (
            movieId INTEGER NOT NULL,
            genreId INTEGER NOT NULL
        )
        "#,
    ),
    (
        "idx_movie_genres_movie",
        "CREATE INDEX IF NOT EXISTS idx_movie_genres_movie ON movie_genres(movieId)",
    ),
    (
        "idx_ratings_movie",
        "CREATE INDEX IF NOT EXISTS idx_ratings_movie ON ratings(movieId)",
    ),
];

/// Names of the tables the pipeline writes, in load order.
pub const TABLES: [&str; 4] = ["genres", "movies", "movie_genres", "ratings"];

/// Ensure every table and index exists on an open pool.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    for (name, ddl) in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create schema object '{}'", name))?;
    }
    Ok(())
}

/// `mpipe init`: open (or create) the database and apply the schema.
pub async fn run_init(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}
