//! End-to-end tests against a mock OMDb server.
//!
//! The mock answers `GET /?apikey=..&i=..` the way the real service does:
//! a full record for a known title, `Response: "False"` for an unknown one,
//! and an HTTP 500 for one id to simulate a transport failure.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use movie_pipeline::config::{parse_config, Config};
use movie_pipeline::enrich::{Lookup, MetadataSource, OmdbClient};
use movie_pipeline::models::UNAVAILABLE;
use movie_pipeline::pipeline::{run_pipeline_with_source, RunOptions};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use tempfile::TempDir;

const API_KEY: &str = "test-key";

// ─── Mock server ────────────────────────────────────────────────────

async fn omdb(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("apikey").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "Response": "False", "Error": "Invalid API key!" })),
        )
            .into_response();
    }

    match params.get("i").map(String::as_str) {
        Some("tt0114709") => Json(json!({
            "Title": "Toy Story",
            "Year": "1995",
            "Director": "John Lasseter",
            "Plot": "A cowboy doll is profoundly threatened and jealous when a new spaceman action figure supplants him as top toy in a boy's bedroom.",
            "BoxOffice": "$223,225,679",
            "Response": "True"
        }))
        .into_response(),
        Some("tt0113228") => Json(json!({
            "Title": "Grumpier Old Men",
            "Director": "Howard Deutch",
            "Response": "True"
        }))
        .into_response(),
        Some("tt0113497") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(json!({ "Response": "False", "Error": "Incorrect IMDb ID." })).into_response(),
    }
}

async fn start_mock_omdb() -> SocketAddr {
    let app = Router::new().route("/", get(omdb));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// ─── Helpers ────────────────────────────────────────────────────────

fn write_inputs(tmp: &TempDir, movies: &str) {
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("movies.csv"), movies).unwrap();
    fs::write(
        data.join("links.csv"),
        "movieId,imdbId,tmdbId\n1,114709,862\n2,113497,8844\n3,113228,15602\n4,112453,\n",
    )
    .unwrap();
    fs::write(
        data.join("ratings.csv"),
        "userId,movieId,rating,timestamp\n1,1,4.0,964982703\n1,3,4.0,964981247\n",
    )
    .unwrap();
}

fn test_config(tmp: &TempDir, addr: Option<SocketAddr>) -> Config {
    let root = tmp.path();
    let mut content = format!(
        r#"
[db]
path = "{root}/movies.sqlite"

[inputs]
movies = "{root}/data/movies.csv"
ratings = "{root}/data/ratings.csv"
links = "{root}/data/links.csv"
"#,
        root = root.display()
    );
    if let Some(addr) = addr {
        content.push_str(&format!(
            r#"
[enrichment]
api_key = "{}"
base_url = "http://{}/"
concurrency = 2
timeout_secs = 5
"#,
            API_KEY, addr
        ));
    }
    parse_config(&content).unwrap()
}

const MOVIES_CSV: &str = "movieId,title,genres
1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy
2,Jumanji (1995),Adventure|Children|Fantasy
3,Grumpier Old Men (1995),Comedy|Romance
4,Clueless,Comedy|Romance
";

type MovieDbRow = (
    i64,
    String,
    String,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
);

async fn movie_rows(cfg: &Config) -> Vec<MovieDbRow> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}", cfg.db.path.display()))
        .await
        .unwrap();
    let rows = sqlx::query_as(
        "SELECT movieId, imdbId, title, release_year, director, plot, box_office FROM movies ORDER BY movieId",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    pool.close().await;
    rows
}

async fn genre_ids(cfg: &Config) -> HashMap<String, i64> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}", cfg.db.path.display()))
        .await
        .unwrap();
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT genreId, genre_name FROM genres")
        .fetch_all(&pool)
        .await
        .unwrap();
    pool.close().await;
    rows.into_iter().map(|(id, name)| (name, id)).collect()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn omdb_client_maps_responses() {
    let addr = start_mock_omdb().await;
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp, Some(addr));
    let client = OmdbClient::from_config(&cfg.enrichment).unwrap().unwrap();

    match client.lookup("tt0114709").await.unwrap() {
        Lookup::Found(e) => {
            assert_eq!(e.director, "John Lasseter");
            assert_eq!(e.box_office, "$223,225,679");
        }
        other => panic!("expected Found, got {:?}", other),
    }
    assert_eq!(client.lookup("tt9999999").await.unwrap(), Lookup::NotFound);
    assert!(client.lookup("tt0113497").await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_key_is_a_lookup_error() {
    let addr = start_mock_omdb().await;
    let tmp = TempDir::new().unwrap();
    let mut cfg = test_config(&tmp, Some(addr));
    cfg.enrichment.api_key = Some("wrong".to_string());
    let client = OmdbClient::from_config(&cfg.enrichment).unwrap().unwrap();

    assert!(client.lookup("tt0114709").await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_with_partial_enrichment() {
    let addr = start_mock_omdb().await;
    let tmp = TempDir::new().unwrap();
    write_inputs(&tmp, MOVIES_CSV);
    let cfg = test_config(&tmp, Some(addr));
    let client = OmdbClient::from_config(&cfg.enrichment).unwrap().unwrap();

    let metadata: &dyn MetadataSource = &client;
    let summary = run_pipeline_with_source(&cfg, Some(metadata), RunOptions::default())
        .await
        .unwrap();
    assert!(summary.enriched);
    assert_eq!(summary.load.movies_inserted, 4);

    let rows = movie_rows(&cfg).await;
    assert_eq!(rows.len(), 4);

    let (id, imdb, title, year, director, plot, box_office) = &rows[0];
    assert_eq!((*id, imdb.as_str(), title.as_str()), (1, "tt0114709", "Toy Story"));
    assert_eq!(*year, Some(1995));
    assert_eq!(director.as_deref(), Some("John Lasseter"));
    assert!(plot.as_deref().unwrap().starts_with("A cowboy doll"));
    assert_eq!(box_office.as_deref(), Some("$223,225,679"));

    // HTTP 500 → sentinel for that movie only
    assert_eq!(rows[1].4.as_deref(), Some(UNAVAILABLE));
    assert_eq!(rows[1].6.as_deref(), Some(UNAVAILABLE));

    // found, but without plot or box office
    assert_eq!(rows[2].4.as_deref(), Some("Howard Deutch"));
    assert_eq!(rows[2].5.as_deref(), Some(UNAVAILABLE));

    // not found; no year in title
    assert_eq!(rows[3].2, "Clueless");
    assert_eq!(rows[3].3, None);
    assert_eq!(rows[3].4.as_deref(), Some(UNAVAILABLE));
}

#[tokio::test]
async fn pipeline_without_enrichment_uses_sentinel() {
    let tmp = TempDir::new().unwrap();
    write_inputs(&tmp, MOVIES_CSV);
    let cfg = test_config(&tmp, None);

    let summary = run_pipeline_with_source(&cfg, None, RunOptions::default())
        .await
        .unwrap();
    assert!(!summary.enriched);

    let rows = movie_rows(&cfg).await;
    assert_eq!(rows[0].1, "tt0114709");
    assert_eq!(rows[0].2, "Toy Story");
    for row in &rows {
        assert_eq!(row.4.as_deref(), Some(UNAVAILABLE));
        assert_eq!(row.5.as_deref(), Some(UNAVAILABLE));
        assert_eq!(row.6.as_deref(), Some(UNAVAILABLE));
    }
}

#[tokio::test]
async fn genre_ids_survive_reordered_input() {
    let tmp = TempDir::new().unwrap();
    write_inputs(&tmp, MOVIES_CSV);
    let cfg = test_config(&tmp, None);

    run_pipeline_with_source(&cfg, None, RunOptions::default())
        .await
        .unwrap();
    let before = genre_ids(&cfg).await;
    assert_eq!(before["Adventure"], 1);
    assert_eq!(before.len(), 6);

    // same catalog, different order, plus one new genre
    write_inputs(
        &tmp,
        "movieId,title,genres
4,Clueless,Romance|Comedy|Musical
3,Grumpier Old Men (1995),Comedy|Romance
2,Jumanji (1995),Fantasy|Children|Adventure
1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy
",
    );
    let summary = run_pipeline_with_source(&cfg, None, RunOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.load.genres_inserted, 1);

    let after = genre_ids(&cfg).await;
    assert_eq!(after.len(), 7);
    for (name, id) in &before {
        assert_eq!(after[name], *id, "genre {} changed id", name);
    }
    assert_eq!(after["Musical"], 7);
}
