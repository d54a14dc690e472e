//! # Movie Pipeline
//!
//! Batch ETL for MovieLens-style catalogs: reads `movies.csv`, `links.csv`
//! and `ratings.csv`, enriches every movie with OMDb metadata, normalizes
//! the pipe-delimited genre column into a dimension and a junction table, and
//! loads everything into SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌─────────────┐   ┌──────────┐
//! │  CSV      │──▶│  OMDb     │──▶│  Normalize  │──▶│  SQLite  │
//! │  source   │   │  enrich   │   │  genres/ids │   │  load    │
//! └───────────┘   └───────────┘   └─────────────┘   └──────────┘
//! ```
//!
//! `genres` and `movies` are loaded insert-if-absent, `movie_genres` and
//! `ratings` are fully replaced, and all four writes commit in a single
//! transaction.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`schema`] | Idempotent table creation |
//! | [`source`] | CSV extraction and join |
//! | [`enrich`] | OMDb lookups |
//! | [`progress`] | Enrichment progress reporting |
//! | [`normalize`] | Title/year cleanup, genre explosion |
//! | [`load`] | Transactional load |
//! | [`pipeline`] | Step sequencing |
//! | [`stats`] | Table row counts |

pub mod config;
pub mod db;
pub mod enrich;
pub mod load;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod source;
pub mod stats;
