//! Row counts for the loaded tables.
//!
//! Used by `mpipe stats` to check what the last run left in the store.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::schema::{self, TABLES};

/// Row count per table, in load order.
pub async fn table_counts(pool: &SqlitePool) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
        counts.push((table, n));
    }
    Ok(counts)
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    schema::ensure_schema(&pool).await?;
    let counts = table_counts(&pool).await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Movie Pipeline — Database Stats");
    println!("===============================");
    println!();
    println!("  Database:      {}", config.db.path.display());
    println!("  Size:          {}", format_bytes(db_size));
    println!();
    for (table, n) in &counts {
        println!("  {:<14} {}", format!("{}:", table), n);
    }

    let unenriched: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM movies WHERE director IS NULL OR director = 'N/A'")
            .fetch_one(&pool)
            .await?;
    println!();
    println!("  Movies without director: {}", unenriched);

    pool.close().await;
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
