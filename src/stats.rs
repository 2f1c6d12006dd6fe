//! Loaded database statistics.
//!
//! Summarizes what the last load produced: total rows and a per
//! category/dynasty breakdown. Used by `poems stats` to check a run before
//! shipping the database file.

use anyhow::{bail, Result};
use sqlx::Row;

use crate::config::Config;
use crate::db;

/// Row count for one (category, dynasty) pair.
struct GroupStats {
    category: String,
    dynasty: String,
    rows: i64,
    authors: i64,
}

pub async fn run_stats(config: &Config) -> Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        bail!(
            "Database not found: {}. Run `poems run` or `poems load` first.",
            db_path.display()
        );
    }

    let pool = db::connect(config).await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM poems")
        .fetch_one(&pool)
        .await?;

    let rows = sqlx::query(
        r#"
        SELECT category, dynasty, COUNT(*) AS poem_count, COUNT(DISTINCT author) AS author_count
        FROM poems
        GROUP BY category, dynasty
        ORDER BY poem_count DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let groups: Vec<GroupStats> = rows
        .iter()
        .map(|row| GroupStats {
            category: row.get("category"),
            dynasty: row.get("dynasty"),
            rows: row.get("poem_count"),
            authors: row.get("author_count"),
        })
        .collect();

    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    println!("Poems — Database Stats");
    println!("======================");
    println!();
    println!("  Database:  {}", db_path.display());
    println!("  Size:      {}", format_bytes(db_size));
    println!("  Poems:     {}", total);

    if !groups.is_empty() {
        println!();
        println!(
            "  {:<10} {:<10} {:>8} {:>8}",
            "CATEGORY", "DYNASTY", "POEMS", "AUTHORS"
        );
        println!("  {}", "-".repeat(40));
        for g in &groups {
            println!(
                "  {:<10} {:<10} {:>8} {:>8}",
                g.category, g.dynasty, g.rows, g.authors
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
