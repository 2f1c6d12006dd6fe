//! Database load.
//!
//! Recreates the SQLite file, applies the create-table script verbatim, and
//! executes every line of the simplified stream as one statement inside a
//! single transaction. Any SQL error aborts the load.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::db;
use crate::progress::{ProgressEvent, ProgressReporter};

/// Statements between two loading progress events.
const PROGRESS_EVERY: u64 = 10_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub statements: u64,
    pub rows: i64,
}

/// Delete the database file and any journal siblings.
fn remove_database(config: &Config) -> Result<()> {
    let db_path = config.db_path();
    for suffix in ["", "-journal", "-wal", "-shm"] {
        let mut path = db_path.clone().into_os_string();
        path.push(suffix);
        let path = PathBuf::from(path);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

pub async fn load_statements(config: &Config, reporter: &dyn ProgressReporter) -> Result<LoadStats> {
    let hans_path = config.hans_path();
    let content = std::fs::read_to_string(&hans_path)
        .with_context(|| format!("Failed to read statement stream: {}", hans_path.display()))?;
    let schema = std::fs::read_to_string(&config.db.schema)
        .with_context(|| format!("Failed to read schema script: {}", config.db.schema.display()))?;

    remove_database(config)?;
    let pool = db::connect(config).await?;

    sqlx::raw_sql(&schema)
        .execute(&pool)
        .await
        .with_context(|| format!("Failed to apply schema {}", config.db.schema.display()))?;

    let statements: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let total = statements.len() as u64;

    let mut tx = pool.begin().await?;
    for (i, sql) in statements.iter().enumerate() {
        let n = i as u64 + 1;
        if let Err(e) = sqlx::raw_sql(sql).execute(&mut *tx).await {
            let preview: String = sql.chars().take(120).collect();
            bail!("Statement {} failed: {}\n  {}", n, e, preview);
        }
        if n % PROGRESS_EVERY == 0 {
            reporter.report(ProgressEvent::Loading { n, total });
        }
    }
    tx.commit().await?;
    reporter.report(ProgressEvent::Loading { n: total, total });

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM poems")
        .fetch_one(&pool)
        .await?;

    pool.close().await;
    Ok(LoadStats {
        statements: total,
        rows,
    })
}

pub fn print_load_summary(config: &Config, stats: &LoadStats) {
    println!("load");
    println!("  statements: {}", stats.statements);
    println!("  rows: {}", stats.rows);
    println!("  database: {}", config.db_path().display());
}

pub async fn run_load(config: &Config, reporter: &dyn ProgressReporter) -> Result<()> {
    let stats = load_statements(config, reporter).await?;
    print_load_summary(config, &stats);
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::fs;

    const SCHEMA: &str = "CREATE TABLE poems (category TEXT, dynasty TEXT, title TEXT, \
        author TEXT, rhythmic TEXT, chapter TEXT, section TEXT, notes TEXT, paragraphs TEXT);";

    fn setup(tmp: &tempfile::TempDir, statements: &str) -> Config {
        let schema = tmp.path().join("create_table.sql");
        fs::write(&schema, SCHEMA).unwrap();
        let cfg: Config = toml::from_str(&format!(
            "[paths]\nrepo = \"{}\"\noutput = \"{}\"\n\n[db]\nschema = \"{}\"\n",
            tmp.path().join("repo").display(),
            tmp.path().join("output").display(),
            schema.display()
        ))
        .unwrap();
        fs::create_dir_all(cfg.sql_dir()).unwrap();
        fs::write(cfg.hans_path(), statements).unwrap();
        cfg
    }

    const ROW: &str = "INSERT INTO `poems` (`category`,`dynasty`,`title`,`author`,`rhythmic`,`chapter`,`section`,`notes`,`paragraphs`) \
        VALUES ('shi','tang','静夜思','李白','','','','','床前明月光,|疑是地上霜。');";

    #[tokio::test]
    async fn test_load_executes_each_line() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = setup(&tmp, &format!("{}\n{}\n", ROW, ROW));

        let stats = load_statements(&cfg, &NoProgress).await.unwrap();
        assert_eq!(stats, LoadStats { statements: 2, rows: 2 });
        assert!(cfg.db_path().exists());
    }

    #[tokio::test]
    async fn test_load_recreates_database() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = setup(&tmp, &format!("{}\n", ROW));

        load_statements(&cfg, &NoProgress).await.unwrap();
        let stats = load_statements(&cfg, &NoProgress).await.unwrap();
        assert_eq!(stats.rows, 1);
    }

    #[tokio::test]
    async fn test_load_sql_error_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = setup(&tmp, &format!("{}\nINSERT INTO `poems` VALUES ('it's');\n", ROW));

        let err = load_statements(&cfg, &NoProgress).await.unwrap_err();
        assert!(err.to_string().contains("Statement 2 failed"));
    }

    #[tokio::test]
    async fn test_load_missing_stream_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = setup(&tmp, "");
        fs::remove_file(cfg.hans_path()).unwrap();
        assert!(load_statements(&cfg, &NoProgress).await.is_err());
    }
}
