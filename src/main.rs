//! # poetry-export CLI (`poems`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `poems run` | Reset output, export, transcode, and load |
//! | `poems export` | Reset output and write the traditional-script SQL |
//! | `poems transcode` | Convert the traditional SQL into simplified script |
//! | `poems load` | Recreate the database from the simplified SQL |
//! | `poems sources` | List source groups and matched file counts |
//! | `poems stats` | Summarize the loaded database |
//!
//! ## Examples
//!
//! ```bash
//! poems run --config ./config/poems.toml
//! poems export --progress json 2> progress.jsonl
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use poetry_export::progress::ProgressMode;
use poetry_export::{config, load, pipeline, sources, stats};

/// Export the chinese-poetry corpus to traditional/simplified SQL and SQLite.
#[derive(Parser)]
#[command(name = "poems", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/poems.toml")]
    config: PathBuf,

    /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline: export, transcode, load.
    ///
    /// The output directory is removed and recreated first.
    Run,

    /// Reset the output directory and write the traditional-script SQL.
    Export,

    /// Convert the traditional-script SQL into the simplified-script SQL.
    Transcode,

    /// Recreate the database, apply the schema, and execute the simplified SQL.
    Load,

    /// List source groups and how many files each one matches.
    Sources,

    /// Show row counts of the loaded database.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let reporter = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Run => pipeline::run_all(&cfg, reporter.as_ref()).await?,
        Commands::Export => pipeline::run_export(&cfg, reporter.as_ref())?,
        Commands::Transcode => pipeline::run_transcode(&cfg, reporter.as_ref())?,
        Commands::Load => load::run_load(&cfg, reporter.as_ref()).await?,
        Commands::Sources => sources::list_sources(&cfg)?,
        Commands::Stats => stats::run_stats(&cfg).await?,
    }

    Ok(())
}
