//! Export pipeline orchestration.
//!
//! Coordinates the full run: reset output → discover source groups →
//! extract → filter → render (traditional stream) → transcode (simplified
//! stream) → load into SQLite. Strictly sequential; a failed run is redone
//! from a clean output directory.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::extract::{self, FileRecords};
use crate::filter::{self, Rejection};
use crate::load;
use crate::models::{ParseMode, PoemRecord, RenderedStatement, SourceFile};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::sources;
use crate::statement;
use crate::transcode::{self, TranscodeStats};

/// Counters for one export pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub files: u64,
    pub accepted: u64,
    pub no_body: u64,
    pub malformed_lines: u64,
    pub rejected: BTreeMap<Rejection, u64>,
}

impl ExportStats {
    pub fn rejected_total(&self) -> u64 {
        self.rejected.values().sum()
    }
}

/// Per-run state handed to every stage: configuration, progress sink, and
/// the ordinal counter for accepted records.
pub struct PipelineContext<'a> {
    config: &'a Config,
    reporter: &'a dyn ProgressReporter,
    ordinal: u64,
    stats: ExportStats,
}

impl<'a> PipelineContext<'a> {
    pub fn new(config: &'a Config, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            config,
            reporter,
            ordinal: 0,
            stats: ExportStats::default(),
        }
    }

    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }

    pub fn into_stats(self) -> ExportStats {
        self.stats
    }

    /// Filter a record and render it if kept. Dropped records return `None`.
    pub fn accept(&mut self, record: &PoemRecord) -> Option<RenderedStatement> {
        if let Some(reason) = filter::rejection(record, &self.config.filter) {
            *self.stats.rejected.entry(reason).or_insert(0) += 1;
            return None;
        }

        self.ordinal += 1;
        self.stats.accepted += 1;
        self.reporter.report(ProgressEvent::Accepted {
            ordinal: self.ordinal,
            title: record.title.clone(),
            rhythmic: record.rhythmic.clone(),
        });

        Some(RenderedStatement {
            ordinal: self.ordinal,
            sql: statement::render(record, self.config.sql.legacy_escaping),
        })
    }

    /// Append every kept record of `file` to the traditional stream.
    ///
    /// The stream is opened once for the file and closed before returning.
    pub fn process_file(&mut self, file: &SourceFile) -> Result<()> {
        let records = read_records(file)
            .with_context(|| format!("Failed to parse {}", file.path.display()))?;
        self.stats.files += 1;
        self.stats.no_body += records.no_body;
        self.stats.malformed_lines += records.malformed_lines;
        if records.malformed_lines > 0 {
            eprintln!(
                "Warning: skipped {} malformed line(s) in {}",
                records.malformed_lines,
                file.path.display()
            );
        }

        let hant_path = self.config.hant_path();
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&hant_path)
            .with_context(|| format!("Failed to open {}", hant_path.display()))?;
        let mut writer = BufWriter::new(handle);

        for record in &records.records {
            if let Some(rendered) = self.accept(record) {
                writer
                    .write_all(rendered.sql.as_bytes())
                    .with_context(|| format!("Failed to write {}", hant_path.display()))?;
            }
        }

        writer
            .flush()
            .with_context(|| format!("Failed to write {}", hant_path.display()))?;
        Ok(())
    }
}

fn read_records(file: &SourceFile) -> Result<FileRecords> {
    match file.mode {
        ParseMode::Array => {
            let bytes = std::fs::read(&file.path)?;
            extract::extract_array(&bytes, file.category, &file.dynasty)
        }
        ParseMode::Lines => {
            let text = std::fs::read_to_string(&file.path)?;
            Ok(extract::extract_lines(&text, file.category, &file.dynasty))
        }
    }
}

/// Absolute form of `path` with symlinks and `..` resolved through its
/// deepest existing ancestor. Components below that ancestor are appended
/// as written.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Remove and recreate the output directory tree.
pub fn reset_output(config: &Config) -> Result<()> {
    let output = &config.paths.output;
    if resolve_path(&config.paths.repo)?.starts_with(resolve_path(output)?) {
        bail!(
            "Refusing to reset output {}: it contains the corpus repo",
            output.display()
        );
    }

    if output.exists() {
        std::fs::remove_dir_all(output)
            .with_context(|| format!("Failed to remove {}", output.display()))?;
    }
    std::fs::create_dir_all(config.sql_dir())
        .with_context(|| format!("Failed to create {}", config.sql_dir().display()))?;
    if let Some(parent) = config.db_path().parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Reset output and write the traditional stream for every source group.
pub fn export(config: &Config, reporter: &dyn ProgressReporter) -> Result<ExportStats> {
    reset_output(config)?;
    // Empty stream even when no file matched.
    File::create(config.hant_path())
        .with_context(|| format!("Failed to create {}", config.hant_path().display()))?;

    let mut ctx = PipelineContext::new(config, reporter);
    for group in &config.sources {
        let files = sources::discover_group(config, group)?;
        reporter.report(ProgressEvent::Group {
            group: group.label(),
            files: files.len() as u64,
        });
        for file in &files {
            ctx.process_file(file)?;
        }
    }

    Ok(ctx.into_stats())
}

/// Recreate the simplified stream from the traditional one.
pub fn transcode_output(config: &Config, reporter: &dyn ProgressReporter) -> Result<TranscodeStats> {
    let converter = transcode::build_converter();
    transcode::transcode_file(
        converter.as_ref(),
        &config.hant_path(),
        &config.hans_path(),
        reporter,
    )
}

/// Hex SHA-256 of a file's contents.
pub fn file_digest(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn print_export_summary(config: &Config, stats: &ExportStats) -> Result<()> {
    println!("export");
    println!("  files: {}", stats.files);
    println!("  accepted: {}", stats.accepted);
    println!("  dropped (no body): {}", stats.no_body);
    for (reason, count) in &stats.rejected {
        println!("  dropped ({}): {}", reason, count);
    }
    if stats.malformed_lines > 0 {
        println!("  malformed lines: {}", stats.malformed_lines);
    }
    println!("  output: {}", config.hant_path().display());
    println!("  sha256: {}", file_digest(&config.hant_path())?);
    Ok(())
}

fn print_transcode_summary(config: &Config, stats: &TranscodeStats) {
    println!("transcode");
    println!("  lines: {}", stats.lines);
    println!("  unconverted: {}", stats.failed);
    println!("  output: {}", config.hans_path().display());
}

pub fn run_export(config: &Config, reporter: &dyn ProgressReporter) -> Result<()> {
    let stats = export(config, reporter)?;
    print_export_summary(config, &stats)?;
    println!("ok");
    Ok(())
}

pub fn run_transcode(config: &Config, reporter: &dyn ProgressReporter) -> Result<()> {
    if !config.hant_path().exists() {
        bail!(
            "Traditional stream not found: {}. Run `poems export` first.",
            config.hant_path().display()
        );
    }
    let stats = transcode_output(config, reporter)?;
    print_transcode_summary(config, &stats);
    println!("ok");
    Ok(())
}

/// Full run: export, transcode, load.
pub async fn run_all(config: &Config, reporter: &dyn ProgressReporter) -> Result<()> {
    let export_stats = export(config, reporter)?;
    print_export_summary(config, &export_stats)?;

    let transcode_stats = transcode_output(config, reporter)?;
    print_transcode_summary(config, &transcode_stats);

    let loaded = load::load_statements(config, reporter).await?;
    load::print_load_summary(config, &loaded);

    println!("ok");
    Ok(())
}
