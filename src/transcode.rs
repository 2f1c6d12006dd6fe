//! Traditional → simplified script conversion of the statement stream.
//!
//! The transcoder knows nothing about SQL: it reads the traditional stream
//! one line at a time, passes each line through a [`ScriptConverter`], and
//! writes the result to the simplified stream. A line whose conversion fails
//! is reported and written unconverted, so both streams keep the same line
//! count.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::progress::{ProgressEvent, ProgressReporter};

/// Lines between two transcoding progress events.
const PROGRESS_EVERY: u64 = 10_000;

/// Conversion failure for a single piece of text.
#[derive(Debug)]
pub enum ConvertError {
    Backend(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Backend(e) => write!(f, "script conversion failed: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Converts text from traditional to simplified script.
pub trait ScriptConverter {
    /// Short name for summaries.
    fn name(&self) -> &str;

    fn convert(&self, text: &str) -> Result<String, ConvertError>;
}

/// Conversion tables compiled into the `zhconv` crate.
pub struct BuiltinConverter;

impl ScriptConverter for BuiltinConverter {
    fn name(&self) -> &str {
        "builtin"
    }

    fn convert(&self, text: &str) -> Result<String, ConvertError> {
        Ok(zhconv::zhconv(text, zhconv::Variant::ZhHans))
    }
}

pub fn build_converter() -> Box<dyn ScriptConverter> {
    Box::new(BuiltinConverter)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeStats {
    pub lines: u64,
    pub failed: u64,
}

/// Convert every line of `reader` into `writer`, newline-terminated.
pub fn transcode_stream<R: BufRead, W: Write>(
    converter: &dyn ScriptConverter,
    reader: R,
    mut writer: W,
    reporter: &dyn ProgressReporter,
) -> Result<TranscodeStats> {
    let mut stats = TranscodeStats::default();

    for line in reader.lines() {
        let line = line.context("Failed to read traditional statement stream")?;
        stats.lines += 1;

        let converted = match converter.convert(&line) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Warning: line {} left unconverted: {}", stats.lines, e);
                stats.failed += 1;
                line
            }
        };

        writer.write_all(converted.as_bytes())?;
        writer.write_all(b"\n")?;

        if stats.lines % PROGRESS_EVERY == 0 {
            reporter.report(ProgressEvent::Transcoding { n: stats.lines });
        }
    }

    writer.flush()?;
    reporter.report(ProgressEvent::Transcoding { n: stats.lines });
    Ok(stats)
}

/// Recreate `output` from `input` through `converter`.
pub fn transcode_file(
    converter: &dyn ScriptConverter,
    input: &Path,
    output: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<TranscodeStats> {
    let reader = BufReader::new(
        File::open(input)
            .with_context(|| format!("Failed to open statement stream: {}", input.display()))?,
    );
    let writer = BufWriter::new(
        File::create(output)
            .with_context(|| format!("Failed to create statement stream: {}", output.display()))?,
    );
    transcode_stream(converter, reader, writer, reporter)
        .with_context(|| format!("Failed to write {}", output.display()))
}
