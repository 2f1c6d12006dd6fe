//! Record extraction from heterogeneous corpus JSON.
//!
//! The corpus files disagree on field names: poems keep their lines under
//! `paragraphs`, the Lunyu-style files use `content`, and commentary files
//! use `comment`. Extraction normalizes every shape into a [`PoemRecord`]
//! and reports records with no usable body as `None` rather than an error.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::models::{Category, PoemRecord};

/// Body field names, in precedence order. The first non-empty one wins.
pub const BODY_FIELDS: [&str; 3] = ["paragraphs", "content", "comment"];

/// Extract a record from one JSON object.
///
/// Missing scalar fields become empty strings and missing arrays become
/// empty sequences. Returns `None` when no body field yields any lines.
pub fn extract_record(value: &Value, category: Category, dynasty: &str) -> Option<PoemRecord> {
    let object = value.as_object()?;

    let body = BODY_FIELDS
        .iter()
        .map(|field| string_array_field(object, field))
        .find(|lines| !lines.is_empty())?;

    Some(PoemRecord {
        category,
        dynasty: dynasty.to_string(),
        title: string_field(object, "title"),
        author: string_field(object, "author"),
        rhythmic: string_field(object, "rhythmic"),
        chapter: string_field(object, "chapter"),
        section: string_field(object, "section"),
        notes: string_array_field(object, "notes"),
        body,
    })
}

fn string_field(object: &Map<String, Value>, field: &str) -> String {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn string_array_field(object: &Map<String, Value>, field: &str) -> Vec<String> {
    match object.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Outcome of splitting one source file into records.
#[derive(Debug, Default)]
pub struct FileRecords {
    /// Records with a usable body, in file order.
    pub records: Vec<PoemRecord>,
    /// Objects that had no body under any of [`BODY_FIELDS`].
    pub no_body: u64,
    /// Lines that could not be parsed as an object (line mode only).
    pub malformed_lines: u64,
}

/// Parse a file holding a single top-level JSON array of objects.
pub fn extract_array(bytes: &[u8], category: Category, dynasty: &str) -> Result<FileRecords> {
    let values: Vec<Value> =
        serde_json::from_slice(bytes).context("Source file is not a JSON array")?;

    let mut out = FileRecords::default();
    for value in &values {
        match extract_record(value, category, dynasty) {
            Some(record) => out.records.push(record),
            None => out.no_body += 1,
        }
    }
    Ok(out)
}

/// Parse a file with one JSON object per line.
///
/// Array punctuation around each object (`[`, trailing `,` or `]`) is
/// stripped first, so a pretty-printed array with a damaged last line still
/// yields every intact object.
pub fn extract_lines(text: &str, category: Category, dynasty: &str) -> FileRecords {
    let mut out = FileRecords::default();
    for line in text.lines() {
        let candidate = strip_array_punctuation(line);
        if candidate.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(candidate) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                out.malformed_lines += 1;
                continue;
            }
        };

        match extract_record(&value, category, dynasty) {
            Some(record) => out.records.push(record),
            None => out.no_body += 1,
        }
    }
    out
}

fn strip_array_punctuation(line: &str) -> &str {
    line.trim()
        .trim_start_matches('[')
        .trim_end_matches([',', ']'])
        .trim()
}
