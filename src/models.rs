//! Core data models used throughout the exporter.
//!
//! These types represent the source files, normalized poems, and rendered
//! statements that flow through the export pipeline.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Corpus category, persisted verbatim in the `category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// 诗
    Shi,
    /// 词
    Ci,
    /// 曲
    Qu,
    /// 诗歌 (Shijing odes)
    Shige,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shi => "shi",
            Category::Ci => "ci",
            Category::Qu => "qu",
            Category::Shige => "shige",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a source file is split into JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// The whole file is one top-level array of objects.
    #[default]
    Array,
    /// Each line holds one object; stray brackets and commas are tolerated.
    Lines,
}

/// A corpus file discovered by globbing, with the tags its records inherit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub category: Category,
    pub dynasty: String,
    pub mode: ParseMode,
}

/// A normalized poem, independent of the source file's JSON shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoemRecord {
    pub category: Category,
    pub dynasty: String,
    pub title: String,
    pub author: String,
    pub rhythmic: String,
    pub chapter: String,
    pub section: String,
    pub notes: Vec<String>,
    pub body: Vec<String>,
}

/// One literal insert line plus its progress ordinal (not persisted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatement {
    pub ordinal: u64,
    pub sql: String,
}
