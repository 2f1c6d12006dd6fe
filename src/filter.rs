//! Validity filter for extracted records.
//!
//! Oversized titles and authors, and text carrying the corpus placeholder
//! glyph for unrecoverable characters, mark corrupted entries. The filter is
//! pure: it only inspects the record.

use std::fmt;

use crate::config::FilterConfig;
use crate::models::PoemRecord;
use crate::statement::flatten;

/// Why a record was dropped. Rules are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    TitleTooLong,
    AuthorTooLong,
    Placeholder,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::TitleTooLong => "title too long",
            Rejection::AuthorTooLong => "author too long",
            Rejection::Placeholder => "placeholder glyph",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First rule the record violates, or `None` when it should be kept.
pub fn rejection(record: &PoemRecord, config: &FilterConfig) -> Option<Rejection> {
    if record.title.chars().count() > config.max_title_chars {
        return Some(Rejection::TitleTooLong);
    }
    if record.author.chars().count() > config.max_author_chars {
        return Some(Rejection::AuthorTooLong);
    }

    let notes = flatten(&record.notes);
    let body = flatten(&record.body);
    let fields = [
        record.rhythmic.as_str(),
        record.chapter.as_str(),
        record.section.as_str(),
        notes.as_str(),
        body.as_str(),
    ];
    if fields
        .iter()
        .any(|value| value.contains(config.placeholder.as_str()))
    {
        return Some(Rejection::Placeholder);
    }

    None
}

pub fn is_valid(record: &PoemRecord, config: &FilterConfig) -> bool {
    rejection(record, config).is_none()
}
