//! Insert-statement rendering.
//!
//! Each kept record becomes exactly one line of SQL text targeting the
//! `poems` table. Array fields are flattened with [`FIELD_DELIMITER`] and
//! every text value is escaped for a single-quoted literal.

use crate::models::PoemRecord;

/// Separator used to flatten `notes` and body lines into one column.
pub const FIELD_DELIMITER: &str = "|";

/// Column order of every rendered statement.
pub const COLUMNS: [&str; 9] = [
    "category",
    "dynasty",
    "title",
    "author",
    "rhythmic",
    "chapter",
    "section",
    "notes",
    "paragraphs",
];

/// Join an ordered sequence into a single delimited string.
pub fn flatten(items: &[String]) -> String {
    items.join(FIELD_DELIMITER)
}

/// Escape a value for embedding between single quotes.
///
/// `\"` left behind by upstream JSON tooling is collapsed to `"`. Line
/// breaks are written as the two-character sequences `\n` and `\r`, so a
/// statement never spans more than one line. Single quotes are doubled
/// unless `legacy` is set, in which case they pass through untouched as the
/// historical exporter did.
pub fn escape(value: &str, legacy: bool) -> String {
    let unescaped = value
        .replace("\\\"", "\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    if legacy {
        unescaped
    } else {
        unescaped.replace('\'', "''")
    }
}

/// Render one record as a newline-terminated insert statement.
pub fn render(record: &PoemRecord, legacy: bool) -> String {
    let notes = flatten(&record.notes);
    let body = flatten(&record.body);
    let values = [
        record.category.as_str(),
        record.dynasty.as_str(),
        record.title.as_str(),
        record.author.as_str(),
        record.rhythmic.as_str(),
        record.chapter.as_str(),
        record.section.as_str(),
        notes.as_str(),
        body.as_str(),
    ];

    let columns = COLUMNS
        .iter()
        .map(|c| format!("`{}`", c))
        .collect::<Vec<_>>()
        .join(",");
    let literals = values
        .iter()
        .map(|v| format!("'{}'", escape(v, legacy)))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "INSERT INTO `poems` ({}) VALUES ({});\n",
        columns, literals
    )
}
