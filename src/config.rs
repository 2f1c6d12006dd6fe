use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::{Category, ParseMode};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub sql: SqlConfig,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceGroupConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Root of the chinese-poetry checkout.
    pub repo: PathBuf,
    /// Working output directory. Removed and recreated by `run` and `export`.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("./output")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    /// Database file. Defaults to `<output>/database/poems.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Create-table script, executed verbatim before loading.
    #[serde(default = "default_schema")]
    pub schema: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: None,
            schema: default_schema(),
        }
    }
}

fn default_schema() -> PathBuf {
    PathBuf::from("./sql/create_table.sql")
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,
    #[serde(default = "default_max_author_chars")]
    pub max_author_chars: usize,
    /// Glyph the corpus uses for characters lost to OCR or encoding damage.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_title_chars: default_max_title_chars(),
            max_author_chars: default_max_author_chars(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_max_title_chars() -> usize {
    30
}
fn default_max_author_chars() -> usize {
    10
}
fn default_placeholder() -> String {
    "□".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SqlConfig {
    /// Leave single quotes unescaped, matching the historical exporter output.
    #[serde(default)]
    pub legacy_escaping: bool,
}

/// One corpus family: a directory under the repo root plus a file glob,
/// tagged with the category and dynasty every record in it receives.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceGroupConfig {
    pub dir: String,
    pub glob: String,
    pub category: Category,
    pub dynasty: String,
    #[serde(default)]
    pub mode: ParseMode,
}

impl SourceGroupConfig {
    fn new(dir: &str, glob: &str, category: Category, dynasty: &str, mode: ParseMode) -> Self {
        Self {
            dir: dir.to_string(),
            glob: glob.to_string(),
            category,
            dynasty: dynasty.to_string(),
            mode,
        }
    }

    pub fn label(&self) -> String {
        format!("{}:{}", self.category, self.dynasty)
    }
}

pub fn default_sources() -> Vec<SourceGroupConfig> {
    vec![
        SourceGroupConfig::new("json", "poet.tang.*.json", Category::Shi, "tang", ParseMode::Array),
        SourceGroupConfig::new("json", "poet.song.*.json", Category::Shi, "song", ParseMode::Array),
        SourceGroupConfig::new("ci", "ci.song.*.json", Category::Ci, "song", ParseMode::Array),
        // yuanqu.json ends with an extra `]`, so it is read one object per line.
        SourceGroupConfig::new("yuanqu", "yuanqu.json", Category::Qu, "yuan", ParseMode::Lines),
        SourceGroupConfig::new("shijing", "shijing.json", Category::Shige, "zhou", ParseMode::Array),
    ]
}

impl Config {
    pub fn sql_dir(&self) -> PathBuf {
        self.paths.output.join("sql")
    }

    /// Traditional-script statement stream.
    pub fn hant_path(&self) -> PathBuf {
        self.sql_dir().join("poems_hant.sql")
    }

    /// Simplified-script statement stream.
    pub fn hans_path(&self) -> PathBuf {
        self.sql_dir().join("poems_hans.sql")
    }

    pub fn db_path(&self) -> PathBuf {
        match &self.db.path {
            Some(path) => path.clone(),
            None => self.paths.output.join("database").join("poems.db"),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.filter.max_title_chars == 0 {
        anyhow::bail!("filter.max_title_chars must be > 0");
    }
    if config.filter.max_author_chars == 0 {
        anyhow::bail!("filter.max_author_chars must be > 0");
    }
    if config.filter.placeholder.is_empty() {
        anyhow::bail!("filter.placeholder must not be empty");
    }

    if config.sources.is_empty() {
        anyhow::bail!("at least one [[sources]] entry is required");
    }
    for source in &config.sources {
        globset::Glob::new(&source.glob)
            .with_context(|| format!("Invalid glob for source {}: {}", source.label(), source.glob))?;
        if source.dynasty.trim().is_empty() {
            anyhow::bail!("source {} has an empty dynasty", source.glob);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse(
            r#"
[paths]
repo = "/data/chinese-poetry"
"#,
        );
        assert_eq!(cfg.paths.output, PathBuf::from("./output"));
        assert_eq!(cfg.filter.max_title_chars, 30);
        assert_eq!(cfg.filter.max_author_chars, 10);
        assert_eq!(cfg.filter.placeholder, "□");
        assert!(!cfg.sql.legacy_escaping);
        assert_eq!(cfg.sources.len(), 5);
        assert_eq!(cfg.sources[3].mode, ParseMode::Lines);
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_output_layout() {
        let cfg = parse(
            r#"
[paths]
repo = "/r"
output = "/out"
"#,
        );
        assert_eq!(cfg.hant_path(), PathBuf::from("/out/sql/poems_hant.sql"));
        assert_eq!(cfg.hans_path(), PathBuf::from("/out/sql/poems_hans.sql"));
        assert_eq!(cfg.db_path(), PathBuf::from("/out/database/poems.db"));
    }

    #[test]
    fn test_explicit_sources_replace_defaults() {
        let cfg = parse(
            r#"
[paths]
repo = "/r"

[[sources]]
dir = "shijing"
glob = "shijing.json"
category = "shige"
dynasty = "zhou"
"#,
        );
        assert_eq!(cfg.sources.len(), 1);
        assert_eq!(cfg.sources[0].category, Category::Shige);
        assert_eq!(cfg.sources[0].mode, ParseMode::Array);
        assert_eq!(cfg.sources[0].label(), "shige:zhou");
    }
}
