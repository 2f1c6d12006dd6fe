use anyhow::{Context, Result};
use globset::Glob;
use walkdir::WalkDir;

use crate::config::{Config, SourceGroupConfig};
use crate::models::SourceFile;

/// Files of one source group, sorted by path.
///
/// Only direct children of `<repo>/<dir>` are matched against the group
/// glob. A missing directory yields no files.
pub fn discover_group(config: &Config, group: &SourceGroupConfig) -> Result<Vec<SourceFile>> {
    let root = config.paths.repo.join(&group.dir);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let matcher = Glob::new(&group.glob)
        .with_context(|| format!("Invalid glob: {}", group.glob))?
        .compile_matcher();

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !matcher.is_match(entry.file_name()) {
            continue;
        }
        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            category: group.category,
            dynasty: group.dynasty.clone(),
            mode: group.mode,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

pub fn list_sources(config: &Config) -> Result<()> {
    println!(
        "{:<14} {:<10} {:<20} {:<7} FILES",
        "GROUP", "DIR", "GLOB", "MODE"
    );
    for group in &config.sources {
        let files = discover_group(config, group)?;
        let mode = match group.mode {
            crate::models::ParseMode::Array => "array",
            crate::models::ParseMode::Lines => "lines",
        };
        println!(
            "{:<14} {:<10} {:<20} {:<7} {}",
            group.label(),
            group.dir,
            group.glob,
            mode,
            files.len()
        );
    }
    Ok(())
}
