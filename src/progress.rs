//! Export progress reporting.
//!
//! Reports observable progress during `poems run` so users see which corpus
//! group is being read, each accepted poem, and how far transcoding and
//! loading have come. Progress is emitted on **stderr** so stdout remains
//! parseable for scripts.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// Starting a source group (e.g. `shi:tang`) with this many files.
    Group { group: String, files: u64 },
    /// A record passed the filter and was written to the traditional stream.
    Accepted {
        ordinal: u64,
        title: String,
        rhythmic: String,
    },
    /// n lines written to the simplified stream so far.
    Transcoding { n: u64 },
    /// n statements executed out of total.
    Loading { n: u64, total: u64 },
}

/// Reports pipeline progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "(1,234) title 静夜思, rhythmic ".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Group { group, files } => {
                format!("export {}  {} files\n", group, format_number(*files))
            }
            ProgressEvent::Accepted {
                ordinal,
                title,
                rhythmic,
            } => format!(
                "({}) title {}, rhythmic {}\n",
                format_number(*ordinal),
                title,
                rhythmic
            ),
            ProgressEvent::Transcoding { n } => {
                format!("transcode  {} lines\n", format_number(*n))
            }
            ProgressEvent::Loading { n, total } => format!(
                "load  {} / {} statements\n",
                format_number(*n),
                format_number(*total)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Group { group, files } => serde_json::json!({
                "event": "progress",
                "phase": "export",
                "group": group,
                "files": files
            }),
            ProgressEvent::Accepted {
                ordinal,
                title,
                rhythmic,
            } => serde_json::json!({
                "event": "accepted",
                "ordinal": ordinal,
                "title": title,
                "rhythmic": rhythmic
            }),
            ProgressEvent::Transcoding { n } => serde_json::json!({
                "event": "progress",
                "phase": "transcode",
                "n": n
            }),
            ProgressEvent::Loading { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "load",
                "n": n,
                "total": total
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
