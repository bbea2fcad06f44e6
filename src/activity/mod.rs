use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Activity log entry (JSONL)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single entry in the activity log (`~/.promconsole/activity.jsonl`).
///
/// One entry per page action outcome: which page, what was attempted, and
/// how it ended (`ok`, `transport`, `rejected`, `invalid`, `stale`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub level: Level,
    pub page: String,
    pub action: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only JSONL sink with a minimum level.
///
/// Write failures are swallowed: a full disk must never turn a successful
/// save into a failed one.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: Option<PathBuf>,
    min_level: Level,
}

impl ActivityLog {
    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self {
            path: None,
            min_level: Level::Error,
        }
    }

    pub fn to_file(path: impl Into<PathBuf>, min_level: Level) -> Self {
        Self {
            path: Some(path.into()),
            min_level,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let level = Level::parse(&config.level).unwrap_or(Level::Info);
        Self::to_file(expand_home(&config.path), level)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn enabled_for(&self, level: Level) -> bool {
        self.path.is_some() && level >= self.min_level
    }

    pub fn record(
        &self,
        level: Level,
        page: &str,
        action: &str,
        outcome: &str,
        message: Option<&str>,
    ) {
        if !self.enabled_for(level) {
            return;
        }
        let entry = ActivityEntry {
            timestamp: Utc::now().to_rfc3339(),
            level,
            page: page.to_string(),
            action: action.to_string(),
            outcome: outcome.to_string(),
            message: message.map(str::to_string),
        };
        if let Some(path) = &self.path {
            let _ = append_entry(path, &entry);
        }
    }

    /// Read every entry back. Malformed lines are skipped.
    pub fn read_all(&self) -> Vec<ActivityEntry> {
        self.path.as_deref().map(read_entries).unwrap_or_default()
    }

    /// The newest `limit` entries, oldest first.
    pub fn read_recent(&self, limit: usize) -> Vec<ActivityEntry> {
        let mut entries = self.read_all();
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        entries
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_entry(path: &Path, entry: &ActivityEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

fn read_entries(path: &Path) -> Vec<ActivityEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
        .collect()
}
