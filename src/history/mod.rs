//! Persistent log of finished dictations and generations
//!
//! Stored as JSON (`~/.voxdesk/history.json`), newest entry first. Every
//! read-modify-write runs under the file lock and replaces the file
//! atomically, so concurrent writers never lose an entry.


use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{Config, FileLock, ensure_parent, write_atomic};
use crate::pipeline::GenerationMode;

pub const MAX_HISTORY_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub text: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

/// Text logged for a finished assistant request
pub fn exchange_entry(
    mode: GenerationMode,
    agent: Option<&str>,
    request: &str,
    response: &str,
) -> String {
    let tag = match (agent, mode) {
        (Some(name), _) => format!("Agent {}", name),
        (None, GenerationMode::Text) => "User".to_string(),
        (None, GenerationMode::Web) => "Web".to_string(),
        (None, GenerationMode::Vision) => "Vision".to_string(),
    };
    format!("[{}] {}\n[AI] {}", tag, request, response.trim())
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: MAX_HISTORY_ENTRIES,
        }
    }

    /// ~/.voxdesk/history.json
    pub fn open_default() -> Self {
        Self::new(Config::global_config_dir().join("history.json"))
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, newest first
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.read()?.history)
    }

    /// Prepend `text` to the log. Empty text is not recorded.
    pub fn add(&self, text: &str) -> Result<Option<HistoryEntry>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        ensure_parent(&self.path)?;
        let _lock = FileLock::acquire(&self.path)?;
        let mut file = self.read()?;

        let entry = HistoryEntry {
            id: file.history.len() as u64 + 1,
            text: text.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        file.history.insert(0, entry.clone());
        file.history.truncate(self.max_entries);

        self.write(&file)?;
        tracing::debug!(id = entry.id, entries = file.history.len(), "History entry added");
        Ok(Some(entry))
    }

    pub fn clear(&self) -> Result<()> {
        ensure_parent(&self.path)?;
        let _lock = FileLock::acquire(&self.path)?;
        self.write(&HistoryFile::default())
    }

    fn read(&self) -> Result<HistoryFile> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HistoryFile::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read history: {}", self.path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(HistoryFile::default());
        }
        match serde_json::from_str(&content) {
            Ok(file) => Ok(file),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Unreadable history, starting fresh: {}", e);
                Ok(HistoryFile::default())
            }
        }
    }

    fn write(&self, file: &HistoryFile) -> Result<()> {
        let content = serde_json::to_string_pretty(file).context("Failed to serialize history")?;
        write_atomic(&self.path, &content)
    }
}
