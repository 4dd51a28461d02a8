//! History command implementation

use anyhow::Result;
use chrono::{Local, TimeZone};
use std::path::Path;

use voxdesk::history::HistoryStore;

/// List the newest history entries, or clear the log
pub fn history_command(usage_dir: &Path, limit: usize, clear: bool) -> Result<()> {
    let history = HistoryStore::new(usage_dir.join("history.json"));
    if clear {
        history.clear()?;
        println!("History cleared");
        return Ok(());
    }

    let entries = history.entries()?;
    if entries.is_empty() {
        println!("History is empty");
        return Ok(());
    }
    for entry in entries.iter().take(limit) {
        let when = Local
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("#{} {}", entry.id, when);
        for line in entry.text.lines() {
            println!("    {}", line);
        }
    }
    if entries.len() > limit {
        println!("... {} older entries", entries.len() - limit);
    }
    Ok(())
}
