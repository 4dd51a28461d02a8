//! Usage statistics
//!
//! Cumulative totals live in `~/.voxdesk/stats.json`, words per day in
//! `~/.voxdesk/activity.json`. Both are updated under their file lock and
//! replaced atomically.


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{Config, FileLock, ensure_parent, write_atomic};

/// Typing speed the time-saved estimate compares against
pub const DEFAULT_TYPING_WPM: f64 = 40.0;
pub const DEFAULT_CHART_DAYS: u32 = 7;

/// Cumulative totals; times are in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    #[serde(default)]
    pub total_words: u64,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub total_process_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DailyActivity {
    date: String,
    words: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ActivityFile {
    #[serde(default)]
    daily_activity: Vec<DailyActivity>,
}

/// Derived figures for a dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_words: u64,
    /// Spoken words per minute of recording
    pub average_speed: u64,
    /// Minutes saved compared with typing, rounded to two decimals
    pub time_saved: f64,
}

impl DashboardStats {
    pub fn from_totals(totals: &UsageTotals) -> Self {
        let minutes = totals.total_time / 60.0;
        let average_speed = if minutes > 0.0 {
            (totals.total_words as f64 / minutes).round() as u64
        } else {
            0
        };
        let time_saved = if totals.total_words > 0 {
            let typing_minutes = totals.total_words as f64 / DEFAULT_TYPING_WPM;
            ((typing_minutes - minutes).max(0.0) * 100.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            total_words: totals.total_words,
            average_speed,
            time_saved,
        }
    }
}

pub fn day_bucket(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

#[derive(Debug, Clone)]
pub struct StatsRecorder {
    totals_path: PathBuf,
    activity_path: PathBuf,
}

impl StatsRecorder {
    /// Store both files in `dir`
    pub fn new(dir: &Path) -> Self {
        Self {
            totals_path: dir.join("stats.json"),
            activity_path: dir.join("activity.json"),
        }
    }

    pub fn open_default() -> Self {
        Self::new(&Config::global_config_dir())
    }

    /// Count the words of `text` towards today's activity and the totals.
    ///
    /// Returns the number of words recorded; text without words changes nothing.
    pub fn record(&self, text: &str, audio: Duration, process: Duration) -> Result<u64> {
        self.record_on(Local::now().date_naive(), text, audio, process)
    }

    pub fn record_on(
        &self,
        day: NaiveDate,
        text: &str,
        audio: Duration,
        process: Duration,
    ) -> Result<u64> {
        let words = word_count(text);
        if words == 0 {
            return Ok(0);
        }

        self.add_daily_words(day, words)?;

        ensure_parent(&self.totals_path)?;
        let _lock = FileLock::acquire(&self.totals_path)?;
        let mut totals: UsageTotals = read_json(&self.totals_path)?;
        totals.total_words += words;
        totals.total_time += audio.as_secs_f64();
        totals.total_process_time += process.as_secs_f64();
        write_json(&self.totals_path, &totals)?;

        tracing::debug!(words, total_words = totals.total_words, "Usage recorded");
        Ok(words)
    }

    fn add_daily_words(&self, day: NaiveDate, words: u64) -> Result<()> {
        ensure_parent(&self.activity_path)?;
        let _lock = FileLock::acquire(&self.activity_path)?;
        let mut activity: ActivityFile = read_json(&self.activity_path)?;

        let date = day_bucket(day);
        match activity.daily_activity.iter_mut().find(|e| e.date == date) {
            Some(entry) => entry.words += words,
            None => activity.daily_activity.push(DailyActivity { date, words }),
        }
        write_json(&self.activity_path, &activity)
    }

    pub fn totals(&self) -> Result<UsageTotals> {
        read_json(&self.totals_path)
    }

    pub fn dashboard(&self) -> Result<DashboardStats> {
        Ok(DashboardStats::from_totals(&self.totals()?))
    }

    /// Words per day for the `days` days ending with `today`, zero-filled
    pub fn chart(&self, days: u32, today: NaiveDate) -> Result<BTreeMap<String, u64>> {
        let activity: ActivityFile = read_json(&self.activity_path)?;
        let recorded: BTreeMap<String, u64> = activity
            .daily_activity
            .into_iter()
            .map(|e| (e.date, e.words))
            .collect();

        let mut chart = BTreeMap::new();
        for offset in (0..days.max(1)).rev() {
            let Some(day) = today.checked_sub_days(chrono::Days::new(offset as u64)) else {
                continue;
            };
            let date = day_bucket(day);
            let words = recorded.get(&date).copied().unwrap_or(0);
            chart.insert(date, words);
        }
        Ok(chart)
    }
}

/// Missing, empty or corrupt files read as the default value
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), "Unreadable stats file, starting fresh: {}", e);
        T::default()
    }))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    write_atomic(path, &content)
}
