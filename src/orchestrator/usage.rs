//! History log and usage statistics, written off the request path

use std::time::Duration;

use super::Inner;
use crate::transcript::preview;

impl Inner {
    /// Count a transcript towards the usage statistics in the background
    pub(crate) fn record_stats(&self, text: &str, audio: Duration, process: Duration) {
        let Some(stats) = self.stats.clone() else {
            return;
        };
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = stats.record(&text, audio, process) {
                tracing::warn!("Recording usage statistics failed: {:#}", e);
            }
        });
    }

    /// Append `entry` to the history log in the background
    pub(crate) fn record_history(&self, entry: String) {
        let Some(history) = self.history.clone() else {
            return;
        };
        tokio::task::spawn_blocking(move || {
            if let Err(e) = history.add(&entry) {
                tracing::warn!(entry = %preview(&entry), "Adding history entry failed: {:#}", e);
            }
        });
    }
}
