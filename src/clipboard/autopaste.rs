//! Paste, copy and selection capture on top of a [`ClipboardService`]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::ClipboardService;

/// Pause between writing the clipboard and pasting
pub const PASTE_DELAY: Duration = Duration::from_millis(100);
/// Pause between pasting and clearing the clipboard
pub const CLEAR_DELAY: Duration = Duration::from_millis(500);
/// Pause after clearing before the simulated copy
const CLEAR_SETTLE_DELAY: Duration = Duration::from_millis(50);
/// Interval while waiting for a simulated copy to land
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Retries after a failed clipboard restore
pub const RESTORE_RETRIES: u32 = 3;
/// Base backoff between restore attempts
pub const RESTORE_BACKOFF: Duration = Duration::from_millis(50);

/// Write `text`, paste it into the focused application, then clear the
/// clipboard so the result does not linger in clipboard history.
pub async fn paste_and_clear(clipboard: Arc<dyn ClipboardService>, text: &str) -> Result<()> {
    if text.is_empty() {
        tracing::debug!("paste_and_clear called with empty text, skipping");
        return Ok(());
    }

    clipboard.write(text)?;
    tracing::debug!(chars = text.len(), "Copied to clipboard");
    tokio::time::sleep(PASTE_DELAY).await;

    let paster = Arc::clone(&clipboard);
    tokio::task::spawn_blocking(move || paster.send_paste())
        .await
        .context("Paste task failed")??;
    tracing::debug!("Simulated paste");

    tokio::time::sleep(CLEAR_DELAY).await;
    clipboard.write("")?;
    tracing::debug!("Clipboard cleared");
    Ok(())
}

/// Copy `text` to the clipboard, pasting it as well when `autopaste` is set.
///
/// Returns whether the text was pasted.
pub async fn copy_result(
    clipboard: Arc<dyn ClipboardService>,
    text: &str,
    autopaste: bool,
) -> Result<bool> {
    if autopaste {
        paste_and_clear(clipboard, text).await?;
        Ok(true)
    } else {
        clipboard.write(text)?;
        tracing::info!(chars = text.len(), "Result copied to clipboard");
        Ok(false)
    }
}

/// Read the text currently selected in the focused application.
///
/// Backs up the clipboard, clears it, simulates a copy and polls until text
/// appears or `timeout` elapses. The backup is restored in the background.
/// Returns an empty string when nothing was selected.
pub async fn capture_selection(clipboard: Arc<dyn ClipboardService>, timeout: Duration) -> String {
    let backup = match clipboard.read() {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("Could not back up clipboard: {}", e);
            String::new()
        }
    };

    let selected = match poll_copy(Arc::clone(&clipboard), timeout).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Selection capture failed: {}", e);
            String::new()
        }
    };

    if !backup.is_empty() {
        restore_clipboard(clipboard, backup);
    }

    selected
}

async fn poll_copy(clipboard: Arc<dyn ClipboardService>, timeout: Duration) -> Result<String> {
    clipboard.write("")?;
    tokio::time::sleep(CLEAR_SETTLE_DELAY).await;

    let copier = Arc::clone(&clipboard);
    tokio::task::spawn_blocking(move || copier.send_copy())
        .await
        .context("Copy task failed")??;

    let deadline = Instant::now() + timeout;
    loop {
        let content = clipboard.read().unwrap_or_default();
        if !content.is_empty() {
            tracing::debug!(chars = content.len(), "Captured selection");
            return Ok(content);
        }
        if Instant::now() >= deadline {
            tracing::debug!("No clipboard content after {:?}", timeout);
            return Ok(String::new());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Write `backup` back in the background with bounded retries.
///
/// Failures are logged, never surfaced. The handle resolves to whether the
/// restore succeeded.
pub fn restore_clipboard(clipboard: Arc<dyn ClipboardService>, backup: String) -> JoinHandle<bool> {
    tokio::spawn(async move {
        for attempt in 0..=RESTORE_RETRIES {
            match clipboard.write(&backup) {
                Ok(()) => {
                    tracing::debug!("Clipboard restored");
                    return true;
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, "Clipboard restore failed: {}", e);
                    if attempt < RESTORE_RETRIES {
                        tokio::time::sleep(RESTORE_BACKOFF * (attempt + 1)).await;
                    }
                }
            }
        }
        false
    })
}
