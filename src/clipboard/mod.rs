//! Clipboard access and autopaste
//!
//! Results reach the focused application through the clipboard plus a
//! simulated paste keystroke; the current selection is read with a simulated
//! copy.

mod autopaste;
mod system;


pub use autopaste::{
    CLEAR_DELAY, PASTE_DELAY, POLL_INTERVAL, RESTORE_BACKOFF, RESTORE_RETRIES, capture_selection,
    copy_result, paste_and_clear, restore_clipboard,
};
pub use system::SystemClipboard;

use anyhow::Result;

/// Clipboard plus keystroke simulation
pub trait ClipboardService: Send + Sync {
    /// Current clipboard text (empty when the clipboard holds no text)
    fn read(&self) -> Result<String>;

    fn write(&self, text: &str) -> Result<()>;

    /// Simulate the platform paste shortcut in the focused application
    fn send_paste(&self) -> Result<()>;

    /// Simulate the platform copy shortcut in the focused application
    fn send_copy(&self) -> Result<()>;
}
