//! System clipboard backed by arboard and platform keystroke tools
//!
//! Keystrokes use osascript on macOS and xdotool (X11) or ydotool (Wayland)
//! on Linux.

use anyhow::{Context, Result, anyhow};
use arboard::Clipboard;
#[cfg(any(target_os = "macos", target_os = "linux"))]
use std::process::Command;

use super::ClipboardService;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardService for SystemClipboard {
    fn read(&self) -> Result<String> {
        let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(anyhow!("Failed to read clipboard: {}", e)),
        }
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
        if text.is_empty() {
            clipboard.clear().context("Failed to clear clipboard")
        } else {
            clipboard
                .set_text(text)
                .context("Failed to copy to clipboard")
        }
    }

    fn send_paste(&self) -> Result<()> {
        send_shortcut('v')
    }

    fn send_copy(&self) -> Result<()> {
        send_shortcut('c')
    }
}

/// Simulate Cmd+<key> on macOS
#[cfg(target_os = "macos")]
fn send_shortcut(key: char) -> Result<()> {
    let script = format!(
        r#"tell application "System Events" to keystroke "{}" using command down"#,
        key
    );
    let output = Command::new("osascript")
        .args(["-e", &script])
        .output()
        .context("Failed to run osascript")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("osascript failed: {}", stderr));
    }

    Ok(())
}

/// Simulate Ctrl+<key> on Linux
#[cfg(target_os = "linux")]
fn send_shortcut(key: char) -> Result<()> {
    let xdotool = Command::new("xdotool")
        .args(["key", &format!("ctrl+{}", key)])
        .output();

    if matches!(xdotool, Ok(ref output) if output.status.success()) {
        return Ok(());
    }

    // Wayland fallback with raw evdev key codes (29 = left ctrl)
    let code = match key {
        'v' => "47",
        'c' => "46",
        other => return Err(anyhow!("No key code for '{}'", other)),
    };
    let ydotool = Command::new("ydotool")
        .args([
            "key",
            "29:1",
            &format!("{}:1", code),
            &format!("{}:0", code),
            "29:0",
        ])
        .output();

    match ydotool {
        Ok(output) if output.status.success() => Ok(()),
        _ => Err(anyhow!(
            "Keystroke simulation requires xdotool (X11) or ydotool (Wayland)"
        )),
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn send_shortcut(_key: char) -> Result<()> {
    Err(anyhow!(
        "Keystroke simulation is not supported on this platform"
    ))
}
