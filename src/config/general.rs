//! General settings

use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_AUDIO_MODEL: &str = "nova-2";

/// `[general]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Transcription language (en, de, fr, ...)
    #[serde(default = "default_language")]
    pub language: String,

    /// Chat model used for general generations
    #[serde(default = "default_model")]
    pub model: String,

    /// Transcription model
    #[serde(default = "default_audio_model")]
    pub audio_model: String,

    /// Mute system volume while recording
    #[serde(default)]
    pub mute_on_record: bool,

    /// Paste dictation results into the focused application
    #[serde(default = "default_true")]
    pub autopaste: bool,

    /// Forward response chunks to the UI while they stream in
    #[serde(default = "default_true")]
    pub stream_responses: bool,

    /// Write spoken numbers as digits (English and French transcripts)
    #[serde(default = "default_true")]
    pub convert_numbers: bool,

    /// Keep a history log and usage statistics in the config directory
    #[serde(default = "default_true")]
    pub record_usage: bool,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_audio_model() -> String {
    DEFAULT_AUDIO_MODEL.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            model: default_model(),
            audio_model: default_audio_model(),
            mute_on_record: false,
            autopaste: true,
            stream_responses: true,
            convert_numbers: true,
            record_usage: true,
        }
    }
}

/// `[timeouts]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline for one busy operation before the watchdog resets everything
    #[serde(default = "default_watchdog_secs")]
    pub watchdog_secs: u64,

    /// How long to wait for the recording file after capture stops
    #[serde(default = "default_recording_file_wait_ms")]
    pub recording_file_wait_ms: u64,

    /// How long to wait for a simulated copy to populate the clipboard
    #[serde(default = "default_clipboard_timeout_ms")]
    pub clipboard_timeout_ms: u64,
}

fn default_watchdog_secs() -> u64 {
    60
}

fn default_recording_file_wait_ms() -> u64 {
    2000
}

fn default_clipboard_timeout_ms() -> u64 {
    800
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            watchdog_secs: default_watchdog_secs(),
            recording_file_wait_ms: default_recording_file_wait_ms(),
            clipboard_timeout_ms: default_clipboard_timeout_ms(),
        }
    }
}
