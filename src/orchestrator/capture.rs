//! Context capture around a request: selection, screenshot, recording file

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::Inner;
use crate::clipboard;
use crate::error::VoxError;
use crate::recording::FinishedRecording;
use crate::transcript;

/// Deletes the recording file on every exit path
pub(crate) struct RecordingFile {
    path: PathBuf,
}

impl RecordingFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for RecordingFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Recording file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), "Failed to remove recording file: {}", e),
        }
    }
}

impl Inner {
    /// Transcribe a finished recording, abandoning it if `cancel` fires
    pub(crate) async fn transcribe(
        &self,
        recording: &FinishedRecording,
        cancel: &CancellationToken,
    ) -> Result<String, VoxError> {
        let selection = self.state.selection();
        tracing::info!(
            language = %selection.language,
            model = %selection.audio_model,
            duration_ms = recording.duration.as_millis() as u64,
            "Transcribing"
        );

        let text = tokio::select! {
            _ = cancel.cancelled() => return Err(VoxError::Cancelled),
            result = self.transcriber.transcribe(
                &recording.path,
                &selection.language,
                &selection.audio_model,
            ) => result?,
        };
        Ok(text)
    }

    /// Text selected in the focused application, empty if none
    pub(crate) async fn selected_text(&self) -> String {
        clipboard::capture_selection(Arc::clone(&self.clipboard), self.settings.clipboard_timeout).await
    }

    /// Screenshot as a data URL; capture failures are logged and yield `None`
    pub(crate) async fn screenshot(&self) -> Option<String> {
        match self.screen.capture().await {
            Ok(Some(image)) => {
                tracing::debug!(bytes = image.len(), "Screen captured");
                Some(image)
            }
            Ok(None) => {
                tracing::warn!("Screen capture returned nothing");
                None
            }
            Err(e) => {
                tracing::error!("Screen capture failed: {}", e);
                None
            }
        }
    }

    /// Convert spoken numbers, apply replacements and reject empty transcripts
    pub(crate) fn post_process(&self, raw: &str) -> Result<String, VoxError> {
        let mut text = raw.trim().to_string();
        if self.settings.convert_numbers {
            text = transcript::convert_numbers(&text, &self.state.selection().language);
        }
        let text = transcript::apply_replacements(&text, &self.settings.replacements)
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(VoxError::Input("No speech detected.".to_string()));
        }
        Ok(text)
    }
}
