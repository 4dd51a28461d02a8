//! Dictation: transcript straight into the focused application

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use super::Inner;
use crate::clipboard;
use crate::error::VoxError;
use crate::events::AppEvent;
use crate::recording::FinishedRecording;
use crate::transcript::preview;
use crate::ui::UiEvent;

impl Inner {
    pub(crate) async fn run_dictation(
        &self,
        recording: &FinishedRecording,
        cancel: &CancellationToken,
    ) -> Result<(), VoxError> {
        let started = Instant::now();
        self.ui.notify(UiEvent::TranscriptionStarted);
        self.emit(AppEvent::TranscriptionStarted).await;

        let raw = self.transcribe(recording, cancel).await?;
        let text = self.post_process(&raw)?;
        tracing::info!(chars = text.len(), preview = %preview(&text), "Dictation transcribed");

        self.emit(AppEvent::TranscriptionComplete {
            text: text.clone(),
            duration: recording.duration,
        })
        .await;
        self.ui.notify(UiEvent::Transcript { text: text.clone() });

        if cancel.is_cancelled() {
            return Err(VoxError::Cancelled);
        }

        let pasted = clipboard::copy_result(Arc::clone(&self.clipboard), &text, self.settings.autopaste)
            .await
            .map_err(|e| {
                tracing::error!("Delivering dictation failed: {}", e);
                VoxError::Input("Could not paste the transcript.".to_string())
            })?;
        self.ui.notify(UiEvent::ResultDelivered { pasted });

        self.record_stats(&text, recording.duration, started.elapsed());
        self.record_history(text);
        Ok(())
    }
}
