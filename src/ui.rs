//! UI notification sink
//!
//! The core never renders anything. It reports progress through a [`UiSink`]
//! that the embedding application implements.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::pipeline::GenerationMode;
use crate::recording::RecordingKind;

/// Notifications sent to the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    RecordingStarted { kind: RecordingKind },
    RecordingStopped { kind: RecordingKind, duration: Duration },
    TranscriptionStarted,
    /// Final dictation text after post-processing
    Transcript { text: String },
    GenerationStarted { model: String, mode: GenerationMode },
    /// Visible part of a streaming response
    StreamChunk(String),
    GenerationFinished { text: String },
    /// Result placed on the clipboard (`pasted` when it was also pasted)
    ResultDelivered { pasted: bool },
    WindowVisibility(bool),
    /// User-facing error message
    Error(String),
    /// Everything went back to idle after a forced reset
    Reset,
}

/// Fire-and-forget receiver of [`UiEvent`]s
pub trait UiSink: Send + Sync {
    fn notify(&self, event: UiEvent);
}

/// Forwards events into an unbounded channel
#[derive(Clone)]
pub struct ChannelUiSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelUiSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl UiSink for ChannelUiSink {
    fn notify(&self, event: UiEvent) {
        // Receiver gone means the UI shut down
        let _ = self.tx.send(event);
    }
}

/// Writes events to the log (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUiSink;

impl UiSink for LogUiSink {
    fn notify(&self, event: UiEvent) {
        match event {
            UiEvent::Error(message) => tracing::warn!("{}", message),
            UiEvent::StreamChunk(chunk) => tracing::trace!(chars = chunk.len(), "stream chunk"),
            UiEvent::GenerationFinished { text } => {
                tracing::info!(chars = text.len(), "generation finished")
            }
            UiEvent::Transcript { text } => tracing::info!(chars = text.len(), "transcript ready"),
            other => tracing::info!("{:?}", other),
        }
    }
}
