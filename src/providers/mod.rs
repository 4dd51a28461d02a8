//! External collaborator traits
//!
//! Audio capture, transcription, LLM streaming, volume control and screen
//! capture live outside the core. Each is reached through a trait so the
//! embedding application (and the tests) can plug in their own implementation.

mod router;

pub use router::ProviderRouter;

use std::path::Path;
use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

use crate::conversation::ConversationMessage;
use crate::error::{ProviderError, TranscriptionError};
use crate::recording::RecordingSession;

/// Stream of response fragments from an LLM provider
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Records audio into the session's target file
#[async_trait]
pub trait AudioCaptureService: Send + Sync {
    /// Begin capturing into `session.path()`.
    ///
    /// The service may call [`RecordingSession::signal_silence`] when it
    /// detects trailing silence.
    async fn start_capture(&self, session: &RecordingSession) -> Result<()>;

    /// Stop capturing and finish writing the file.
    async fn stop_capture(&self) -> Result<()>;
}

/// Turns a finished recording into text
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(
        &self,
        path: &Path,
        language: &str,
        model: &str,
    ) -> std::result::Result<String, TranscriptionError>;
}

/// Streams chat completions
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier used in logs
    fn id(&self) -> &str;

    async fn stream_chat(
        &self,
        messages: &[ConversationMessage],
        model: &str,
    ) -> std::result::Result<FragmentStream, ProviderError>;
}

/// System volume control used to mute while recording
pub trait VolumeControl: Send + Sync {
    /// Mute the output and return the level to restore later.
    fn mute(&self) -> Result<f32>;

    fn restore(&self, level: f32) -> Result<()>;
}

/// Screen grabber for vision requests
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Capture the primary screen as an image data URL.
    async fn capture(&self) -> Result<Option<String>>;
}

/// Volume control that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVolumeControl;

impl VolumeControl for NoVolumeControl {
    fn mute(&self) -> Result<f32> {
        Ok(1.0)
    }

    fn restore(&self, _level: f32) -> Result<()> {
        Ok(())
    }
}

/// Screen capture that never produces an image
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScreenCapture;

#[async_trait]
impl ScreenCapture for NoScreenCapture {
    async fn capture(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
