//! Recording session handed to the capture service

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::pipeline::GenerationMode;

/// What a recording is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingKind {
    /// Speech-to-text pasted into the focused application
    Dictation,
    /// Spoken request to the assistant
    Assistant(GenerationMode),
}

impl RecordingKind {
    pub fn is_ai(&self) -> bool {
        matches!(self, RecordingKind::Assistant(_))
    }
}

impl std::fmt::Display for RecordingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordingKind::Dictation => write!(f, "dictation"),
            RecordingKind::Assistant(mode) => write!(f, "assistant ({})", mode),
        }
    }
}

/// One recording from start to stop
#[derive(Debug, Clone)]
pub struct RecordingSession {
    id: Uuid,
    kind: RecordingKind,
    path: PathBuf,
    started_at: Instant,
    silence: CancellationToken,
    closed: CancellationToken,
}

impl RecordingSession {
    /// New session writing to a unique file in `dir`
    pub fn new(kind: RecordingKind, dir: &Path) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            kind,
            path: dir.join(format!("voxdesk-{}.wav", id)),
            started_at: Instant::now(),
            silence: CancellationToken::new(),
            closed: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> RecordingKind {
        self.kind
    }

    /// Target file the capture service writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Report trailing silence; the orchestrator stops the recording.
    pub fn signal_silence(&self) {
        tracing::debug!(session = %self.id, "Silence detected");
        self.silence.cancel();
    }

    pub fn silence_detected(&self) -> bool {
        self.silence.is_cancelled()
    }

    /// Resolves once silence was signalled
    pub fn silence_token(&self) -> CancellationToken {
        self.silence.clone()
    }

    /// Resolves once the session was stopped or aborted
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    pub(super) fn close(&self) {
        self.closed.cancel();
    }
}
