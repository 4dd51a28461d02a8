//! Recording state machine: idle -> recording -> finalizing -> idle

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use super::session::{RecordingKind, RecordingSession};
use crate::error::VoxError;
use crate::providers::{AudioCaptureService, VolumeControl};
use crate::state::RuntimeState;
use crate::ui::{UiEvent, UiSink};

const FILE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct RecordingSettings {
    /// Mute system output while recording
    pub mute_on_record: bool,
    /// Bound on waiting for the recording file after capture stops
    pub file_wait: Duration,
    /// Directory for recording files
    pub temp_dir: PathBuf,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            mute_on_record: false,
            file_wait: Duration::from_millis(2000),
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// A stopped recording ready for transcription
#[derive(Debug, Clone)]
pub struct FinishedRecording {
    pub kind: RecordingKind,
    pub path: PathBuf,
    pub duration: Duration,
}

struct ActiveRecording {
    session: RecordingSession,
    /// Volume level to restore on stop
    restore_volume: Option<f32>,
}

/// Owns `is_recording`, `is_ai_recording` and the recording clock
pub struct RecordingMachine {
    state: Arc<RuntimeState>,
    capture: Arc<dyn AudioCaptureService>,
    volume: Arc<dyn VolumeControl>,
    ui: Arc<dyn UiSink>,
    settings: RecordingSettings,
    active: Mutex<Option<ActiveRecording>>,
}

impl RecordingMachine {
    pub fn new(
        state: Arc<RuntimeState>,
        capture: Arc<dyn AudioCaptureService>,
        volume: Arc<dyn VolumeControl>,
        ui: Arc<dyn UiSink>,
        settings: RecordingSettings,
    ) -> Self {
        Self {
            state,
            capture,
            volume,
            ui,
            settings,
            active: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveRecording>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Session currently being recorded
    pub fn current_session(&self) -> Option<RecordingSession> {
        self.active().as_ref().map(|a| a.session.clone())
    }

    /// Start a recording of `kind`.
    ///
    /// Returns `Ok(None)` without side effects when a recording is already
    /// running.
    pub async fn start(&self, kind: RecordingKind) -> Result<Option<RecordingSession>, VoxError> {
        if !self.state.begin_recording(kind.is_ai()) {
            tracing::debug!(%kind, "Start ignored, already recording");
            return Ok(None);
        }

        let session = RecordingSession::new(kind, &self.settings.temp_dir);
        let restore_volume = if self.settings.mute_on_record {
            match self.volume.mute() {
                Ok(level) => Some(level),
                Err(e) => {
                    tracing::warn!("Failed to mute system volume: {}", e);
                    None
                }
            }
        } else {
            None
        };

        *self.active() = Some(ActiveRecording {
            session: session.clone(),
            restore_volume,
        });

        tracing::info!(%kind, session = %session.id(), "Recording started");
        self.ui.notify(UiEvent::RecordingStarted { kind });

        if let Err(e) = self.capture.start_capture(&session).await {
            tracing::error!("Failed to start audio capture: {}", e);
            self.abort().await;
            return Err(VoxError::Input(format!("Could not start recording: {}", e)));
        }

        Ok(Some(session))
    }

    /// Stop the running recording and wait for its file.
    ///
    /// Returns `Ok(None)` when nothing was recording. Flags are cleared before
    /// waiting, so a missing file still leaves the machine idle.
    pub async fn stop(&self) -> Result<Option<FinishedRecording>, VoxError> {
        let Some(duration) = self.state.end_recording() else {
            tracing::debug!("Stop ignored, not recording");
            return Ok(None);
        };

        let Some(active) = self.active().take() else {
            return Err(VoxError::Input("No active recording session".to_string()));
        };
        active.session.close();
        self.restore_volume(active.restore_volume);

        if let Err(e) = self.capture.stop_capture().await {
            tracing::warn!("Audio capture did not stop cleanly: {}", e);
        }

        let kind = active.session.kind();
        tracing::info!(%kind, duration_ms = duration.as_millis() as u64, "Recording stopped");
        self.ui.notify(UiEvent::RecordingStopped { kind, duration });

        let path = active.session.path().to_path_buf();
        if !wait_for_file(&path, self.settings.file_wait).await {
            tracing::error!(path = %path.display(), "Recording file never materialized");
            let _ = std::fs::remove_file(&path);
            return Err(VoxError::Input("Recording file not found".to_string()));
        }

        Ok(Some(FinishedRecording {
            kind,
            path,
            duration,
        }))
    }

    /// Drop the running recording without producing a file.
    pub async fn abort(&self) {
        self.state.end_recording();
        let active = self.active().take();
        if let Some(active) = active {
            active.session.close();
            self.restore_volume(active.restore_volume);
            if let Err(e) = self.capture.stop_capture().await {
                tracing::debug!("Stopping capture during abort failed: {}", e);
            }
            let _ = std::fs::remove_file(active.session.path());
        }
    }

    fn restore_volume(&self, level: Option<f32>) {
        if let Some(level) = level {
            if let Err(e) = self.volume.restore(level) {
                tracing::warn!("Failed to restore system volume: {}", e);
            }
        }
    }
}

/// Poll until `path` exists with non-zero size or `timeout` elapses.
pub async fn wait_for_file(path: &Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(meta) = std::fs::metadata(path) {
            if meta.len() > 0 {
                return true;
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(FILE_POLL_INTERVAL).await;
    }
}
