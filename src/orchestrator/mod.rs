//! Orchestrator
//!
//! Wires hotkeys, recording, transcription, dispatch and generation together.
//! Every public trigger returns a join handle right away; progress and
//! failures reach the embedding application through the [`UiSink`] and the
//! [`EventBus`].

mod assistant;
mod capture;
mod dictation;
mod hotkey_wiring;
mod usage;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::agents::AgentDispatcher;
use crate::clipboard::ClipboardService;
use crate::config::{Config, HotkeyBindings};
use crate::error::VoxError;
use crate::events::{AppEvent, EventBus};
use crate::history::HistoryStore;
use crate::hotkeys::{HotkeyError, HotkeyListener, KeyFeed};
use crate::pipeline::{GenerationMode, GenerationPipeline};
use crate::providers::{
    AudioCaptureService, NoScreenCapture, NoVolumeControl, ProviderRouter, ScreenCapture,
    TranscriptionProvider, VolumeControl,
};
use crate::recording::{RecordingKind, RecordingMachine, RecordingSession, RecordingSettings};
use crate::state::RuntimeState;
use crate::stats::StatsRecorder;
use crate::transcript::Replacement;
use crate::ui::{UiEvent, UiSink};
use crate::watchdog::Watchdog;

/// External services the orchestrator drives
pub struct Collaborators {
    pub capture: Arc<dyn AudioCaptureService>,
    pub transcriber: Arc<dyn TranscriptionProvider>,
    pub router: ProviderRouter,
    pub clipboard: Arc<dyn ClipboardService>,
    pub ui: Arc<dyn UiSink>,
    pub volume: Arc<dyn VolumeControl>,
    pub screen: Arc<dyn ScreenCapture>,
    pub history: Option<HistoryStore>,
    pub stats: Option<StatsRecorder>,
}

impl Collaborators {
    pub fn new(
        capture: Arc<dyn AudioCaptureService>,
        transcriber: Arc<dyn TranscriptionProvider>,
        router: ProviderRouter,
        clipboard: Arc<dyn ClipboardService>,
        ui: Arc<dyn UiSink>,
    ) -> Self {
        Self {
            capture,
            transcriber,
            router,
            clipboard,
            ui,
            volume: Arc::new(NoVolumeControl),
            screen: Arc::new(NoScreenCapture),
            history: None,
            stats: None,
        }
    }

    pub fn with_volume(mut self, volume: Arc<dyn VolumeControl>) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_screen(mut self, screen: Arc<dyn ScreenCapture>) -> Self {
        self.screen = screen;
        self
    }

    /// Keep the history log and usage statistics in `dir`
    pub fn with_usage_log(mut self, dir: &Path) -> Self {
        self.history = Some(HistoryStore::new(dir.join("history.json")));
        self.stats = Some(StatsRecorder::new(dir));
        self
    }
}

/// Settings read from [`Config`] at construction
#[derive(Debug, Clone)]
pub(crate) struct OrchestratorSettings {
    pub autopaste: bool,
    pub stream_responses: bool,
    pub clipboard_timeout: Duration,
    pub replacements: Vec<Replacement>,
    pub convert_numbers: bool,
}

pub(crate) struct Inner {
    pub state: Arc<RuntimeState>,
    pub recorder: RecordingMachine,
    pub transcriber: Arc<dyn TranscriptionProvider>,
    pub pipeline: GenerationPipeline,
    pub dispatcher: RwLock<AgentDispatcher>,
    pub clipboard: Arc<dyn ClipboardService>,
    pub screen: Arc<dyn ScreenCapture>,
    pub ui: Arc<dyn UiSink>,
    pub events: Arc<EventBus>,
    pub watchdog: Watchdog,
    pub history: Option<HistoryStore>,
    pub stats: Option<StatsRecorder>,
    pub settings: OrchestratorSettings,
}

pub struct Orchestrator {
    inner: Arc<Inner>,
    hotkeys: Mutex<Option<HotkeyListener>>,
}

impl Orchestrator {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let state = Arc::new(RuntimeState::from_config(config));
        Self::with_state(config, state, collaborators)
    }

    /// Build on an existing shared state
    pub fn with_state(config: &Config, state: Arc<RuntimeState>, collaborators: Collaborators) -> Self {
        let Collaborators {
            capture,
            transcriber,
            router,
            clipboard,
            ui,
            volume,
            screen,
            history,
            stats,
        } = collaborators;
        let record_usage = config.general.record_usage;

        let recorder = RecordingMachine::new(
            Arc::clone(&state),
            capture,
            volume,
            Arc::clone(&ui),
            RecordingSettings {
                mute_on_record: config.general.mute_on_record,
                file_wait: Duration::from_millis(config.timeouts.recording_file_wait_ms),
                ..RecordingSettings::default()
            },
        );
        let pipeline = GenerationPipeline::new(Arc::clone(&state), router, Arc::clone(&ui));
        let watchdog = Watchdog::new(
            Arc::clone(&state),
            Arc::clone(&ui),
            Duration::from_secs(config.timeouts.watchdog_secs),
        );

        let inner = Inner {
            state,
            recorder,
            transcriber,
            pipeline,
            dispatcher: RwLock::new(AgentDispatcher::new(config.agents.clone())),
            clipboard,
            screen,
            ui,
            events: Arc::new(EventBus::new()),
            watchdog,
            history: history.filter(|_| record_usage),
            stats: stats.filter(|_| record_usage),
            settings: OrchestratorSettings {
                autopaste: config.general.autopaste,
                stream_responses: config.general.stream_responses,
                clipboard_timeout: Duration::from_millis(config.timeouts.clipboard_timeout_ms),
                replacements: config.replacements.clone(),
                convert_numbers: config.general.convert_numbers,
            },
        };

        Self {
            inner: Arc::new(inner),
            hotkeys: Mutex::new(None),
        }
    }

    pub fn state(&self) -> Arc<RuntimeState> {
        Arc::clone(&self.inner.state)
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.inner.events)
    }

    /// Session currently being recorded
    pub fn current_recording(&self) -> Option<RecordingSession> {
        self.inner.recorder.current_session()
    }

    /// Replace the agent list, e.g. after the settings were edited
    pub fn set_agents(&self, agents: Vec<crate::config::Agent>) {
        *self
            .inner
            .dispatcher
            .write()
            .unwrap_or_else(|e| e.into_inner()) = AgentDispatcher::new(agents);
    }

    pub fn clear_history(&self) {
        let mut conversation = self.inner.state.conversation();
        conversation.clear();
        conversation.set_response_visible(false);
    }

    fn listener(&self) -> MutexGuard<'_, Option<HotkeyListener>> {
        self.hotkeys.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Bind the hotkey actions and start the input listener.
    ///
    /// Must be called from within a tokio runtime. On failure the previously
    /// registered bindings stay active.
    pub fn register_hotkeys(&self, bindings: &HotkeyBindings) -> Result<usize, HotkeyError> {
        let handlers = hotkey_wiring::default_handlers(&self.inner);
        let mut slot = self.listener();
        if slot.is_none() {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|e| HotkeyError::ListenerStart(e.to_string()))?;
            *slot = Some(HotkeyListener::new(runtime));
        }
        match slot.as_mut() {
            Some(listener) => listener.register(bindings, &handlers),
            None => Err(HotkeyError::NoBindings),
        }
    }

    /// Feed for the OS keyboard hook, once hotkeys were registered
    pub fn key_feed(&self) -> Option<KeyFeed> {
        self.listener().as_ref().map(|l| l.feed())
    }

    pub fn start_dictation(&self) -> JoinHandle<()> {
        self.inner.start_recording(RecordingKind::Dictation)
    }

    /// Stop whatever is recording and process it
    pub fn stop_dictation(&self) -> JoinHandle<()> {
        self.inner.finish_recording()
    }

    /// Start an assistant recording, or finish the running one
    pub fn trigger_ai_generation(&self) -> JoinHandle<()> {
        self.inner.toggle_assistant(GenerationMode::Text)
    }

    pub fn trigger_web_search(&self) -> JoinHandle<()> {
        self.inner.toggle_assistant(GenerationMode::Web)
    }

    pub fn trigger_vision_generation(&self) -> JoinHandle<()> {
        self.inner.toggle_assistant(GenerationMode::Vision)
    }

    /// Stop the hotkey listener and drop any running recording
    pub async fn shutdown(&self) {
        self.inner.state.set_exiting();
        if let Some(mut listener) = self.listener().take() {
            listener.stop();
        }
        self.inner.recorder.abort().await;
        tracing::info!("Orchestrator shut down");
    }
}

impl Inner {
    /// Spawn `operation` and report its failure to the UI
    fn spawn_op<F>(self: &Arc<Self>, name: &'static str, operation: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = Result<(), VoxError>> + Send + 'static,
    {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = operation.await {
                inner.report(name, &e);
            }
        })
    }

    fn report(&self, operation: &str, error: &VoxError) {
        if !error.is_reportable() {
            tracing::debug!(operation, "Operation abandoned: {}", error);
            return;
        }
        tracing::error!(operation, "Operation failed: {}", error);
        self.ui.notify(UiEvent::Error(error.user_message()));
    }

    pub(crate) fn start_recording(self: &Arc<Self>, kind: RecordingKind) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        self.spawn_op("start_recording", async move {
            if inner.state.is_busy() {
                tracing::debug!(%kind, "Start ignored, an operation is still running");
                return Ok(());
            }
            if let Some(session) = inner.recorder.start(kind).await? {
                inner.watch_silence(session);
            }
            Ok(())
        })
    }

    pub(crate) fn finish_recording(self: &Arc<Self>) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        self.spawn_op("finish_recording", async move { inner.finish().await })
    }

    pub(crate) fn toggle_assistant(self: &Arc<Self>, mode: GenerationMode) -> JoinHandle<()> {
        if self.state.is_ai_recording() {
            self.finish_recording()
        } else {
            self.start_recording(RecordingKind::Assistant(mode))
        }
    }

    /// Stop the recording as if the key was released once silence is reported
    fn watch_silence(self: &Arc<Self>, session: RecordingSession) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let closed = session.closed_token();
            let silence = session.silence_token();
            tokio::select! {
                _ = closed.cancelled() => {}
                _ = silence.cancelled() => {
                    tracing::info!(session = %session.id(), "Silence detected, stopping recording");
                    if let Err(e) = inner.finish().await {
                        inner.report("silence_stop", &e);
                    }
                }
            }
        });
    }

    /// Stop the running recording, then transcribe and route it by kind
    async fn finish(self: &Arc<Self>) -> Result<(), VoxError> {
        if !self.state.is_recording() {
            tracing::debug!("Finish ignored, not recording");
            return Ok(());
        }

        // The busy holder owns the recording; it ends the session itself
        let Some(busy) = self.state.try_begin_busy() else {
            tracing::debug!("Finish ignored, another operation is finishing the recording");
            return Ok(());
        };
        let _watchdog = self.watchdog.arm(&busy);
        let cancel = busy.cancel_token();

        let Some(finished) = self.recorder.stop().await? else {
            return Ok(());
        };
        let _file = capture::RecordingFile::new(finished.path.clone());

        match finished.kind {
            RecordingKind::Dictation => self.run_dictation(&finished, &cancel).await,
            RecordingKind::Assistant(mode) => self.run_assistant(mode, &finished, &cancel).await,
        }
    }

    pub(crate) async fn emit(&self, event: AppEvent) {
        self.events.publish(event).await;
    }
}
