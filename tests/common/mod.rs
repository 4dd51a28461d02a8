//! Shared fakes for orchestrator integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;

use voxdesk::clipboard::ClipboardService;
use voxdesk::config::Config;
use voxdesk::conversation::ConversationMessage;
use voxdesk::error::{ProviderError, ProviderErrorKind, TranscriptionError};
use voxdesk::events::{AppEvent, EventBus, EventKind};
use voxdesk::providers::{
    AudioCaptureService, FragmentStream, LlmProvider, ProviderRouter, ScreenCapture,
    TranscriptionProvider,
};
use voxdesk::recording::RecordingSession;
use voxdesk::ui::{ChannelUiSink, UiEvent};
use voxdesk::{Collaborators, Orchestrator};

/// Writes a small WAV stub when capture stops
#[derive(Default)]
pub struct FakeCapture {
    session: Mutex<Option<RecordingSession>>,
    paths: Mutex<Vec<PathBuf>>,
}

impl FakeCapture {
    /// Every recording file handed to the capture service
    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }

    /// Report trailing silence on the running session
    pub fn signal_silence(&self) {
        if let Some(session) = self.session.lock().unwrap().as_ref() {
            session.signal_silence();
        }
    }
}

#[async_trait]
impl AudioCaptureService for FakeCapture {
    async fn start_capture(&self, session: &RecordingSession) -> Result<()> {
        self.paths.lock().unwrap().push(session.path().to_path_buf());
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn stop_capture(&self) -> Result<()> {
        if let Some(session) = self.session.lock().unwrap().take() {
            std::fs::write(session.path(), b"RIFF....WAVEfmt ")?;
        }
        Ok(())
    }
}

/// Returns a fixed transcript, or fails every call once `fail_with` is set
pub struct FakeTranscriber {
    text: Mutex<String>,
    failure: Mutex<Option<TranscriptionError>>,
    calls: AtomicU32,
    /// Whether the recording file existed when transcription ran
    saw_file: Mutex<Vec<bool>>,
}

impl FakeTranscriber {
    pub fn new(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_string()),
            failure: Mutex::new(None),
            calls: AtomicU32::new(0),
            saw_file: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_with(&self, error: TranscriptionError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn saw_file(&self) -> Vec<bool> {
        self.saw_file.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionProvider for FakeTranscriber {
    async fn transcribe(
        &self,
        path: &Path,
        _language: &str,
        _model: &str,
    ) -> std::result::Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saw_file.lock().unwrap().push(path.exists());
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.text.lock().unwrap().clone())
    }
}

/// A request seen by [`ScriptedProvider`]
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub messages: Vec<ConversationMessage>,
    pub model: String,
}

/// Streams a fixed list of fragments, optionally slowly, optionally ending in an error
pub struct ScriptedProvider {
    fragments: Vec<String>,
    failure: Option<ProviderErrorKind>,
    delay: Duration,
    requests: Mutex<Vec<SeenRequest>>,
}

impl ScriptedProvider {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: None,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stream the first `n` fragments, then fail with `kind`
    pub fn failing_after(mut self, n: usize, kind: ProviderErrorKind) -> Self {
        self.fragments.truncate(n);
        self.failure = Some(kind);
        self
    }

    /// Wait `delay` before every fragment
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn stream_chat(
        &self,
        messages: &[ConversationMessage],
        model: &str,
    ) -> std::result::Result<FragmentStream, ProviderError> {
        self.requests.lock().unwrap().push(SeenRequest {
            messages: messages.to_vec(),
            model: model.to_string(),
        });
        let delay = self.delay;
        let mut fragments: Vec<Result<String, ProviderError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if let Some(kind) = self.failure {
            fragments.push(Err(ProviderError::new(kind, "scripted failure")));
        }
        let stream = futures::stream::iter(fragments).then(move |item| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            item
        });
        Ok(Box::pin(stream))
    }
}

/// In-memory clipboard; a simulated copy yields `selection`
#[derive(Default)]
pub struct FakeClipboard {
    content: Mutex<String>,
    selection: String,
    writes: Mutex<Vec<String>>,
    pastes: AtomicU32,
}

impl FakeClipboard {
    pub fn with_selection(selection: &str) -> Self {
        Self {
            selection: selection.to_string(),
            ..Default::default()
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn pastes(&self) -> u32 {
        self.pastes.load(Ordering::SeqCst)
    }
}

impl ClipboardService for FakeClipboard {
    fn read(&self) -> Result<String> {
        Ok(self.content.lock().unwrap().clone())
    }

    fn write(&self, text: &str) -> Result<()> {
        self.writes.lock().unwrap().push(text.to_string());
        *self.content.lock().unwrap() = text.to_string();
        Ok(())
    }

    fn send_paste(&self) -> Result<()> {
        self.pastes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn send_copy(&self) -> Result<()> {
        *self.content.lock().unwrap() = self.selection.clone();
        Ok(())
    }
}

/// Screen capture returning a fixed data URL
pub struct FakeScreen;

pub const SCREENSHOT_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

#[async_trait]
impl ScreenCapture for FakeScreen {
    async fn capture(&self) -> Result<Option<String>> {
        Ok(Some(SCREENSHOT_URL.to_string()))
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub capture: Arc<FakeCapture>,
    pub transcriber: Arc<FakeTranscriber>,
    pub provider: Arc<ScriptedProvider>,
    pub clipboard: Arc<FakeClipboard>,
    pub ui: UnboundedReceiver<UiEvent>,
}

pub struct HarnessBuilder {
    config: Config,
    transcript: String,
    provider: ScriptedProvider,
    clipboard: FakeClipboard,
    screen: bool,
    usage_dir: Option<PathBuf>,
}

pub fn harness(transcript: &str) -> HarnessBuilder {
    HarnessBuilder {
        config: Config::default(),
        transcript: transcript.to_string(),
        provider: ScriptedProvider::new(&["OK"]),
        clipboard: FakeClipboard::default(),
        screen: false,
        usage_dir: None,
    }
}

impl HarnessBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn provider(mut self, provider: ScriptedProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn clipboard(mut self, clipboard: FakeClipboard) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_screen(mut self) -> Self {
        self.screen = true;
        self
    }

    /// Keep history and statistics in `dir`
    pub fn usage_log(mut self, dir: &Path) -> Self {
        self.usage_dir = Some(dir.to_path_buf());
        self
    }

    pub fn build(self) -> Harness {
        let capture = Arc::new(FakeCapture::default());
        let transcriber = Arc::new(FakeTranscriber::new(&self.transcript));
        let provider = Arc::new(self.provider);
        let clipboard = Arc::new(self.clipboard);
        let (sink, ui) = ChannelUiSink::new();

        let mut collaborators = Collaborators::new(
            capture.clone(),
            transcriber.clone(),
            ProviderRouter::new(provider.clone()),
            clipboard.clone(),
            Arc::new(sink),
        );
        if self.screen {
            collaborators = collaborators.with_screen(Arc::new(FakeScreen));
        }
        if let Some(dir) = &self.usage_dir {
            collaborators = collaborators.with_usage_log(dir);
        }

        Harness {
            orchestrator: Orchestrator::new(&self.config, collaborators),
            capture,
            transcriber,
            provider,
            clipboard,
            ui,
        }
    }
}

impl Harness {
    /// Every UI event delivered so far
    pub fn drain_ui(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.ui.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the first UI event matching `predicate`
    pub async fn wait_for_ui(
        &mut self,
        timeout: Duration,
        predicate: impl Fn(&UiEvent) -> bool,
    ) -> Option<UiEvent> {
        tokio::time::timeout(timeout, async {
            while let Some(event) = self.ui.recv().await {
                if predicate(&event) {
                    return Some(event);
                }
            }
            None
        })
        .await
        .ok()
        .flatten()
    }
}

/// Record every event of `kind` emitted on `bus`
pub fn collect_events(bus: &EventBus, kind: EventKind) -> Arc<Mutex<Vec<AppEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe(kind, move |event| sink.lock().unwrap().push(event.clone()));
    seen
}

/// Count events of `kind` emitted on `bus`
pub fn count_events(bus: &EventBus, kind: EventKind) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    bus.subscribe(kind, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    count
}

/// Poll `condition` while background writers run on the blocking pool
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
        tokio::task::yield_now().await;
    }
    condition()
}

pub fn errors(events: &[UiEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Error(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}
