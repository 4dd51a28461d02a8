//! Shared runtime state
//!
//! One `RuntimeState` exists per process and is injected as `Arc<RuntimeState>`
//! into every component. Field clusters are guarded separately:
//!
//! - flags are atomics (`recording`/`ai_recording` owned by the recording
//!   state machine, `busy` by [`BusyGuard`] and the watchdog, `settings_open`
//!   and `window_visible` by the UI layer)
//! - the recording clock has its own mutex
//! - the conversation has its own mutex and is mutated only by the pipeline
//! - model selection and the model catalog each sit behind an `RwLock`

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, ModelCatalog};
use crate::conversation::Conversation;

/// Identifier of one busy operation. Zero means idle.
pub type OpId = u64;

const IDLE: OpId = 0;

/// Language and model choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub language: String,
    pub selected_model: String,
    pub audio_model: String,
}

pub struct RuntimeState {
    recording: AtomicBool,
    ai_recording: AtomicBool,
    settings_open: AtomicBool,
    exiting: AtomicBool,
    window_visible: AtomicBool,
    busy: AtomicU64,
    next_op: AtomicU64,
    recording_started: Mutex<Option<Instant>>,
    conversation: Mutex<Conversation>,
    selection: RwLock<ModelSelection>,
    catalog: RwLock<ModelCatalog>,
}

impl RuntimeState {
    pub fn new(selection: ModelSelection, catalog: ModelCatalog) -> Self {
        Self {
            recording: AtomicBool::new(false),
            ai_recording: AtomicBool::new(false),
            settings_open: AtomicBool::new(false),
            exiting: AtomicBool::new(false),
            window_visible: AtomicBool::new(true),
            busy: AtomicU64::new(IDLE),
            next_op: AtomicU64::new(1),
            recording_started: Mutex::new(None),
            conversation: Mutex::new(Conversation::new()),
            selection: RwLock::new(selection),
            catalog: RwLock::new(catalog),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ModelSelection {
                language: config.general.language.clone(),
                selected_model: config.general.model.clone(),
                audio_model: config.general.audio_model.clone(),
            },
            config.catalog(),
        )
    }

    // --- flags ---

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    pub fn is_ai_recording(&self) -> bool {
        self.ai_recording.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst) != IDLE
    }

    /// Whether `op` is the operation currently holding the busy flag
    pub fn is_busy_with(&self, op: OpId) -> bool {
        op != IDLE && self.busy.load(Ordering::SeqCst) == op
    }

    pub fn is_settings_open(&self) -> bool {
        self.settings_open.load(Ordering::SeqCst)
    }

    pub fn set_settings_open(&self, open: bool) {
        self.settings_open.store(open, Ordering::SeqCst);
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::SeqCst)
    }

    pub fn set_exiting(&self) {
        self.exiting.store(true, Ordering::SeqCst);
    }

    pub fn is_window_visible(&self) -> bool {
        self.window_visible.load(Ordering::SeqCst)
    }

    pub fn set_window_visible(&self, visible: bool) {
        self.window_visible.store(visible, Ordering::SeqCst);
    }

    /// Flip window visibility, returning the new value
    pub fn toggle_window_visible(&self) -> bool {
        !self.window_visible.fetch_xor(true, Ordering::SeqCst)
    }

    // --- recording ---

    /// Mark recording as started. Returns false if a recording is already running.
    pub(crate) fn begin_recording(&self, ai: bool) -> bool {
        if self
            .recording
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.ai_recording.store(ai, Ordering::SeqCst);
        *self.recording_clock() = Some(Instant::now());
        true
    }

    /// Clear the recording flags and return the elapsed duration.
    ///
    /// Returns `None` if no recording was running.
    pub(crate) fn end_recording(&self) -> Option<Duration> {
        if self
            .recording
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        self.ai_recording.store(false, Ordering::SeqCst);
        let started = self.recording_clock().take();
        Some(started.map(|t| t.elapsed()).unwrap_or_default())
    }

    pub fn recording_start_time(&self) -> Option<Instant> {
        *self.recording_clock()
    }

    fn recording_clock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.recording_started.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- busy ---

    /// Claim the busy flag for a new operation.
    ///
    /// Returns `None` if another operation is already busy. The returned guard
    /// clears the flag on drop unless the watchdog already reset it.
    pub fn try_begin_busy(self: &Arc<Self>) -> Option<BusyGuard> {
        let op = self.next_op.fetch_add(1, Ordering::SeqCst);
        self.busy
            .compare_exchange(IDLE, op, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(BusyGuard {
            state: Arc::clone(self),
            op,
            cancel: CancellationToken::new(),
        })
    }

    /// Reset every operation flag (watchdog path).
    pub fn force_reset(&self) {
        self.busy.store(IDLE, Ordering::SeqCst);
        self.recording.store(false, Ordering::SeqCst);
        self.ai_recording.store(false, Ordering::SeqCst);
        self.recording_clock().take();
    }

    // --- conversation ---

    pub fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- models ---

    pub fn selection(&self) -> ModelSelection {
        self.selection
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn selected_model(&self) -> String {
        self.selection
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .selected_model
            .clone()
    }

    pub fn set_selected_model(&self, model: impl Into<String>) {
        self.selection
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .selected_model = model.into();
    }

    pub fn set_language(&self, language: impl Into<String>) {
        self.selection
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .language = language.into();
    }

    pub fn catalog(&self) -> ModelCatalog {
        self.catalog
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_catalog(&self, catalog: ModelCatalog) {
        *self.catalog.write().unwrap_or_else(|e| e.into_inner()) = catalog;
    }
}

/// Holds the busy flag for one operation.
///
/// Dropping the guard clears the flag only if it still belongs to this
/// operation, so a late drop after a watchdog reset cannot clear a newer one.
pub struct BusyGuard {
    state: Arc<RuntimeState>,
    op: OpId,
    cancel: CancellationToken,
}

impl BusyGuard {
    pub fn op(&self) -> OpId {
        self.op
    }

    /// Token cancelled when the watchdog abandons this operation
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let _ = self
            .state
            .busy
            .compare_exchange(self.op, IDLE, Ordering::SeqCst, Ordering::SeqCst);
    }
}
