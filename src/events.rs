//! Thread-safe publish/subscribe for completion notifications
//!
//! The subscriber list is locked only while it is copied; callbacks run
//! outside the lock, so a callback may subscribe or emit without deadlocking.
//! A panicking callback is logged and does not affect the others.
//!
//! [`EventBus::emit`] runs callbacks on the calling thread. Async code uses
//! [`EventBus::publish`], which runs each callback on the blocking pool and
//! logs callbacks that take longer than the callback budget.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::pipeline::GenerationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TranscriptionStarted,
    TranscriptionComplete,
    GenerationComplete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    TranscriptionStarted,
    TranscriptionComplete {
        text: String,
        duration: Duration,
    },
    GenerationComplete {
        text: String,
        mode: GenerationMode,
        agent: Option<String>,
    },
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::TranscriptionStarted => EventKind::TranscriptionStarted,
            AppEvent::TranscriptionComplete { .. } => EventKind::TranscriptionComplete,
            AppEvent::GenerationComplete { .. } => EventKind::GenerationComplete,
        }
    }
}

pub type Callback = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Callbacks running longer than this are logged
pub const DEFAULT_CALLBACK_BUDGET: Duration = Duration::from_secs(5);

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct EventBus {
    subscribers: Mutex<HashMap<EventKind, Vec<(SubscriptionId, Callback)>>>,
    next_id: AtomicU64,
    callback_budget: Duration,
}

impl Default for EventBus {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            callback_budget: DEFAULT_CALLBACK_BUDGET,
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback_budget(mut self, budget: Duration) -> Self {
        self.callback_budget = budget;
        self
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for callbacks in subscribers.values_mut() {
            if let Some(pos) = callbacks.iter().position(|(sub, _)| *sub == id) {
                callbacks.remove(pos);
                return true;
            }
        }
        false
    }

    fn callbacks(&self, kind: EventKind) -> Vec<Callback> {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers
            .get(&kind)
            .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default()
    }

    /// Deliver `event` to every subscriber of its kind, in subscription order,
    /// on the calling thread.
    pub fn emit(&self, event: AppEvent) {
        let callbacks = self.callbacks(event.kind());
        tracing::debug!(kind = ?event.kind(), subscribers = callbacks.len(), "Emitting event");

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                tracing::error!(kind = ?event.kind(), "Event subscriber panicked");
            }
        }
    }

    /// Deliver `event` like [`emit`](Self::emit), running each callback on
    /// the blocking pool so the calling task's worker thread stays free.
    ///
    /// Callbacks still run one after another in subscription order.
    pub async fn publish(&self, event: AppEvent) {
        let callbacks = self.callbacks(event.kind());
        if callbacks.is_empty() {
            return;
        }
        tracing::debug!(kind = ?event.kind(), subscribers = callbacks.len(), "Publishing event");

        let kind = event.kind();
        let event = Arc::new(event);
        let budget = self.callback_budget;
        for callback in callbacks {
            let event = Arc::clone(&event);
            let delivery = tokio::task::spawn_blocking(move || {
                let started = Instant::now();
                callback(event.as_ref());
                started.elapsed()
            });
            match delivery.await {
                Ok(elapsed) if elapsed > budget => tracing::warn!(
                    ?kind,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = budget.as_millis() as u64,
                    "Event subscriber exceeded its time budget"
                ),
                Ok(_) => {}
                Err(e) if e.is_panic() => tracing::error!(?kind, "Event subscriber panicked"),
                Err(e) => tracing::error!(?kind, "Event delivery failed: {}", e),
            }
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}
