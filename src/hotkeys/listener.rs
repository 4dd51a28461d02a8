//! Input-capture thread and action dispatch

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::HotkeyError;
use super::binding::{KeyBinding, TriggerMode, Transition};
use super::keys::{Key, KeySet, parse_combination};
use crate::config::{HotkeyAction, HotkeyBindings};

pub type ActionFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;
pub type GuardFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Callbacks attached to one hotkey action.
///
/// Guards run on the worker task right before their action; a guard returning
/// `false` skips the action silently. Transitions of one binding run in order,
/// each action finishing before the next guard is evaluated.
#[derive(Clone, Default)]
pub struct ActionHandlers {
    on_activate: Option<ActionFn>,
    on_deactivate: Option<ActionFn>,
    activate_guard: Option<GuardFn>,
    deactivate_guard: Option<GuardFn>,
}

impl ActionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_activate = Some(Arc::new(move || action().boxed()));
        self
    }

    pub fn on_deactivate<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_deactivate = Some(Arc::new(move || action().boxed()));
        self
    }

    pub fn activate_when(mut self, guard: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.activate_guard = Some(Arc::new(guard));
        self
    }

    pub fn deactivate_when(mut self, guard: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.deactivate_guard = Some(Arc::new(guard));
        self
    }

    fn for_transition(&self, transition: Transition) -> (Option<ActionFn>, Option<GuardFn>) {
        match transition {
            Transition::Activate => (self.on_activate.clone(), self.activate_guard.clone()),
            Transition::Deactivate => (self.on_deactivate.clone(), self.deactivate_guard.clone()),
        }
    }
}

/// Raw key event from an OS keyboard hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
}

enum ListenerMsg {
    Key(KeyEvent),
    Stop,
}

/// Entry point for the OS keyboard hook.
///
/// Stays valid across re-registration; events sent while the listener is
/// stopped are dropped.
#[derive(Clone, Default)]
pub struct KeyFeed {
    tx: Arc<Mutex<Option<Sender<ListenerMsg>>>>,
}

impl KeyFeed {
    fn slot(&self) -> MutexGuard<'_, Option<Sender<ListenerMsg>>> {
        self.tx.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns `false` if no listener is running
    pub fn send(&self, event: KeyEvent) -> bool {
        match self.slot().as_ref() {
            Some(tx) => tx.send(ListenerMsg::Key(event)).is_ok(),
            None => false,
        }
    }

    pub fn press(&self, key: impl Into<Key>) -> bool {
        self.send(KeyEvent::Pressed(key.into()))
    }

    pub fn release(&self, key: impl Into<Key>) -> bool {
        self.send(KeyEvent::Released(key.into()))
    }

    fn install(&self, tx: Sender<ListenerMsg>) {
        *self.slot() = Some(tx);
    }

    fn take(&self) -> Option<Sender<ListenerMsg>> {
        self.slot().take()
    }
}

#[derive(Clone)]
struct Registration {
    action: HotkeyAction,
    combination: String,
    keys: KeySet,
    handlers: ActionHandlers,
}

struct ArmedBinding {
    state: KeyBinding,
    worker: UnboundedSender<Transition>,
}

/// Owns the input-capture thread and the registered bindings
pub struct HotkeyListener {
    runtime: Handle,
    feed: KeyFeed,
    registrations: Vec<Registration>,
    worker: Option<JoinHandle<()>>,
    started: u64,
}

impl HotkeyListener {
    /// Fired actions are spawned onto `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            feed: KeyFeed::default(),
            registrations: Vec::new(),
            worker: None,
            started: 0,
        }
    }

    pub fn feed(&self) -> KeyFeed {
        self.feed.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Registered actions with their combination strings
    pub fn registered(&self) -> Vec<(HotkeyAction, String)> {
        self.registrations
            .iter()
            .map(|r| (r.action, r.combination.clone()))
            .collect()
    }

    /// Replace the active bindings.
    ///
    /// Every combination is parsed before the running listener is touched. If
    /// parsing or the restart fails, the previous bindings stay (or are put
    /// back) in place. Blank combinations leave their action unbound.
    pub fn register(
        &mut self,
        bindings: &HotkeyBindings,
        handlers: &HashMap<HotkeyAction, ActionHandlers>,
    ) -> Result<usize, HotkeyError> {
        let mut registrations = Vec::new();
        for (action, combination) in bindings.iter() {
            if combination.trim().is_empty() {
                tracing::debug!(%action, "Hotkey left unbound");
                continue;
            }
            let keys =
                parse_combination(combination).map_err(|e| HotkeyError::InvalidBinding {
                    action,
                    combination: combination.to_string(),
                    reason: e.to_string(),
                })?;
            let Some(action_handlers) = handlers.get(&action) else {
                tracing::warn!(%action, "No handler for hotkey action, skipping");
                continue;
            };
            registrations.push(Registration {
                action,
                combination: combination.to_string(),
                keys,
                handlers: action_handlers.clone(),
            });
        }

        if registrations.is_empty() {
            return Err(HotkeyError::NoBindings);
        }

        let previous = std::mem::take(&mut self.registrations);
        self.stop_worker();

        match self.start(&registrations) {
            Ok(()) => {
                let count = registrations.len();
                self.registrations = registrations;
                tracing::info!(count, "Hotkey listener started");
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Failed to start hotkey listener: {}", e);
                if !previous.is_empty() {
                    if let Err(rollback) = self.start(&previous) {
                        tracing::error!("Restoring previous hotkeys failed: {}", rollback);
                    }
                }
                self.registrations = previous;
                Err(e)
            }
        }
    }

    /// Stop listening and drop every binding
    pub fn stop(&mut self) {
        self.stop_worker();
        self.registrations.clear();
        tracing::info!("Hotkey listener stopped");
    }

    fn start(&mut self, registrations: &[Registration]) -> Result<(), HotkeyError> {
        let bindings: Vec<ArmedBinding> = registrations
            .iter()
            .map(|r| {
                let mode = if r.action.is_press_trigger() {
                    TriggerMode::Press
                } else {
                    TriggerMode::Hold
                };
                let (tx, rx) = unbounded_channel();
                self.runtime
                    .spawn(action_worker(r.action, r.handlers.clone(), rx));
                ArmedBinding {
                    state: KeyBinding::new(r.keys.clone(), mode),
                    worker: tx,
                }
            })
            .collect();

        let (tx, rx) = mpsc::channel();
        self.started += 1;
        let worker = thread::Builder::new()
            .name(format!("voxdesk-hotkeys-{}", self.started))
            .spawn(move || input_loop(rx, bindings))
            .map_err(|e| HotkeyError::ListenerStart(e.to_string()))?;

        self.feed.install(tx);
        self.worker = Some(worker);
        Ok(())
    }

    fn stop_worker(&mut self) {
        if let Some(tx) = self.feed.take() {
            let _ = tx.send(ListenerMsg::Stop);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Hotkey input thread panicked");
            }
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

fn input_loop(rx: Receiver<ListenerMsg>, mut bindings: Vec<ArmedBinding>) {
    while let Ok(msg) = rx.recv() {
        let event = match msg {
            ListenerMsg::Key(event) => event,
            ListenerMsg::Stop => break,
        };

        for binding in bindings.iter_mut() {
            let transition = match event {
                KeyEvent::Pressed(key) => binding.state.press(key.canonical()),
                KeyEvent::Released(key) => binding.state.release(key.canonical()),
            };
            if let Some(transition) = transition {
                let _ = binding.worker.send(transition);
            }
        }
    }
    // Dropping the bindings closes every action worker's queue
}

/// Runs one binding's actions in the order their transitions fired
async fn action_worker(
    action: HotkeyAction,
    handlers: ActionHandlers,
    mut transitions: UnboundedReceiver<Transition>,
) {
    while let Some(transition) = transitions.recv().await {
        let (callback, guard) = handlers.for_transition(transition);
        let Some(callback) = callback else {
            continue;
        };

        let outcome = AssertUnwindSafe(async {
            if let Some(guard) = guard {
                if !guard() {
                    tracing::debug!(%action, ?transition, "Hotkey guard rejected action");
                    return;
                }
            }
            tracing::debug!(%action, ?transition, "Hotkey action");
            callback().await;
        })
        .catch_unwind()
        .await;

        if outcome.is_err() {
            tracing::error!(%action, ?transition, "Hotkey action panicked");
        }
    }
}
