//! Per-binding key state machines

use std::collections::HashSet;

use super::keys::{Key, KeySet};

/// How a binding reacts to its key set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fires once when every key is held
    Press,
    /// Activates when every key is held, deactivates when any is released
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activate,
    Deactivate,
}

/// Key tracking for one binding.
///
/// Only keys belonging to the binding are tracked, so extra keys held at the
/// same time neither block nor trigger it.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    keys: KeySet,
    mode: TriggerMode,
    held: HashSet<Key>,
    active: bool,
}

impl KeyBinding {
    pub fn new(keys: KeySet, mode: TriggerMode) -> Self {
        Self {
            keys,
            mode,
            held: HashSet::new(),
            active: false,
        }
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn press(&mut self, key: Key) -> Option<Transition> {
        if !self.keys.contains(&key) {
            return None;
        }

        match self.mode {
            TriggerMode::Press => {
                // Auto-repeat presses of a held key do not re-fire
                if self.held.insert(key) && self.held == self.keys {
                    return Some(Transition::Activate);
                }
                None
            }
            TriggerMode::Hold => {
                self.held.insert(key);
                if self.held == self.keys && !self.active {
                    self.active = true;
                    return Some(Transition::Activate);
                }
                None
            }
        }
    }

    pub fn release(&mut self, key: Key) -> Option<Transition> {
        if !self.keys.contains(&key) {
            return None;
        }
        self.held.remove(&key);

        if self.mode == TriggerMode::Hold && self.active {
            self.active = false;
            return Some(Transition::Deactivate);
        }
        None
    }

    /// Forget held keys, e.g. after the listener restarts
    pub fn reset(&mut self) {
        self.held.clear();
        self.active = false;
    }
}
