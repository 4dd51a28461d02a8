//! Global hotkeys
//!
//! Combination strings are parsed into canonical key sets. A dedicated input
//! thread feeds raw key events through one state machine per binding and
//! spawns every fired action onto the tokio runtime, so the OS hook never
//! waits on an action.

mod binding;
mod keys;
mod listener;

#[cfg(test)]
mod tests;

pub use binding::{KeyBinding, Transition, TriggerMode};
pub use keys::{Key, KeySet, Modifier, parse_combination};
pub use listener::{ActionFn, ActionHandlers, GuardFn, HotkeyListener, KeyEvent, KeyFeed};

use thiserror::Error;

use crate::config::HotkeyAction;
use crate::error::VoxError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("empty key combination")]
    Empty,

    #[error("invalid hotkey format '{0}': only alphanumerics, '+' and '_' are allowed")]
    InvalidCharacters(String),

    #[error("invalid function key: {0}")]
    InvalidFunctionKey(String),

    #[error("unrecognized hotkey component: {0}")]
    UnknownKey(String),

    #[error("invalid hotkey '{combination}' for {action}: {reason}")]
    InvalidBinding {
        action: HotkeyAction,
        combination: String,
        reason: String,
    },

    #[error("no hotkey bindings to register")]
    NoBindings,

    #[error("failed to start hotkey listener: {0}")]
    ListenerStart(String),
}

impl HotkeyError {
    pub fn user_message(&self) -> String {
        match self {
            HotkeyError::InvalidBinding {
                action,
                combination,
                ..
            } => format!("Invalid hotkey '{}' for {}.", combination, action),
            HotkeyError::NoBindings => "No hotkeys configured.".to_string(),
            HotkeyError::ListenerStart(_) => "Could not start the hotkey listener.".to_string(),
            other => format!("Invalid hotkey: {}", other),
        }
    }
}

impl From<HotkeyError> for VoxError {
    fn from(e: HotkeyError) -> Self {
        VoxError::Configuration(e.to_string())
    }
}
