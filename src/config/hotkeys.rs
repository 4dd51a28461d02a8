//! Hotkey bindings

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of bindable actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HotkeyAction {
    /// Show or hide the main window
    ToggleVisibility,
    /// Hold to dictate, release to transcribe and paste
    RecordToggle,
    /// Hold to ask the assistant, release to generate
    AiToggle,
    /// Same as `AiToggle` with a web-search capable model
    WebSearchToggle,
    /// Same as `AiToggle` with a screenshot attached
    ScreenVisionToggle,
}

impl HotkeyAction {
    pub const ALL: [HotkeyAction; 5] = [
        HotkeyAction::ToggleVisibility,
        HotkeyAction::RecordToggle,
        HotkeyAction::AiToggle,
        HotkeyAction::WebSearchToggle,
        HotkeyAction::ScreenVisionToggle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HotkeyAction::ToggleVisibility => "toggle_visibility",
            HotkeyAction::RecordToggle => "record_toggle",
            HotkeyAction::AiToggle => "ai_toggle",
            HotkeyAction::WebSearchToggle => "web_search_toggle",
            HotkeyAction::ScreenVisionToggle => "screen_vision_toggle",
        }
    }

    /// Default key combination
    pub fn default_combination(&self) -> &'static str {
        match self {
            HotkeyAction::ToggleVisibility => "ctrl+alt",
            HotkeyAction::RecordToggle => "ctrl+x",
            HotkeyAction::AiToggle => "ctrl+q",
            HotkeyAction::WebSearchToggle => "alt+w",
            HotkeyAction::ScreenVisionToggle => "alt+x",
        }
    }

    /// Press-trigger actions fire once; the others are hold-to-record
    pub fn is_press_trigger(&self) -> bool {
        matches!(self, HotkeyAction::ToggleVisibility)
    }
}

impl std::fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HotkeyAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HotkeyAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown hotkey action: {}", s))
    }
}

/// `[hotkeys]` section: action name -> combination string
///
/// Keys stay plain strings in the file; unknown action names are reported by
/// [`Config::validate`](super::Config::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotkeyBindings(pub BTreeMap<String, String>);

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self(
            HotkeyAction::ALL
                .into_iter()
                .map(|a| (a.as_str().to_string(), a.default_combination().to_string()))
                .collect(),
        )
    }
}

impl HotkeyBindings {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, action: HotkeyAction) -> Option<&str> {
        self.0.get(action.as_str()).map(|s| s.as_str())
    }

    pub fn set(&mut self, action: HotkeyAction, combination: impl Into<String>) {
        self.0.insert(action.as_str().to_string(), combination.into());
    }

    /// Entries with a known action name
    pub fn iter(&self) -> impl Iterator<Item = (HotkeyAction, &str)> {
        self.0
            .iter()
            .filter_map(|(name, combo)| Some((name.parse().ok()?, combo.as_str())))
    }

    /// Action names that are not part of the fixed set
    pub fn unknown_actions(&self) -> Vec<&str> {
        self.0
            .keys()
            .filter(|name| name.parse::<HotkeyAction>().is_err())
            .map(|name| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
