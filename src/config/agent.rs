//! Agent configuration

use serde::{Deserialize, Serialize};

/// A user-defined assistant triggered by a spoken phrase
///
/// An active agent with a trigger phrase participates in dispatch.
/// Inactive agents never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identifier (generated when missing)
    #[serde(default = "new_agent_id")]
    pub id: String,

    /// Display name, also injected into the system prompt
    pub name: String,

    /// Spoken phrase that selects this agent (matched case-insensitively at the start)
    #[serde(default)]
    pub trigger: Option<String>,

    /// User instructions appended to the agent system prompt
    #[serde(default)]
    pub prompt: String,

    /// Target model. Falls back to the selected model when unset.
    #[serde(default)]
    pub model: Option<String>,

    /// Paste the result into the focused application instead of copying it
    #[serde(default = "default_true")]
    pub autopaste: bool,

    /// Attach a screenshot of the current screen to the request
    #[serde(default)]
    pub screen_vision: bool,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn new_agent_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

impl Agent {
    pub fn new(name: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            id: new_agent_id(),
            name: name.into(),
            trigger: Some(trigger.into()),
            prompt: String::new(),
            model: None,
            autopaste: true,
            screen_vision: false,
            active: true,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_autopaste(mut self, autopaste: bool) -> Self {
        self.autopaste = autopaste;
        self
    }

    pub fn with_screen_vision(mut self, screen_vision: bool) -> Self {
        self.screen_vision = screen_vision;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Trimmed, lower-cased trigger phrase, if the agent can be dispatched to
    pub fn normalized_trigger(&self) -> Option<String> {
        if !self.active {
            return None;
        }
        let trigger = self.trigger.as_deref()?.trim().to_lowercase();
        if trigger.is_empty() { None } else { Some(trigger) }
    }

    /// Model this agent runs on
    pub fn resolved_model<'a>(&'a self, selected_model: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(selected_model)
    }
}
