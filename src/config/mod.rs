//! Configuration loading and management

mod agent;
mod general;
mod hotkeys;
mod io;
mod models;


pub use agent::Agent;
pub use general::{
    DEFAULT_AUDIO_MODEL, DEFAULT_LANGUAGE, DEFAULT_MODEL, GeneralConfig, TimeoutConfig,
};
pub use hotkeys::{HotkeyAction, HotkeyBindings};
pub(crate) use io::{FileLock, ensure_parent, write_atomic};
pub use models::{
    DEFAULT_CONTEXT_LIMIT_TOKENS, DEFAULT_PROVIDER, ModelCatalog, ModelInfo, default_models,
};

use serde::{Deserialize, Serialize};

use crate::transcript::Replacement;

/// Main configuration structure (`~/.voxdesk/config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub hotkeys: HotkeyBindings,

    #[serde(default)]
    pub agents: Vec<Agent>,

    #[serde(default = "default_models")]
    pub models: Vec<ModelInfo>,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Transcript replacements, applied in order
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            hotkeys: HotkeyBindings::default(),
            agents: Vec::new(),
            models: default_models(),
            timeouts: TimeoutConfig::default(),
            replacements: Vec::new(),
        }
    }
}

impl Config {
    /// Model catalog built from the `[[models]]` entries
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.clone())
    }

    /// Collect every problem that would make a triggered operation fail.
    ///
    /// Returns an empty list for a usable configuration.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let catalog = self.catalog();

        for name in self.hotkeys.unknown_actions() {
            problems.push(format!("unknown hotkey action '{}'", name));
        }

        for (action, combination) in self.hotkeys.iter() {
            if combination.trim().is_empty() {
                continue;
            }
            if let Err(e) = crate::hotkeys::parse_combination(combination) {
                problems.push(format!("hotkey '{}': {}", action, e));
            }
        }

        if catalog.is_empty() {
            problems.push("no models configured".to_string());
        } else if !catalog.contains(&self.general.model) {
            problems.push(format!(
                "selected model '{}' is not in the model list",
                self.general.model
            ));
        }

        for agent in &self.agents {
            let model = agent.resolved_model(&self.general.model);
            if agent.active && !catalog.contains(model) {
                problems.push(format!(
                    "agent '{}' uses unavailable model '{}'",
                    agent.name, model
                ));
            }
            if agent.active && agent.screen_vision && !catalog.is_multimodal(model) {
                problems.push(format!(
                    "agent '{}' requests screen vision but '{}' is not multimodal",
                    agent.name, model
                ));
            }
        }

        problems
    }
}
