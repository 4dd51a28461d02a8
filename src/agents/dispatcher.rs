//! Trigger-phrase dispatch

use crate::config::{Agent, ModelCatalog};
use crate::error::VoxError;

/// An agent selected by its trigger phrase
#[derive(Debug, Clone)]
pub struct AgentMatch {
    pub agent: Agent,
    /// Transcript with the trigger phrase removed
    pub instruction: String,
}

/// Where a transcript goes
#[derive(Debug, Clone)]
pub enum Dispatch {
    Agent(AgentMatch),
    /// No agent matched; carries the transcript unmodified
    General(String),
}

impl Dispatch {
    pub fn agent_name(&self) -> Option<&str> {
        match self {
            Dispatch::Agent(m) => Some(&m.agent.name),
            Dispatch::General(_) => None,
        }
    }
}

/// Matches transcripts against the configured agents
#[derive(Debug, Clone, Default)]
pub struct AgentDispatcher {
    agents: Vec<Agent>,
}

impl AgentDispatcher {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Find the first active agent whose trigger phrase starts the transcript.
    pub fn dispatch(&self, transcript: &str) -> Dispatch {
        let text = transcript.trim_start();
        let text_lower = text.to_lowercase();

        for agent in &self.agents {
            let Some(trigger) = agent.normalized_trigger() else {
                continue;
            };

            if !text_lower.starts_with(&trigger) {
                continue;
            }
            // None when the trigger ends inside one character's expansion
            let Some(rest_start) = original_offset(text, trigger.len()) else {
                continue;
            };
            let instruction = text[rest_start..].trim().to_string();

            tracing::info!(
                agent = %agent.name,
                instruction = %crate::transcript::preview(&instruction),
                "Agent triggered"
            );
            return Dispatch::Agent(AgentMatch {
                agent: agent.clone(),
                instruction,
            });
        }

        Dispatch::General(transcript.to_string())
    }
}

/// Byte offset in `text` whose lower-cased prefix is `lowered_len` bytes long.
///
/// Lower-casing can grow a character (`İ` becomes `i̇`), so offsets into the
/// lower-cased text do not carry over directly.
fn original_offset(text: &str, lowered_len: usize) -> Option<usize> {
    let mut consumed = 0;
    for (idx, c) in text.char_indices() {
        if consumed == lowered_len {
            return Some(idx);
        }
        if consumed > lowered_len {
            return None;
        }
        consumed += c.to_lowercase().map(char::len_utf8).sum::<usize>();
    }
    (consumed == lowered_len).then_some(text.len())
}

/// Resolve the model an agent runs on and check it can serve the request.
///
/// Fails before any network call when the model is missing from the catalog
/// or when a screen-vision agent targets a model without image input.
pub fn ensure_model_available(
    agent: &Agent,
    selected_model: &str,
    catalog: &ModelCatalog,
) -> Result<String, VoxError> {
    let model = agent.resolved_model(selected_model);

    if !catalog.contains(model) {
        return Err(VoxError::Configuration(format!(
            "Agent model '{}' is unavailable",
            model
        )));
    }

    if agent.screen_vision && !catalog.is_multimodal(model) {
        return Err(VoxError::Configuration(format!(
            "Model '{}' does not support screen vision. Pick a multimodal model for agent '{}'.",
            model, agent.name
        )));
    }

    Ok(model.to_string())
}
