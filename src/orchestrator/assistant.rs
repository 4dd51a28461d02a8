//! Assistant requests: agent dispatch or general generation

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::Inner;
use crate::agents::{AgentMatch, Dispatch, ensure_model_available};
use crate::clipboard;
use crate::context;
use crate::conversation::ConversationMessage;
use crate::error::VoxError;
use crate::events::AppEvent;
use crate::history;
use crate::pipeline::{GenerationMode, GenerationRequest};
use crate::prompts::{self, PromptContext};
use crate::recording::FinishedRecording;
use crate::transcript::preview;
use crate::ui::UiEvent;

fn user_turn(text: &str, image: Option<&String>) -> ConversationMessage {
    match image {
        Some(url) => ConversationMessage::user_with_image(text, url.as_str()),
        None => ConversationMessage::user(text),
    }
}

impl Inner {
    pub(crate) async fn run_assistant(
        &self,
        mode: GenerationMode,
        recording: &FinishedRecording,
        cancel: &CancellationToken,
    ) -> Result<(), VoxError> {
        self.ui.notify(UiEvent::TranscriptionStarted);
        self.emit(AppEvent::TranscriptionStarted).await;

        // Network transcription and the local clipboard round-trip overlap
        let (transcript, selection) =
            tokio::join!(self.transcribe(recording, cancel), self.selected_text());
        let text = self.post_process(&transcript?)?;
        tracing::info!(
            %mode,
            chars = text.len(),
            selection_chars = selection.chars().count(),
            preview = %preview(&text),
            "Assistant request transcribed"
        );
        self.emit(AppEvent::TranscriptionComplete {
            text: text.clone(),
            duration: recording.duration,
        })
        .await;
        self.record_stats(&text, recording.duration, Duration::ZERO);

        // Agents only answer the plain assistant hotkey
        let dispatch = if mode == GenerationMode::Text {
            self.dispatch(&text)
        } else {
            Dispatch::General(text)
        };

        let (response, mode, agent, request) = match dispatch {
            Dispatch::Agent(matched) => {
                let name = matched.agent.name.clone();
                let instruction = matched.instruction.clone();
                let (response, mode) = self.run_agent(matched, selection, cancel).await?;
                (response, mode, Some(name), instruction)
            }
            Dispatch::General(text) => {
                let response = self.run_general(mode, &text, selection, cancel).await?;
                (response, mode, None, text)
            }
        };

        self.record_history(history::exchange_entry(mode, agent.as_deref(), &request, &response));
        self.emit(AppEvent::GenerationComplete {
            text: response,
            mode,
            agent,
        })
        .await;
        Ok(())
    }

    fn dispatch(&self, text: &str) -> Dispatch {
        self.dispatcher
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .dispatch(text)
    }

    async fn run_agent(
        &self,
        matched: AgentMatch,
        selection: String,
        cancel: &CancellationToken,
    ) -> Result<(String, GenerationMode), VoxError> {
        let AgentMatch { agent, instruction } = matched;
        let catalog = self.state.catalog();
        let model = ensure_model_available(&agent, &self.state.selected_model(), &catalog)?;
        tracing::info!(agent = %agent.name, model = %model, "Executing agent");

        let image = if agent.screen_vision {
            self.screenshot().await
        } else {
            None
        };
        let context = PromptContext {
            selected_text: selection,
            image_data_url: image,
        };
        let prompt = prompts::agent_user_prompt(&instruction, &context);

        let mut messages = vec![ConversationMessage::system(prompts::agent_system_prompt(&agent))];
        messages.extend(self.pipeline.history_for_new_generation());
        messages.push(user_turn(&prompt, context.image_data_url.as_ref()));

        let mode = if agent.screen_vision {
            GenerationMode::Vision
        } else {
            GenerationMode::Text
        };
        let request = GenerationRequest::new(messages, model, mode, ConversationMessage::user(prompt))
            .streaming(self.settings.stream_responses && !agent.autopaste);

        let response = self.pipeline.execute(request, cancel).await?;
        self.deliver(&response, agent.autopaste).await;
        Ok((response, mode))
    }

    async fn run_general(
        &self,
        mode: GenerationMode,
        text: &str,
        selection: String,
        cancel: &CancellationToken,
    ) -> Result<String, VoxError> {
        let catalog = self.state.catalog();
        if catalog.is_empty() {
            return Err(VoxError::Configuration(
                "No AI model available. Add a model in the settings.".to_string(),
            ));
        }

        let current = self.state.selected_model();
        let model = match mode {
            GenerationMode::Text => Some(current),
            GenerationMode::Web => catalog.select_web_model(&current),
            GenerationMode::Vision => catalog.select_vision_model(&current),
        }
        .ok_or_else(|| VoxError::Configuration(format!("No model available for {} requests.", mode)))?;

        let image = if mode == GenerationMode::Vision {
            if !catalog.is_multimodal(&model) {
                return Err(VoxError::Configuration(format!(
                    "Model '{}' does not support screen vision.",
                    model
                )));
            }
            let Some(image) = self.screenshot().await else {
                return Err(VoxError::Input("Screen capture failed.".to_string()));
            };
            Some(image)
        } else {
            None
        };

        let web_capable = catalog.get(&model).is_some_and(|m| m.web_search);
        let system_prompt = |selected_text: &str| {
            let context = PromptContext {
                selected_text: selected_text.to_string(),
                image_data_url: image.clone(),
            };
            match mode {
                GenerationMode::Text => prompts::general_system_prompt(&context, web_capable),
                GenerationMode::Web => prompts::web_system_prompt(&context),
                GenerationMode::Vision => prompts::vision_system_prompt(&context),
            }
        };

        let history = self.pipeline.history_for_new_generation();
        let fixed = format!("{}{}", system_prompt(""), text);
        let reduced = context::reduce(&fixed, &history, &selection, catalog.context_limit(&model))?;

        let mut messages = vec![ConversationMessage::system(system_prompt(&reduced.selection))];
        messages.extend(reduced.history.iter().cloned());
        messages.push(user_turn(text, image.as_ref()));

        let mut request = GenerationRequest::new(messages, model, mode, ConversationMessage::user(text))
            .streaming(self.settings.stream_responses);
        if reduced.history != history {
            request = request.with_replaced_history(reduced.history);
        }

        self.pipeline.execute(request, cancel).await
    }

    /// Paste or copy an agent result; failures are reported, not propagated
    async fn deliver(&self, text: &str, autopaste: bool) {
        match clipboard::copy_result(Arc::clone(&self.clipboard), text, autopaste).await {
            Ok(pasted) => self.ui.notify(UiEvent::ResultDelivered { pasted }),
            Err(e) => {
                tracing::error!("Delivering result failed: {}", e);
                self.ui
                    .notify(UiEvent::Error("Could not copy the result to the clipboard.".to_string()));
            }
        }
    }
}
