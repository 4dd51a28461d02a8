//! Streaming generation against the selected provider

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::conversation::ConversationMessage;
use crate::error::VoxError;
use crate::providers::{LlmProvider, ProviderRouter};
use crate::state::RuntimeState;
use crate::stream::ThinkFilter;
use crate::ui::{UiEvent, UiSink};

/// Kind of generation, used for model selection and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    #[default]
    Text,
    Web,
    Vision,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Text => write!(f, "text"),
            GenerationMode::Web => write!(f, "web"),
            GenerationMode::Vision => write!(f, "vision"),
        }
    }
}

/// One request to the pipeline
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Full message list sent to the provider
    pub messages: Vec<ConversationMessage>,
    pub model: String,
    pub mode: GenerationMode,
    /// User turn recorded in history on success
    pub user_turn: ConversationMessage,
    /// Forward visible chunks to the UI while streaming
    pub stream_to_ui: bool,
    /// Compressed history that replaces the stored one on success
    pub replace_history: Option<Vec<ConversationMessage>>,
}

impl GenerationRequest {
    pub fn new(
        messages: Vec<ConversationMessage>,
        model: impl Into<String>,
        mode: GenerationMode,
        user_turn: ConversationMessage,
    ) -> Self {
        Self {
            messages,
            model: model.into(),
            mode,
            user_turn,
            stream_to_ui: true,
            replace_history: None,
        }
    }

    pub fn streaming(mut self, stream_to_ui: bool) -> Self {
        self.stream_to_ui = stream_to_ui;
        self
    }

    pub fn with_replaced_history(mut self, history: Vec<ConversationMessage>) -> Self {
        self.replace_history = Some(history);
        self
    }
}

/// Sole writer of the conversation history
pub struct GenerationPipeline {
    state: Arc<RuntimeState>,
    router: ProviderRouter,
    ui: Arc<dyn UiSink>,
}

impl GenerationPipeline {
    pub fn new(state: Arc<RuntimeState>, router: ProviderRouter, ui: Arc<dyn UiSink>) -> Self {
        Self { state, router, ui }
    }

    /// History to build a new request on.
    ///
    /// When the previous reply is no longer visible the stored history is
    /// cleared first, so a fresh request starts a fresh conversation.
    pub fn history_for_new_generation(&self) -> Vec<ConversationMessage> {
        let mut conversation = self.state.conversation();
        if !conversation.response_visible() && !conversation.is_empty() {
            tracing::debug!(messages = conversation.len(), "Clearing stale conversation history");
            conversation.clear();
        }
        conversation.messages().to_vec()
    }

    /// Run `request` to completion and return the visible response text.
    ///
    /// On success the user and assistant turns are appended to history. On
    /// failure the reply-visible flag is cleared. When `cancel` fires the
    /// stream is abandoned and history is left untouched.
    pub async fn execute(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, VoxError> {
        let provider_name = self.state.catalog().provider_for(&request.model).to_string();
        let provider = self.router.resolve(&provider_name);

        tracing::info!(
            model = %request.model,
            mode = %request.mode,
            provider = %provider.id(),
            messages = request.messages.len(),
            "Starting generation"
        );
        self.ui.notify(UiEvent::GenerationStarted {
            model: request.model.clone(),
            mode: request.mode,
        });

        let result = self.stream_response(provider.as_ref(), &request, cancel).await;

        match result {
            Ok(text) if cancel.is_cancelled() => {
                tracing::warn!(chars = text.len(), "Generation finished after cancellation, discarding");
                Err(VoxError::Cancelled)
            }
            Ok(text) if text.trim().is_empty() => {
                self.state.conversation().set_response_visible(false);
                Err(VoxError::Input("The model returned an empty response.".to_string()))
            }
            Ok(text) => {
                {
                    let mut conversation = self.state.conversation();
                    if let Some(history) = request.replace_history {
                        conversation.replace(history);
                    }
                    conversation.push_exchange(
                        request.user_turn,
                        ConversationMessage::assistant(text.clone()),
                    );
                    conversation.set_response_visible(true);
                }
                tracing::info!(chars = text.len(), "Generation complete");
                self.ui.notify(UiEvent::GenerationFinished { text: text.clone() });
                Ok(text)
            }
            Err(VoxError::Cancelled) => {
                tracing::warn!("Generation abandoned");
                Err(VoxError::Cancelled)
            }
            Err(e) => {
                tracing::error!(model = %request.model, "Generation failed: {}", e);
                self.state.conversation().set_response_visible(false);
                Err(e)
            }
        }
    }

    async fn stream_response(
        &self,
        provider: &dyn LlmProvider,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, VoxError> {
        let mut stream = tokio::select! {
            _ = cancel.cancelled() => return Err(VoxError::Cancelled),
            stream = provider.stream_chat(&request.messages, &request.model) => stream?,
        };

        let mut filter = ThinkFilter::new();
        let mut full = String::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(VoxError::Cancelled),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    if let Some(visible) = filter.feed(&fragment) {
                        self.forward(&visible, request.stream_to_ui);
                        full.push_str(&visible);
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            }
        }

        if let Some(rest) = filter.finish() {
            self.forward(&rest, request.stream_to_ui);
            full.push_str(&rest);
        }

        Ok(full)
    }

    fn forward(&self, chunk: &str, stream_to_ui: bool) {
        if stream_to_ui {
            self.ui.notify(UiEvent::StreamChunk(chunk.to_string()));
        }
    }
}
