use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::config::{Config, ModelCatalog, ModelInfo};
use crate::conversation::ConversationMessage;
use crate::error::{ProviderError, ProviderErrorKind, VoxError};
use crate::providers::{FragmentStream, LlmProvider, ProviderRouter};
use crate::state::RuntimeState;
use crate::ui::{ChannelUiSink, UiEvent};

struct ScriptedProvider {
    id: &'static str,
    fragments: Vec<Result<String, ProviderError>>,
    delay: Duration,
    open_error: Option<ProviderError>,
    models: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(id: &'static str, fragments: &[&str]) -> Self {
        Self {
            id,
            fragments: fragments.iter().map(|f| Ok(f.to_string())).collect(),
            delay: Duration::ZERO,
            open_error: None,
            models: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn id(&self) -> &str {
        self.id
    }

    async fn stream_chat(
        &self,
        _messages: &[ConversationMessage],
        model: &str,
    ) -> Result<FragmentStream, ProviderError> {
        self.models.lock().unwrap().push(model.to_string());
        if let Some(e) = &self.open_error {
            return Err(e.clone());
        }
        let delay = self.delay;
        let stream = futures::stream::iter(self.fragments.clone()).then(move |item| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            item
        });
        Ok(Box::pin(stream))
    }
}

fn setup(
    provider: Arc<ScriptedProvider>,
) -> (Arc<RuntimeState>, GenerationPipeline, UnboundedReceiver<UiEvent>) {
    let state = Arc::new(RuntimeState::from_config(&Config::default()));
    let (sink, rx) = ChannelUiSink::new();
    let pipeline = GenerationPipeline::new(
        Arc::clone(&state),
        ProviderRouter::new(provider),
        Arc::new(sink),
    );
    (state, pipeline, rx)
}

fn request(text: &str) -> GenerationRequest {
    GenerationRequest::new(
        vec![ConversationMessage::system("sys"), ConversationMessage::user(text)],
        "llama-3.3-70b-versatile",
        GenerationMode::Text,
        ConversationMessage::user(text),
    )
}

fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_success_filters_think_and_commits_history() {
    let provider = Arc::new(ScriptedProvider::new("p", &["<think>plan</think>", "Hello", " world"]));
    let (state, pipeline, mut rx) = setup(provider);

    let text = pipeline
        .execute(request("hi"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(text, "Hello world");
    let conversation = state.conversation();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.messages()[1].content.text(), "Hello world");
    assert!(conversation.response_visible());
    drop(conversation);

    let chunks: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            UiEvent::StreamChunk(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(chunks, vec!["Hello".to_string(), " world".to_string()]);
}

#[tokio::test]
async fn test_streaming_disabled_sends_no_chunks() {
    let provider = Arc::new(ScriptedProvider::new("p", &["quiet"]));
    let (_state, pipeline, mut rx) = setup(provider);

    pipeline
        .execute(request("hi").streaming(false), &CancellationToken::new())
        .await
        .unwrap();

    assert!(!drain(&mut rx).iter().any(|e| matches!(e, UiEvent::StreamChunk(_))));
}

#[tokio::test]
async fn test_mid_stream_error_is_classified() {
    let mut provider = ScriptedProvider::new("p", &["partial"]);
    provider
        .fragments
        .push(Err(ProviderError::from_status(429, "too many requests")));
    let (state, pipeline, _rx) = setup(Arc::new(provider));
    state.conversation().set_response_visible(true);

    let err = pipeline
        .execute(request("hi"), &CancellationToken::new())
        .await
        .unwrap_err();

    match &err {
        VoxError::Provider(e) => assert_eq!(e.kind, ProviderErrorKind::RateLimited),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.user_message(), "Rate limit reached. Please wait a moment.");
    assert!(state.conversation().is_empty());
    assert!(!state.conversation().response_visible());
}

#[tokio::test]
async fn test_open_error_is_classified() {
    let mut provider = ScriptedProvider::new("p", &[]);
    provider.open_error = Some(ProviderError::from_status(401, "bad key"));
    let (_state, pipeline, _rx) = setup(Arc::new(provider));

    let err = pipeline
        .execute(request("hi"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid API Key. Check your credentials.");
}

#[tokio::test]
async fn test_empty_response_is_an_error() {
    let provider = Arc::new(ScriptedProvider::new("p", &["<think>only thoughts</think>"]));
    let (state, pipeline, _rx) = setup(provider);

    let err = pipeline
        .execute(request("hi"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, VoxError::Input(_)));
    assert!(state.conversation().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_abandons_stream() {
    let mut provider = ScriptedProvider::new("p", &["one", "two", "three"]);
    provider.delay = Duration::from_secs(1);
    let (state, pipeline, _rx) = setup(Arc::new(provider));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let err = pipeline.execute(request("hi"), &cancel).await.unwrap_err();
    assert!(matches!(err, VoxError::Cancelled));
    assert!(state.conversation().is_empty());
}

#[tokio::test]
async fn test_routes_by_catalog_provider() {
    let default = Arc::new(ScriptedProvider::new("default", &["from default"]));
    let special = Arc::new(ScriptedProvider::new("special", &["from special"]));

    let state = Arc::new(RuntimeState::from_config(&Config::default()));
    state.set_catalog(ModelCatalog::new(vec![
        ModelInfo::new("fancy").with_provider("special"),
    ]));
    let (sink, _rx) = ChannelUiSink::new();
    let router = ProviderRouter::new(default.clone()).with_binding("special", special.clone());
    let pipeline = GenerationPipeline::new(Arc::clone(&state), router, Arc::new(sink));

    let mut fancy = request("hi");
    fancy.model = "fancy".to_string();
    let text = pipeline.execute(fancy, &CancellationToken::new()).await.unwrap();
    assert_eq!(text, "from special");

    let mut unknown = request("hi");
    unknown.model = "mystery".to_string();
    let text = pipeline.execute(unknown, &CancellationToken::new()).await.unwrap();
    assert_eq!(text, "from default");
    assert_eq!(*default.models.lock().unwrap(), vec!["mystery".to_string()]);
}

#[tokio::test]
async fn test_stale_history_cleared_for_new_generation() {
    let provider = Arc::new(ScriptedProvider::new("p", &["answer"]));
    let (state, pipeline, _rx) = setup(provider);

    pipeline
        .execute(request("first"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(pipeline.history_for_new_generation().len(), 2);

    state.conversation().set_response_visible(false);
    assert!(pipeline.history_for_new_generation().is_empty());
    assert!(state.conversation().is_empty());
}

#[tokio::test]
async fn test_replaced_history_is_committed() {
    let provider = Arc::new(ScriptedProvider::new("p", &["answer"]));
    let (state, pipeline, _rx) = setup(provider);

    let compressed = vec![ConversationMessage::system("kept")];
    pipeline
        .execute(
            request("q").with_replaced_history(compressed),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let conversation = state.conversation();
    assert_eq!(conversation.len(), 3);
    assert!(conversation.messages()[0].is_system());
}
