//! Conversation messages exchanged with the LLM provider

use serde::{Deserialize, Serialize};

/// Maximum number of messages kept in the conversation history
pub const MAX_CONVERSATION_HISTORY: usize = 200;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One part of a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { url: String },
}

/// Message content: plain text or a list of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// All text in the content, image parts skipped.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Number of characters used for token estimation
    pub fn char_len(&self) -> usize {
        match self {
            MessageContent::Text(text) => text.chars().count(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => text.chars().count(),
                    ContentPart::ImageUrl { .. } => 0,
                })
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ConversationMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// User message with text followed by an image
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    url: image_url.into(),
                },
            ]),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Conversation history plus the reply-visible flag.
///
/// Mutated only by the generation pipeline.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
    response_visible: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn response_visible(&self) -> bool {
        self.response_visible
    }

    pub fn set_response_visible(&mut self, visible: bool) {
        self.response_visible = visible;
    }

    /// Append a completed exchange and enforce the size cap.
    pub fn push_exchange(&mut self, user: ConversationMessage, assistant: ConversationMessage) {
        self.messages.push(user);
        self.messages.push(assistant);
        self.enforce_cap();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Swap in a compressed history
    pub fn replace(&mut self, messages: Vec<ConversationMessage>) {
        self.messages = messages;
        self.enforce_cap();
    }

    /// Drop the oldest non-system messages until the cap holds.
    fn enforce_cap(&mut self) {
        while self.messages.len() > MAX_CONVERSATION_HISTORY {
            match self.messages.iter().position(|m| !m.is_system()) {
                Some(idx) => {
                    self.messages.remove(idx);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_exchange_caps_history() {
        let mut conv = Conversation::new();
        conv.messages.push(ConversationMessage::system("sys"));
        for i in 0..150 {
            conv.push_exchange(
                ConversationMessage::user(format!("q{}", i)),
                ConversationMessage::assistant(format!("a{}", i)),
            );
        }
        assert_eq!(conv.len(), MAX_CONVERSATION_HISTORY);
        assert!(conv.messages()[0].is_system());
        assert_eq!(conv.messages().last().unwrap().content.text(), "a149");
    }

    #[test]
    fn test_multimodal_text_skips_images() {
        let msg = ConversationMessage::user_with_image("describe", "data:image/png;base64,AAAA");
        assert_eq!(msg.content.text(), "describe");
        assert_eq!(msg.content.char_len(), 8);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ConversationMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
