//! Context reduction to fit a model's token budget

use thiserror::Error;

use super::truncate::{
    CHARS_PER_TOKEN_TRUNCATION, cut_tail, estimate_chars, estimate_tokens, truncate_to_tokens,
};
use crate::conversation::{ContentPart, ConversationMessage, MessageContent};

/// Tokens kept free for the model's answer
pub const RESPONSE_BUFFER_TOKENS: usize = 1024;

/// Per-message budget for history kept during compression
pub const MIN_HISTORY_TOKENS: usize = 300;

/// Share of the selection kept on the first selection pass
pub const SELECTED_TEXT_PRIORITY_RATIO: f64 = 0.9;

/// User/assistant pairs kept during compression
const MAX_KEPT_PAIRS: usize = 2;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("Context still exceeds limit after reduction: {required} > {available} tokens")]
    ContextOverflow { required: usize, available: usize },
}

impl BudgetError {
    pub fn user_message(&self) -> &'static str {
        match self {
            BudgetError::ContextOverflow { .. } => {
                "Context too large. Please reduce selection or clear history."
            }
        }
    }
}

impl From<BudgetError> for crate::error::VoxError {
    fn from(e: BudgetError) -> Self {
        crate::error::VoxError::Configuration(e.user_message().to_string())
    }
}

/// History and selection that fit the budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedContext {
    pub history: Vec<ConversationMessage>,
    pub selection: String,
}

/// Token budget available for the request itself
pub fn available_tokens(model_limit: usize) -> usize {
    model_limit.saturating_sub(RESPONSE_BUFFER_TOKENS)
}

/// Estimated tokens for prompt, history and selection sent together
pub fn total_tokens(fixed_prompt: &str, history: &[ConversationMessage], selection: &str) -> usize {
    let chars = fixed_prompt.chars().count()
        + history.iter().map(|m| m.content.char_len()).sum::<usize>()
        + selection.chars().count();
    estimate_chars(chars)
}

/// Shrink `history` and `selection` until everything fits `model_limit`.
///
/// Stops at the first stage that fits:
/// 1. keep system messages and the last two user/assistant pairs, each cut to
///    [`MIN_HISTORY_TOKENS`]
/// 2. truncate the selection to 90% of its own estimate
/// 3. cut the excess off the end of the selection
///
/// System messages are never dropped.
pub fn reduce(
    fixed_prompt: &str,
    history: &[ConversationMessage],
    selection: &str,
    model_limit: usize,
) -> Result<ReducedContext, BudgetError> {
    let available = available_tokens(model_limit);
    let mut history = history.to_vec();
    let mut selection = selection.to_string();

    let initial = total_tokens(fixed_prompt, &history, &selection);
    if initial <= available {
        return Ok(ReducedContext { history, selection });
    }
    tracing::debug!(tokens = initial, available, "Context over budget, reducing");

    let mut current = initial;

    if !history.is_empty() {
        history = compress_history(&history);
        current = total_tokens(fixed_prompt, &history, &selection);
        tracing::info!(from = initial, to = current, "History compressed");
    }

    if current > available && !selection.is_empty() {
        let keep = (estimate_tokens(&selection) as f64 * SELECTED_TEXT_PRIORITY_RATIO) as usize;
        selection = truncate_to_tokens(&selection, keep);
        current = total_tokens(fixed_prompt, &history, &selection);
        tracing::info!(tokens = current, "Selection reduced");
    }

    if current > available && !selection.is_empty() {
        let excess = current - available;
        let cut = (excess as f64 * CHARS_PER_TOKEN_TRUNCATION).ceil() as usize;
        selection = cut_tail(&selection, cut);
        current = total_tokens(fixed_prompt, &history, &selection);
        tracing::warn!(removed_chars = cut, tokens = current, "Emergency cut applied to selection");
    }

    if current > available {
        return Err(BudgetError::ContextOverflow {
            required: current,
            available,
        });
    }

    tracing::info!(from = initial, to = current, "Context reduced");
    Ok(ReducedContext { history, selection })
}

/// Keep system messages plus the most recent complete user/assistant pairs.
fn compress_history(history: &[ConversationMessage]) -> Vec<ConversationMessage> {
    let mut pairs: Vec<Vec<ConversationMessage>> = Vec::new();
    let mut buffer: Vec<ConversationMessage> = Vec::new();

    for message in history.iter().rev().filter(|m| !m.is_system()) {
        buffer.push(message.clone());
        if buffer.len() == 2 {
            buffer.reverse();
            pairs.push(std::mem::take(&mut buffer));
            if pairs.len() == MAX_KEPT_PAIRS {
                break;
            }
        }
    }

    history
        .iter()
        .filter(|m| m.is_system())
        .cloned()
        .chain(pairs.into_iter().rev().flatten())
        .map(|mut message| {
            message.content = truncate_content(&message.content, MIN_HISTORY_TOKENS);
            message
        })
        .collect()
}

fn truncate_content(content: &MessageContent, max_tokens: usize) -> MessageContent {
    match content {
        MessageContent::Text(text) => MessageContent::Text(truncate_to_tokens(text, max_tokens)),
        MessageContent::Parts(parts) => MessageContent::Parts(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => ContentPart::Text {
                        text: truncate_to_tokens(text, max_tokens),
                    },
                    other => other.clone(),
                })
                .collect(),
        ),
    }
}
