//! Context budget management
//!
//! Token estimation plus the reducer that trims conversation history and the
//! user's selection until a request fits the model's context window.

mod budget;
mod truncate;


pub use budget::{
    BudgetError, MIN_HISTORY_TOKENS, RESPONSE_BUFFER_TOKENS, ReducedContext,
    SELECTED_TEXT_PRIORITY_RATIO, available_tokens, reduce, total_tokens,
};
pub use truncate::{
    CHARS_PER_TOKEN_ESTIMATE, CHARS_PER_TOKEN_TRUNCATION, TRUNCATION_MARKER, cut_tail,
    estimate_tokens, tokens_to_chars, truncate_to_tokens,
};
