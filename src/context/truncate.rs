//! Token estimation and word-boundary-safe truncation

/// Characters per token when estimating
pub const CHARS_PER_TOKEN_ESTIMATE: usize = 3;

/// Characters per token when converting a token budget into a cut position
pub const CHARS_PER_TOKEN_TRUNCATION: f64 = 3.5;

/// Appended to text that was cut
pub const TRUNCATION_MARKER: &str = "\n... [TRUNCATED] ...";

/// Approximate token count for `text`
pub fn estimate_tokens(text: &str) -> usize {
    estimate_chars(text.chars().count())
}

/// Approximate token count for `chars` characters
pub fn estimate_chars(chars: usize) -> usize {
    chars / CHARS_PER_TOKEN_ESTIMATE
}

/// Character budget for `tokens` tokens
pub fn tokens_to_chars(tokens: usize) -> usize {
    (tokens as f64 * CHARS_PER_TOKEN_TRUNCATION) as usize
}

/// Truncate `text` to roughly `max_tokens` tokens.
///
/// Cuts at the last space inside the budget (hard cut if there is none) and
/// appends [`TRUNCATION_MARKER`]. The marker is counted against the budget, so
/// the output never exceeds the character budget and truncating again is a
/// no-op.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    if estimate_tokens(text) <= max_tokens {
        return text.to_string();
    }

    let max_chars = tokens_to_chars(max_tokens);
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_chars = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_chars {
        return text.chars().take(max_chars).collect();
    }

    let head = take_chars(text, max_chars - marker_chars);
    let kept = match head.rfind(' ') {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head,
    };

    tracing::debug!(
        from = text.chars().count(),
        to = kept.chars().count(),
        "Text truncated"
    );
    format!("{}{}", kept, TRUNCATION_MARKER)
}

/// Drop the last `count` characters of `text`.
pub fn cut_tail(text: &str, count: usize) -> String {
    let len = text.chars().count();
    if count >= len {
        return String::new();
    }
    take_chars(text, len - count).to_string()
}

/// Prefix of `text` holding at most `count` characters
fn take_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
