//! Transcript post-processing

mod numbers;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use numbers::{convert_numbers, supports_number_conversion};

/// A user-defined replacement applied to every transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Apply replacements in order as plain substring substitutions.
///
/// Entries with an empty `from` or `to` are skipped.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> String {
    let mut out = text.to_string();
    for r in replacements {
        if r.from.is_empty() || r.to.is_empty() {
            continue;
        }
        out = out.replace(&r.from, &r.to);
    }
    out
}

/// Short preview for log lines; transcripts are never logged in full.
pub fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 50;
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
