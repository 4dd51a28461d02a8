//! Incremental filter for a leading `<think>...</think>` block

pub const THINK_START_TAG: &str = "<think>";
pub const THINK_END_TAG: &str = "</think>";

/// Whether the stream opened with a think block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThinkState {
    /// Not enough text seen to decide
    #[default]
    Unknown,
    /// Inside the think block, suppressing output
    Thinking,
    /// Forwarding everything
    Passthrough,
}

/// Per-response parser state.
///
/// Feed fragments in arrival order; tags may be split across fragments.
#[derive(Debug, Default)]
pub struct ThinkFilter {
    state: ThinkState,
    buffer: String,
}

impl ThinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ThinkState {
        self.state
    }

    /// Consume one fragment, returning the text to forward, if any.
    pub fn feed(&mut self, fragment: &str) -> Option<String> {
        match self.state {
            ThinkState::Passthrough => non_empty(fragment.to_string()),
            ThinkState::Unknown => {
                self.buffer.push_str(fragment);
                let trimmed = self.buffer.trim_start();
                if trimmed.starts_with(THINK_START_TAG) {
                    tracing::debug!("Think block detected");
                    self.state = ThinkState::Thinking;
                    self.take_after_end_tag()
                } else if trimmed.len() >= THINK_START_TAG.len()
                    || (!trimmed.is_empty() && !THINK_START_TAG.starts_with(trimmed))
                {
                    self.state = ThinkState::Passthrough;
                    non_empty(std::mem::take(&mut self.buffer))
                } else {
                    None
                }
            }
            ThinkState::Thinking => {
                self.buffer.push_str(fragment);
                self.take_after_end_tag()
            }
        }
    }

    /// Flush at end of stream.
    ///
    /// An undecided buffer (whitespace or a partial start tag) is forwarded; an
    /// unterminated think block is dropped.
    pub fn finish(&mut self) -> Option<String> {
        let buffer = std::mem::take(&mut self.buffer);
        match self.state {
            ThinkState::Unknown => {
                self.state = ThinkState::Passthrough;
                non_empty(buffer)
            }
            ThinkState::Thinking => {
                tracing::warn!(chars = buffer.len(), "Stream ended inside think block");
                self.state = ThinkState::Passthrough;
                None
            }
            ThinkState::Passthrough => None,
        }
    }

    fn take_after_end_tag(&mut self) -> Option<String> {
        let idx = self.buffer.find(THINK_END_TAG)?;
        let remainder = self.buffer[idx + THINK_END_TAG.len()..].to_string();
        self.buffer.clear();
        self.state = ThinkState::Passthrough;
        tracing::debug!("Think block ended");
        non_empty(remainder)
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Run a complete response through a fresh filter.
pub fn strip_think<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    let mut filter = ThinkFilter::new();
    let mut out = String::new();
    for fragment in fragments {
        if let Some(text) = filter.feed(fragment) {
            out.push_str(&text);
        }
    }
    if let Some(text) = filter.finish() {
        out.push_str(&text);
    }
    out
}
