//! Error taxonomy for triggered operations
//!
//! Every error is local to one operation: it is reported to the UI once, the
//! shared state is reset, and the process keeps running.

use thiserror::Error;

/// Failure classes reported by an LLM provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// HTTP 429
    RateLimited,
    /// HTTP 413
    PayloadTooLarge,
    /// HTTP 401
    Unauthorized,
    /// HTTP 503
    ServiceUnavailable,
    /// Connection problems and anything unclassified
    Network,
}

impl ProviderErrorKind {
    /// Classify an HTTP status code. Unknown codes count as network failures.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            413 => Self::PayloadTooLarge,
            401 => Self::Unauthorized,
            503 => Self::ServiceUnavailable,
            _ => Self::Network,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimited => "Rate limit reached. Please wait a moment.",
            Self::PayloadTooLarge => "Request too large. Try reducing context or selection.",
            Self::Unauthorized => "Invalid API Key. Check your credentials.",
            Self::ServiceUnavailable => "Service temporarily unavailable. Try again later.",
            Self::Network => "An API error occurred. Please try again.",
        }
    }
}

/// Error raised by an [`LlmProvider`](crate::providers::LlmProvider) call or stream.
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {detail}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub detail: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::from_status(status), detail)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, detail)
    }
}

/// Error raised by a [`TranscriptionProvider`](crate::providers::TranscriptionProvider).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("Transcription unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transcription provider failure: {0}")]
    ProviderFailure(String),
}

/// Top-level error for one triggered operation.
#[derive(Debug, Clone, Error)]
pub enum VoxError {
    /// Invalid audio, missing recording, empty transcript
    #[error("Input error: {0}")]
    Input(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Raised only by the watchdog
    #[error("Operation timed out after {0}s")]
    Timeout(u64),

    /// Invalid hotkey combination, no model available, incompatible agent setup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation was abandoned because its cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,
}

impl VoxError {
    /// Message suitable for the UI sink.
    pub fn user_message(&self) -> String {
        match self {
            VoxError::Input(msg) => format!("Error: {}", msg),
            VoxError::Provider(e) => e.kind.user_message().to_string(),
            VoxError::Transcription(TranscriptionError::InvalidAudio(_)) => {
                "Error: The recording could not be processed.".to_string()
            }
            VoxError::Transcription(TranscriptionError::Unauthorized(_)) => {
                "Error: Transcription API key rejected. Check your credentials.".to_string()
            }
            VoxError::Transcription(TranscriptionError::ProviderFailure(_)) => {
                "Error: Transcription failed. Please try again.".to_string()
            }
            VoxError::Timeout(_) => "The operation took too long. Please try again.".to_string(),
            VoxError::Configuration(msg) => msg.clone(),
            VoxError::Cancelled => String::new(),
        }
    }

    /// Whether the failure should be shown to the user at all.
    ///
    /// Cancellation is silent: the watchdog already reported the timeout.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, VoxError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, VoxError>;
