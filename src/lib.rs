//! voxdesk - voice-to-action desktop core
//!
//! Global hotkeys start and stop audio recordings. Each recording is
//! transcribed and then either pasted as dictation, handed to a trigger-phrase
//! agent, or answered by a streamed LLM generation that keeps a shared
//! conversation history. Platform pieces (audio, transcription, LLM clients,
//! clipboard, screen) are plugged in through the traits in [`providers`] and
//! [`clipboard`].

pub mod agents;
pub mod clipboard;
pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod events;
pub mod history;
pub mod hotkeys;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod recording;
pub mod state;
pub mod stats;
pub mod stream;
pub mod transcript;
pub mod ui;
pub mod watchdog;

pub use config::Config;
pub use error::{Result, VoxError};
pub use orchestrator::{Collaborators, Orchestrator};
