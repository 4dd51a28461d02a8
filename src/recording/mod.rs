//! Recording lifecycle
//!
//! Flips the shared recording flags, mutes system volume when configured and
//! drives the capture service. The capture service writes the finished
//! recording to the session's file; the orchestrator deletes it after use.

mod machine;
mod session;


pub use machine::{FinishedRecording, RecordingMachine, RecordingSettings, wait_for_file};
pub use session::{RecordingKind, RecordingSession};
