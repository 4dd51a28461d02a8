//! Agent dispatch
//!
//! Maps a transcript onto a user-defined agent via its trigger phrase, or onto
//! the general assistant when nothing matches.

mod dispatcher;


pub use crate::config::Agent;
pub use dispatcher::{AgentDispatcher, AgentMatch, Dispatch, ensure_model_available};
