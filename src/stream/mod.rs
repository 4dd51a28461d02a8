//! Streaming response parsing

mod parser;


pub use parser::{THINK_END_TAG, THINK_START_TAG, ThinkFilter, ThinkState, strip_think};
