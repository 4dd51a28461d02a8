//! Generation pipeline
//!
//! Picks the provider for a model, streams the response through the think
//! filter, classifies failures and commits successful exchanges to history.

mod generation;

#[cfg(test)]
mod tests;

pub use generation::{GenerationMode, GenerationPipeline, GenerationRequest};
