//! Budget command implementation

use anyhow::{Context, Result};
use std::path::Path;

use voxdesk::context::{self, available_tokens, estimate_tokens};

use super::load_config;

/// Estimate how a selection fits the context window of `model`
pub fn budget_command(config_path: &Path, selection: &Path, model: Option<String>) -> Result<()> {
    let config = load_config(config_path)?;
    let text = std::fs::read_to_string(selection)
        .with_context(|| format!("Failed to read selection: {}", selection.display()))?;

    let model = model.unwrap_or_else(|| config.general.model.clone());
    let catalog = config.catalog();
    if !catalog.contains(&model) {
        println!("Model '{}' is not configured, using the default limit", model);
    }
    let limit = catalog.context_limit(&model);

    println!("Model: {} (context limit {} tokens)", model, limit);
    println!("Available for the request: {} tokens", available_tokens(limit));
    println!(
        "Selection: {} chars, ~{} tokens",
        text.chars().count(),
        estimate_tokens(&text)
    );

    match context::reduce("", &[], &text, limit) {
        Ok(reduced) if reduced.selection == text => println!("Fits without reduction"),
        Ok(reduced) => println!(
            "Reduced to {} chars, ~{} tokens",
            reduced.selection.chars().count(),
            estimate_tokens(&reduced.selection)
        ),
        Err(e) => println!("Does not fit: {}", e),
    }

    Ok(())
}
