//! Dispatch command implementation

use anyhow::Result;
use std::path::Path;

use voxdesk::agents::{AgentDispatcher, Dispatch, ensure_model_available};

use super::load_config;

/// Show where a transcript would be routed
pub fn dispatch_command(config_path: &Path, text: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let dispatcher = AgentDispatcher::new(config.agents.clone());

    match dispatcher.dispatch(text) {
        Dispatch::Agent(matched) => {
            println!("Agent: {}", matched.agent.name);
            println!("Instruction: {}", matched.instruction);
            match ensure_model_available(&matched.agent, &config.general.model, &config.catalog())
            {
                Ok(model) => println!("Model: {}", model),
                Err(e) => println!("Model: unavailable ({})", e.user_message()),
            }
            if matched.agent.screen_vision {
                println!("Screen vision: yes");
            }
            println!(
                "Result: {}",
                if matched.agent.autopaste { "pasted" } else { "copied" }
            );
        }
        Dispatch::General(text) => {
            println!("No agent matched, general request");
            println!("Text: {}", text);
        }
    }

    Ok(())
}
