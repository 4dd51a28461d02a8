//! Check command implementation

use anyhow::{Result, bail};
use std::path::Path;

use super::load_config;

/// Validate the configuration and list every problem found
pub fn check_command(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let problems = config.validate();

    if json {
        let report = serde_json::json!({
            "config": config_path.display().to_string(),
            "ok": problems.is_empty(),
            "problems": problems,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Config: {}", config_path.display());
        println!(
            "  {} hotkeys, {} agents, {} models, {} replacements",
            config.hotkeys.iter().filter(|(_, c)| !c.trim().is_empty()).count(),
            config.agents.len(),
            config.models.len(),
            config.replacements.len()
        );
        if problems.is_empty() {
            println!("OK");
        } else {
            println!("\nProblems ({}):", problems.len());
            for problem in &problems {
                println!("  - {}", problem);
            }
        }
    }

    if !problems.is_empty() {
        bail!("Configuration has {} problem(s)", problems.len());
    }
    Ok(())
}
