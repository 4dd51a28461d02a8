//! Init command implementation

use anyhow::Result;
use std::path::Path;
use tracing::info;

use voxdesk::Config;
use voxdesk::config::HotkeyAction;

/// Write a default configuration to `config_path`
pub fn init_command(config_path: &Path, force: bool) -> Result<()> {
    let config = Config::init(config_path, force)?;
    info!(path = %config_path.display(), "Configuration written");

    println!("Created: {}", config_path.display());
    println!();
    println!("Hotkeys:");
    for action in HotkeyAction::ALL {
        let combination = config.hotkeys.get(action).unwrap_or("");
        println!("  {:<22} {}", action.as_str(), combination);
    }
    println!();
    println!("Models: {}", config.catalog().names().join(", "));

    Ok(())
}
