//! CLI command implementations

pub mod budget;
pub mod check;
pub mod dispatch;
pub mod history;
pub mod init;
pub mod stats;
pub mod strip;

use anyhow::{Context, Result};
use std::path::Path;

use voxdesk::Config;

/// Load an existing config; diagnostics never create one implicitly
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "No configuration at {}\nRun `voxdesk init` to create one.",
            path.display()
        );
    }
    Config::from_file(path).with_context(|| "Configuration could not be loaded")
}
