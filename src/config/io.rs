//! Configuration file I/O operations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

/// `config.toml` -> `config.toml.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Exclusive advisory lock on `<file>.lock`, released on drop.
///
/// Shared by every store under the config directory.
pub(crate) struct FileLock {
    file: File,
}

impl FileLock {
    pub(crate) fn acquire(path: &Path) -> Result<Self> {
        let lock_path = sibling(path, "lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!("Releasing file lock failed: {}", e);
        }
    }
}

/// Replace `path` with `content` through a synced temp file and a rename
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = sibling(path, "tmp");
    let mut temp = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
    temp.write_all(content.as_bytes())
        .and_then(|()| temp.sync_all())
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display())),
        _ => Ok(()),
    }
}

impl Config {
    /// ~/.voxdesk/
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".voxdesk")
    }

    /// ~/.voxdesk/config.toml
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save under an exclusive lock; readers never see a half-written file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let _lock = FileLock::acquire(path)?;
        write_atomic(path, &content)
    }

    /// Load configuration from `path`, creating it with defaults when missing.
    ///
    /// Creation happens under the config lock so two processes starting at
    /// once write the defaults only once.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }

        ensure_parent(path)?;
        let _lock = FileLock::acquire(path)?;
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::info!(path = %path.display(), "No config found, writing defaults");
        let config = Config::default();
        let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        write_atomic(path, &content)?;
        Ok(config)
    }

    /// Load the global configuration
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::global_config_path())
    }

    /// Write a default configuration to `path`.
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn init(path: &Path, force: bool) -> Result<Self> {
        if path.exists() && !force {
            anyhow::bail!(
                "Configuration already exists: {}\nUse --force to overwrite.",
                path.display()
            );
        }
        let config = Config::default();
        config.save_to_file(path)?;
        Ok(config)
    }
}
