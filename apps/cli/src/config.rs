//! CLI configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the `tend` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Id of the account this machine acts for.
    pub user_id: String,
    /// Display name of the account.
    pub user_name: String,
}

impl Config {
    /// Default config location, `~/.tend/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tend")
            .join("config.toml")
    }

    /// Loads the configuration from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| {
            format!("No configuration at {}. Run 'tend init <name>' to create one.", path.display())
        })?;
        toml::from_str(&raw)
            .with_context(|| format!("Invalid configuration at {}", path.display()))
    }

    /// Writes the configuration to the given path, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("Serializing configuration")?;
        fs::write(path, raw).with_context(|| format!("Writing {}", path.display()))
    }
}
