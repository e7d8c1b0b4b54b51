//! Configuration management for the SkyTwin CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skytwin_runtime::config::AirspaceConfig;
use std::path::{Path, PathBuf};

/// Name of the project config file.
pub const CONFIG_FILE: &str = "skytwin.toml";

/// SkyTwin project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub airspace: AirspaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks to run when `--ticks` is not given.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
}

fn default_ticks() -> u64 { 200 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
        }
    }
}

impl Config {
    /// Load config from skytwin.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find skytwin.toml in current or parent directories.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [airspace]
            agent_count = 4
            seed = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.run.ticks, 200);
        assert_eq!(config.airspace.agent_count, 4);
        assert_eq!(config.airspace.seed, Some(12));
        assert_eq!(config.airspace.event_log_capacity, 50);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.airspace.agent_count = 7;
        config.run.ticks = 30;
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.airspace, config.airspace);
        assert_eq!(loaded.run.ticks, 30);
    }
}
