//! # System configuration
//!
//! One TOML file holds every persisted setting: the frame loop, vibration
//! and danger tags. Missing files and missing keys degrade to defaults so
//! the game always starts; a file that exists but does not parse is an
//! error, since silently ignoring it would drop the player's choices.
//!
//! ```toml
//! [input]
//! tick_interval_ms = 16
//! initial_mode = "Gamepad"
//!
//! [haptics]
//! vibration_enabled = true
//! low_frequency_motor = 0.8
//! high_frequency_motor = 0.0
//! stop_delay_ms = 300
//!
//! [danger]
//! tags = ["Enemy"]
//! ```

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::danger::DangerSettings;
use crate::haptics::HapticSettings;
use crate::input::InputSettings;

const CONFIG_DIR: &str = ".config/repairman";
const SYSTEM_CONFIG_FILE: &str = "system_config.toml";

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    pub input: InputSettings,
    pub haptics: HapticSettings,
    pub danger: DangerSettings,
}

impl SystemConfig {
    /// Reads the config at `path`, falling back to defaults if it is absent
    pub async fn load(path: &Path) -> Result<Self> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check config file {}: {}", path.display(), e))?;
        if !exists {
            warn!(
                "No config at {}, using default settings",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let mut config = Self::parse(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
        config.normalize();

        info!("Loaded system config from {}", path.display());
        debug!("System config: {:?}", config);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| eyre!("{}", e))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize system config: {}", e))?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file {}: {}", path.display(), e))?;
        debug!("Saved system config to {}", path.display());
        Ok(())
    }

    /// Brings out-of-range values back into range
    pub fn normalize(&mut self) {
        self.input.normalize();
        self.haptics.normalize();
    }
}

/// Writes a default config if none exists yet
pub async fn ensure_default_config(path: &Path) -> Result<()> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|e| eyre!("Failed to check config file {}: {}", path.display(), e))?;
    if exists {
        return Ok(());
    }
    info!("Creating default config at {}", path.display());
    SystemConfig::default().save(path).await
}

/// `~/.config/repairman/system_config.toml`
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using working directory");
        PathBuf::from(".")
    });
    path.push(CONFIG_DIR);
    path.push(SYSTEM_CONFIG_FILE);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputMode;

    #[test]
    fn partial_file_fills_defaults() {
        let config = SystemConfig::parse(
            r#"
            [haptics]
            vibration_enabled = false
            "#,
        )
        .unwrap();

        assert!(!config.haptics.vibration_enabled);
        assert_eq!(config.haptics.low_frequency_motor, 0.8);
        assert_eq!(config.input.initial_mode, InputMode::Gamepad);
        assert!(config.danger.tags.is_empty());
    }

    #[test]
    fn default_path_ends_with_file_name() {
        assert!(default_config_path().ends_with("repairman/system_config.toml"));
    }
}
