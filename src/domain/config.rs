use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::error::{ComError, ComResult};

/// RoboCom configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobocomConfig {
    /// Serial link to the motor controller
    #[serde(default)]
    pub serial: SerialConfig,
    /// TCP server for the supervising GUI
    #[serde(default)]
    pub gui: GuiConfig,
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Serial link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial device path
    #[serde(default = "default_device")]
    pub device: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// GUI server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuiConfig {
    /// TCP port the server listens on
    #[serde(default = "default_gui_port")]
    pub port: u16,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_device() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_gui_port() -> u16 {
    5544
}

impl Default for RobocomConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            gui: GuiConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            port: default_gui_port(),
        }
    }
}

impl RobocomConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: &Path) -> ComResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ComError::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| ComError::Config {
            message: format!("failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Default configuration file location
    /// (`~/.config/robocom/config.toml` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("robocom").join("config.toml"))
    }

    /// Load the default configuration file if it exists, otherwise
    /// fall back to built-in defaults.
    pub fn load_default() -> ComResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }
}
