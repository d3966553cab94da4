//! Top-level application configuration.
//!
//! Configuration is stored in `.qtrack/config.yaml` and includes:
//! - Remote store location and credentials
//! - Page size for question tables
//! - Search debounce and notification timings

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Directory holding qtrack state, relative to the project root
pub const QTRACK_DIR: &str = ".qtrack";

/// Main configuration structure
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote question store
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token (the QTRACK_TOKEN environment variable takes precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Rows per page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Delay before search input triggers a fetch, in milliseconds (default: 300)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Remote operation timeout in seconds (default: 30)
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout: u64,
}

/// Toast timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a message stays visible, in milliseconds (default: 4000)
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,

    /// Delay between hiding a message and showing the next, in milliseconds (default: 300)
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_remote_timeout() -> u64 {
    30
}

fn default_display_ms() -> u64 {
    4000
}

fn default_grace_ms() -> u64 {
    300
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_ms: default_display_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            notifications: NotificationConfig::default(),
            remote_timeout: default_remote_timeout(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("page_size", &self.page_size)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("notifications", &self.notifications)
            .field("remote_timeout", &self.remote_timeout)
            .finish()
    }
}

/// Root directory holding `.qtrack/`: `QTRACK_ROOT` if set, else the current directory
pub fn qtrack_root() -> PathBuf {
    if let Ok(root) = env::var("QTRACK_ROOT")
        && !root.is_empty()
    {
        return PathBuf::from(root).join(QTRACK_DIR);
    }
    PathBuf::from(QTRACK_DIR)
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        qtrack_root().join("config.yaml")
    }

    /// Load configuration from the default location, or return defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, or return defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            TrackerError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                TrackerError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            TrackerError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only, the file may hold a token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, permissions)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(TrackerError::Config(
                "page_size must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Get the API token from the environment or the config file
    pub fn token(&self) -> Option<SecretString> {
        if let Ok(token) = env::var("QTRACK_TOKEN")
            && !token.is_empty()
        {
            return Some(SecretString::from(token));
        }

        self.token.clone().map(SecretString::from)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
