use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{OfficeError, Result};
use crate::util::expand_tilde;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_SPACE_ID: &str = "main-virtual-office";

/// Environment variable that overrides `apiBaseUrl`.
pub const API_URL_ENV: &str = "VIRTUAL_OFFICE_API_URL";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfficeConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub space_id: String,
    pub debounce_ms: u64,
    pub poll_interval_secs: u64,
    /// Overrides `~/.virtual-office` for session and log files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 10,
            space_id: DEFAULT_SPACE_ID.to_string(),
            debounce_ms: 300,
            poll_interval_secs: 15,
            data_dir: None,
        }
    }
}

impl OfficeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Directory holding `session.json` and `logs/`.
    pub fn data_dir(&self) -> Option<PathBuf> {
        match &self.data_dir {
            Some(dir) => Some(PathBuf::from(expand_tilde(dir))),
            None => default_data_dir(),
        }
    }

    fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }
}

fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".virtual-office"))
}

pub fn config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config.json"))
}

/// Reads the config file at `path`; a missing or unreadable file yields defaults.
pub fn load_config_from(path: &Path) -> OfficeConfig {
    let config = std::fs::read_to_string(path)
        .ok()
        .and_then(|content| match serde_json::from_str::<OfficeConfig>(&content) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring malformed config: {e}");
                None
            }
        })
        .unwrap_or_default();
    config.apply_env()
}

pub fn load_config() -> OfficeConfig {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => OfficeConfig::default().apply_env(),
    }
}

pub fn save_config_to(path: &Path, config: &OfficeConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn save_config(config: &OfficeConfig) -> Result<()> {
    let path = config_path()
        .ok_or_else(|| OfficeError::Custom("Cannot find home directory".into()))?;
    save_config_to(&path, config)
}
