//! Client config load/save for `~/.quiz/config.yaml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::DEFAULT_LIMIT;
use crate::step::PULSE_WINDOW;

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "QUIZ_API_URL";

/// API section (base_url).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Quiz section (pulse_window_ms, search_limit).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_window_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_limit: Option<usize>,
}

impl QuizSection {
    pub fn pulse_window(&self) -> Duration {
        self.pulse_window_ms
            .map(Duration::from_millis)
            .unwrap_or(PULSE_WINDOW)
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub quiz: QuizSection,
}

/// Returns the default config file path: `~/.quiz/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".quiz").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Base URL of the recommendation service: `QUIZ_API_URL` if set, else
/// `api.base_url`.
pub fn resolve_base_url(config: &Config) -> Result<String, ConfigError> {
    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }
    config
        .api
        .base_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .ok_or(ConfigError::MissingBaseUrl)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("no API base URL: set QUIZ_API_URL or api.base_url")]
    MissingBaseUrl,
}
