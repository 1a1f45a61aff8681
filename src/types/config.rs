//! Configuration for Tabula.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{TabulaError, TabulaResult};

/// Environment variable that overrides the backend base URL.
pub const BACKEND_URL_ENV: &str = "TABULA_BACKEND_URL";

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tabula.toml";

/// Default backend address (loopback, the analytics service's default port).
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Main configuration for Tabula.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analytics backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Request dispatch settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Analytics backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analytics service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Unset means the HTTP client's default (none).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

/// How incoming lines are scheduled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Every line is dispatched on its own task; responses may be reordered.
    #[default]
    Concurrent,
    /// Lines are dispatched one at a time; responses keep input order.
    Sequential,
}

/// Request dispatch settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Dispatch mode.
    #[serde(default)]
    pub dispatch: DispatchMode,
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> TabulaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> TabulaResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolves the effective configuration, then applies the environment.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// loaded if present and defaults are used otherwise.
    pub fn resolve(explicit: Option<&Path>) -> TabulaResult<Self> {
        let mut config = match explicit {
            Some(path) if !path.exists() => {
                return Err(TabulaError::config(format!(
                    "file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(BACKEND_URL_ENV).ok());
        config.backend.base_url = normalize_base_url(&config.backend.base_url);
        Ok(config)
    }

    /// Applies the backend URL taken from the environment, ignoring blank values.
    pub fn apply_env_override(&mut self, backend_url: Option<String>) {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend.base_url = url.trim().to_string();
        }
    }
}

/// Removes trailing slashes so endpoint paths can be appended directly.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
