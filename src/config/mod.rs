use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ApiError;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.transcriptapi.com";

/// Environment variable consulted for the API key
pub const API_KEY_ENV: &str = "YT_TRANSCRIPT_API_KEY";

const MIN_API_KEY_LEN: usize = 8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings for the API
    pub client: ClientConfig,

    /// ASR job polling
    pub polling: PollingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Bearer token for the API
    pub api_key: String,

    /// Base URL, without trailing slash once validated
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Additional attempts after a timeout or 5xx response
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between job status checks
    pub interval_secs: u64,

    /// Give up on a job after this long
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            timeout_secs: 1200,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings and return a normalized copy.
    ///
    /// The API key is trimmed and must be at least 8 characters; trailing
    /// slashes are stripped from the base URL. A zero request timeout is
    /// rejected.
    pub fn validated(&self) -> Result<Self, ApiError> {
        let api_key = self.api_key.trim();
        if api_key.chars().count() < MIN_API_KEY_LEN {
            return Err(ApiError::Validation(format!(
                "API key must be at least {} characters (set --api-key or {})",
                MIN_API_KEY_LEN, API_KEY_ENV
            )));
        }

        let base_url = self.base_url.trim().trim_end_matches('/');
        url::Url::parse(base_url)
            .map_err(|e| ApiError::Validation(format!("Invalid base URL '{}': {}", base_url, e)))?;

        if self.timeout_secs == 0 {
            return Err(ApiError::Validation(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        })
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from file (if any), then apply the environment.
    pub async fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        config.apply_overrides(std::env::var(API_KEY_ENV).ok(), None);
        Ok(config)
    }

    /// Load configuration from a specific YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path =
            Self::config_path().context("Could not determine config directory")?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Copy of the configuration with the API key cleared
    pub fn without_api_key(&self) -> Self {
        let mut config = self.clone();
        config.client.api_key.clear();
        config
    }

    /// Non-empty overrides replace file values
    pub fn apply_overrides(&mut self, api_key: Option<String>, base_url: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.client.api_key = key;
        }
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.client.base_url = url;
        }
    }

    /// Get configuration file path
    pub fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("yt-transcript-client").join("config.yaml"))
    }

    /// Display current configuration
    pub fn display(&self) {
        let key_state = if self.client.api_key.trim().is_empty() {
            "not set".to_string()
        } else {
            format!("set ({} characters)", self.client.api_key.trim().chars().count())
        };

        println!("Current Configuration:");
        println!("  API Key: {}", key_state);
        println!("  Base URL: {}", self.client.base_url);
        println!("  Request Timeout: {}s", self.client.timeout_secs);
        println!("  Max Retries: {}", self.client.max_retries);
        println!("  Poll Interval: {}s", self.polling.interval_secs);
        println!("  Poll Timeout: {}s", self.polling.timeout_secs);
        if let Some(path) = Self::config_path() {
            println!("  Config File: {}", path.display());
        }
    }
}
