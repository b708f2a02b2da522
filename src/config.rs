use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

use crate::version::error::{ConfigError, TrackerError};
use crate::version::repository::normalize_repository;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_BRANCH: &str = "main";

pub const DEFAULT_PATH: &str = "package.json";

/// Request timeout in milliseconds (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// How long a retrieved version stays fresh in milliseconds (5 minutes)
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Identifying `User-Agent` sent with every request
pub const USER_AGENT: &str = "package-track";

/// Content negotiation for the raw file instead of the JSON envelope
pub const GITHUB_RAW_ACCEPT: &str = "application/vnd.github.v3.raw";

/// Tracker settings as supplied by the caller (config file, CLI flags)
#[derive(Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerOptions {
    pub repository: String,
    pub branch: Option<String>,
    pub path: Option<String>,
    pub auth_token: Option<String>,
    pub timeout_ms: Option<i64>,
    pub cache_ttl_ms: Option<i64>,
    pub api_base_url: Option<String>,
}

impl TrackerOptions {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            ..Default::default()
        }
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn cache_ttl_ms(mut self, cache_ttl_ms: i64) -> Self {
        self.cache_ttl_ms = Some(cache_ttl_ms);
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }
}

impl fmt::Debug for TrackerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerOptions")
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("path", &self.path)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("cache_ttl_ms", &self.cache_ttl_ms)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Validated, immutable tracker configuration
#[derive(Clone, PartialEq)]
pub struct TrackerConfig {
    repository: String,
    branch: String,
    path: String,
    auth_token: Option<String>,
    timeout_ms: u64,
    cache_ttl_ms: u64,
    api_base_url: String,
}

impl TrackerConfig {
    pub fn from_options(options: &TrackerOptions) -> Result<Self, TrackerError> {
        let repository = normalize_repository(&options.repository)?;

        let timeout_ms = positive_ms("timeoutMs", options.timeout_ms, DEFAULT_TIMEOUT_MS)?;
        let cache_ttl_ms = positive_ms("cacheTtlMs", options.cache_ttl_ms, DEFAULT_CACHE_TTL_MS)?;

        let api_base_url = non_empty(options.api_base_url.as_deref())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            repository,
            branch: non_empty(options.branch.as_deref())
                .unwrap_or(DEFAULT_BRANCH)
                .to_string(),
            path: non_empty(options.path.as_deref())
                .unwrap_or(DEFAULT_PATH)
                .trim_start_matches('/')
                .to_string(),
            auth_token: non_empty(options.auth_token.as_deref()).map(str::to_string),
            timeout_ms,
            cache_ttl_ms,
            api_base_url,
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::milliseconds(self.cache_ttl_ms as i64)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("path", &self.path)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("cache_ttl_ms", &self.cache_ttl_ms)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn positive_ms(field: &'static str, value: Option<i64>, default: u64) -> Result<u64, TrackerError> {
    match value {
        None => Ok(default),
        Some(ms) if ms > 0 => Ok(ms as u64),
        Some(ms) => Err(TrackerError::InvalidConfiguration {
            field,
            reason: format!("must be a positive number of milliseconds, got {}", ms),
        }),
    }
}

/// Polling behavior of the version monitor
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorOptions {
    /// Refresh interval in milliseconds; non-positive means refresh once
    pub refresh_interval_ms: i64,
    /// Branches tried in order when the primary branch has no such file
    pub fallback_branches: Vec<String>,
    pub show_update_check: bool,
    /// Baseline version for update checks
    pub current_version: Option<String>,
}

impl MonitorOptions {
    pub fn refresh_interval(&self) -> Option<std::time::Duration> {
        (self.refresh_interval_ms > 0)
            .then(|| std::time::Duration::from_millis(self.refresh_interval_ms as u64))
    }
}

/// Configuration file contents
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub tracker: TrackerOptions,
    pub monitor: MonitorOptions,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the default config file, treating a missing file as empty config
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Returns the path to the config directory for package-track.
/// Uses $XDG_CONFIG_HOME/package-track if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/package-track,
/// or ./package-track if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("package-track")
}
