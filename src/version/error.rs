use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid repository format: {input:?} (expected \"owner/repo\" or a GitHub URL)")]
    InvalidRepositoryFormat { input: String },

    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("Request for {repository} timed out after {timeout_ms}ms")]
    RequestTimeout { repository: String, timeout_ms: u64 },

    #[error("Invalid package format in {repository}/{path}: {reason}")]
    InvalidPackageFormat {
        repository: String,
        path: String,
        reason: String,
    },

    #[error("No version field found in {repository}/{path}")]
    MissingVersionField { repository: String, path: String },

    #[error("Invalid version format: {version:?}")]
    InvalidVersionFormat { version: String },

    #[error("Repository or file not found: {repository}/{path} (ref: {branch})")]
    NotFound {
        repository: String,
        branch: String,
        path: String,
    },

    #[error("Unauthorized access to {repository}: check that the auth token is valid")]
    Unauthorized { repository: String },

    #[error("GitHub API rate limit exceeded for {repository}. {}", rate_limit_hint(.authenticated))]
    RateLimitExceeded {
        repository: String,
        authenticated: bool,
        retry_after_secs: Option<u64>,
    },

    #[error("GitHub API error for {repository}: {status}{}", remote_message_suffix(.message))]
    RemoteError {
        repository: String,
        status: u16,
        message: Option<String>,
    },

    #[error("Network error while fetching {repository}: {source}")]
    Network {
        repository: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to check for updates: {source}")]
    UpdateCheckFailed {
        #[source]
        source: Box<TrackerError>,
    },
}

impl TrackerError {
    pub fn invalid_version(version: &str) -> Self {
        Self::InvalidVersionFormat {
            version: version.to_string(),
        }
    }

    /// Whether this error (or the error it wraps) is a not-found condition
    pub fn is_not_found(&self) -> bool {
        match self {
            TrackerError::NotFound { .. } => true,
            TrackerError::UpdateCheckFailed { source } => source.is_not_found(),
            _ => false,
        }
    }
}

fn rate_limit_hint(authenticated: &bool) -> &'static str {
    if *authenticated {
        "Check that the auth token is valid and has not exhausted its quota."
    } else {
        "Consider using a personal access token."
    }
}

fn remote_message_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!(" {}", message),
        _ => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
