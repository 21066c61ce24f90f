//! Client configuration.
//!
//! Layered lowest to highest: built-in defaults, the JSON config file
//! (`<config dir>/chatline/config.json`), environment variables, then
//! whatever the caller sets through the builder (CLI flags).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ChatError, ChatResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_FILTER: &str = "chatline=info";

pub const ENV_BASE_URL: &str = "CHATLINE_BASE_URL";
pub const ENV_SESSION: &str = "CHATLINE_SESSION";
pub const ENV_CONNECT_TIMEOUT: &str = "CHATLINE_CONNECT_TIMEOUT";

/// Configuration for the chat client.
///
/// # Example
///
/// ```ignore
/// use chatline::config::ClientConfig;
///
/// let config = ClientConfig::load()?
///     .with_base_url("https://chat.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server origin, without trailing slash
    pub base_url: String,
    /// Value of the `Cookie` header sent with every request
    pub session_cookie: Option<String>,
    /// TCP connect timeout; the response body itself has no deadline
    pub connect_timeout_secs: u64,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// On-disk form; every field optional so partial files are allowed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: Option<String>,
    session_cookie: Option<String>,
    connect_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

impl ClientConfig {
    /// Create a new ClientConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the session cookie sent with every request.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Set the connect timeout in seconds.
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set the default log filter.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatline").join("config.json"))
    }

    /// Defaults, then the default config file if present, then environment.
    pub fn load() -> ChatResult<Self> {
        let mut config = Self::default();
        if let Some(path) = Self::default_path() {
            if path.exists() {
                config = config.merge_file(&path)?;
            }
        }
        config.merge_env(|key| std::env::var(key).ok())
    }

    /// Overlay the values present in a JSON config file.
    pub fn merge_file(mut self, path: &Path) -> ChatResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ChatError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file: ConfigFile = serde_json::from_str(&raw).map_err(|e| {
            ChatError::Config(format!("invalid config file {}: {}", path.display(), e))
        })?;

        if let Some(url) = file.base_url {
            self = self.with_base_url(url);
        }
        if let Some(cookie) = file.session_cookie {
            self.session_cookie = Some(cookie);
        }
        if let Some(secs) = file.connect_timeout_secs {
            self.connect_timeout_secs = secs;
        }
        if let Some(filter) = file.log_filter {
            self.log_filter = filter;
        }
        self.validate()
    }

    /// Overlay environment variables, read through `lookup`.
    pub fn merge_env<F>(mut self, lookup: F) -> ChatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self = self.with_base_url(url);
        }
        if let Some(cookie) = lookup(ENV_SESSION) {
            self.session_cookie = Some(cookie);
        }
        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT) {
            self.connect_timeout_secs = raw.trim().parse().map_err(|_| {
                ChatError::Config(format!("{} must be a number of seconds, got '{}'", ENV_CONNECT_TIMEOUT, raw))
            })?;
        }
        self.validate()
    }

    /// Check the base URL scheme.
    pub fn validate(self) -> ChatResult<Self> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(self)
    }
}
