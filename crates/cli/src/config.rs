//! Configuration: optional TOML file, then environment, then flags.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use warpcast::ClientConfig;

pub const TOKEN_VAR: &str = "WARPCAST_API_TOKEN";
pub const PROPAGATE_VAR: &str = "WARPCAST_PROPAGATE_ERRORS";
pub const BASE_URL_VAR: &str = "WARPCAST_API_URL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Upstream API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP listener settings (ignored for stdio).
    #[serde(default)]
    pub server: ServerConfig,
}

/// Warpcast API settings.
#[derive(Deserialize)]
pub struct ApiConfig {
    /// Bearer token. Prefer the environment variable over the file.
    pub token: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Return upstream failures as errors instead of error payloads.
    #[serde(default)]
    pub propagate_errors: bool,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    warpcast::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    warpcast::DEFAULT_TIMEOUT.as_secs()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            propagate_errors: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("propagate_errors", &self.propagate_errors)
            .finish()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "api.timeout_secs".to_string(),
                value: "0".to_string(),
                expected: "a positive number of seconds",
            });
        }
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_VAR).filter(|t| !t.trim().is_empty()) {
            self.api.token = Some(token.trim().to_string());
        }
        if let Some(url) = lookup(BASE_URL_VAR).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(PROPAGATE_VAR) {
            self.api.propagate_errors = parse_flag(PROPAGATE_VAR, &raw)?;
        }
        Ok(())
    }

    /// Overlay command-line values.
    pub fn apply_flags(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }

    pub fn has_token(&self) -> bool {
        self.api.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Settings for the Warpcast client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            token: self.api.token.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            propagate_errors: self.api.propagate_errors,
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            expected: "true/false",
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {name}: {value:?} (expected {expected})")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
}
