//! Configuration loading for feed-cli.
//!
//! Configuration is loaded from a TOML file (default: `config.toml` in the
//! platform config directory). A missing default file means "all defaults";
//! a missing file given with `--config` is an error. The application keys can
//! also come from `PHOTOFEED_ACCESS_KEY` / `PHOTOFEED_SECRET_KEY`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use photofeed_client::{AvatarSize, ClientConfig};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api.access_key`.
pub const ACCESS_KEY_ENV: &str = "PHOTOFEED_ACCESS_KEY";
/// Environment variable overriding `api.secret_key`.
pub const SECRET_KEY_ENV: &str = "PHOTOFEED_SECRET_KEY";

/// Root configuration for feed-cli.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// API credentials and hosts.
    #[serde(default)]
    pub api: ApiConfig,
    /// Local storage.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Application access key.
    #[serde(default)]
    pub access_key: String,
    /// Application secret key.
    #[serde(default)]
    pub secret_key: String,
    /// Redirect URI registered for the application.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Space separated OAuth scopes.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Authorization host.
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    /// API host.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Photos per page (default: 10).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Avatar rendition (default: small).
    #[serde(default)]
    pub avatar_size: AvatarSize,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Credentials file (default: `credentials.json` in the data directory).
    pub credentials_path: Option<PathBuf>,
}

// Default value functions
fn default_redirect_uri() -> String {
    photofeed_client::config::DEFAULT_REDIRECT_URI.to_string()
}

fn default_scope() -> String {
    photofeed_client::config::DEFAULT_SCOPE.to_string()
}

fn default_auth_base_url() -> String {
    photofeed_client::config::DEFAULT_AUTH_BASE_URL.to_string()
}

fn default_api_base_url() -> String {
    photofeed_client::config::DEFAULT_API_BASE_URL.to_string()
}

fn default_per_page() -> u32 {
    photofeed_core::DEFAULT_PER_PAGE
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
            auth_base_url: default_auth_base_url(),
            api_base_url: default_api_base_url(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
            avatar_size: AvatarSize::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load from `explicit` if given, else from the default location if a
    /// file exists there, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Replace the application keys with non-empty overrides.
    pub fn with_key_overrides(mut self, access_key: Option<String>, secret_key: Option<String>) -> Self {
        if let Some(key) = access_key.filter(|k| !k.is_empty()) {
            self.api.access_key = key;
        }
        if let Some(key) = secret_key.filter(|k| !k.is_empty()) {
            self.api.secret_key = key;
        }
        self
    }

    /// Apply `PHOTOFEED_ACCESS_KEY` / `PHOTOFEED_SECRET_KEY`.
    pub fn with_env_overrides(self) -> Self {
        self.with_key_overrides(
            std::env::var(ACCESS_KEY_ENV).ok(),
            std::env::var(SECRET_KEY_ENV).ok(),
        )
    }

    /// Library configuration. Fails if no access key is configured.
    pub fn client_config(&self) -> Result<ClientConfig> {
        if self.api.access_key.is_empty() {
            anyhow::bail!(
                "No access key configured. Set api.access_key in the config file or {}.",
                ACCESS_KEY_ENV
            );
        }
        let api = &self.api;
        Ok(ClientConfig::new(&api.access_key, &api.secret_key)
            .with_redirect_uri(&api.redirect_uri)
            .with_scope(&api.scope)
            .with_auth_base_url(&api.auth_base_url)
            .with_api_base_url(&api.api_base_url)
            .with_per_page(api.per_page)
            .with_timeout(Duration::from_secs(api.timeout_secs))
            .with_avatar_size(api.avatar_size))
    }

    /// Where the bearer token is stored.
    pub fn credentials_path(&self) -> Result<PathBuf> {
        match &self.storage.credentials_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_data_dir()?.join("credentials.json")),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", "photofeed", "feed-cli")
}

/// Default configuration file location.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Default data directory.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = project_dirs().context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
