//! Startup configuration
//!
//! Settings are resolved once, before the server accepts any request:
//! command line / environment first, then the optional TOML settings file,
//! then defaults. The token is never read from the file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use github_api::{DEFAULT_API_URL, HttpClientConfig};
use serde::Deserialize;

use crate::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Values supplied on the command line or through the environment
#[derive(Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub config_path: Option<PathBuf>,
}

/// Contents of the optional settings file
///
/// ```toml
/// api_url = "https://ghe.example.com/api/v3"
/// timeout_secs = 60
/// user_agent = "my-agent/1.0"
/// ```
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved, immutable server configuration
#[derive(Clone)]
pub struct Config {
    token: String,
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Resolve overrides, reading the settings file if one was named.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let settings = match &overrides.config_path {
            Some(path) => SettingsFile::load(path)?,
            None => SettingsFile::default(),
        };
        Self::from_parts(overrides, settings)
    }

    /// Layer `overrides` over `settings` over defaults.
    pub fn from_parts(overrides: Overrides, settings: SettingsFile) -> Result<Self> {
        let token = overrides
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::MissingCredential)?;

        let timeout_secs = overrides
            .timeout_secs
            .or(settings.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            token,
            api_url: overrides
                .api_url
                .or(settings.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            user_agent: settings
                .user_agent
                .unwrap_or_else(|| format!("github-mcp-server/{}", env!("CARGO_PKG_VERSION"))),
        })
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}
