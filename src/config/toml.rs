//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// API client configuration section
    #[serde(default)]
    pub gitlab: GitLabSection,

    /// Webhook receiver configuration section
    #[serde(default)]
    pub server: ServerSection,
}

/// API client configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitLabSection {
    /// GitLab instance URL
    pub url: Option<String>,

    /// REST API version, e.g. "v4"
    pub api_version: Option<String>,

    /// User agent sent with API requests
    pub requester: Option<String>,

    /// Access token for the `private-token` header
    pub access_token: Option<String>,

    /// Number of cached GET responses
    pub cache_size: Option<usize>,
}

/// Webhook receiver configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Listen address
    pub bind: Option<String>,

    /// Shared secret expected in `x-gitlab-token`
    pub secret: Option<String>,

    /// Event types handled by the logging hook
    #[serde(default)]
    pub events: Vec<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# gitlab-sansio configuration file

[gitlab]
# GitLab instance URL (default: https://gitlab.com)
# url = "https://gitlab.example.com"

# REST API version (default: v4)
# api_version = "v4"

# User agent sent with every request; use your username or project name
# requester = "gitlab-sansio"

# Personal or project access token, sent as the private-token header
# access_token = "glpat-..."

# Number of GET responses kept for conditional requests (0 disables caching)
cache_size = 500

[server]
# Listen address for the webhook receiver
bind = "127.0.0.1:8080"

# Shared secret; requests must carry it in x-gitlab-token
# secret = "change-me"

# Event types logged by the receiver
# Note: CLI --event values REPLACE this list entirely (not merged)
# events = ["Push Hook", "Merge Request Hook", "Pipeline Hook"]
"#
    .to_string()
}
