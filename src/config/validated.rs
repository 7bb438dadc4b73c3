//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::LazyLock;

use http::HeaderValue;
use regex::Regex;
use url::Url;

use crate::api::Params;

use super::cli::{Cli, Command};
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

static API_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+$").expect("API version regex is valid"));

/// Fully validated configuration ready for use by the application.
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// API client settings
    pub gitlab: GitLabSettings,

    /// Webhook receiver settings
    pub server: ServerSettings,

    /// What the binary should do
    pub action: Action,

    /// Verbose logging enabled
    pub verbose: bool,
}

/// Settings for the API client.
#[derive(Debug, Clone)]
pub struct GitLabSettings {
    /// Instance URL; the API root is derived from it
    pub url: Url,

    /// REST API version
    pub api_version: String,

    /// User agent
    pub requester: String,

    /// Access token, if any
    pub access_token: Option<String>,

    /// Number of cached GET responses; 0 disables caching
    pub cache_size: usize,
}

/// Settings for the webhook receiver.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Listen address
    pub bind: SocketAddr,

    /// Shared secret checked against `x-gitlab-token`
    pub secret: Option<String>,

    /// Event types handled by the logging hook
    pub events: Vec<String>,
}

/// The operation selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run the webhook receiver.
    Serve,

    /// Fetch `path` and print the result.
    Get {
        /// API path or absolute URL
        path: String,
        /// Query and template parameters
        params: Params,
        /// Follow pagination
        all: bool,
    },
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.gitlab.access_token.is_some() { "set" } else { "none" };
        let secret = if self.server.secret.is_some() { "set" } else { "none" };

        write!(
            f,
            "Config {{ url: {}, api_version: {}, requester: {}, access_token: {}, \
             cache_size: {}, bind: {}, secret: {}, events: {} }}",
            self.gitlab.url,
            self.gitlab.api_version,
            self.gitlab.requester,
            token,
            self.gitlab.cache_size,
            self.server.bind,
            secret,
            self.server.events.len(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values, which take
    /// precedence over built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - URL is invalid or not http(s)
    /// - API version is not of the form `v<number>`
    /// - Requester or access token cannot be sent as a header value
    /// - Bind address is invalid
    /// - An event type is blank or a `--param` is not `key=value`
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let gitlab = GitLabSettings {
            url: Self::resolve_url(cli, toml)?,
            api_version: Self::resolve_api_version(cli, toml)?,
            requester: Self::resolve_requester(cli, toml)?,
            access_token: Self::resolve_access_token(cli, toml)?,
            cache_size: cli
                .cache_size
                .or_else(|| toml.and_then(|t| t.gitlab.cache_size))
                .unwrap_or(defaults::CACHE_SIZE),
        };

        let server = ServerSettings {
            bind: Self::resolve_bind(cli, toml)?,
            secret: cli
                .secret
                .clone()
                .or_else(|| toml.and_then(|t| t.server.secret.clone())),
            events: Self::resolve_events(cli, toml)?,
        };

        Ok(Self {
            gitlab,
            server,
            action: Self::resolve_action(cli)?,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        let url_str = cli
            .url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.gitlab.url.as_deref()))
            .unwrap_or(defaults::URL);

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(url)
    }

    fn resolve_api_version(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let version = cli
            .api_version
            .as_deref()
            .or_else(|| toml.and_then(|t| t.gitlab.api_version.as_deref()))
            .unwrap_or(defaults::API_VERSION);

        if API_VERSION.is_match(version) {
            Ok(version.to_string())
        } else {
            Err(ConfigError::InvalidApiVersion(version.to_string()))
        }
    }

    fn resolve_requester(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let requester = cli
            .requester
            .as_deref()
            .or_else(|| toml.and_then(|t| t.gitlab.requester.as_deref()))
            .unwrap_or(defaults::REQUESTER);

        if requester.trim().is_empty() {
            return Err(ConfigError::InvalidHeaderValue {
                field: "requester",
                reason: "must not be empty".to_string(),
            });
        }
        check_header_value("requester", requester)?;
        Ok(requester.to_string())
    }

    fn resolve_access_token(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<String>, ConfigError> {
        let token = cli
            .access_token
            .as_deref()
            .or_else(|| toml.and_then(|t| t.gitlab.access_token.as_deref()));

        match token {
            Some(token) => {
                check_header_value("access_token", token)?;
                Ok(Some(token.to_string()))
            }
            None => Ok(None),
        }
    }

    fn resolve_bind(cli: &Cli, toml: Option<&TomlConfig>) -> Result<SocketAddr, ConfigError> {
        let bind = cli
            .bind
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.bind.as_deref()))
            .unwrap_or(defaults::BIND);

        bind.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidBind {
            value: bind.to_string(),
            reason: e.to_string(),
        })
    }

    fn resolve_events(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Vec<String>, ConfigError> {
        // CLI events replace TOML events entirely
        let events = if !cli.events.is_empty() {
            cli.events.clone()
        } else if let Some(t) = toml.filter(|t| !t.server.events.is_empty()) {
            t.server.events.clone()
        } else {
            defaults::events()
        };

        if events.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::EmptyEventType);
        }
        Ok(events)
    }

    fn resolve_action(cli: &Cli) -> Result<Action, ConfigError> {
        match &cli.command {
            None | Some(Command::Serve | Command::Init { .. }) => Ok(Action::Serve),
            Some(Command::Get { path, params, all }) => {
                let mut parsed = Params::new();
                for raw in params {
                    let (key, value) = parse_param(raw)?;
                    // Repeated keys become list values
                    let mut values = parsed
                        .get_all(&key)
                        .map(<[String]>::to_vec)
                        .unwrap_or_default();
                    values.push(value);
                    parsed.insert(key, values);
                }
                Ok(Action::Get {
                    path: path.clone(),
                    params: parsed,
                    all: *all,
                })
            }
        }
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

/// Splits a `key=value` parameter. The value may be empty or contain `=`.
pub(crate) fn parse_param(s: &str) -> Result<(String, String), ConfigError> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidParam(s.to_string())),
    }
}

fn check_header_value(field: &'static str, value: &str) -> Result<(), ConfigError> {
    HeaderValue::from_str(value)
        .map(drop)
        .map_err(|e| ConfigError::InvalidHeaderValue {
            field,
            reason: e.to_string(),
        })
}
