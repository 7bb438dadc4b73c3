//! Configuration layer for the gitlab-sansio binary.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Every field has a default, so the binary runs with no configuration at
//! all against `https://gitlab.com`.
//!
//! For the receiver's event list (`server.events`), CLI `--event` values
//! **replace** TOML values entirely (not merged).
//!
//! # Secrets
//!
//! `access_token` and `secret` are never printed; the [`Display`] impl of
//! [`ValidatedConfig`] only says whether they are set.
//!
//! [`Display`]: std::fmt::Display

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod toml_tests;

pub use cli::{Cli, Command};
pub use error::ConfigError;
pub use toml::{GitLabSection, ServerSection, TomlConfig, default_config_template};
pub use validated::{
    Action, GitLabSettings, ServerSettings, ValidatedConfig, write_default_config,
};
