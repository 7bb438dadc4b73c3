//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// gitlab-sansio: GitLab API client and webhook receiver
///
/// Queries a GitLab REST API or receives GitLab webhooks, using the
/// transport-agnostic core of this crate.
#[derive(Debug, Parser)]
#[command(name = "gitlab-sansio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: serve)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// GitLab instance URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// REST API version
    #[arg(long = "api-version", global = true)]
    pub api_version: Option<String>,

    /// User agent sent with API requests
    #[arg(long, global = true)]
    pub requester: Option<String>,

    /// Personal or project access token
    #[arg(long = "access-token", global = true)]
    pub access_token: Option<String>,

    /// Number of cached GET responses (0 disables caching)
    #[arg(long = "cache-size", global = true)]
    pub cache_size: Option<usize>,

    /// Address for the webhook receiver
    #[arg(long, global = true)]
    pub bind: Option<String>,

    /// Shared secret expected in `x-gitlab-token`
    #[arg(long, global = true)]
    pub secret: Option<String>,

    /// Event type to log (can be specified multiple times)
    #[arg(long = "event", value_name = "TYPE", global = true)]
    pub events: Vec<String>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for gitlab-sansio
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "gitlab-sansio.toml")]
        output: PathBuf,
    },

    /// Run the webhook receiver
    Serve,

    /// Fetch an API path and print the JSON result
    Get {
        /// API path, relative to the API root or absolute
        path: String,

        /// Query or template parameter (can be specified multiple times)
        #[arg(long = "param", short, value_name = "K=V")]
        params: Vec<String>,

        /// Follow pagination and print every item
        #[arg(long)]
        all: bool,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
