//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.roster.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `ROSTER_USERS`, `ROSTER_TOKEN`, or legacy
//!    `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--users`/`-u`, `--input`/`-i` and
//!    `--token`/`-t`
//!
//! # Configuration File
//!
//! Place `.roster.toml` in the current directory, home directory, or
//! XDG config directory with:
//!
//! ```toml
//! token = "ghp_example"
//! api_base = "https://api.github.com"
//! request_delay_ms = 1000
//! rate_limit_threshold = 10
//! per_page = 100
//! ```

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::aggregation::{DEFAULT_RATE_LIMIT_THRESHOLD, PipelineSettings};
use crate::github::error::IntakeError;
use crate::github::normalizer::DEFAULT_WEB_HOST;
use crate::github::pagination::{MAX_PER_PAGE, validate_per_page};

/// GitHub REST API root used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const DEFAULT_REQUEST_DELAY_MS: u64 = 1_000;

/// Where the raw account list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource<'config> {
    /// Text passed with `--users`.
    Inline(&'config str),
    /// A file named with `--input`.
    File(Utf8PathBuf),
    /// Standard input.
    Stdin,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `ROSTER_USERS` or `--users`: Account list as free text
/// - `ROSTER_INPUT` or `--input`: File holding the account list
/// - `ROSTER_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `ROSTER_API_BASE` or `--api-base`: REST API root
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use roster::RosterConfig;
///
/// let config = RosterConfig::load().expect("failed to load configuration");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "ROSTER",
    discovery(
        dotfile_name = ".roster.toml",
        config_file_name = "roster.toml",
        app_name = "roster"
    )
)]
pub struct RosterConfig {
    /// Accounts to look up, separated by commas or whitespace.
    ///
    /// Profile URLs and `@handles` are accepted. Can be provided via:
    /// - CLI: `--users <LIST>` or `-u <LIST>`
    /// - Environment: `ROSTER_USERS`
    /// - Config file: `users = "..."`
    #[ortho_config(cli_short = 'u')]
    pub users: Option<String>,

    /// File holding the account list.
    ///
    /// Ignored when `users` is set. When neither is set the list is read
    /// from standard input.
    #[ortho_config(cli_short = 'i')]
    pub input: Option<String>,

    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `ROSTER_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// REST API root. Defaults to `https://api.github.com`.
    #[ortho_config()]
    pub api_base: String,

    /// Host stripped from pasted profile URLs. Defaults to `github.com`.
    #[ortho_config()]
    pub web_host: String,

    /// Pause between accounts, in milliseconds. Defaults to 1000.
    #[ortho_config()]
    pub request_delay_ms: u64,

    /// The run stops once fewer API calls than this remain. Defaults to 10.
    #[ortho_config()]
    pub rate_limit_threshold: u32,

    /// Repository page size, `1..=100`. Defaults to 100.
    #[ortho_config()]
    pub per_page: u8,

    /// Writes run events to stderr as JSON lines.
    ///
    /// Can be provided via:
    /// - CLI: `--events` / `-e`
    /// - Config file: `events = true`
    #[ortho_config(cli_short = 'e')]
    pub events: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            users: None,
            input: None,
            token: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            web_host: DEFAULT_WEB_HOST.to_owned(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            rate_limit_threshold: DEFAULT_RATE_LIMIT_THRESHOLD,
            per_page: MAX_PER_PAGE,
            events: false,
        }
    }
}

impl RosterConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, IntakeError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(IntakeError::MissingToken)
    }

    /// Determines where the account list is read from.
    #[must_use]
    pub fn input_source(&self) -> InputSource<'_> {
        if let Some(users) = self.users.as_deref() {
            InputSource::Inline(users)
        } else if let Some(path) = self.input.as_deref() {
            InputSource::File(Utf8PathBuf::from(path))
        } else {
            InputSource::Stdin
        }
    }

    /// Returns the API root after checking that it is an HTTP(S) URL.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidUrl`] when the value does not parse or
    /// uses another scheme.
    pub fn api_base(&self) -> Result<&str, IntakeError> {
        let trimmed = self.api_base.trim();
        let parsed =
            Url::parse(trimmed).map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(trimmed.trim_end_matches('/')),
            other => Err(IntakeError::InvalidUrl(format!(
                "unsupported scheme `{other}` in {trimmed}"
            ))),
        }
    }

    /// Pipeline tunables derived from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPagination`] when `per_page` is outside
    /// `1..=100`.
    pub fn pipeline_settings(&self) -> Result<PipelineSettings, IntakeError> {
        validate_per_page(self.per_page)?;
        Ok(PipelineSettings {
            request_delay: Duration::from_millis(self.request_delay_ms),
            rate_limit_threshold: self.rate_limit_threshold,
            per_page: self.per_page,
        })
    }
}
