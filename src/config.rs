//! Configuration management for the proxy
//!
//! Two layers are loaded once at startup and never reloaded:
//! - [`ServerSettings`] come from environment variables (bind address, verbosity)
//! - [`ProxyConfig`] comes from the JSON settings file (target, auth policy, network policy)

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Directory name used under the platform config dir
const APP_DIR: &str = "claude-proxy";

/// How the proxy obtains the credential it attaches upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthKind {
    /// `api_key` holds the literal key
    #[serde(rename = "apikey")]
    ApiKey,
    /// `api_key` holds the path of a JSON token file, `login_url` the entry to read
    #[serde(rename = "token-file", alias = "opencode")]
    TokenFile,
}

impl AuthKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::ApiKey => "apikey",
            AuthKind::TokenFile => "token-file",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream target and auth policy, as persisted in the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream base URL; the inbound path is appended verbatim
    pub target: String,
    pub auth_type: AuthKind,
    /// Literal API key, or token file path when `auth_type` is `token-file`
    pub api_key: String,
    /// Lookup key inside the token file
    pub login_url: String,

    /// Send the credential as an access-gateway token instead of backend auth
    pub cf_access: bool,
    pub cf_client_id: String,
    pub cf_client_secret: String,

    /// Outbound HTTP(S) proxy URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// PEM bundle that replaces the built-in trust roots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub insecure_skip_verify: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        let auth_file = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("opencode")
            .join("auth.json");

        Self {
            target: "https://opencode.custom.dev/anthropic".to_string(),
            auth_type: AuthKind::TokenFile,
            api_key: auth_file.to_string_lossy().into_owned(),
            login_url: "https://opencode.custom.dev".to_string(),
            cf_access: true,
            cf_client_id: String::new(),
            cf_client_secret: String::new(),
            proxy: None,
            ca_cert: None,
            insecure_skip_verify: false,
        }
    }
}

impl ProxyConfig {
    /// Load the settings file, falling back to defaults when it does not exist
    ///
    /// An unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read settings file {}", path.display()))
            }
        };

        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        config.validate()
    }

    /// Check invariants and normalize the target
    pub fn validate(mut self) -> Result<Self> {
        let url = Url::parse(&self.target)
            .with_context(|| format!("Invalid target URL: {}", self.target))?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            bail!("Target must be an absolute http(s) URL: {}", self.target);
        }
        while self.target.ends_with('/') {
            self.target.pop();
        }

        if let Some(proxy) = self.proxy.as_deref() {
            if proxy.is_empty() {
                self.proxy = None;
            }
        }
        if self.ca_cert.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.ca_cert = None;
        }

        Ok(self)
    }

    /// Token file path with `~/` expanded
    pub fn token_file_path(&self) -> PathBuf {
        expand_home(&self.api_key)
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Process-level settings loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Emit debug lines per request
    pub verbose: bool,
    /// Suppress all log output; wins over `verbose`
    pub quiet: bool,
    pub log_format: LogFormat,
    /// Location of the JSON settings file
    pub config_path: PathBuf,
}

impl ServerSettings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let log_format = match env::var("CLAUDE_PROXY_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("text") | Err(_) => LogFormat::Text,
            Ok(other) => bail!("Invalid CLAUDE_PROXY_LOG_FORMAT: {other}"),
        };

        Ok(Self {
            host: env::var("CLAUDE_PROXY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("CLAUDE_PROXY_PORT")
                .unwrap_or_else(|_| "8787".to_string())
                .parse()
                .context("Invalid CLAUDE_PROXY_PORT")?,
            verbose: env_flag("CLAUDE_PROXY_VERBOSE"),
            quiet: env_flag("CLAUDE_PROXY_QUIET"),
            log_format,
            config_path: env::var("CLAUDE_PROXY_CONFIG")
                .map(|p| expand_home(&p))
                .unwrap_or_else(|_| default_config_path()),
        })
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// `<config_dir>/claude-proxy/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}
