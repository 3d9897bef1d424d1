//! Configuration data model.
//!
//! `File*` structs mirror the TOML file and keep every field optional so a
//! missing setting falls back to its default. `Config` is the validated,
//! immutable result handed to the rest of the program.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_DRIVE_BASE_URL, DEFAULT_DRIVE_UPLOAD_URL, DEFAULT_MAIL_BASE_URL,
    DEFAULT_SHEETS_BASE_URL, DEFAULT_TIMEOUT_SECS,
};
use crate::exec::{BackoffPolicy, RetryPolicy};

/// Raw `steward.toml` contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct FileConfig {
    pub(super) execution: FileExecutionConfig,
    pub(super) services: ServicesConfig,
    pub(super) auth: FileAuthConfig,
    pub(super) network: NetworkConfig,
    pub(super) display: DisplayConfig,
}

/// `[execution]` as written; validated into `RetryPolicy`/`BackoffPolicy`.
///
/// Ceilings are read as signed integers so that `0` and negative values reach
/// validation instead of failing as a type mismatch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct FileExecutionConfig {
    pub(super) retry_enabled: Option<bool>,
    pub(super) max_attempts_read: Option<i64>,
    pub(super) max_attempts_write: Option<i64>,
    pub(super) backoff_base_ms: Option<u64>,
    pub(super) backoff_max_ms: Option<u64>,
    pub(super) backoff_jitter: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct FileAuthConfig {
    pub(super) token_file: Option<String>,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub retry: RetryPolicy,
    pub backoff: BackoffPolicy,
    pub services: ServicesConfig,
    pub auth: AuthConfig,
    pub network: NetworkConfig,
    pub display: DisplayConfig,
}

/// REST endpoint roots.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServicesConfig {
    pub drive_base_url: String,
    /// Media upload root for file contents.
    pub drive_upload_url: String,
    pub sheets_base_url: String,
    pub mail_base_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
            drive_upload_url: DEFAULT_DRIVE_UPLOAD_URL.to_string(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            mail_base_url: DEFAULT_MAIL_BASE_URL.to_string(),
        }
    }
}

/// Where bearer tokens come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Literal token from `STEWARD_ACCESS_TOKEN`; wins over `token_file`.
    pub access_token: Option<String>,
    /// Token file path with `~` already expanded.
    pub token_file: Option<PathBuf>,
}

/// Network/HTTP timeout policy.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Display / rendering preferences.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Outcome of `steward init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInitResult {
    Created { path: PathBuf },
    AlreadyInitialized { path: PathBuf },
    Overwritten { path: PathBuf, backup_path: PathBuf },
}
