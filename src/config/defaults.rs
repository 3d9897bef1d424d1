//! Default configuration constants.

/// Embedded default `steward.toml` written by `steward init`.
pub(super) const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/steward.toml");

pub(super) const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
pub(super) const DEFAULT_BACKOFF_MAX_MS: u64 = 30_000;
pub(super) const DEFAULT_BACKOFF_JITTER: f64 = 0.25;

pub(super) const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub(super) const DEFAULT_DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";
pub(super) const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub(super) const DEFAULT_MAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Default per-request HTTP timeout.
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 30;
