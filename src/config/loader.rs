//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;
use crate::exec::{BackoffPolicy, RetryPolicy, DEFAULT_MAX_ATTEMPTS_READ, DEFAULT_MAX_ATTEMPTS_WRITE};

use super::defaults::{DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_JITTER, DEFAULT_BACKOFF_MAX_MS};
use super::env::{access_token_override, apply_env_overrides};
use super::init::{config_root_dir, expand_home};
use super::sources::read_config_text_with_sources;
use super::types::{AuthConfig, Config, FileConfig};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text_with_sources(path_override, &read_file, &config_root)?;
    debug!(?source, "config source selected");
    let mut file: FileConfig = toml::from_str(&text)?;
    apply_env_overrides(&mut file, &env_lookup)?;
    resolve(file, access_token_override(&env_lookup))
}

/// Validate raw settings into the immutable runtime config.
fn resolve(file: FileConfig, access_token: Option<String>) -> Result<Config, ConfigError> {
    let exec = file.execution;
    let retry = RetryPolicy::new(
        exec.retry_enabled.unwrap_or(true),
        exec.max_attempts_read
            .unwrap_or(i64::from(DEFAULT_MAX_ATTEMPTS_READ)),
        exec.max_attempts_write
            .unwrap_or(i64::from(DEFAULT_MAX_ATTEMPTS_WRITE)),
    )?;

    let base_ms = exec.backoff_base_ms.unwrap_or(DEFAULT_BACKOFF_BASE_MS);
    let max_ms = exec.backoff_max_ms.unwrap_or(DEFAULT_BACKOFF_MAX_MS);
    let jitter = exec.backoff_jitter.unwrap_or(DEFAULT_BACKOFF_JITTER);
    if !(0.0..=1.0).contains(&jitter) {
        return Err(ConfigError::Invalid(format!(
            "execution.backoff_jitter must be between 0 and 1, got {jitter}"
        )));
    }
    if max_ms < base_ms {
        return Err(ConfigError::Invalid(format!(
            "execution.backoff_max_ms ({max_ms}) is below backoff_base_ms ({base_ms})"
        )));
    }
    let backoff = BackoffPolicy::new(
        Duration::from_millis(base_ms),
        Duration::from_millis(max_ms),
        jitter,
    );

    let mut network = file.network;
    network.timeout_secs = network.timeout_secs.max(1);

    Ok(Config {
        retry,
        backoff,
        services: file.services,
        auth: AuthConfig {
            access_token,
            token_file: file.auth.token_file.as_deref().map(expand_home),
        },
        network,
        display: file.display,
    })
}
