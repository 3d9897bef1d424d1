//! Environment overrides.
//!
//! `STEWARD_*` variables are applied to the parsed file before validation so
//! that an out-of-range value from either source fails the same way.

use crate::error::ConfigError;

use super::types::FileConfig;

pub(super) const ENV_RETRY_ENABLED: &str = "STEWARD_RETRY_ENABLED";
pub(super) const ENV_MAX_ATTEMPTS_READ: &str = "STEWARD_MAX_ATTEMPTS_READ";
pub(super) const ENV_MAX_ATTEMPTS_WRITE: &str = "STEWARD_MAX_ATTEMPTS_WRITE";
pub(super) const ENV_ACCESS_TOKEN: &str = "STEWARD_ACCESS_TOKEN";
pub(super) const ENV_TOKEN_FILE: &str = "STEWARD_TOKEN_FILE";
pub(super) const ENV_TIMEOUT_SECS: &str = "STEWARD_TIMEOUT_SECS";

pub(super) fn apply_env_overrides<FEnv>(
    file: &mut FileConfig,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(raw) = non_empty(env_lookup, ENV_RETRY_ENABLED) {
        file.execution.retry_enabled = Some(parse_bool(ENV_RETRY_ENABLED, &raw)?);
    }
    if let Some(raw) = non_empty(env_lookup, ENV_MAX_ATTEMPTS_READ) {
        file.execution.max_attempts_read = Some(parse_int(ENV_MAX_ATTEMPTS_READ, &raw)?);
    }
    if let Some(raw) = non_empty(env_lookup, ENV_MAX_ATTEMPTS_WRITE) {
        file.execution.max_attempts_write = Some(parse_int(ENV_MAX_ATTEMPTS_WRITE, &raw)?);
    }
    if let Some(path) = non_empty(env_lookup, ENV_TOKEN_FILE) {
        file.auth.token_file = Some(path);
    }
    if let Some(raw) = non_empty(env_lookup, ENV_TIMEOUT_SECS) {
        let parsed = raw.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {ENV_TIMEOUT_SECS} value `{raw}`: expected positive integer seconds"
            ))
        })?;
        // Zero would disable the timeout entirely.
        file.network.timeout_secs = parsed.max(1);
    }
    Ok(())
}

/// Literal bearer token override, if set.
pub(super) fn access_token_override<FEnv>(env_lookup: &FEnv) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    non_empty(env_lookup, ENV_ACCESS_TOKEN)
}

fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(format!(
            "invalid {name} value `{raw}`: expected true or false"
        ))),
    }
}

fn parse_int(name: &str, raw: &str) -> Result<i64, ConfigError> {
    raw.parse::<i64>().map_err(|_| {
        ConfigError::Invalid(format!("invalid {name} value `{raw}`: expected an integer"))
    })
}
