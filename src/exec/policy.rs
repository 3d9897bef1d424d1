//! Process-wide retry policy.

use crate::error::ConfigError;

/// Default ceiling for read attempts, including the first request.
pub const DEFAULT_MAX_ATTEMPTS_READ: u32 = 4;
/// Writes are not retried unless explicitly configured.
pub const DEFAULT_MAX_ATTEMPTS_WRITE: u32 = 1;

/// Immutable retry settings, built once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    enabled: bool,
    max_attempts_read: u32,
    max_attempts_write: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts_read: DEFAULT_MAX_ATTEMPTS_READ,
            max_attempts_write: DEFAULT_MAX_ATTEMPTS_WRITE,
        }
    }
}

impl RetryPolicy {
    /// Validate and build a policy. Ceilings below 1 are rejected.
    pub fn new(
        enabled: bool,
        max_attempts_read: i64,
        max_attempts_write: i64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            enabled,
            max_attempts_read: positive_ceiling("max_attempts_read", max_attempts_read)?,
            max_attempts_write: positive_ceiling("max_attempts_write", max_attempts_write)?,
        })
    }

    /// Policy that performs every operation exactly once.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_attempts_read(&self) -> u32 {
        self.max_attempts_read
    }

    pub fn max_attempts_write(&self) -> u32 {
        self.max_attempts_write
    }

    /// Attempt ceiling for one call.
    ///
    /// A disabled policy always yields 1, even when the call carries its own
    /// override.
    pub fn ceiling(&self, is_write: bool, per_call: Option<u32>) -> u32 {
        if !self.enabled {
            return 1;
        }
        let configured = if is_write {
            self.max_attempts_write
        } else {
            self.max_attempts_read
        };
        per_call.unwrap_or(configured).max(1)
    }
}

fn positive_ceiling(name: &str, value: i64) -> Result<u32, ConfigError> {
    if value < 1 {
        return Err(ConfigError::Invalid(format!(
            "`{name}` must be a positive integer, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| ConfigError::Invalid(format!("`{name}` is too large: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_writes_to_one_attempt() {
        let policy = RetryPolicy::default();
        assert!(policy.enabled());
        assert_eq!(policy.ceiling(false, None), 4);
        assert_eq!(policy.ceiling(true, None), 1);
    }

    #[test]
    fn disabled_policy_ignores_overrides() {
        let policy = RetryPolicy::disabled();
        assert_eq!(policy.ceiling(false, None), 1);
        assert_eq!(policy.ceiling(true, Some(5)), 1);
    }

    #[test]
    fn per_call_override_replaces_configured_ceiling() {
        let policy = RetryPolicy::new(true, 4, 1).unwrap();
        assert_eq!(policy.ceiling(true, Some(3)), 3);
        assert_eq!(policy.ceiling(false, Some(1)), 1);
    }

    #[test]
    fn non_positive_ceilings_are_rejected() {
        let err = RetryPolicy::new(true, 0, 1).unwrap_err();
        assert!(err.to_string().contains("max_attempts_read"), "got: {err}");
        let err = RetryPolicy::new(true, 3, -2).unwrap_err();
        assert!(err.to_string().contains("max_attempts_write"), "got: {err}");
        assert!(RetryPolicy::new(true, i64::MAX, 1).is_err());
    }
}
