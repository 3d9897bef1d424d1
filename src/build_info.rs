//! Build metadata captured by `build.rs`.

/// Short git commit hash, or `unknown`.
pub const GIT_COMMIT: &str = env!("STEWARD_BUILD_GIT_HASH");

/// UTC build timestamp.
pub const BUILD_TIMESTAMP: &str = env!("STEWARD_BUILD_TIMESTAMP");

/// Text printed by `steward --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("STEWARD_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("STEWARD_BUILD_TIMESTAMP")
);
