//! Configuration loading from TOML files and environment variables.
//!
//! Precedence (highest wins):
//! 1. `STEWARD_*` environment variables
//! 2. TOML file given via `--config`
//! 3. `./steward.toml`
//! 4. `$XDG_CONFIG_HOME/steward/steward.toml` (or `~/.config/steward/steward.toml`)
//! 5. Built-in defaults
//!
//! Values are validated once at startup. The resulting [`Config`] is never
//! mutated afterwards.

mod defaults;
mod env;
mod init;
mod loader;
mod sources;
mod types;

pub use init::{config_root_dir, default_global_config_path, initialize_default_config};
pub use loader::load_config;
pub use types::{
    AuthConfig, Config, ConfigInitResult, DisplayConfig, NetworkConfig, ServicesConfig,
};
