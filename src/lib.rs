//! Steward: a productivity client for Drive, Sheets and Gmail.
//!
//! Every remote call runs through a retry executor that separates transient
//! from permanent failures and honors server backoff hints. Every mutation
//! can instead be simulated, producing a structured preview of what it would
//! have done.
//!
//! # Quick start
//!
//! ```no_run
//! use steward::config::load_config;
//! use steward::services::Workspace;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?;
//! let ws = Workspace::from_config(&config);
//! let preview = ws.drive().create_folder("Reports", None, true).await?;
//! println!("{:?}", preview.report());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod build_info;
pub mod config;
pub mod dryrun;
pub mod error;
pub mod exec;
pub mod render;
pub mod services;
#[cfg(test)]
pub mod testsupport;
