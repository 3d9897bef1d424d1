//! Token file written by an external login helper.
//!
//! Format: `{"access_token": "...", "expires_at_unix": 1700000000}`; the
//! expiry is optional.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Bearer, CredentialProvider};
use crate::config::config_root_dir;
use crate::error::CredentialError;

/// Seconds before expiry at which a token is already treated as expired.
const EXPIRY_SAFETY_WINDOW_SECS: i64 = 30;

/// On-disk token record.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_at_unix: Option<i64>,
}

impl StoredToken {
    fn is_expired_at(&self, now_unix: i64) -> bool {
        self.expires_at_unix
            .is_some_and(|expiry| now_unix.saturating_add(EXPIRY_SAFETY_WINDOW_SECS) >= expiry)
    }
}

/// Default token location (`~/.config/steward/token.json`).
pub fn default_token_file_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("steward").join("token.json"))
}

/// Reads the token file on every request so external refreshes are picked up.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredToken, CredentialError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::Missing(self.path.clone()))
            }
            Err(err) => return Err(CredentialError::Io(err)),
        };
        serde_json::from_str(&text).map_err(|err| {
            CredentialError::Invalid(format!(
                "failed to parse token file `{}`: {err}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl CredentialProvider for TokenFile {
    async fn bearer_token(&self) -> Result<Bearer, CredentialError> {
        let stored = self.load()?;
        if stored.access_token.trim().is_empty() {
            return Err(CredentialError::Invalid(format!(
                "token file `{}` has an empty access_token",
                self.path.display()
            )));
        }
        if stored.is_expired_at(unix_now_secs()) {
            return Err(CredentialError::Expired);
        }
        Ok(Bearer::new(stored.access_token))
    }
}

fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
