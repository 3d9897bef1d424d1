//! Credential provider boundary.
//!
//! Acquiring and refreshing tokens is outside this crate. The executor only
//! asks a [`CredentialProvider`] for a bearer token before every attempt and
//! treats any failure as a configuration problem.

mod token_file;

use crate::config::AuthConfig;
use crate::error::CredentialError;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub use token_file::{default_token_file_path, StoredToken, TokenFile};

/// Bearer token attached to outbound requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Bearer(String);

impl Bearer {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Bearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bearer(<redacted>)")
    }
}

/// Source of valid bearer tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return a token usable right now, or an unrecoverable error.
    async fn bearer_token(&self) -> Result<Bearer, CredentialError>;
}

/// Fixed token, e.g. from `STEWARD_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(Bearer);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Bearer::new(token))
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<Bearer, CredentialError> {
        if self.0.as_str().trim().is_empty() {
            return Err(CredentialError::Invalid("access token is empty".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// Pick the credential source described by `auth`.
///
/// A literal token wins; otherwise the token file (configured or default) is
/// read on every request.
pub fn provider_from_config(auth: &AuthConfig) -> Arc<dyn CredentialProvider> {
    if let Some(token) = &auth.access_token {
        return Arc::new(StaticToken::new(token.clone()));
    }
    let path = auth
        .token_file
        .clone()
        .or_else(default_token_file_path)
        .unwrap_or_else(|| PathBuf::from("token.json"));
    Arc::new(TokenFile::new(path))
}
