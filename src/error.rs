//! Unified error types for the client.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// CredentialError
// ---------------------------------------------------------------------------

/// Unrecoverable failures from a credential provider.
#[derive(Debug)]
pub enum CredentialError {
    /// No local credential file exists at the configured path.
    Missing(PathBuf),
    /// The stored token is past its expiry.
    Expired,
    Invalid(String),
    Io(std::io::Error),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "no credential file at {}", path.display()),
            Self::Expired => write!(f, "stored access token has expired"),
            Self::Invalid(msg) => write!(f, "invalid credential: {msg}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for CredentialError {}

impl From<std::io::Error> for CredentialError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// One failed remote call, as raised by the transport.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Socket-level error surfaced outside reqwest.
    Io(std::io::Error),
    /// Non-2xx status from the API.
    Status {
        code: u16,
        body: String,
        /// Server wait hint; only populated for 429 and 503.
        retry_after: Option<Duration>,
    },
    /// The response arrived but could not be decoded.
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(code: u16, body: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::Status {
            code,
            body: body.into(),
            retry_after,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Http(err) => err.status().map(|status| status.as_u16()),
            Self::Io(_) | Self::InvalidResponse(_) => None,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// ExecError
// ---------------------------------------------------------------------------

/// Category of a failure propagated out of the retry executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Permanent,
    Configuration,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transient => "transient failure",
            Self::Permanent => "permanent failure",
            Self::Configuration => "configuration failure",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Final failure of one executed operation.
///
/// Every variant keeps the operation label and the number of attempts that
/// actually reached the remote side.
#[derive(Debug)]
pub enum ExecError {
    /// Still failing transiently when the attempt ceiling was reached.
    Transient {
        operation: &'static str,
        attempts: u32,
        source: ApiError,
    },
    Permanent {
        operation: &'static str,
        attempts: u32,
        source: ApiError,
    },
    /// The credential provider could not supply a token.
    Configuration {
        operation: &'static str,
        attempts: u32,
        source: CredentialError,
    },
    Cancelled {
        operation: &'static str,
        attempts: u32,
        last_error: Option<ApiError>,
    },
}

impl ExecError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transient { .. } => FailureKind::Transient,
            Self::Permanent { .. } => FailureKind::Permanent,
            Self::Configuration { .. } => FailureKind::Configuration,
            Self::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Transient { attempts, .. }
            | Self::Permanent { attempts, .. }
            | Self::Configuration { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::Transient { operation, .. }
            | Self::Permanent { operation, .. }
            | Self::Configuration { operation, .. }
            | Self::Cancelled { operation, .. } => operation,
        }
    }

    /// The transport fault behind this failure, when there was one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Transient { source, .. } | Self::Permanent { source, .. } => Some(source),
            Self::Cancelled { last_error, .. } => last_error.as_ref(),
            Self::Configuration { .. } => None,
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attempts = self.attempts();
        let plural = if attempts == 1 { "" } else { "s" };
        write!(
            f,
            "{} ({}, {attempts} attempt{plural})",
            self.operation(),
            self.kind()
        )?;
        match self {
            Self::Transient { source, .. } | Self::Permanent { source, .. } => {
                write!(f, ": {source}")
            }
            Self::Configuration { source, .. } => write!(f, ": {source}"),
            Self::Cancelled {
                last_error: Some(err),
                ..
            } => write!(f, ": last error: {err}"),
            Self::Cancelled { .. } => Ok(()),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transient { source, .. } | Self::Permanent { source, .. } => Some(source),
            Self::Configuration { source, .. } => Some(source),
            Self::Cancelled {
                last_error: Some(err),
                ..
            } => Some(err),
            Self::Cancelled { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ServiceError: top-level
// ---------------------------------------------------------------------------

/// Errors returned by the service wrappers and the dry-run layer.
#[derive(Debug)]
pub enum ServiceError {
    Exec(ExecError),
    /// Reading local state (e.g. a folder to sync) failed.
    Local {
        path: PathBuf,
        source: std::io::Error,
    },
    InvalidArguments(String),
}

impl ServiceError {
    pub fn local(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Local {
            path: path.into(),
            source,
        }
    }

    /// Failure category as seen by the caller; local and argument problems
    /// are never retryable.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Exec(err) => err.kind(),
            Self::Local { .. } | Self::InvalidArguments(_) => FailureKind::Permanent,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec(e) => write!(f, "{e}"),
            Self::Local { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ExecError> for ServiceError {
    fn from(e: ExecError) -> Self {
        Self::Exec(e)
    }
}
