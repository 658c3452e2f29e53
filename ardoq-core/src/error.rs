//! Error types for ardoq-core.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`Transport`](crate::transport::Transport).
///
/// The synchronization layer never swallows or retries these; they reach the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The workspace or entity does not exist remotely.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credential missing, rejected, or not allowed to perform the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote entity was modified concurrently.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Optimistic `_version` check failed on update.
    #[error("version conflict: {0}")]
    VersionConflict(String),

    /// The service rejected the request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Transient remote outage.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other non-success HTTP status.
    #[error("unexpected status {code}: {message}")]
    Status { code: u16, message: String },

    /// Connection, DNS, TLS or timeout failure before a status was received.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// All errors that can arise while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No API token in the config file or `ARDOQ_API_TOKEN`.
    #[error("API token expected: set `token` in {path} or ARDOQ_API_TOKEN")]
    MissingToken { path: PathBuf },

    /// The default host serves many organizations; one must be named.
    #[error("org label required when using host '{host}': set `org` or ARDOQ_ORG_LABEL")]
    MissingOrg { host: String },
}
