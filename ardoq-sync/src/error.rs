//! Error types for ardoq-sync.

use std::path::PathBuf;

use thiserror::Error;

use ardoq_core::{EntityId, EntityKind, TransportError, WorkspaceId};

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote call failed. Passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The candidate lacks a field needed to correlate it with remote state.
    #[error("malformed {kind} candidate: {reason}")]
    MalformedCandidate { kind: EntityKind, reason: String },

    /// The cache and the remote state have diverged in a way the orchestrator
    /// cannot reconcile. Indicates a programming error, not a runtime condition.
    #[error("invariant violation: {kind} {id} is not present in cached workspace {workspace}")]
    InvariantViolation {
        kind: EntityKind,
        id: EntityId,
        workspace: WorkspaceId,
    },

    /// A remote entity the sync layer needs to address carries no `_id`.
    #[error("{kind} '{label}' has no _id")]
    MissingId { kind: EntityKind, label: String },

    /// An entity could not be converted to or from its wire form.
    #[error("entity JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A manifest file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest file is not valid YAML for the expected shape.
    #[error("failed to parse manifest at {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl SyncError {
    /// Whether this error came from the remote service.
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn malformed(kind: EntityKind, reason: impl Into<String>) -> SyncError {
    SyncError::MalformedCandidate {
        kind,
        reason: reason.into(),
    }
}
