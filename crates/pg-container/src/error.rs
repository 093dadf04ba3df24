//! Error types for container operations

use crate::artist::{ArtistId, BoxError};
use crate::observer::ObserverId;

/// Errors raised by container operations
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// An observer callback failed during notification
    #[error("observer {id} failed: {source}")]
    Observer {
        id: ObserverId,
        #[source]
        source: BoxError,
    },

    /// One or more members could not be removed
    #[error("failed to remove {} of the container's members", failures.len())]
    Removal { failures: Vec<RemovalFailure> },
}

impl ContainerError {
    /// Member removal failures, if this is a removal error
    #[must_use]
    pub fn removal_failures(&self) -> &[RemovalFailure] {
        match self {
            Self::Removal { failures } => failures,
            Self::Observer { .. } => &[],
        }
    }
}

/// A single member that failed to detach
#[derive(Debug, thiserror::Error)]
#[error("{artist}: {source}")]
pub struct RemovalFailure {
    /// Drawable that failed
    pub artist: ArtistId,
    /// Underlying failure
    #[source]
    pub source: BoxError,
}

/// Errors raised when rebuilding a container from a snapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Snapshot references a drawable the resolver does not know
    #[error("unknown artist in snapshot: {0}")]
    UnknownArtist(ArtistId),

    /// Snapshot references a shared container the resolver does not know
    #[error("unknown shared group in snapshot: #{0}")]
    UnknownGroup(usize),

    /// Snapshot does not match the shape its kind requires
    #[error("malformed {kind} snapshot: {reason}")]
    Malformed { kind: &'static str, reason: String },
}
