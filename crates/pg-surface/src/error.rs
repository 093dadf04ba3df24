//! Error types for surface operations

use pg_container::{ArtistId, ContainerError, StateError};

/// Errors raised by a [`crate::Surface`]
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Primitive is not (or no longer) attached to the surface
    #[error("{0} is not attached to the surface")]
    NotAttached(ArtistId),

    /// Primitive outlived the surface that created it
    #[error("{0} belongs to a surface that has been dropped")]
    SurfaceDropped(ArtistId),

    /// Two inputs that must line up have different lengths
    #[error("{what}: expected {expected} values, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A plotting call received no data
    #[error("{0}: no data")]
    EmptyData(&'static str),

    /// Histogram bins cannot be used
    #[error("invalid bins: {0}")]
    InvalidBins(String),

    /// No group carries the requested label
    #[error("no group labeled '{0}'")]
    NoSuchGroup(String),

    /// Snapshot could not be restored
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Container operation failed
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
}

impl SurfaceError {
    /// Length mismatch between `what` inputs
    pub(crate) fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// Fail with [`SurfaceError::LengthMismatch`] unless `actual == expected`
pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), SurfaceError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SurfaceError::length_mismatch(what, expected, actual))
    }
}
