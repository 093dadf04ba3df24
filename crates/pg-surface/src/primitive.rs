//! Primitives attached to a surface

use crate::error::SurfaceError;
use crate::surface::SurfaceInner;
use pg_container::{Artist, ArtistId, BoxError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Weak;

/// What a primitive draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Filled polygon (bar, histogram bin)
    Patch,
    /// Polyline
    Line,
    /// Marker set
    Marker,
    /// Point collection (scatter)
    Collection,
    /// Disjoint line segments, stored as point pairs
    Segment,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Patch => "patch",
            Self::Line => "line",
            Self::Marker => "marker",
            Self::Collection => "collection",
            Self::Segment => "segment",
        };
        f.write_str(name)
    }
}

/// Leaf drawable owned by a [`crate::Surface`]
///
/// Holds a weak link back to its surface so removing it detaches it from
/// the surface's bookkeeping.
pub struct Primitive {
    id: ArtistId,
    kind: PrimitiveKind,
    points: Vec<(f64, f64)>,
    surface: Weak<SurfaceInner>,
}

impl Primitive {
    pub(crate) fn new(
        id: ArtistId,
        kind: PrimitiveKind,
        points: Vec<(f64, f64)>,
        surface: Weak<SurfaceInner>,
    ) -> Self {
        Self {
            id,
            kind,
            points,
            surface,
        }
    }

    /// Primitive kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Geometry in data coordinates
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Snapshot for persistence
    #[must_use]
    pub fn to_state(&self) -> PrimitiveState {
        PrimitiveState {
            id: self.id,
            kind: self.kind,
            points: self.points.clone(),
            detached: false,
        }
    }
}

impl Artist for Primitive {
    fn id(&self) -> ArtistId {
        self.id
    }

    fn remove(&self) -> Result<(), BoxError> {
        let surface = self
            .surface
            .upgrade()
            .ok_or(SurfaceError::SurfaceDropped(self.id))?;
        surface.detach_primitive(self.id)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} {} ({} points)", self.kind, self.id, self.points.len())
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitive")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("points", &self.points.len())
            .finish_non_exhaustive()
    }
}

/// Persisted form of a [`Primitive`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveState {
    pub id: ArtistId,
    pub kind: PrimitiveKind,
    pub points: Vec<(f64, f64)>,
    /// Removed from the surface but still held by a group
    #[serde(default)]
    pub detached: bool,
}
