//! Drawable handles held by containers
//!
//! Defines the [`Artist`] trait for leaf drawables and the [`Member`] enum
//! describing one slot of a container's fixed sequence.

use crate::container::Container;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

/// Boxed error returned by artist removal and observer callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared handle to a leaf drawable
///
/// Handles are shared: the hosting surface keeps its own reference.
pub type ArtistRef = Rc<dyn Artist>;

/// Stable identifier of a leaf drawable
///
/// Used to resolve members when a container is rebuilt from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub u64);

impl Display for ArtistId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "artist#{}", self.0)
    }
}

/// A leaf drawable primitive (one bar, one line, one marker set)
///
/// # Contract
/// - `id` is stable for the lifetime of the drawable
/// - `remove` detaches the drawable from whatever surface hosts it
pub trait Artist: Debug {
    /// Stable identifier
    fn id(&self) -> ArtistId;

    /// Detach from the hosting surface
    ///
    /// # Errors
    /// Returns error if the drawable cannot be detached (e.g. it is not
    /// attached anywhere)
    fn remove(&self) -> Result<(), BoxError>;

    /// Short human-readable description
    fn describe(&self) -> String {
        self.id().to_string()
    }
}

/// One slot of a container's member sequence
#[derive(Debug, Clone)]
pub enum Member {
    /// Leaf drawable
    Artist(ArtistRef),

    /// Plain nested sequence (e.g. the stem lines of a stem plot)
    Seq(Vec<Member>),

    /// Nested container (e.g. error bars inside a bar group)
    Group(Rc<Container>),
}

impl Member {
    /// Wrap a leaf drawable
    #[inline]
    #[must_use]
    pub fn artist(artist: ArtistRef) -> Self {
        Self::Artist(artist)
    }

    /// Wrap a list of leaf drawables as a nested sequence
    #[must_use]
    pub fn seq(artists: impl IntoIterator<Item = ArtistRef>) -> Self {
        Self::Seq(artists.into_iter().map(Self::Artist).collect())
    }

    /// Wrap a nested container
    #[inline]
    #[must_use]
    pub fn group(container: Rc<Container>) -> Self {
        Self::Group(container)
    }

    /// Leaf drawable, if this slot holds one
    #[inline]
    #[must_use]
    pub fn as_artist(&self) -> Option<&ArtistRef> {
        match self {
            Self::Artist(a) => Some(a),
            _ => None,
        }
    }

    /// Nested container, if this slot holds one
    #[inline]
    #[must_use]
    pub fn as_group(&self) -> Option<&Rc<Container>> {
        match self {
            Self::Group(c) => Some(c),
            _ => None,
        }
    }

    /// Nested sequence, if this slot holds one
    #[inline]
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Member]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl From<ArtistRef> for Member {
    fn from(artist: ArtistRef) -> Self {
        Self::Artist(artist)
    }
}

impl From<Rc<Container>> for Member {
    fn from(container: Rc<Container>) -> Self {
        Self::Group(container)
    }
}
