//! Grouped drawable containers
//!
//! Bundles the drawables that represent one plotted series so the series
//! can be labeled, removed or observed as a unit.
//!
//! # Core Concepts
//!
//! - [`Container`]: fixed ordered members plus label, observers and removal hook
//! - [`Artist`]: leaf drawable handle held by containers
//! - [`Member`]: one slot of a container (leaf, nested sequence or nested group)
//! - [`GroupKind`]: bar/hist/scatter/errorbar/stem records
//! - [`ContainerState`]: serializable snapshot, minus the removal hook
//!
//! # Example
//!
//! ```rust,ignore
//! use pg_container::{Container, Member};
//!
//! let group = Container::new(vec![Member::artist(bar1), Member::artist(bar2)]);
//! let id = group.add_callback(|c| {
//!     println!("label is now {:?}", c.label());
//!     Ok(())
//! });
//! group.set_label(Some("heights"))?;
//! group.remove_callback(id);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod artist;
mod container;
mod error;
mod kind;
mod observer;
mod state;

/// Depth-first flattening of member sequences
pub mod flatten;

// Re-exports
pub use artist::{Artist, ArtistId, ArtistRef, BoxError, Member};
pub use container::{Container, RemoveMethod};
pub use error::{ContainerError, RemovalFailure, StateError};
pub use flatten::Leaves;
pub use kind::{
    Align, BarParams, Bins, ErrorbarParams, GroupKind, HistData, HistParams, HistType,
    Orientation, ScatterParams,
};
pub use observer::{Observer, ObserverId, ObserverRegistry};
pub use state::{ContainerState, KindState, MemberState, NestedState, Resolve};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
