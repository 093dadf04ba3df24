//! plotgroup Surface
//!
//! Bookkeeping for one drawing area: the primitives it owns and the grouped
//! series attached to it.
//!
//! # Core Concepts
//!
//! - [`Surface`]: owns primitives and groups, wires removal hooks
//! - [`Primitive`]: leaf drawable that detaches itself on removal
//! - [`SurfaceConfig`]: defaults applied to built groups
//! - [`SurfaceState`]: JSON snapshot; reload re-attaches removal hooks
//!
//! # Example
//!
//! ```rust,ignore
//! use pg_surface::{BarOptions, Surface, SurfaceConfig};
//!
//! let surface = Surface::new(SurfaceConfig::default());
//! let bars = surface.bar(&[1.0, 2.0], &[3.0, 5.0], &BarOptions::default())?;
//! bars.set_label(Some("heights"))?;
//! bars.remove()?; // patches detached, group dropped from the surface
//! ```

#![allow(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod error;
mod persist;
mod plotting;
mod primitive;
mod surface;

// Re-exports
pub use config::SurfaceConfig;
pub use error::SurfaceError;
pub use persist::SurfaceState;
pub use plotting::{BarOptions, ErrorbarOptions, Histogram};
pub use primitive::{Primitive, PrimitiveKind, PrimitiveState};
pub use surface::Surface;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
