//! Surface bookkeeping
//!
//! [`Surface`] owns the primitives it creates and the groups attached to it.
//! Attaching a group wires its removal hook so that removing the group
//! drops it from the surface's group list.

use crate::config::SurfaceConfig;
use crate::error::SurfaceError;
use crate::primitive::{Primitive, PrimitiveKind};
use indexmap::IndexMap;
use pg_container::{ArtistId, ArtistRef, Container};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Shared state behind a [`Surface`]
///
/// Primitives and removal hooks hold weak links to this. Detached
/// primitives are remembered weakly for as long as some group still holds
/// them, so snapshots can record them.
#[derive(Debug)]
pub(crate) struct SurfaceInner {
    pub(crate) config: SurfaceConfig,
    pub(crate) primitives: RefCell<IndexMap<ArtistId, Rc<Primitive>>>,
    pub(crate) detached: RefCell<IndexMap<ArtistId, Weak<Primitive>>>,
    pub(crate) groups: RefCell<Vec<Rc<Container>>>,
    pub(crate) next_id: Cell<u64>,
}

impl SurfaceInner {
    pub(crate) fn detach_primitive(&self, id: ArtistId) -> Result<(), SurfaceError> {
        let primitive = self
            .primitives
            .borrow_mut()
            .shift_remove(&id)
            .ok_or(SurfaceError::NotAttached(id))?;
        let mut detached = self.detached.borrow_mut();
        detached.retain(|_, p| p.strong_count() > 0);
        detached.insert(id, Rc::downgrade(&primitive));
        tracing::trace!(artist = %id, "primitive detached");
        Ok(())
    }

    /// Detached primitive with `id` that is still held somewhere
    pub(crate) fn detached_primitive(&self, id: ArtistId) -> Option<Rc<Primitive>> {
        self.detached.borrow().get(&id).and_then(Weak::upgrade)
    }

    fn detach_group(&self, group: &Container) {
        let mut groups = self.groups.borrow_mut();
        let before = groups.len();
        groups.retain(|g| !std::ptr::eq(Rc::as_ptr(g), group));
        if groups.len() < before {
            tracing::debug!(label = ?group.label(), "group detached");
        }
    }
}

/// Bookkeeping for the primitives and groups of one drawing area
///
/// Single-threaded: handles are `Rc`-based.
#[derive(Debug, Clone)]
pub struct Surface {
    pub(crate) inner: Rc<SurfaceInner>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl Surface {
    /// Create empty surface
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        Self::with_next_id(config, 0)
    }

    pub(crate) fn with_next_id(config: SurfaceConfig, next_id: u64) -> Self {
        Self {
            inner: Rc::new(SurfaceInner {
                config,
                primitives: RefCell::new(IndexMap::new()),
                detached: RefCell::new(IndexMap::new()),
                groups: RefCell::new(Vec::new()),
                next_id: Cell::new(next_id),
            }),
        }
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.inner.config
    }

    /// Create a primitive and attach it
    pub fn add_primitive(&self, kind: PrimitiveKind, points: Vec<(f64, f64)>) -> Rc<Primitive> {
        let id = ArtistId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.insert_primitive(id, kind, points)
    }

    /// Same as [`Surface::add_primitive`], typed as a container member
    pub(crate) fn add_artist(&self, kind: PrimitiveKind, points: Vec<(f64, f64)>) -> ArtistRef {
        self.add_primitive(kind, points)
    }

    pub(crate) fn insert_primitive(
        &self,
        id: ArtistId,
        kind: PrimitiveKind,
        points: Vec<(f64, f64)>,
    ) -> Rc<Primitive> {
        let primitive = Rc::new(Primitive::new(id, kind, points, Rc::downgrade(&self.inner)));
        self.inner
            .primitives
            .borrow_mut()
            .insert(id, Rc::clone(&primitive));
        primitive
    }

    /// Create a primitive that is already detached (restored from a snapshot)
    pub(crate) fn insert_detached(
        &self,
        id: ArtistId,
        kind: PrimitiveKind,
        points: Vec<(f64, f64)>,
    ) -> Rc<Primitive> {
        let primitive = Rc::new(Primitive::new(id, kind, points, Rc::downgrade(&self.inner)));
        self.inner
            .detached
            .borrow_mut()
            .insert(id, Rc::downgrade(&primitive));
        primitive
    }

    /// Attached primitive with `id`
    #[must_use]
    pub fn primitive(&self, id: ArtistId) -> Option<Rc<Primitive>> {
        self.inner.primitives.borrow().get(&id).cloned()
    }

    /// Check if a primitive with `id` is attached
    #[must_use]
    pub fn contains(&self, id: ArtistId) -> bool {
        self.inner.primitives.borrow().contains_key(&id)
    }

    /// Number of attached primitives
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.inner.primitives.borrow().len()
    }

    /// Attach `container` and install its removal hook
    ///
    /// The surface's events flag is stamped onto the group.
    pub fn add_container(&self, container: Container) -> Rc<Container> {
        let group = Rc::new(container);
        self.attach(Rc::clone(&group));
        group
    }

    pub(crate) fn attach(&self, group: Rc<Container>) {
        group.set_events_enabled(self.inner.config.events_enabled);
        let surface: Weak<SurfaceInner> = Rc::downgrade(&self.inner);
        group.set_remove_method(move |removed| {
            if let Some(inner) = surface.upgrade() {
                inner.detach_group(removed);
            }
        });
        tracing::debug!(kind = group.kind().name(), members = group.len(), "group attached");
        self.inner.groups.borrow_mut().push(group);
    }

    /// Attached groups in attach order
    #[must_use]
    pub fn groups(&self) -> Vec<Rc<Container>> {
        self.inner.groups.borrow().clone()
    }

    /// First attached group carrying `label`
    #[must_use]
    pub fn find_group(&self, label: &str) -> Option<Rc<Container>> {
        self.inner
            .groups
            .borrow()
            .iter()
            .find(|g| g.label().as_deref() == Some(label))
            .cloned()
    }

    /// Remove the first group carrying `label`
    ///
    /// # Errors
    /// Returns [`SurfaceError::NoSuchGroup`] if no group matches, or the
    /// group's removal error
    pub fn remove_group(&self, label: &str) -> Result<(), SurfaceError> {
        let group = self
            .find_group(label)
            .ok_or_else(|| SurfaceError::NoSuchGroup(label.to_string()))?;
        group.remove()?;
        Ok(())
    }

    /// Labeled groups that belong in a legend
    ///
    /// Groups without a label, or whose label starts with `_`, are skipped.
    #[must_use]
    pub fn legend_entries(&self) -> Vec<(String, Rc<Container>)> {
        self.inner
            .groups
            .borrow()
            .iter()
            .filter_map(|g| {
                g.label()
                    .filter(|l| !l.starts_with('_'))
                    .map(|l| (l, Rc::clone(g)))
            })
            .collect()
    }
}
