//! Saving and reloading a surface
//!
//! Group snapshots never carry removal hooks; [`Surface::load_state`]
//! re-attaches them while rebuilding.

use crate::config::SurfaceConfig;
use crate::error::SurfaceError;
use crate::primitive::{Primitive, PrimitiveState};
use crate::surface::Surface;
use indexmap::{IndexMap, IndexSet};
use pg_container::{
    Artist, ArtistId, ArtistRef, Container, ContainerState, Member, Resolve, StateError,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Persisted form of a [`Surface`]
///
/// `primitives` lists attached primitives first, then detached ones that a
/// group still holds. A group's error bar record that is itself an
/// attached group is stored as that group's index in `groups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceState {
    pub config: SurfaceConfig,
    pub next_artist_id: u64,
    pub primitives: Vec<PrimitiveState>,
    pub groups: Vec<ContainerState>,
}

impl SurfaceState {
    /// Encode as pretty-printed JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Decode from JSON
    ///
    /// # Errors
    /// Returns error if `json` is not a valid surface snapshot
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Surface {
    /// Snapshot primitives and groups
    #[must_use]
    pub fn save_state(&self) -> SurfaceState {
        let groups = self.groups();
        let mut primitives: Vec<PrimitiveState> = self
            .inner
            .primitives
            .borrow()
            .values()
            .map(|p| p.to_state())
            .collect();

        let mut reachable = IndexSet::new();
        for group in &groups {
            collect_group(group, &mut reachable);
        }
        primitives.extend(
            reachable
                .into_iter()
                .filter(|id| !self.contains(*id))
                .filter_map(|id| self.inner.detached_primitive(id))
                .map(|p| PrimitiveState {
                    detached: true,
                    ..p.to_state()
                }),
        );

        let shared = |c: &Container| groups.iter().position(|g| std::ptr::eq(Rc::as_ptr(g), c));
        SurfaceState {
            config: self.config().clone(),
            next_artist_id: self.inner.next_id.get(),
            primitives,
            groups: groups.iter().map(|g| g.to_state_with(&shared)).collect(),
        }
    }

    /// Rebuild a surface from `state`, re-attaching every group's removal hook
    ///
    /// Groups come back in their saved order, each with its persisted
    /// events flag. Error bar records that pointed at an attached group
    /// point at the restored group again.
    ///
    /// # Errors
    /// Returns error if a group references a primitive or group missing
    /// from `state`
    pub fn load_state(state: &SurfaceState) -> Result<Self, SurfaceError> {
        let surface = Surface::with_next_id(state.config.clone(), state.next_artist_id);
        let mut detached = IndexMap::new();
        for p in &state.primitives {
            if p.detached {
                let primitive = surface.insert_detached(p.id, p.kind, p.points.clone());
                detached.insert(p.id, primitive);
            } else {
                surface.insert_primitive(p.id, p.kind, p.points.clone());
            }
        }

        let loader = Loader {
            surface: &surface,
            detached,
            states: &state.groups,
            slots: RefCell::new(vec![Slot::Pending; state.groups.len()]),
        };
        let groups = (0..state.groups.len())
            .map(|index| loader.group(index))
            .collect::<Result<Vec<_>, _>>()?;

        for group in groups {
            let events = group.events_enabled();
            surface.attach(Rc::clone(&group));
            // Keep the persisted flag rather than the surface default.
            group.set_events_enabled(events);
        }
        tracing::debug!(
            primitives = state.primitives.len(),
            groups = state.groups.len(),
            "surface restored"
        );
        Ok(surface)
    }
}

fn collect_members(members: &[Member], out: &mut IndexSet<ArtistId>) {
    for member in members {
        match member {
            Member::Artist(a) => {
                out.insert(a.id());
            }
            Member::Seq(items) => collect_members(items, out),
            Member::Group(c) => collect_group(c, out),
        }
    }
}

fn collect_group(group: &Container, out: &mut IndexSet<ArtistId>) {
    collect_members(group.members(), out);
    if let Some(record) = group.errorbar_record() {
        collect_group(record, out);
    }
}

#[derive(Clone)]
enum Slot {
    Pending,
    Loading,
    Done(Rc<Container>),
}

/// Restores groups on demand so shared records can point at groups saved
/// later in the list
struct Loader<'a> {
    surface: &'a Surface,
    detached: IndexMap<ArtistId, Rc<Primitive>>,
    states: &'a [ContainerState],
    slots: RefCell<Vec<Slot>>,
}

impl Loader<'_> {
    fn group(&self, index: usize) -> Result<Rc<Container>, StateError> {
        match self.slots.borrow().get(index) {
            None => return Err(StateError::UnknownGroup(index)),
            Some(Slot::Done(group)) => return Ok(Rc::clone(group)),
            Some(Slot::Loading) => {
                return Err(StateError::Malformed {
                    kind: "surface",
                    reason: format!("group #{index} refers back to itself"),
                })
            }
            Some(Slot::Pending) => {}
        }
        self.slots.borrow_mut()[index] = Slot::Loading;
        let group = Rc::new(Container::from_state_with(&self.states[index], self)?);
        self.slots.borrow_mut()[index] = Slot::Done(Rc::clone(&group));
        Ok(group)
    }
}

impl Resolve for Loader<'_> {
    fn artist(&self, id: ArtistId) -> Option<ArtistRef> {
        self.surface
            .primitive(id)
            .or_else(|| self.detached.get(&id).cloned())
            .map(|p| p as ArtistRef)
    }

    fn shared(&self, index: usize) -> Result<Rc<Container>, StateError> {
        self.group(index)
    }
}
