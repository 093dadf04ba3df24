//! Serializable container snapshots
//!
//! [`ContainerState`] captures everything about a container that can be
//! persisted. The removal hook is never captured: it closes over the live
//! surface and must be re-attached by the owner after reload. Observer
//! callbacks have no serialized form either, but the id counter is kept so
//! ids handed out after reload never collide with earlier ones.
//!
//! A nested container that the owner also persists on its own (a bar
//! group's error bars attached to the same surface) is written as a
//! [`NestedState::Shared`] index instead of a copy, so that reloading keeps
//! one container behind both references.

use crate::artist::{Artist, ArtistId, ArtistRef, Member};
use crate::container::Container;
use crate::error::StateError;
use crate::kind::{BarParams, ErrorbarParams, GroupKind, HistData, HistParams, ScatterParams};
use crate::observer::ObserverRegistry;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Persisted form of a [`Member`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MemberState {
    Artist { id: ArtistId },
    Seq { items: Vec<MemberState> },
    Group { group: NestedState },
}

/// Persisted form of a container held by another container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NestedState {
    /// Full snapshot of the nested container
    Inline { state: Box<ContainerState> },
    /// Index of a container the owner persists itself
    Shared { index: usize },
}

/// Persisted form of a [`GroupKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KindState {
    Plain,
    Bar {
        errorbar: Option<NestedState>,
    },
    Hist {
        data: HistData,
        errorbar: Option<NestedState>,
    },
    Scatter(ScatterParams),
    Errorbar(ErrorbarParams),
    Stem,
}

/// Persisted form of a [`Container`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerState {
    pub members: Vec<MemberState>,
    pub label: Option<String>,
    pub events_enabled: bool,
    pub next_observer_id: u64,
    pub kind: KindState,
}

/// Lookups used while rebuilding a container from a snapshot
pub trait Resolve {
    /// Live drawable with `id`
    fn artist(&self, id: ArtistId) -> Option<ArtistRef>;

    /// Container persisted by the owner under `index`
    ///
    /// # Errors
    /// Returns [`StateError::UnknownGroup`] unless the owner knows `index`
    fn shared(&self, index: usize) -> Result<Rc<Container>, StateError> {
        Err(StateError::UnknownGroup(index))
    }
}

/// Resolver that only knows drawables
struct ByArtist<'a, F>(&'a F);

impl<F> Resolve for ByArtist<'_, F>
where
    F: Fn(ArtistId) -> Option<ArtistRef>,
{
    fn artist(&self, id: ArtistId) -> Option<ArtistRef> {
        (self.0)(id)
    }
}

impl Container {
    /// Snapshot everything except the removal hook and observer callbacks
    ///
    /// Nested containers are written inline.
    #[must_use]
    pub fn to_state(&self) -> ContainerState {
        self.to_state_with(&|_| None)
    }

    /// Snapshot with nested containers written as [`NestedState::Shared`]
    /// wherever `shared` returns an index
    #[must_use]
    pub fn to_state_with(&self, shared: &dyn Fn(&Container) -> Option<usize>) -> ContainerState {
        ContainerState {
            members: self
                .members()
                .iter()
                .map(|m| member_state(m, shared))
                .collect(),
            label: self.label(),
            events_enabled: self.events_enabled(),
            next_observer_id: self.next_observer_id(),
            kind: kind_state(self.kind(), shared),
        }
    }

    /// Rebuild a container from `state`
    ///
    /// Leaf drawables are looked up by id through `resolve`. The result has
    /// no removal hook and no observers; its observer ids continue from the
    /// persisted counter.
    ///
    /// # Errors
    /// Returns [`StateError::UnknownArtist`] if `resolve` cannot find a
    /// member, [`StateError::UnknownGroup`] for a shared reference, or
    /// [`StateError::Malformed`] if a stem snapshot does not have its three
    /// slots
    pub fn from_state<F>(state: &ContainerState, resolve: &F) -> Result<Self, StateError>
    where
        F: Fn(ArtistId) -> Option<ArtistRef>,
    {
        Self::from_state_with(state, &ByArtist(resolve))
    }

    /// Rebuild a container from `state`, resolving shared references
    /// through `resolver`
    ///
    /// # Errors
    /// Same as [`Container::from_state`], plus whatever
    /// [`Resolve::shared`] reports
    pub fn from_state_with<R>(state: &ContainerState, resolver: &R) -> Result<Self, StateError>
    where
        R: Resolve + ?Sized,
    {
        let members = state
            .members
            .iter()
            .map(|m| restore_member(m, resolver))
            .collect::<Result<Vec<_>, _>>()?;

        let kind = match &state.kind {
            KindState::Plain => GroupKind::Plain,
            KindState::Bar { errorbar } => GroupKind::Bar(BarParams {
                errorbar: restore_optional(errorbar.as_ref(), resolver)?,
            }),
            KindState::Hist { data, errorbar } => GroupKind::Hist(HistParams {
                data: data.clone(),
                errorbar: restore_optional(errorbar.as_ref(), resolver)?,
            }),
            KindState::Scatter(params) => GroupKind::Scatter(params.clone()),
            KindState::Errorbar(params) => GroupKind::Errorbar(*params),
            KindState::Stem => {
                check_stem_shape(&members)?;
                GroupKind::Stem
            }
        };

        let mut container = Container::with_kind(members, kind)
            .with_observers(ObserverRegistry::resuming_at(state.next_observer_id));
        if let Some(label) = &state.label {
            container = container.with_label(label);
        }
        container.set_events_enabled(state.events_enabled);
        Ok(container)
    }
}

fn nested_state(
    container: &Container,
    shared: &dyn Fn(&Container) -> Option<usize>,
) -> NestedState {
    match shared(container) {
        Some(index) => NestedState::Shared { index },
        None => NestedState::Inline {
            state: Box::new(container.to_state_with(shared)),
        },
    }
}

fn member_state(member: &Member, shared: &dyn Fn(&Container) -> Option<usize>) -> MemberState {
    match member {
        Member::Artist(a) => MemberState::Artist { id: a.id() },
        Member::Seq(items) => MemberState::Seq {
            items: items.iter().map(|m| member_state(m, shared)).collect(),
        },
        Member::Group(c) => MemberState::Group {
            group: nested_state(c, shared),
        },
    }
}

fn kind_state(kind: &GroupKind, shared: &dyn Fn(&Container) -> Option<usize>) -> KindState {
    let nested = |c: &Option<Rc<Container>>| c.as_deref().map(|c| nested_state(c, shared));
    match kind {
        GroupKind::Plain => KindState::Plain,
        GroupKind::Bar(p) => KindState::Bar {
            errorbar: nested(&p.errorbar),
        },
        GroupKind::Hist(p) => KindState::Hist {
            data: p.data.clone(),
            errorbar: nested(&p.errorbar),
        },
        GroupKind::Scatter(p) => KindState::Scatter(p.clone()),
        GroupKind::Errorbar(p) => KindState::Errorbar(*p),
        GroupKind::Stem => KindState::Stem,
    }
}

fn restore_member<R>(state: &MemberState, resolver: &R) -> Result<Member, StateError>
where
    R: Resolve + ?Sized,
{
    match state {
        MemberState::Artist { id } => resolver
            .artist(*id)
            .map(Member::Artist)
            .ok_or(StateError::UnknownArtist(*id)),
        MemberState::Seq { items } => items
            .iter()
            .map(|m| restore_member(m, resolver))
            .collect::<Result<Vec<_>, _>>()
            .map(Member::Seq),
        MemberState::Group { group } => restore_nested(group, resolver).map(Member::Group),
    }
}

fn restore_nested<R>(state: &NestedState, resolver: &R) -> Result<Rc<Container>, StateError>
where
    R: Resolve + ?Sized,
{
    match state {
        NestedState::Inline { state } => Container::from_state_with(state, resolver).map(Rc::new),
        NestedState::Shared { index } => resolver.shared(*index),
    }
}

fn restore_optional<R>(
    state: Option<&NestedState>,
    resolver: &R,
) -> Result<Option<Rc<Container>>, StateError>
where
    R: Resolve + ?Sized,
{
    state.map(|s| restore_nested(s, resolver)).transpose()
}

fn check_stem_shape(members: &[Member]) -> Result<(), StateError> {
    let ok = members.len() == 3
        && members[0].as_artist().is_some()
        && members[1].as_seq().is_some()
        && members[2].as_artist().is_some();
    if ok {
        Ok(())
    } else {
        Err(StateError::Malformed {
            kind: "stem",
            reason: "expected [markerline, [stemlines..], baseline]".to_string(),
        })
    }
}
