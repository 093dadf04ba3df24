//! Grouped drawable container
//!
//! A [`Container`] bundles the drawables that make up one plotted series so
//! the series can be labeled, removed or observed as a unit.

use crate::artist::{Artist, ArtistRef, BoxError, Member};
use crate::error::{ContainerError, RemovalFailure};
use crate::flatten::Leaves;
use crate::kind::{BarParams, ErrorbarParams, GroupKind, HistParams, ScatterParams};
use crate::observer::{Observer, ObserverId, ObserverRegistry};
use std::cell::{Cell, RefCell};
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// Removal hook installed by the owning surface
pub type RemoveMethod = Rc<dyn Fn(&Container)>;

/// Ordered, fixed group of drawables with a label, observers and a removal hook
///
/// # Invariants
/// - Members are fixed at construction; only label, observers, the removal
///   hook and the events flag change afterwards
/// - Observer ids are never reused
///
/// Not thread-safe: interior mutability goes through `Cell`/`RefCell`, so
/// the type is neither `Send` nor `Sync`.
pub struct Container {
    members: Box<[Member]>,
    kind: GroupKind,
    label: RefCell<Option<String>>,
    remove_method: RefCell<Option<RemoveMethod>>,
    observers: RefCell<ObserverRegistry>,
    events_enabled: Cell<bool>,
}

impl Container {
    /// Create plain container over `members` with no label
    #[inline]
    #[must_use]
    pub fn new(members: Vec<Member>) -> Self {
        Self::with_kind(members, GroupKind::Plain)
    }

    /// Create container of the given specialization
    #[must_use]
    pub fn with_kind(members: Vec<Member>, kind: GroupKind) -> Self {
        Self {
            members: members.into_boxed_slice(),
            kind,
            label: RefCell::new(None),
            remove_method: RefCell::new(None),
            observers: RefCell::new(ObserverRegistry::new()),
            events_enabled: Cell::new(false),
        }
    }

    /// Set initial label
    ///
    /// No observers exist yet, so nothing is notified.
    #[inline]
    #[must_use]
    pub fn with_label(self, label: impl Display) -> Self {
        *self.label.borrow_mut() = Some(label.to_string());
        self
    }

    /// Replace observer registry (used when restoring from a snapshot)
    #[inline]
    #[must_use]
    pub(crate) fn with_observers(self, observers: ObserverRegistry) -> Self {
        *self.observers.borrow_mut() = observers;
        self
    }

    /// Bar group over `patches`
    #[must_use]
    pub fn bar(patches: Vec<ArtistRef>, params: BarParams) -> Self {
        Self::with_kind(
            patches.into_iter().map(Member::Artist).collect(),
            GroupKind::Bar(params),
        )
    }

    /// Histogram group over `patches`
    #[must_use]
    pub fn hist(patches: Vec<ArtistRef>, params: HistParams) -> Self {
        Self::with_kind(
            patches.into_iter().map(Member::Artist).collect(),
            GroupKind::Hist(params),
        )
    }

    /// Scatter group over `members`
    #[must_use]
    pub fn scatter(members: Vec<Member>, params: ScatterParams) -> Self {
        Self::with_kind(members, GroupKind::Scatter(params))
    }

    /// Error bar group over `lines`
    ///
    /// `lines` is usually `[data_line, [caplines..], [barlinecols..]]`.
    #[must_use]
    pub fn errorbar(lines: Vec<Member>, has_xerr: bool, has_yerr: bool) -> Self {
        Self::with_kind(
            lines,
            GroupKind::Errorbar(ErrorbarParams { has_xerr, has_yerr }),
        )
    }

    /// Stem group: members are `[markerline, [stemlines..], baseline]`
    #[must_use]
    pub fn stem(markerline: ArtistRef, stemlines: Vec<ArtistRef>, baseline: ArtistRef) -> Self {
        Self::with_kind(
            vec![
                Member::Artist(markerline),
                Member::seq(stemlines),
                Member::Artist(baseline),
            ],
            GroupKind::Stem,
        )
    }

    // --- tuple-like access ---

    /// Top-level members in construction order
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Member at `index`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Member> {
        self.members.get(index)
    }

    /// Iterate top-level members
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }

    /// Number of top-level members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the container has no members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Specialization tag and data
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &GroupKind {
        &self.kind
    }

    // --- label ---

    /// Label used for this group in a legend
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.label.borrow().clone()
    }

    /// Set the label to the string form of `label`, or clear it on `None`
    ///
    /// Always notifies observers afterwards.
    ///
    /// # Errors
    /// Returns the first observer failure, see [`Container::pchanged`]
    pub fn set_label<L: Display>(&self, label: Option<L>) -> Result<(), ContainerError> {
        *self.label.borrow_mut() = label.map(|l| l.to_string());
        self.pchanged()
    }

    /// Clear the label and notify observers
    ///
    /// # Errors
    /// Returns the first observer failure, see [`Container::pchanged`]
    #[inline]
    pub fn clear_label(&self) -> Result<(), ContainerError> {
        self.set_label(None::<&str>)
    }

    // --- events flag ---

    /// Stored events flag
    ///
    /// The flag does not gate [`Container::pchanged`]; observers fire
    /// regardless of its value.
    #[inline]
    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.events_enabled.get()
    }

    /// Store events flag
    #[inline]
    pub fn set_events_enabled(&self, enabled: bool) {
        self.events_enabled.set(enabled);
    }

    // --- removal ---

    /// Install the owner's removal hook, replacing any previous one
    pub fn set_remove_method(&self, f: impl Fn(&Container) + 'static) {
        *self.remove_method.borrow_mut() = Some(Rc::new(f));
    }

    /// Check if a removal hook is installed
    #[inline]
    #[must_use]
    pub fn has_remove_method(&self) -> bool {
        self.remove_method.borrow().is_some()
    }

    /// Remove every member from its surface, then run the removal hook
    ///
    /// Members are removed in construction order. Nested sequences remove
    /// each element; nested containers run their own `remove`. Removal is
    /// best-effort: every member is attempted and the hook runs even when
    /// some members fail.
    ///
    /// # Errors
    /// Returns [`ContainerError::Removal`] listing every member that failed
    pub fn remove(&self) -> Result<(), ContainerError> {
        let mut failures = Vec::new();
        self.remove_into(&mut failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ContainerError::Removal { failures })
        }
    }

    fn remove_into(&self, failures: &mut Vec<RemovalFailure>) {
        remove_members(&self.members, failures);
        // Clone out so the hook may replace itself without a borrow conflict.
        let hook = self.remove_method.borrow().clone();
        if let Some(hook) = hook {
            hook(self);
        }
    }

    // --- observers ---

    /// Register `func` to be called whenever a property changes
    ///
    /// Returns an id usable with [`Container::remove_callback`].
    pub fn add_callback<F>(&self, func: F) -> ObserverId
    where
        F: Fn(&Container) -> Result<(), BoxError> + 'static,
    {
        let id = self.observers.borrow_mut().insert(Rc::new(func) as Observer);
        tracing::debug!(observer = %id, "observer added");
        id
    }

    /// Unregister the observer with `id`
    ///
    /// Unknown ids are ignored. Returns whether an observer was dropped.
    pub fn remove_callback(&self, id: ObserverId) -> bool {
        let removed = self.observers.borrow_mut().remove(id);
        if removed {
            tracing::debug!(observer = %id, "observer removed");
        }
        removed
    }

    /// Ids of registered observers, ascending
    #[must_use]
    pub fn observer_ids(&self) -> Vec<ObserverId> {
        self.observers.borrow().ids()
    }

    /// Id the next registered observer will receive
    #[must_use]
    pub fn next_observer_id(&self) -> u64 {
        self.observers.borrow().next_id()
    }

    /// Call every registered observer with this container
    ///
    /// The observer set is copied before the first call, so observers may add
    /// or remove observers on this container; such changes take effect on the
    /// next notification.
    ///
    /// # Errors
    /// Stops at the first failing observer and returns its error
    pub fn pchanged(&self) -> Result<(), ContainerError> {
        let snapshot = self.observers.borrow().snapshot();
        tracing::trace!(observers = snapshot.len(), "property changed");
        for (id, func) in snapshot {
            func(self).map_err(|source| ContainerError::Observer { id, source })?;
        }
        Ok(())
    }

    // --- flattening ---

    /// Lazy depth-first iterator over leaf drawables
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(&self.members)
    }

    /// All leaf drawables, nested groups expanded depth-first
    #[must_use]
    pub fn children(&self) -> Vec<ArtistRef> {
        self.leaves().cloned().collect()
    }

    // --- specialization accessors ---

    /// Bar fields, if this is a bar group
    #[must_use]
    pub fn as_bar(&self) -> Option<&BarParams> {
        match &self.kind {
            GroupKind::Bar(p) => Some(p),
            _ => None,
        }
    }

    /// Histogram fields, if this is a histogram group
    #[must_use]
    pub fn as_hist(&self) -> Option<&HistParams> {
        match &self.kind {
            GroupKind::Hist(p) => Some(p),
            _ => None,
        }
    }

    /// Scatter fields, if this is a scatter group
    #[must_use]
    pub fn as_scatter(&self) -> Option<&ScatterParams> {
        match &self.kind {
            GroupKind::Scatter(p) => Some(p),
            _ => None,
        }
    }

    /// Error bar flags, if this is an error bar group
    #[must_use]
    pub fn as_errorbar(&self) -> Option<ErrorbarParams> {
        match &self.kind {
            GroupKind::Errorbar(p) => Some(*p),
            _ => None,
        }
    }

    /// Error bar group recorded on a bar or histogram group
    #[must_use]
    pub fn errorbar_record(&self) -> Option<&Rc<Container>> {
        match &self.kind {
            GroupKind::Bar(p) => p.errorbar.as_ref(),
            GroupKind::Hist(p) => p.errorbar.as_ref(),
            _ => None,
        }
    }

    /// Patches of a bar or histogram group
    #[must_use]
    pub fn patches(&self) -> Vec<ArtistRef> {
        match self.kind {
            GroupKind::Bar(_) | GroupKind::Hist(_) => {
                self.members.iter().filter_map(|m| m.as_artist().cloned()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Marker line of a stem group
    #[must_use]
    pub fn markerline(&self) -> Option<&ArtistRef> {
        self.stem_slot(0).and_then(Member::as_artist)
    }

    /// Stem lines of a stem group
    #[must_use]
    pub fn stemlines(&self) -> Vec<ArtistRef> {
        self.stem_slot(1)
            .and_then(Member::as_seq)
            .map(|items| items.iter().filter_map(|m| m.as_artist().cloned()).collect())
            .unwrap_or_default()
    }

    /// Base line of a stem group
    #[must_use]
    pub fn baseline(&self) -> Option<&ArtistRef> {
        self.stem_slot(2).and_then(Member::as_artist)
    }

    fn stem_slot(&self, index: usize) -> Option<&Member> {
        match self.kind {
            GroupKind::Stem => self.members.get(index),
            _ => None,
        }
    }
}

fn remove_members(members: &[Member], failures: &mut Vec<RemovalFailure>) {
    for member in members {
        match member {
            Member::Artist(artist) => {
                if let Err(source) = artist.remove() {
                    tracing::warn!(artist = %artist.id(), error = %source, "member removal failed");
                    failures.push(RemovalFailure {
                        artist: artist.id(),
                        source,
                    });
                }
            }
            Member::Seq(items) => remove_members(items, failures),
            Member::Group(container) => container.remove_into(failures),
        }
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<Container object of {} artists>", self.len())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("kind", &self.kind.name())
            .field("members", &self.members)
            .field("label", &self.label.borrow())
            .field("observers", &self.observers.borrow())
            .field("has_remove_method", &self.has_remove_method())
            .field("events_enabled", &self.events_enabled.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artist::{Artist, ArtistId};

    #[derive(Debug)]
    struct Probe {
        id: u64,
        log: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl Artist for Probe {
        fn id(&self) -> ArtistId {
            ArtistId(self.id)
        }

        fn remove(&self) -> Result<(), BoxError> {
            self.log.borrow_mut().push(format!("remove {}", self.id));
            if self.fail {
                Err("not attached".into())
            } else {
                Ok(())
            }
        }
    }

    fn probe(id: u64, log: &Rc<RefCell<Vec<String>>>) -> ArtistRef {
        Rc::new(Probe {
            id,
            log: Rc::clone(log),
            fail: false,
        })
    }

    fn failing(id: u64, log: &Rc<RefCell<Vec<String>>>) -> ArtistRef {
        Rc::new(Probe {
            id,
            log: Rc::clone(log),
            fail: true,
        })
    }

    #[test]
    fn new_container_has_no_label() {
        let log = Rc::default();
        let c = Container::new(vec![
            probe(1, &log).into(),
            probe(2, &log).into(),
            probe(3, &log).into(),
        ]);
        assert_eq!(c.label(), None);
        c.set_label(Some(5)).unwrap();
        assert_eq!(c.label().as_deref(), Some("5"));
    }

    #[test]
    fn with_label_stringifies() {
        let c = Container::new(vec![]).with_label(2.5);
        assert_eq!(c.label().as_deref(), Some("2.5"));
        assert!(c.is_empty());
    }

    #[test]
    fn clear_label_sets_none() {
        let c = Container::new(vec![]).with_label("series");
        c.clear_label().unwrap();
        assert_eq!(c.label(), None);
    }

    #[test]
    fn set_label_notifies_once() {
        let c = Container::new(vec![]);
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        c.add_callback(move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        c.set_label(Some("a")).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn observer_receives_container() {
        let c = Container::new(vec![]);
        let labels = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&labels);
        c.add_callback(move |changed| {
            sink.borrow_mut().push(changed.label());
            Ok(())
        });
        c.set_label(Some("first")).unwrap();
        c.clear_label().unwrap();
        assert_eq!(*labels.borrow(), vec![Some("first".to_string()), None]);
    }

    #[test]
    fn removed_observer_not_called() {
        let c = Container::new(vec![]);
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let id = c.add_callback(move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        assert!(c.remove_callback(id));
        c.pchanged().unwrap();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn remove_unknown_callback_is_silent() {
        let c = Container::new(vec![]);
        let id = c.add_callback(|_| Ok(()));
        assert!(!c.remove_callback(ObserverId(99)));
        assert_eq!(c.observer_ids(), vec![id]);
    }

    #[test]
    fn observer_may_register_during_notify() {
        let c = Rc::new(Container::new(vec![]));
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        c.add_callback(move |container| {
            seen.set(seen.get() + 1);
            container.add_callback(|_| Ok(()));
            Ok(())
        });
        c.pchanged().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(c.observer_ids().len(), 2);
    }

    #[test]
    fn observer_may_unregister_peer_during_notify() {
        let c = Container::new(vec![]);
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        // Peer is id 1; the first observer removes it, but the snapshot still calls it.
        c.add_callback(|container| {
            container.remove_callback(ObserverId(1));
            Ok(())
        });
        c.add_callback(move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        c.pchanged().unwrap();
        assert_eq!(calls.get(), 1);
        c.pchanged().unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn observer_failure_propagates() {
        let c = Container::new(vec![]);
        let later = Rc::new(Cell::new(false));
        let flag = Rc::clone(&later);
        let bad = c.add_callback(|_| Err("observer broke".into()));
        c.add_callback(move |_| {
            flag.set(true);
            Ok(())
        });
        let err = c.set_label(Some("x")).unwrap_err();
        assert!(matches!(err, ContainerError::Observer { id, .. } if id == bad));
        assert!(!later.get());
        assert_eq!(c.label().as_deref(), Some("x"));
    }

    #[test]
    fn events_flag_does_not_gate_notification() {
        let c = Container::new(vec![]);
        assert!(!c.events_enabled());
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        c.add_callback(move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        c.pchanged().unwrap();
        c.set_events_enabled(true);
        c.pchanged().unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn remove_runs_members_then_hook() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let c = Container::new(vec![probe(1, &log).into(), probe(2, &log).into()]);
        let hook_log = Rc::clone(&log);
        c.set_remove_method(move |container| {
            hook_log
                .borrow_mut()
                .push(format!("hook {}", container.len()));
        });
        c.remove().unwrap();
        assert_eq!(*log.borrow(), vec!["remove 1", "remove 2", "hook 2"]);
    }

    #[test]
    fn remove_without_hook_only_removes_members() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let c = Container::new(vec![probe(1, &log).into(), probe(2, &log).into()]);
        assert!(!c.has_remove_method());
        c.remove().unwrap();
        assert_eq!(*log.borrow(), vec!["remove 1", "remove 2"]);
    }

    #[test]
    fn remove_is_best_effort() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let c = Container::new(vec![
            failing(1, &log).into(),
            probe(2, &log).into(),
            failing(3, &log).into(),
        ]);
        let hook_log = Rc::clone(&log);
        c.set_remove_method(move |_| hook_log.borrow_mut().push("hook".into()));
        let err = c.remove().unwrap_err();
        let failed: Vec<_> = err.removal_failures().iter().map(|f| f.artist).collect();
        assert_eq!(failed, vec![ArtistId(1), ArtistId(3)]);
        assert_eq!(
            *log.borrow(),
            vec!["remove 1", "remove 2", "remove 3", "hook"]
        );
    }

    #[test]
    fn remove_recurses_into_nested_members() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner = Rc::new(Container::new(vec![probe(2, &log).into()]));
        let inner_log = Rc::clone(&log);
        inner.set_remove_method(move |_| inner_log.borrow_mut().push("inner hook".into()));
        let c = Container::new(vec![
            probe(1, &log).into(),
            Member::Group(inner),
            Member::seq(vec![probe(3, &log), probe(4, &log)]),
        ]);
        c.remove().unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["remove 1", "remove 2", "inner hook", "remove 3", "remove 4"]
        );
    }

    #[test]
    fn set_remove_method_replaces_previous() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let c = Container::new(vec![]);
        let first = Rc::clone(&log);
        c.set_remove_method(move |_| first.borrow_mut().push("first".into()));
        let second = Rc::clone(&log);
        c.set_remove_method(move |_| second.borrow_mut().push("second".into()));
        c.remove().unwrap();
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn children_flattens_nested() {
        let log = Rc::default();
        let inner = Rc::new(Container::new(vec![probe(2, &log).into(), probe(3, &log).into()]));
        let c = Container::new(vec![probe(1, &log).into(), inner.into(), probe(4, &log).into()]);
        let ids: Vec<_> = c.children().iter().map(|a| a.id().0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn display_counts_top_level_members() {
        let log = Rc::default();
        let c = Container::new(vec![probe(1, &log).into(), Member::seq(vec![probe(2, &log)])]);
        assert_eq!(c.to_string(), "<Container object of 2 artists>");
    }

    #[test]
    fn stem_accessors() {
        let log = Rc::default();
        let c = Container::stem(
            probe(1, &log),
            vec![probe(2, &log), probe(3, &log)],
            probe(4, &log),
        );
        assert_eq!(c.len(), 3);
        assert_eq!(c.markerline().unwrap().id(), ArtistId(1));
        assert_eq!(c.stemlines().len(), 2);
        assert_eq!(c.baseline().unwrap().id(), ArtistId(4));
        assert_eq!(c.children().len(), 4);
    }

    #[test]
    fn accessors_reject_other_kinds() {
        let log = Rc::default();
        let c = Container::new(vec![probe(1, &log).into()]);
        assert!(c.markerline().is_none());
        assert!(c.patches().is_empty());
        assert!(c.as_bar().is_none());
        assert!(c.as_errorbar().is_none());
        assert!(c.errorbar_record().is_none());
    }

    #[test]
    fn errorbar_flags() {
        let c = Container::errorbar(vec![], true, false);
        let flags = c.as_errorbar().unwrap();
        assert!(flags.has_xerr);
        assert!(!flags.has_yerr);
        assert_eq!(c.kind().name(), "errorbar");
    }

    #[test]
    fn bar_holds_patches_and_errorbar() {
        let log = Rc::default();
        let eb = Rc::new(Container::errorbar(vec![], false, true));
        let c = Container::bar(
            vec![probe(1, &log), probe(2, &log)],
            BarParams {
                errorbar: Some(Rc::clone(&eb)),
            },
        );
        assert_eq!(c.patches().len(), 2);
        assert!(Rc::ptr_eq(c.as_bar().unwrap().errorbar.as_ref().unwrap(), &eb));
        assert!(Rc::ptr_eq(c.errorbar_record().unwrap(), &eb));
        assert!(eb.errorbar_record().is_none());
    }
}
