//! Property-change observer registry
//!
//! Provides [`ObserverRegistry`], a map from [`ObserverId`] to callback with a
//! monotonically increasing id counter.

use crate::artist::BoxError;
use crate::container::Container;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// Handle returned by [`Container::add_callback`]
///
/// Ids are allocated in increasing order and never reused by the same
/// container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverId(pub u64);

impl Display for ObserverId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observer callback, invoked with the container that changed
pub type Observer = Rc<dyn Fn(&Container) -> Result<(), BoxError>>;

/// Registry of observers keyed by id
///
/// # Invariants
/// - `next_id` is greater than every id ever handed out
/// - Iteration order is ascending by id
#[derive(Default, Clone)]
pub struct ObserverRegistry {
    observers: BTreeMap<ObserverId, Observer>,
    next_id: u64,
}

impl ObserverRegistry {
    /// Create empty registry with the counter at zero
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty registry whose counter resumes at `next_id`
    #[inline]
    #[must_use]
    pub fn resuming_at(next_id: u64) -> Self {
        Self {
            observers: BTreeMap::new(),
            next_id,
        }
    }

    /// Store `observer` under the next unused id
    pub fn insert(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.observers.insert(id, observer);
        self.next_id += 1;
        id
    }

    /// Drop the observer stored under `id`
    ///
    /// Returns `false` (and changes nothing) when `id` is unknown.
    #[inline]
    pub fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    /// Check if `id` is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers.contains_key(&id)
    }

    /// Copy of the current `(id, observer)` pairs
    #[must_use]
    pub fn snapshot(&self) -> Vec<(ObserverId, Observer)> {
        self.observers
            .iter()
            .map(|(id, f)| (*id, Rc::clone(f)))
            .collect()
    }

    /// Registered ids in ascending order
    #[must_use]
    pub fn ids(&self) -> Vec<ObserverId> {
        self.observers.keys().copied().collect()
    }

    /// Id the next insert will receive
    #[inline]
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Number of registered observers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Check if no observers are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("ids", &self.ids())
            .field("next_id", &self.next_id)
            .finish()
    }
}
