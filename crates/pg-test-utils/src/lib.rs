//! Testing utilities for plotgroup workspace
//!
//! Shared test helpers, fixtures, and assertions.

#![allow(missing_docs)]

use pg_container::{Artist, ArtistId, ArtistRef, BoxError, Container, Member};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared record of events, in the order they happened
#[derive(Debug, Default, Clone)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Drawable that logs `remove <id>` and can be told to fail
#[derive(Debug)]
pub struct RecordingArtist {
    id: ArtistId,
    log: EventLog,
    fail: Cell<bool>,
    removals: Cell<usize>,
}

impl RecordingArtist {
    pub fn new(id: u64, log: &EventLog) -> Rc<Self> {
        Rc::new(Self {
            id: ArtistId(id),
            log: log.clone(),
            fail: Cell::new(false),
            removals: Cell::new(0),
        })
    }

    pub fn failing(id: u64, log: &EventLog) -> Rc<Self> {
        let artist = Self::new(id, log);
        artist.fail.set(true);
        artist
    }

    pub fn removals(&self) -> usize {
        self.removals.get()
    }
}

impl Artist for RecordingArtist {
    fn id(&self) -> ArtistId {
        self.id
    }

    fn remove(&self) -> Result<(), BoxError> {
        self.log.push(format!("remove {}", self.id.0));
        self.removals.set(self.removals.get() + 1);
        if self.fail.get() {
            Err(format!("{} refused removal", self.id).into())
        } else {
            Ok(())
        }
    }
}

pub fn artist(id: u64, log: &EventLog) -> ArtistRef {
    RecordingArtist::new(id, log)
}

pub fn leaf(id: u64, log: &EventLog) -> Member {
    Member::Artist(artist(id, log))
}

/// Plain container over recording artists with the given ids
pub fn container_of(ids: &[u64], log: &EventLog) -> Container {
    Container::new(ids.iter().map(|&id| leaf(id, log)).collect())
}

/// Observer that logs `notify <tag> <label>` on every call
pub fn logging_observer(
    tag: &'static str,
    log: &EventLog,
) -> impl Fn(&Container) -> Result<(), BoxError> + 'static {
    let log = log.clone();
    move |c: &Container| {
        log.push(format!("notify {tag} {}", c.label().unwrap_or_default()));
        Ok(())
    }
}

/// Observer that counts its calls into `counter`
pub fn counting_observer(
    counter: &Rc<Cell<usize>>,
) -> impl Fn(&Container) -> Result<(), BoxError> + 'static {
    let counter = Rc::clone(counter);
    move |_: &Container| {
        counter.set(counter.get() + 1);
        Ok(())
    }
}

pub fn leaf_ids(container: &Container) -> Vec<u64> {
    container.leaves().map(|a| a.id().0).collect()
}
