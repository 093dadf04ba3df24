//! Depth-first flattening of nested member sequences

use crate::artist::{ArtistRef, Member};
use std::slice;

/// Lazy iterator over the leaf drawables of a member sequence
///
/// Nested sequences and nested containers are expanded depth-first,
/// left to right. The iterator is finite and not restartable.
#[derive(Debug)]
pub struct Leaves<'a> {
    stack: Vec<slice::Iter<'a, Member>>,
}

impl<'a> Leaves<'a> {
    /// Start iterating over `members`
    #[inline]
    #[must_use]
    pub fn new(members: &'a [Member]) -> Self {
        Self {
            stack: vec![members.iter()],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a ArtistRef;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(Member::Artist(artist)) => return Some(artist),
                Some(Member::Seq(items)) => self.stack.push(items.iter()),
                Some(Member::Group(container)) => self.stack.push(container.members().iter()),
            }
        }
    }
}

/// Flatten `members` into an owned list of leaf handles
#[must_use]
pub fn flatten(members: &[Member]) -> Vec<ArtistRef> {
    Leaves::new(members).cloned().collect()
}
