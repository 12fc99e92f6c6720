use std::vec;

use strata_store::ObjectStore;
use strata_types::ObjectId;

use crate::error::ValueResult;
use crate::sequence::node::{Entry, Node};

/// In-order iterator over every entry of a sequence.
///
/// Chunks are loaded one at a time. A read failure is yielded once and ends
/// the iteration.
pub struct SequenceIter<'a> {
    store: &'a dyn ObjectStore,
    /// Chunks still to visit; the next one is on top.
    pending: Vec<ObjectId>,
    current: vec::IntoIter<Entry>,
}

impl<'a> SequenceIter<'a> {
    pub(crate) fn new(store: &'a dyn ObjectStore, root: ObjectId) -> Self {
        Self {
            store,
            pending: vec![root],
            current: Vec::new().into_iter(),
        }
    }
}

impl Iterator for SequenceIter<'_> {
    type Item = ValueResult<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(Ok(entry));
            }
            let id = self.pending.pop()?;
            match Node::load(self.store, &id) {
                Ok(Node::Leaf(entries)) => self.current = entries.into_iter(),
                Ok(Node::Index { children, .. }) => {
                    self.pending.extend(children.into_iter().rev().map(|c| c.id));
                }
                Err(e) => {
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}
