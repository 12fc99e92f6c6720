//! Hash-pruned diff of two prolly-tree sequences.
//!
//! Both trees are walked in key order from a frontier of unexpanded chunks.
//! When both frontiers have the same chunk id on top and nothing is
//! buffered, that whole subtree is identical on both sides and is skipped
//! without being read. Otherwise the taller chunk is expanded (both if they
//! sit at the same level) and buffered leaf entries are merge-joined by key.

use std::cmp::Ordering;
use std::collections::VecDeque;

use strata_store::ObjectStore;
use strata_types::ObjectId;
use strata_value::sequence::{Entry, Node, Sequence};
use tracing::trace;

use crate::change::ValueChanged;
use crate::error::DiffResult;

/// One side of the walk.
struct Frontier {
    /// Unexpanded chunks with their level; the next one in key order is last.
    pending: Vec<(ObjectId, u8)>,
    buffer: VecDeque<Entry>,
}

impl Frontier {
    fn new(seq: &Sequence) -> Self {
        Self {
            pending: vec![(seq.root(), seq.level())],
            buffer: VecDeque::new(),
        }
    }

    fn top(&self) -> Option<(ObjectId, u8)> {
        self.pending.last().copied()
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.buffer.is_empty()
    }

    fn expand(&mut self, store: &dyn ObjectStore) -> DiffResult<()> {
        let Some((id, _)) = self.pending.pop() else {
            return Ok(());
        };
        match Node::load(store, &id)? {
            Node::Leaf(entries) => self.buffer.extend(entries),
            Node::Index { level, children } => {
                let child_level = level.saturating_sub(1);
                self.pending
                    .extend(children.into_iter().rev().map(|c| (c.id, child_level)));
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.buffer.clear();
    }
}

/// Lazy, key-ordered diff between two sequences in the same store.
///
/// Yields at most one error, after which the stream ends.
pub struct SequenceDiff<'a> {
    store: &'a dyn ObjectStore,
    old: Frontier,
    new: Frontier,
    skipped: u64,
    done: bool,
}

impl<'a> SequenceDiff<'a> {
    pub fn new(store: &'a dyn ObjectStore, old: &Sequence, new: &Sequence) -> Self {
        let mut diff = Self {
            store,
            old: Frontier::new(old),
            new: Frontier::new(new),
            skipped: 0,
            done: false,
        };
        if old.root() == new.root() {
            diff.old.clear();
            diff.new.clear();
            diff.skipped = 1;
        }
        diff
    }

    /// Number of shared subtrees skipped so far.
    pub fn skipped_subtrees(&self) -> u64 {
        self.skipped
    }

    fn step(&mut self) -> DiffResult<Option<ValueChanged>> {
        loop {
            if self.old.buffer.is_empty() && self.new.buffer.is_empty() {
                match (self.old.top(), self.new.top()) {
                    (None, None) => return Ok(None),
                    (Some((a, _)), Some((b, _))) if a == b => {
                        self.old.pending.pop();
                        self.new.pending.pop();
                        self.skipped += 1;
                    }
                    (Some((_, old_level)), Some((_, new_level))) => {
                        if old_level >= new_level {
                            self.old.expand(self.store)?;
                        }
                        if new_level >= old_level {
                            self.new.expand(self.store)?;
                        }
                    }
                    (Some(_), None) => self.old.expand(self.store)?,
                    (None, Some(_)) => self.new.expand(self.store)?,
                }
                continue;
            }

            // A side with an empty buffer must reach its next leaf before
            // its entries can be ordered against the other side.
            if self.old.buffer.is_empty() && !self.old.pending.is_empty() {
                self.old.expand(self.store)?;
                continue;
            }
            if self.new.buffer.is_empty() && !self.new.pending.is_empty() {
                self.new.expand(self.store)?;
                continue;
            }

            let order = match (self.old.buffer.front(), self.new.buffer.front()) {
                (Some(o), Some(n)) => o.key.cmp(&n.key),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => continue,
            };
            match order {
                Ordering::Less => {
                    if let Some(entry) = self.old.buffer.pop_front() {
                        return Ok(Some(removed(entry)));
                    }
                }
                Ordering::Greater => {
                    if let Some(entry) = self.new.buffer.pop_front() {
                        return Ok(Some(added(entry)));
                    }
                }
                Ordering::Equal => {
                    if let (Some(o), Some(n)) =
                        (self.old.buffer.pop_front(), self.new.buffer.pop_front())
                    {
                        if o.value != n.value {
                            return Ok(Some(modified(o, n)));
                        }
                    }
                }
            }
        }
    }
}

fn added(entry: Entry) -> ValueChanged {
    let value = entry.value.unwrap_or_else(|| entry.key.clone());
    ValueChanged::added(entry.key, value)
}

fn removed(entry: Entry) -> ValueChanged {
    let value = entry.value.unwrap_or_else(|| entry.key.clone());
    ValueChanged::removed(entry.key, value)
}

fn modified(old: Entry, new: Entry) -> ValueChanged {
    let old_value = old.value.unwrap_or_else(|| old.key.clone());
    let new_value = new.value.unwrap_or_else(|| new.key.clone());
    ValueChanged::modified(new.key, old_value, new_value)
}

impl Iterator for SequenceDiff<'_> {
    type Item = DiffResult<ValueChanged>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(change)) => Some(Ok(change)),
            Ok(None) => {
                self.done = true;
                trace!(skipped = self.skipped, "sequence diff complete");
                None
            }
            Err(e) => {
                self.done = true;
                self.old.clear();
                self.new.clear();
                Some(Err(e))
            }
        }
    }
}

impl std::fmt::Debug for SequenceDiff<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceDiff")
            .field("old_exhausted", &self.old.is_exhausted())
            .field("new_exhausted", &self.new.is_exhausted())
            .field("skipped", &self.skipped)
            .field("done", &self.done)
            .finish()
    }
}
