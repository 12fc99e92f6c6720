//! Content-defined chunking.
//!
//! An entry closes its leaf chunk when its fingerprint is divisible by the
//! chunk pattern; a child reference closes its index chunk the same way
//! (using the child's id) once the chunk holds at least two children. Since
//! boundaries depend only on content, an edit disturbs the chunks around it
//! and the chunking falls back into step right after.

use strata_store::ObjectStore;
use tracing::trace;

use crate::error::{ValueError, ValueResult};
use crate::sequence::node::{ChildRef, Entry, Node};
use crate::sequence::Sequence;
use crate::value::Value;

/// Average number of entries (or children) per chunk.
pub const DEFAULT_CHUNK_PATTERN: u32 = 32;

fn is_boundary(fingerprint: u32, pattern: u32) -> bool {
    fingerprint % pattern == 0
}

/// Builds a [`Sequence`] bottom-up from entries pushed in ascending key order.
pub struct SequenceBuilder<'a> {
    store: &'a dyn ObjectStore,
    pattern: u32,
    leaf: Vec<Entry>,
    /// `levels[i]` holds refs to finished level-`i` chunks awaiting a parent.
    levels: Vec<Vec<ChildRef>>,
    len: u64,
    last_key: Option<Value>,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self::with_pattern(store, DEFAULT_CHUNK_PATTERN)
    }

    /// Builder with a custom chunk pattern (clamped to at least 2).
    ///
    /// Trees built with different patterns hold the same entries but have
    /// different ids, so every collection in one store should share a pattern.
    pub fn with_pattern(store: &'a dyn ObjectStore, pattern: u32) -> Self {
        Self {
            store,
            pattern: pattern.max(2),
            leaf: Vec::new(),
            levels: Vec::new(),
            len: 0,
            last_key: None,
        }
    }

    pub fn push(&mut self, entry: Entry) -> ValueResult<()> {
        if let Some(last) = &self.last_key {
            if entry.key <= *last {
                return Err(ValueError::UnsortedEntries);
            }
        }
        self.last_key = Some(entry.key.clone());
        let boundary = is_boundary(entry.fingerprint(), self.pattern);
        self.leaf.push(entry);
        self.len += 1;
        if boundary {
            self.flush_leaf()?;
        }
        Ok(())
    }

    /// Append a finished base chunk at `level` without reading it.
    ///
    /// Only valid for a chunk that was closed by a boundary (anything off the
    /// right edge of its tree) whose keys all follow the last pushed key.
    /// Returns `false` and leaves the builder untouched when lower levels
    /// still hold pending entries, since re-chunking from that state could
    /// split the chunk differently; the caller must then descend into it.
    pub(crate) fn push_chunk(&mut self, level: usize, child: &ChildRef) -> ValueResult<bool> {
        let aligned = self.leaf.is_empty() && self.levels.iter().take(level).all(Vec::is_empty);
        if !aligned {
            return Ok(false);
        }
        while self.levels.len() < level {
            self.levels.push(Vec::new());
        }
        self.len += child.count;
        self.last_key = Some(child.last_key.clone());
        self.push_child(level, child.clone())?;
        Ok(true)
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn finish(mut self) -> ValueResult<Sequence> {
        if self.len == 0 {
            let root = Node::Leaf(Vec::new()).save(self.store)?;
            return Ok(Sequence::new(root, 0, 0));
        }
        if !self.leaf.is_empty() {
            self.flush_leaf()?;
        }

        let mut level = 0;
        loop {
            let is_top = level + 1 >= self.levels.len();
            let pending = self.levels[level].len();
            if is_top && pending == 1 {
                let root = self.levels[level][0].id;
                trace!(root = %root.short_hex(), level, len = self.len, "built sequence");
                return Ok(Sequence::new(root, level as u8, self.len));
            }
            if pending > 0 {
                self.flush_index(level)?;
            }
            level += 1;
        }
    }

    fn flush_leaf(&mut self) -> ValueResult<()> {
        let entries = std::mem::take(&mut self.leaf);
        let Some(last_key) = entries.last().map(|e| e.key.clone()) else {
            return Ok(());
        };
        let count = entries.len() as u64;
        let id = Node::Leaf(entries).save(self.store)?;
        self.push_child(0, ChildRef { id, last_key, count })
    }

    fn push_child(&mut self, level: usize, child: ChildRef) -> ValueResult<()> {
        if self.levels.len() <= level {
            self.levels.push(Vec::new());
        }
        let boundary = is_boundary(child.id.leading_u32(), self.pattern);
        self.levels[level].push(child);
        if boundary && self.levels[level].len() >= 2 {
            self.flush_index(level)?;
        }
        Ok(())
    }

    fn flush_index(&mut self, level: usize) -> ValueResult<()> {
        let children = std::mem::take(&mut self.levels[level]);
        let Some(last_key) = children.last().map(|c| c.last_key.clone()) else {
            return Ok(());
        };
        let count = children.iter().map(|c| c.count).sum();
        let node = Node::Index {
            level: (level + 1) as u8,
            children,
        };
        let id = node.save(self.store)?;
        self.push_child(level + 1, ChildRef { id, last_key, count })
    }
}
