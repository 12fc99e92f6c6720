//! Prolly trees: the persistent sorted sequence behind maps and sets.
//!
//! Entries live in leaf chunks; index chunks point at lower chunks and
//! record the last key and entry count below each child. Chunk boundaries
//! are decided by the content of the entries themselves (see
//! [`builder`]), so the shape of the tree is a pure function of the entry
//! set. Two versions of a collection that differ in a few keys share every
//! chunk outside the changed region, which is what lets a diff skip whole
//! subtrees by comparing ids.

pub mod builder;
pub mod editor;
pub mod iter;
pub mod node;

use serde::{Deserialize, Serialize};
use strata_store::ObjectStore;
use strata_types::ObjectId;

use crate::error::ValueResult;
use crate::value::Value;

pub use builder::{SequenceBuilder, DEFAULT_CHUNK_PATTERN};
pub use editor::SequenceEditor;
pub use iter::SequenceIter;
pub use node::{ChildRef, Entry, Node};

/// Handle to a stored prolly tree: its root chunk, height and entry count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    root: ObjectId,
    level: u8,
    len: u64,
}

impl Sequence {
    pub(crate) fn new(root: ObjectId, level: u8, len: u64) -> Self {
        Self { root, level, len }
    }

    /// Build an empty sequence (a single empty leaf).
    pub fn empty(store: &dyn ObjectStore) -> ValueResult<Self> {
        SequenceBuilder::new(store).finish()
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// Height of the root chunk; leaves are level 0.
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Point lookup, descending one chunk per level.
    pub fn get(&self, store: &dyn ObjectStore, key: &Value) -> ValueResult<Option<Entry>> {
        let mut id = self.root;
        loop {
            match Node::load(store, &id)? {
                Node::Leaf(mut entries) => {
                    return Ok(entries
                        .binary_search_by(|e| e.key.cmp(key))
                        .ok()
                        .map(|i| entries.swap_remove(i)));
                }
                Node::Index { children, .. } => {
                    let i = children.partition_point(|c| c.last_key < *key);
                    match children.get(i) {
                        Some(child) => id = child.id,
                        None => return Ok(None),
                    }
                }
            }
        }
    }

    /// All entries in key order.
    pub fn iter<'a>(&self, store: &'a dyn ObjectStore) -> SequenceIter<'a> {
        SequenceIter::new(store, self.root)
    }

    pub fn edit(&self) -> SequenceEditor {
        SequenceEditor::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::InMemoryObjectStore;

    fn build(store: &InMemoryObjectStore, n: u32) -> Sequence {
        let mut builder = SequenceBuilder::with_pattern(store, 4);
        for i in 0..n {
            builder.push(Entry::map(Value::from(f64::from(i)), Value::from(format!("v{i}")))).unwrap();
        }
        builder.finish().unwrap()
    }

    #[test]
    fn empty_sequence_has_no_entries() {
        let store = InMemoryObjectStore::new();
        let seq = Sequence::empty(&store).unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.level(), 0);
        assert!(seq.get(&store, &Value::from("x")).unwrap().is_none());
        assert_eq!(seq.iter(&store).count(), 0);
    }

    #[test]
    fn get_finds_every_key_in_a_deep_tree() {
        let store = InMemoryObjectStore::new();
        let seq = build(&store, 500);
        assert!(seq.level() >= 2, "expected a multi-level tree, got level {}", seq.level());
        for i in (0..500).step_by(37) {
            let entry = seq.get(&store, &Value::from(f64::from(i))).unwrap().unwrap();
            assert_eq!(entry.value, Some(Value::from(format!("v{i}"))));
        }
        assert!(seq.get(&store, &Value::from(1000.0)).unwrap().is_none());
        assert!(seq.get(&store, &Value::from(0.5)).unwrap().is_none());
    }

    #[test]
    fn iter_yields_sorted_entries() {
        let store = InMemoryObjectStore::new();
        let seq = build(&store, 300);
        let keys: Vec<Value> = seq.iter(&store).map(|e| e.unwrap().key).collect();
        assert_eq!(keys.len(), 300);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn same_entries_build_same_tree() {
        let store = InMemoryObjectStore::new();
        let a = build(&store, 200);
        let b = build(&store, 200);
        assert_eq!(a, b);
    }
}
