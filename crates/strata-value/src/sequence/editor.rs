use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::Peekable;

use strata_store::ObjectStore;
use strata_types::ObjectId;
use tracing::debug;

use crate::error::ValueResult;
use crate::sequence::builder::SequenceBuilder;
use crate::sequence::node::{ChildRef, Entry, Node};
use crate::sequence::Sequence;
use crate::value::Value;

/// Batches inserts and removals against a base sequence.
///
/// [`apply`](Self::apply) walks the base tree from the root and only opens
/// chunks whose key range holds an edit, plus the few after an edit that the
/// chunker needs to fall back into step. Every other chunk is handed to the
/// builder by reference, so the cost of an apply follows the number of
/// edits and the tree height rather than the size of the base. The result is
/// the same tree a fresh build of the edited entries would produce.
#[derive(Clone, Debug)]
pub struct SequenceEditor {
    base: Sequence,
    /// `None` marks a removal.
    edits: BTreeMap<Value, Option<Entry>>,
}

impl SequenceEditor {
    pub(crate) fn new(base: Sequence) -> Self {
        Self {
            base,
            edits: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, entry: Entry) {
        self.edits.insert(entry.key.clone(), Some(entry));
    }

    pub fn remove(&mut self, key: Value) {
        self.edits.insert(key, None);
    }

    /// Number of pending edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn apply(self, store: &dyn ObjectStore) -> ValueResult<Sequence> {
        if self.edits.is_empty() {
            return Ok(self.base);
        }
        debug!(edits = self.edits.len(), base_len = self.base.len(), "applying sequence edits");

        let mut splice = Splice {
            store,
            builder: SequenceBuilder::new(store),
            edits: self.edits.into_iter().peekable(),
        };
        splice.descend(&self.base.root(), None)?;
        splice.builder.finish()
    }
}

/// One pass of edits over a base tree, feeding a builder.
struct Splice<'a> {
    store: &'a dyn ObjectStore,
    builder: SequenceBuilder<'a>,
    edits: Peekable<btree_map::IntoIter<Value, Option<Entry>>>,
}

impl Splice<'_> {
    /// Open chunk `id` and feed its content. `bound` is the chunk's last key;
    /// `None` marks the right edge of the tree, which also takes every edit
    /// past the end of the base.
    fn descend(&mut self, id: &ObjectId, bound: Option<&Value>) -> ValueResult<()> {
        match Node::load(self.store, id)? {
            Node::Leaf(entries) => self.splice_leaf(entries, bound),
            Node::Index { level, children } => {
                let last = children.len().saturating_sub(1);
                for (i, child) in children.iter().enumerate() {
                    if bound.is_none() && i == last {
                        self.descend(&child.id, None)?;
                    } else {
                        self.visit(child, usize::from(level) - 1)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Reuse `child` (a level-`level` chunk) whole when no edit falls in it
    /// and the builder is at a chunk boundary; otherwise open it.
    fn visit(&mut self, child: &ChildRef, level: usize) -> ValueResult<()> {
        let touched = self.edits.peek().is_some_and(|(key, _)| *key <= child.last_key);
        if !touched && self.builder.push_chunk(level, child)? {
            return Ok(());
        }
        self.descend(&child.id, Some(&child.last_key))
    }

    fn splice_leaf(&mut self, entries: Vec<Entry>, bound: Option<&Value>) -> ValueResult<()> {
        for entry in entries {
            while let Some((_, edit)) = self.edits.next_if(|(key, _)| *key < entry.key) {
                self.push_edit(edit)?;
            }
            match self.edits.next_if(|(key, _)| *key == entry.key) {
                Some((_, edit)) => self.push_edit(edit)?,
                None => self.builder.push(entry)?,
            }
        }
        while let Some((_, edit)) = self
            .edits
            .next_if(|(key, _)| bound.map_or(true, |last| key <= last))
        {
            self.push_edit(edit)?;
        }
        Ok(())
    }

    fn push_edit(&mut self, edit: Option<Entry>) -> ValueResult<()> {
        match edit {
            Some(entry) => self.builder.push(entry),
            None => Ok(()),
        }
    }
}
