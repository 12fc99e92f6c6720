//! Ordered persistent sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strata_store::ObjectStore;

use crate::error::ValueResult;
use crate::sequence::{Entry, Sequence, SequenceBuilder, SequenceEditor, SequenceIter};
use crate::value::Value;

/// An ordered set of [`Value`]s, stored as a prolly tree of key-only entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Set {
    seq: Sequence,
}

impl Set {
    pub fn empty(store: &dyn ObjectStore) -> ValueResult<Self> {
        Ok(Self {
            seq: Sequence::empty(store)?,
        })
    }

    pub fn from_values<I>(store: &dyn ObjectStore, values: I) -> ValueResult<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let sorted: BTreeSet<Value> = values.into_iter().collect();
        let mut builder = SequenceBuilder::new(store);
        for value in sorted {
            builder.push(Entry::set(value))?;
        }
        Ok(Self {
            seq: builder.finish()?,
        })
    }

    pub fn len(&self) -> u64 {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn sequence(&self) -> &Sequence {
        &self.seq
    }

    pub fn contains(&self, store: &dyn ObjectStore, value: &Value) -> ValueResult<bool> {
        Ok(self.seq.get(store, value)?.is_some())
    }

    /// Elements in order.
    pub fn iter<'a>(&self, store: &'a dyn ObjectStore) -> SetIter<'a> {
        SetIter {
            inner: self.seq.iter(store),
        }
    }

    pub fn edit(&self) -> SetEditor {
        SetEditor {
            inner: self.seq.edit(),
        }
    }
}

pub struct SetIter<'a> {
    inner: SequenceIter<'a>,
}

impl Iterator for SetIter<'_> {
    type Item = ValueResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(|entry| entry.key))
    }
}

/// Accumulates changes to a [`Set`].
#[derive(Clone, Debug)]
pub struct SetEditor {
    inner: SequenceEditor,
}

impl SetEditor {
    pub fn insert(&mut self, value: Value) -> &mut Self {
        self.inner.insert(Entry::set(value));
        self
    }

    pub fn remove(&mut self, value: Value) -> &mut Self {
        self.inner.remove(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn apply(self, store: &dyn ObjectStore) -> ValueResult<Set> {
        Ok(Set {
            seq: self.inner.apply(store)?,
        })
    }
}
