//! Ordered persistent maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_store::ObjectStore;

use crate::error::{ValueError, ValueResult};
use crate::sequence::{Entry, Sequence, SequenceBuilder, SequenceEditor, SequenceIter};
use crate::value::Value;

/// An ordered map from [`Value`] to [`Value`], stored as a prolly tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Map {
    seq: Sequence,
}

impl Map {
    pub fn empty(store: &dyn ObjectStore) -> ValueResult<Self> {
        Ok(Self {
            seq: Sequence::empty(store)?,
        })
    }

    /// Build a map from unordered pairs; for duplicate keys the last one wins.
    pub fn from_entries<I>(store: &dyn ObjectStore, entries: I) -> ValueResult<Self>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let sorted: BTreeMap<Value, Value> = entries.into_iter().collect();
        let mut builder = SequenceBuilder::new(store);
        for (key, value) in sorted {
            builder.push(Entry::map(key, value))?;
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

    pub fn get(&self, store: &dyn ObjectStore, key: &Value) -> ValueResult<Option<Value>> {
        match self.seq.get(store, key)? {
            Some(entry) => entry_value(entry).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, store: &dyn ObjectStore, key: &Value) -> ValueResult<bool> {
        Ok(self.seq.get(store, key)?.is_some())
    }

    /// Entries in key order.
    pub fn iter<'a>(&self, store: &'a dyn ObjectStore) -> MapIter<'a> {
        MapIter {
            inner: self.seq.iter(store),
        }
    }

    pub fn edit(&self) -> MapEditor {
        MapEditor {
            inner: self.seq.edit(),
        }
    }
}

fn entry_value(entry: Entry) -> ValueResult<Value> {
    let Entry { key, value } = entry;
    value.ok_or_else(|| ValueError::MalformedEntry(format!("map entry {key} has no value")))
}

/// Iterator over `(key, value)` pairs of a [`Map`].
pub struct MapIter<'a> {
    inner: SequenceIter<'a>,
}

impl Iterator for MapIter<'_> {
    type Item = ValueResult<(Value, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        let key = entry.key.clone();
        Some(entry_value(entry).map(|value| (key, value)))
    }
}

/// Accumulates changes to a [`Map`].
#[derive(Clone, Debug)]
pub struct MapEditor {
    inner: SequenceEditor,
}

impl MapEditor {
    pub fn set(&mut self, key: Value, value: Value) -> &mut Self {
        self.inner.insert(Entry::map(key, value));
        self
    }

    pub fn remove(&mut self, key: Value) -> &mut Self {
        self.inner.remove(key);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn apply(self, store: &dyn ObjectStore) -> ValueResult<Map> {
        Ok(Map {
            seq: self.inner.apply(store)?,
        })
    }
}
