//! Named records.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A named record whose fields are kept in field-name order.
///
/// Structs are small and held inline; nested maps and sets inside them are
/// still references to stored trees.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Struct {
    name: String,
    fields: BTreeMap<String, Value>,
}

impl Struct {
    pub fn new<K, I>(name: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in name order.
    pub fn fields(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Start building a modified copy of this struct.
    pub fn edit(&self) -> StructEditor {
        StructEditor {
            name: self.name.clone(),
            fields: self.fields.clone(),
        }
    }
}

/// Accumulates field changes and produces a new [`Struct`].
#[derive(Clone, Debug)]
pub struct StructEditor {
    name: String,
    fields: BTreeMap<String, Value>,
}

impl StructEditor {
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> &mut Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn remove(&mut self, field: &str) -> &mut Self {
        self.fields.remove(field);
        self
    }

    /// Give the edited struct a different name.
    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn finish(self) -> Struct {
        Struct {
            name: self.name,
            fields: self.fields,
        }
    }
}
