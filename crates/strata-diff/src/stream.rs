//! Entry points for diffing each collection kind.

use strata_store::ObjectStore;
use strata_value::{Map, Set, Struct};

use crate::change::ValueChanged;
use crate::error::DiffResult;
use crate::sequence_diff::SequenceDiff;
use crate::struct_diff::StructDiff;

/// An ordered change stream over any collection kind.
#[derive(Debug)]
pub enum DiffStream<'a> {
    Sequence(SequenceDiff<'a>),
    Struct(StructDiff),
}

impl Iterator for DiffStream<'_> {
    type Item = DiffResult<ValueChanged>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Sequence(diff) => diff.next(),
            Self::Struct(diff) => diff.next(),
        }
    }
}

/// Changes from `old` to `new`, ordered by key.
pub fn diff_maps<'a>(store: &'a dyn ObjectStore, old: &Map, new: &Map) -> DiffStream<'a> {
    DiffStream::Sequence(SequenceDiff::new(store, old.sequence(), new.sequence()))
}

/// Elements added to or removed from `old`, ordered by element.
pub fn diff_sets<'a>(store: &'a dyn ObjectStore, old: &Set, new: &Set) -> DiffStream<'a> {
    DiffStream::Sequence(SequenceDiff::new(store, old.sequence(), new.sequence()))
}

/// Field changes from `old` to `new`, ordered by field name.
pub fn diff_structs<'a>(old: &Struct, new: &Struct) -> DiffStream<'a> {
    DiffStream::Struct(StructDiff::new(old, new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{ChangeKind, ChangeSet};
    use strata_store::InMemoryObjectStore;
    use strata_value::Value;

    #[test]
    fn map_stream_is_lazy() {
        let store = InMemoryObjectStore::new();
        let old = Map::from_entries(
            &store,
            (0..500).map(|i| (Value::from(f64::from(i)), Value::from(true))),
        )
        .unwrap();
        let new = Map::empty(&store).unwrap();

        let mut stream = diff_maps(&store, &old, &new);
        let first = stream.next().unwrap().unwrap();
        assert_eq!(first.key, Value::from(0.0));
        assert_eq!(first.kind, ChangeKind::Removed);
        // Dropping here abandons the rest of the walk.
    }

    #[test]
    fn set_stream_collects() {
        let store = InMemoryObjectStore::new();
        let old = Set::from_values(&store, [Value::from("a")]).unwrap();
        let new = Set::from_values(&store, [Value::from("a"), Value::from("b")]).unwrap();
        let changes = ChangeSet::collect(diff_sets(&store, &old, &new)).unwrap();
        assert_eq!(changes.additions(), 1);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn struct_stream_collects() {
        let old = Struct::new("P", [("x", Value::from(1.0))]);
        let new = Struct::new("P", [("x", Value::from(2.0))]);
        let changes = ChangeSet::collect(diff_structs(&old, &new)).unwrap();
        assert_eq!(changes.modifications(), 1);
    }
}
