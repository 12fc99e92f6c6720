//! Change records.

use std::fmt;

use strata_value::Value;

use crate::error::DiffResult;

/// What happened at a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// A single change between a parent collection and its descendant.
///
/// Struct fields are keyed by their name as a string value. Set elements are
/// carried as the new value when added and as the old value when removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueChanged {
    pub key: Value,
    pub kind: ChangeKind,
    /// Absent for [`ChangeKind::Added`].
    pub old_value: Option<Value>,
    /// Absent for [`ChangeKind::Removed`].
    pub new_value: Option<Value>,
}

impl ValueChanged {
    pub fn added(key: Value, new_value: Value) -> Self {
        Self {
            key,
            kind: ChangeKind::Added,
            old_value: None,
            new_value: Some(new_value),
        }
    }

    pub fn removed(key: Value, old_value: Value) -> Self {
        Self {
            key,
            kind: ChangeKind::Removed,
            old_value: Some(old_value),
            new_value: None,
        }
    }

    pub fn modified(key: Value, old_value: Value, new_value: Value) -> Self {
        Self {
            key,
            kind: ChangeKind::Modified,
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }
}

/// A fully collected diff.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub changes: Vec<ValueChanged>,
}

impl ChangeSet {
    /// Drain a stream, stopping at the first error.
    pub fn collect<I>(stream: I) -> DiffResult<Self>
    where
        I: IntoIterator<Item = DiffResult<ValueChanged>>,
    {
        let changes = stream.into_iter().collect::<DiffResult<Vec<_>>>()?;
        Ok(Self { changes })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn additions(&self) -> usize {
        self.count(ChangeKind::Added)
    }

    pub fn removals(&self) -> usize {
        self.count(ChangeKind::Removed)
    }

    pub fn modifications(&self) -> usize {
        self.count(ChangeKind::Modified)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;

    #[test]
    fn constructors_fill_the_right_sides() {
        let added = ValueChanged::added(Value::from("k"), Value::from(1.0));
        assert!(added.old_value.is_none());
        let removed = ValueChanged::removed(Value::from("k"), Value::from(1.0));
        assert!(removed.new_value.is_none());
        let modified = ValueChanged::modified(Value::from("k"), Value::from(1.0), Value::from(2.0));
        assert_eq!(modified.kind, ChangeKind::Modified);
    }

    #[test]
    fn change_set_counts() {
        let set = ChangeSet::collect(vec![
            Ok(ValueChanged::added(Value::from("a"), Value::from(1.0))),
            Ok(ValueChanged::removed(Value::from("b"), Value::from(1.0))),
            Ok(ValueChanged::added(Value::from("c"), Value::from(1.0))),
        ])
        .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.additions(), 2);
        assert_eq!(set.removals(), 1);
        assert_eq!(set.modifications(), 0);
    }

    #[test]
    fn change_set_stops_at_error() {
        let result = ChangeSet::collect(vec![
            Ok(ValueChanged::added(Value::from("a"), Value::from(1.0))),
            Err(DiffError::ProducerPanicked),
        ]);
        assert!(matches!(result, Err(DiffError::ProducerPanicked)));
    }
}
