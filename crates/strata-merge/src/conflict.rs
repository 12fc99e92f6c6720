//! Conflicts and merge outcomes.

use std::fmt;

use strata_value::Value;

use crate::candidate::Candidate;
use crate::path::Path;

/// A key both descendants changed in ways that cannot be combined.
///
/// A side is `None` when that side has no value at the path (never had one,
/// or removed it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub path: Path,
    pub base: Option<Value>,
    pub ours: Option<Value>,
    pub theirs: Option<Value>,
}

impl Conflict {
    /// The same conflict seen from the other side.
    pub fn swapped(&self) -> Self {
        Self {
            path: self.path.clone(),
            base: self.base.clone(),
            ours: self.theirs.clone(),
            theirs: self.ours.clone(),
        }
    }
}

struct Side<'a>(&'a Option<Value>);

impl fmt::Display for Side<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "<absent>"),
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: base={} ours={} theirs={}",
            self.path,
            Side(&self.base),
            Side(&self.ours),
            Side(&self.theirs)
        )
    }
}

/// Result of a three-way merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Value,
    /// Unresolved conflicts in path order. The merged value holds the
    /// ancestor's value at each of these paths.
    pub conflicts: Vec<Conflict>,
    /// Conflicts settled automatically by the configured strategy.
    pub resolved: Vec<Conflict>,
}

impl MergeOutcome {
    pub(crate) fn clean(merged: Value) -> Self {
        Self {
            merged,
            conflicts: Vec::new(),
            resolved: Vec::new(),
        }
    }

    /// True when nothing is left for a human to decide.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn merged_candidate(&self) -> Option<Candidate> {
        Candidate::from_value(&self.merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathElement;

    #[test]
    fn display_marks_absent_sides() {
        let conflict = Conflict {
            path: Path::root().child(PathElement::Index(Value::from("a"))),
            base: Some(Value::from(1.0)),
            ours: None,
            theirs: Some(Value::from(3.0)),
        };
        assert_eq!(conflict.to_string(), "[\"a\"]: base=1 ours=<absent> theirs=3");
    }

    #[test]
    fn swapped_exchanges_sides_only() {
        let conflict = Conflict {
            path: Path::root(),
            base: None,
            ours: Some(Value::from(true)),
            theirs: Some(Value::from(false)),
        };
        let swapped = conflict.swapped();
        assert_eq!(swapped.path, conflict.path);
        assert_eq!(swapped.ours, conflict.theirs);
        assert_eq!(swapped.swapped(), conflict);
    }

    #[test]
    fn clean_outcome() {
        let outcome = MergeOutcome::clean(Value::from(1.0));
        assert!(outcome.is_clean());
        assert!(outcome.merged_candidate().is_none());
    }
}
