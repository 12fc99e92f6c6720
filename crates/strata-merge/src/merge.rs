//! The three-way merge orchestrator.

use std::cmp::Ordering;
use std::thread;

use strata_diff::{BackgroundDiff, DiffResult, ValueChanged};
use strata_store::ObjectStore;
use strata_value::Value;
use tracing::{debug, trace};

use crate::candidate::{Candidate, CandidateEditor};
use crate::config::{ConflictStrategy, MergeOptions};
use crate::conflict::{Conflict, MergeOutcome};
use crate::error::{MergeError, MergeResult};
use crate::path::Path;

/// Runs three-way merges against one store.
pub struct Merger<'a> {
    store: &'a dyn ObjectStore,
    options: MergeOptions,
}

/// A nested merge found while walking one level, run after the walk.
struct SubMerge {
    key: Value,
    path: Path,
    base: Candidate,
    ours: Candidate,
    theirs: Candidate,
}

/// Per-key outcome at one level, kept in key order.
enum Slot {
    Conflict(Conflict),
    Resolved(Conflict),
    Nested(usize),
}

impl<'a> Merger<'a> {
    pub fn new(store: &'a dyn ObjectStore, options: MergeOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge any three values.
    ///
    /// Values that are not all collections of the same kind can only be
    /// merged when at most one side changed; otherwise the result is a single
    /// conflict at the root.
    pub fn merge_values(&self, base: &Value, ours: &Value, theirs: &Value) -> MergeResult<MergeOutcome> {
        if let Some(outcome) = short_circuit(base, ours, theirs) {
            return Ok(outcome);
        }
        match (
            Candidate::from_value(base),
            Candidate::from_value(ours),
            Candidate::from_value(theirs),
        ) {
            (Some(b), Some(o), Some(t)) => self.merge_candidates(&b, &o, &t),
            _ => Ok(self.root_conflict(base, ours, theirs)),
        }
    }

    /// Merge three collections.
    ///
    /// Structs are only merged field by field when both sides carry the same
    /// name. A rename on one side against any change on the other is a root
    /// conflict. When both sides agree on a new name the result takes it.
    pub fn merge_candidates(
        &self,
        base: &Candidate,
        ours: &Candidate,
        theirs: &Candidate,
    ) -> MergeResult<MergeOutcome> {
        if !(base.same_variant(ours) && ours.mergeable_with(theirs)) {
            if let Some(outcome) = short_circuit(&base.value(), &ours.value(), &theirs.value()) {
                return Ok(outcome);
            }
            debug!(
                base = %base.kind(),
                ours = %ours.kind(),
                theirs = %theirs.kind(),
                "unmergeable candidates at root"
            );
            return Ok(self.root_conflict(&base.value(), &ours.value(), &theirs.value()));
        }
        self.merge_at(base, ours, theirs, &Path::root())
    }

    fn root_conflict(&self, base: &Value, ours: &Value, theirs: &Value) -> MergeOutcome {
        let conflict = Conflict {
            path: Path::root(),
            base: Some(base.clone()),
            ours: Some(ours.clone()),
            theirs: Some(theirs.clone()),
        };
        match self.options.strategy {
            ConflictStrategy::Report => MergeOutcome {
                merged: base.clone(),
                conflicts: vec![conflict],
                resolved: Vec::new(),
            },
            ConflictStrategy::Ours => MergeOutcome {
                merged: ours.clone(),
                conflicts: Vec::new(),
                resolved: vec![conflict],
            },
            ConflictStrategy::Theirs => MergeOutcome {
                merged: theirs.clone(),
                conflicts: Vec::new(),
                resolved: vec![conflict],
            },
        }
    }

    /// Merge three candidates of one variant located at `path`.
    ///
    /// `ours` and `theirs` must be mergeable with each other; a struct
    /// result is named after them even if `base` had another name.
    fn merge_at(
        &self,
        base: &Candidate,
        ours: &Candidate,
        theirs: &Candidate,
        path: &Path,
    ) -> MergeResult<MergeOutcome> {
        let (ours_hash, theirs_hash, base_hash) = (ours.hash(), theirs.hash(), base.hash());
        if ours_hash == theirs_hash {
            trace!(%path, "both sides agree");
            return Ok(MergeOutcome::clean(ours.value()));
        }
        if ours_hash == base_hash {
            trace!(%path, "only theirs changed");
            return Ok(MergeOutcome::clean(theirs.value()));
        }
        if theirs_hash == base_hash {
            trace!(%path, "only ours changed");
            return Ok(MergeOutcome::clean(ours.value()));
        }

        debug!(%path, kind = %base.kind(), "merging diverged collections");
        let ours_changes = ours.diff(self.store, base)?;
        let theirs_changes = theirs.diff(self.store, base)?;

        if self.options.parallel_diffs {
            let buffer = self.options.diff_buffer;
            thread::scope(|s| {
                let ours_changes = BackgroundDiff::spawn(s, ours_changes, buffer);
                let theirs_changes = BackgroundDiff::spawn(s, theirs_changes, buffer);
                self.join(base, ours, path, ours_changes, theirs_changes)
            })
        } else {
            self.join(base, ours, path, ours_changes, theirs_changes)
        }
    }

    /// Walk both change streams in key order and build the merged value.
    ///
    /// The streams are owned here so that returning early (on error) drops
    /// them, which stops and joins any background producers.
    fn join<I, J>(
        &self,
        base: &Candidate,
        ours: &Candidate,
        path: &Path,
        mut ours_changes: I,
        mut theirs_changes: J,
    ) -> MergeResult<MergeOutcome>
    where
        I: Iterator<Item = DiffResult<ValueChanged>>,
        J: Iterator<Item = DiffResult<ValueChanged>>,
    {
        let mut editor = base.editor();
        editor.adopt_name(ours);
        let mut slots = Vec::new();
        let mut jobs = Vec::new();

        let mut ours_head = pull(&mut ours_changes)?;
        let mut theirs_head = pull(&mut theirs_changes)?;
        loop {
            match (ours_head.take(), theirs_head.take()) {
                (None, None) => break,
                (Some(o), None) => {
                    editor.apply(&o)?;
                    ours_head = pull(&mut ours_changes)?;
                }
                (None, Some(t)) => {
                    editor.apply(&t)?;
                    theirs_head = pull(&mut theirs_changes)?;
                }
                (Some(o), Some(t)) => match o.key.cmp(&t.key) {
                    Ordering::Less => {
                        editor.apply(&o)?;
                        ours_head = pull(&mut ours_changes)?;
                        theirs_head = Some(t);
                    }
                    Ordering::Greater => {
                        editor.apply(&t)?;
                        theirs_head = pull(&mut theirs_changes)?;
                        ours_head = Some(o);
                    }
                    Ordering::Equal => {
                        self.merge_key(base, ours, path, o, t, &mut editor, &mut slots, &mut jobs)?;
                        ours_head = pull(&mut ours_changes)?;
                        theirs_head = pull(&mut theirs_changes)?;
                    }
                },
            }
        }
        drop(ours_changes);
        drop(theirs_changes);

        let mut nested = self.run_sub_merges(&jobs)?;
        for (job, outcome) in jobs.iter().zip(&nested) {
            editor.put(&job.key, Some(&outcome.merged))?;
        }

        let mut conflicts = Vec::new();
        let mut resolved = Vec::new();
        for slot in slots {
            match slot {
                Slot::Conflict(c) => conflicts.push(c),
                Slot::Resolved(c) => resolved.push(c),
                Slot::Nested(i) => {
                    conflicts.append(&mut nested[i].conflicts);
                    resolved.append(&mut nested[i].resolved);
                }
            }
        }

        let merged = editor.finish(self.store)?;
        debug!(%path, conflicts = conflicts.len(), resolved = resolved.len(), "level merged");
        Ok(MergeOutcome {
            merged: merged.into(),
            conflicts,
            resolved,
        })
    }

    /// Both sides changed `key`.
    #[allow(clippy::too_many_arguments)]
    fn merge_key(
        &self,
        base: &Candidate,
        ours: &Candidate,
        path: &Path,
        o: ValueChanged,
        t: ValueChanged,
        editor: &mut CandidateEditor,
        slots: &mut Vec<Slot>,
        jobs: &mut Vec<SubMerge>,
    ) -> MergeResult<()> {
        // Covers both-removed as well as identical new values.
        if o.new_value == t.new_value {
            return editor.apply(&o);
        }

        let key_path = ours.path_concat(&o, path)?;
        let nested = match (&o.new_value, &t.new_value) {
            (Some(ov), Some(tv)) => Candidate::from_value(ov)
                .zip(Candidate::from_value(tv))
                .filter(|(oc, tc)| oc.mergeable_with(tc)),
            _ => None,
        };

        if let Some((nested_ours, nested_theirs)) = nested {
            let nested_base = match base.get(self.store, &o.key)?.as_ref().and_then(Candidate::from_value) {
                Some(b) if b.same_variant(&nested_ours) => b,
                _ => nested_ours.empty_like(self.store)?,
            };
            trace!(path = %key_path, kind = %nested_ours.kind(), "recursing");
            slots.push(Slot::Nested(jobs.len()));
            jobs.push(SubMerge {
                key: o.key,
                path: key_path,
                base: nested_base,
                ours: nested_ours,
                theirs: nested_theirs,
            });
            return Ok(());
        }

        let conflict = Conflict {
            path: key_path,
            base: o.old_value.clone().or_else(|| t.old_value.clone()),
            ours: o.new_value.clone(),
            theirs: t.new_value.clone(),
        };
        match self.options.strategy {
            ConflictStrategy::Report => {
                debug!(path = %conflict.path, "conflict");
                slots.push(Slot::Conflict(conflict));
            }
            ConflictStrategy::Ours => {
                editor.apply(&o)?;
                slots.push(Slot::Resolved(conflict));
            }
            ConflictStrategy::Theirs => {
                editor.apply(&t)?;
                slots.push(Slot::Resolved(conflict));
            }
        }
        Ok(())
    }

    fn run_sub_merges(&self, jobs: &[SubMerge]) -> MergeResult<Vec<MergeOutcome>> {
        if !self.options.parallel_submerges || jobs.len() < 2 {
            return jobs
                .iter()
                .map(|job| self.merge_at(&job.base, &job.ours, &job.theirs, &job.path))
                .collect();
        }

        trace!(count = jobs.len(), "running nested merges in parallel");
        thread::scope(|s| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|job| s.spawn(move || self.merge_at(&job.base, &job.ours, &job.theirs, &job.path)))
                .collect();
            // Join every handle before reporting, so no thread outlives an error.
            let results: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
            results
                .into_iter()
                .map(|r| {
                    r.map_err(|_| MergeError::InvariantViolation("nested merge panicked".into()))?
                })
                .collect()
        })
    }
}

/// The identity cases that need no diffing.
fn short_circuit(base: &Value, ours: &Value, theirs: &Value) -> Option<MergeOutcome> {
    let (base_hash, ours_hash, theirs_hash) = (base.hash(), ours.hash(), theirs.hash());
    if ours_hash == theirs_hash || theirs_hash == base_hash {
        Some(MergeOutcome::clean(ours.clone()))
    } else if ours_hash == base_hash {
        Some(MergeOutcome::clean(theirs.clone()))
    } else {
        None
    }
}

fn pull<I>(changes: &mut I) -> MergeResult<Option<ValueChanged>>
where
    I: Iterator<Item = DiffResult<ValueChanged>>,
{
    changes.next().transpose().map_err(MergeError::from)
}

impl std::fmt::Debug for Merger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merger").field("options", &self.options).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathElement;
    use strata_store::{FaultInjectingStore, InMemoryObjectStore};
    use strata_value::{Map, Set, Struct};

    fn map(store: &dyn ObjectStore, entries: Vec<(&str, Value)>) -> Value {
        Map::from_entries(store, entries.into_iter().map(|(k, v)| (Value::from(k), v)))
            .unwrap()
            .into()
    }

    fn num(x: f64) -> Value {
        Value::from(x)
    }

    fn both_modes() -> [MergeOptions; 2] {
        [MergeOptions::sequential(), MergeOptions::default()]
    }

    #[test]
    fn convergent_sides_merge_to_themselves() {
        let store = InMemoryObjectStore::new();
        let base = map(&store, vec![("a", num(1.0))]);
        let x = map(&store, vec![("a", num(5.0)), ("b", num(2.0))]);
        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&base, &x, &x)
            .unwrap();
        assert_eq!(outcome.merged, x);
        assert!(outcome.is_clean());
    }

    #[test]
    fn one_sided_change_is_taken_verbatim() {
        let store = InMemoryObjectStore::new();
        let base = map(&store, vec![("a", num(1.0))]);
        let changed = map(&store, vec![("a", num(2.0))]);
        let merger = Merger::new(&store, MergeOptions::default());

        store.reset_read_count();
        let outcome = merger.merge_values(&base, &base, &changed).unwrap();
        assert_eq!(outcome.merged, changed);
        assert!(outcome.is_clean());

        let outcome = merger.merge_values(&base, &changed, &base).unwrap();
        assert_eq!(outcome.merged, changed);
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn disjoint_changes_combine() {
        for options in both_modes() {
            let store = InMemoryObjectStore::new();
            let base = map(&store, vec![("a", num(1.0)), ("b", num(2.0))]);
            let ours = map(&store, vec![("a", num(10.0)), ("b", num(2.0))]);
            let theirs = map(&store, vec![("a", num(1.0)), ("c", num(3.0))]);

            let outcome = Merger::new(&store, options)
                .merge_values(&base, &ours, &theirs)
                .unwrap();
            assert!(outcome.is_clean());
            assert_eq!(
                outcome.merged,
                map(&store, vec![("a", num(10.0)), ("c", num(3.0))])
            );
        }
    }

    #[test]
    fn nested_maps_merge_recursively() {
        for options in both_modes() {
            let store = InMemoryObjectStore::new();
            let inner = |entries: Vec<(&str, Value)>| map(&store, entries);
            let base = map(&store, vec![("a", inner(vec![("x", num(1.0))]))]);
            let ours = map(&store, vec![("a", inner(vec![("x", num(1.0)), ("y", num(2.0))]))]);
            let theirs = map(&store, vec![("a", inner(vec![("x", num(1.0)), ("z", num(3.0))]))]);

            let outcome = Merger::new(&store, options)
                .merge_values(&base, &ours, &theirs)
                .unwrap();
            assert!(outcome.is_clean());
            let expected = map(
                &store,
                vec![("a", inner(vec![("x", num(1.0)), ("y", num(2.0)), ("z", num(3.0))]))],
            );
            assert_eq!(outcome.merged, expected);
        }
    }

    #[test]
    fn hard_conflict_keeps_base_and_reports() {
        let store = InMemoryObjectStore::new();
        let base = map(&store, vec![("a", num(1.0)), ("k", num(0.0))]);
        let ours = map(&store, vec![("a", num(2.0)), ("k", num(0.0))]);
        let theirs = map(&store, vec![("a", num(3.0)), ("k", num(9.0))]);

        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&base, &ours, &theirs)
            .unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        let conflict = &outcome.conflicts[0];
        assert_eq!(conflict.path.elements(), &[PathElement::Index(Value::from("a"))]);
        assert_eq!(conflict.base, Some(num(1.0)));
        assert_eq!(conflict.ours, Some(num(2.0)));
        assert_eq!(conflict.theirs, Some(num(3.0)));
        assert_eq!(
            outcome.merged,
            map(&store, vec![("a", num(1.0)), ("k", num(9.0))])
        );
    }

    #[test]
    fn strategies_pick_a_side() {
        let store = InMemoryObjectStore::new();
        let base = map(&store, vec![("a", num(1.0))]);
        let ours = map(&store, vec![("a", num(2.0))]);
        let theirs = map(&store, vec![]);

        let outcome = Merger::new(&store, MergeOptions::default().with_strategy(ConflictStrategy::Ours))
            .merge_values(&base, &ours, &theirs)
            .unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.resolved.len(), 1);
        assert_eq!(outcome.resolved[0].theirs, None);
        assert_eq!(outcome.merged, ours);

        let outcome = Merger::new(&store, MergeOptions::default().with_strategy(ConflictStrategy::Theirs))
            .merge_values(&base, &ours, &theirs)
            .unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.merged, theirs);
    }

    #[test]
    fn removed_on_both_sides_is_not_a_conflict() {
        let store = InMemoryObjectStore::new();
        let base = map(&store, vec![("a", num(1.0)), ("b", num(2.0))]);
        let ours = map(&store, vec![("b", num(3.0))]);
        let theirs = map(&store, vec![("b", num(2.0)), ("c", num(4.0))]);

        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&base, &ours, &theirs)
            .unwrap();
        assert!(outcome.is_clean());
        assert_eq!(
            outcome.merged,
            map(&store, vec![("b", num(3.0)), ("c", num(4.0))])
        );
    }

    #[test]
    fn variant_mismatch_is_a_conflict_without_recursion() {
        let store = InMemoryObjectStore::new();
        let base = Struct::new("Doc", [("f", num(1.0))]);
        let mut ours = base.edit();
        ours.set("f", Set::from_values(&store, [num(1.0)]).unwrap().into());
        let mut theirs = base.edit();
        theirs.set("f", map(&store, vec![("x", num(1.0))]));

        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&base.clone().into(), &ours.finish().into(), &theirs.finish().into())
            .unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].path.to_string(), ".f");
        assert_eq!(outcome.merged, Value::from(base));
    }

    fn point(name: &str, x: f64, y: f64) -> Value {
        Struct::new(name, [("x", num(x)), ("y", num(y))]).into()
    }

    #[test]
    fn rename_against_field_edit_is_a_root_conflict() {
        for options in both_modes() {
            let store = InMemoryObjectStore::new();
            let base = point("P", 1.0, 1.0);
            let renamed = point("Q", 2.0, 1.0);
            let edited = point("P", 1.0, 2.0);
            let merger = Merger::new(&store, options);

            let outcome = merger.merge_values(&base, &renamed, &edited).unwrap();
            assert_eq!(outcome.conflicts.len(), 1);
            let conflict = &outcome.conflicts[0];
            assert!(conflict.path.is_root());
            assert_eq!(conflict.ours, Some(renamed.clone()));
            assert_eq!(conflict.theirs, Some(edited.clone()));
            assert_eq!(outcome.merged, base);

            let swapped = merger.merge_values(&base, &edited, &renamed).unwrap();
            assert_eq!(swapped.conflicts.len(), 1);
            assert!(swapped.conflicts[0].path.is_root());
            assert_eq!(swapped.conflicts[0].ours, Some(edited.clone()));
            assert_eq!(swapped.conflicts[0].theirs, Some(renamed.clone()));
            assert_eq!(swapped.merged, base);
        }
    }

    #[test]
    fn nested_rename_against_field_edit_conflicts_at_the_key() {
        for options in both_modes() {
            let store = InMemoryObjectStore::new();
            let base = map(&store, vec![("p", point("P", 1.0, 1.0)), ("n", num(0.0))]);
            let ours = map(&store, vec![("p", point("Q", 2.0, 1.0)), ("n", num(0.0))]);
            let theirs = map(&store, vec![("p", point("P", 1.0, 2.0)), ("n", num(5.0))]);
            let merger = Merger::new(&store, options);

            let outcome = merger.merge_values(&base, &ours, &theirs).unwrap();
            let paths: Vec<String> = outcome.conflicts.iter().map(|c| c.path.to_string()).collect();
            assert_eq!(paths, ["[\"p\"]"]);
            assert_eq!(
                outcome.merged,
                map(&store, vec![("p", point("P", 1.0, 1.0)), ("n", num(5.0))])
            );

            let swapped = merger.merge_values(&base, &theirs, &ours).unwrap();
            assert_eq!(swapped.conflicts.len(), 1);
            assert_eq!(swapped.conflicts[0].ours, Some(point("P", 1.0, 2.0)));
            assert_eq!(swapped.conflicts[0].theirs, Some(point("Q", 2.0, 1.0)));
            assert_eq!(swapped.merged, outcome.merged);
        }
    }

    #[test]
    fn rename_resolves_by_strategy() {
        let store = InMemoryObjectStore::new();
        let base = point("P", 1.0, 1.0);
        let renamed = point("Q", 1.0, 1.0);
        let edited = point("P", 1.0, 2.0);
        let outcome = Merger::new(&store, MergeOptions::default().with_strategy(ConflictStrategy::Ours))
            .merge_values(&base, &renamed, &edited)
            .unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.resolved.len(), 1);
        assert_eq!(outcome.merged, renamed);
    }

    #[test]
    fn agreed_rename_keeps_the_new_name() {
        for options in both_modes() {
            let store = InMemoryObjectStore::new();
            let merger = Merger::new(&store, options);
            let outcome = merger
                .merge_values(&point("P", 1.0, 1.0), &point("Q", 2.0, 1.0), &point("Q", 1.0, 2.0))
                .unwrap();
            assert!(outcome.is_clean());
            assert_eq!(outcome.merged, point("Q", 2.0, 2.0));

            let base = map(&store, vec![("p", point("P", 1.0, 1.0))]);
            let ours = map(&store, vec![("p", point("Q", 2.0, 1.0))]);
            let theirs = map(&store, vec![("p", point("Q", 1.0, 2.0))]);
            let outcome = merger.merge_values(&base, &ours, &theirs).unwrap();
            assert!(outcome.is_clean());
            assert_eq!(outcome.merged, map(&store, vec![("p", point("Q", 2.0, 2.0))]));
        }
    }

    #[test]
    fn root_mismatch_is_a_root_conflict() {
        let store = InMemoryObjectStore::new();
        let base = map(&store, vec![]);
        let ours = num(1.0);
        let theirs = Value::from("x");
        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&base, &ours, &theirs)
            .unwrap();
        assert_eq!(outcome.conflicts.len(), 1);
        assert!(outcome.conflicts[0].path.is_root());
        assert_eq!(outcome.merged, base);
    }

    #[test]
    fn nested_struct_without_base_merges_against_empty() {
        let store = InMemoryObjectStore::new();
        let base = map(&store, vec![]);
        let ours = map(&store, vec![("p", Struct::new("P", [("x", num(1.0))]).into())]);
        let theirs = map(&store, vec![("p", Struct::new("P", [("y", num(2.0))]).into())]);

        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&base, &ours, &theirs)
            .unwrap();
        assert!(outcome.is_clean());
        let expected = map(
            &store,
            vec![("p", Struct::new("P", [("x", num(1.0)), ("y", num(2.0))]).into())],
        );
        assert_eq!(outcome.merged, expected);
    }

    #[test]
    fn nested_conflicts_carry_full_paths_in_key_order() {
        let options = MergeOptions {
            parallel_submerges: true,
            ..MergeOptions::default()
        };
        let store = InMemoryObjectStore::new();
        let leaf = |v: f64| map(&store, vec![("v", num(v))]);
        let base = map(&store, vec![("a", leaf(0.0)), ("b", leaf(0.0)), ("c", leaf(0.0))]);
        let ours = map(&store, vec![("a", leaf(1.0)), ("b", leaf(1.0)), ("c", leaf(1.0))]);
        let theirs = map(&store, vec![("a", leaf(2.0)), ("b", leaf(2.0)), ("c", leaf(2.0))]);

        let outcome = Merger::new(&store, options)
            .merge_values(&base, &ours, &theirs)
            .unwrap();
        let paths: Vec<String> = outcome.conflicts.iter().map(|c| c.path.to_string()).collect();
        assert_eq!(paths, ["[\"a\"][\"v\"]", "[\"b\"][\"v\"]", "[\"c\"][\"v\"]"]);
        assert_eq!(outcome.merged, base);
    }

    #[test]
    fn sets_union_additions_and_removals() {
        let store = InMemoryObjectStore::new();
        let set = |xs: &[f64]| -> Value {
            Set::from_values(&store, xs.iter().map(|x| num(*x))).unwrap().into()
        };
        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&set(&[1.0, 2.0, 3.0]), &set(&[1.0, 2.0, 4.0]), &set(&[2.0, 3.0, 5.0]))
            .unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.merged, set(&[2.0, 4.0, 5.0]));
    }

    #[test]
    fn merged_value_shares_untouched_chunks() {
        let store = InMemoryObjectStore::new();
        let base = Map::from_entries(
            &store,
            (0..5000).map(|i| (num(f64::from(i)), Value::from(format!("v{i}")))),
        )
        .unwrap();
        let mut ours = base.edit();
        ours.set(num(10.0), Value::from("ours"));
        let ours = ours.apply(&store).unwrap();
        let mut theirs = base.edit();
        theirs.set(num(4000.0), Value::from("theirs"));
        let theirs = theirs.apply(&store).unwrap();

        let before = store.len();
        let outcome = Merger::new(&store, MergeOptions::default())
            .merge_values(&base.into(), &ours.into(), &theirs.into())
            .unwrap();
        assert!(outcome.is_clean());
        assert!(store.len() - before < 20, "merge wrote {} new chunks", store.len() - before);
        let merged = outcome.merged.as_map().unwrap();
        assert_eq!(merged.get(&store, &num(10.0)).unwrap(), Some(Value::from("ours")));
        assert_eq!(merged.get(&store, &num(4000.0)).unwrap(), Some(Value::from("theirs")));
    }

    #[test]
    fn merge_reads_follow_the_changes_not_the_size() {
        for options in both_modes() {
            let store = InMemoryObjectStore::new();
            let base = Map::from_entries(
                &store,
                (0..20_000).map(|i| (num(f64::from(i)), Value::from(format!("v{i}")))),
            )
            .unwrap();
            let mut ours = base.edit();
            ours.set(num(123.0), Value::from("ours"));
            let ours = ours.apply(&store).unwrap();
            let mut theirs = base.edit();
            theirs.remove(num(17_000.0));
            let theirs = theirs.apply(&store).unwrap();

            store.reset_read_count();
            let outcome = Merger::new(&store, options)
                .merge_values(&base.into(), &ours.into(), &theirs.into())
                .unwrap();
            let reads = store.read_count();
            assert!(outcome.is_clean());
            assert!(reads < 60, "merge read {reads} chunks");

            let merged = outcome.merged.as_map().unwrap();
            assert_eq!(merged.len(), 19_999);
            assert_eq!(merged.get(&store, &num(123.0)).unwrap(), Some(Value::from("ours")));
            assert_eq!(merged.get(&store, &num(17_000.0)).unwrap(), None);
        }
    }

    #[test]
    fn storage_failure_aborts_the_merge() {
        for options in both_modes() {
            let store = FaultInjectingStore::new(InMemoryObjectStore::new());
            let base = map(&store, vec![("a", num(1.0))]);
            let ours = map(&store, vec![("a", num(2.0))]);
            let theirs = map(&store, vec![("a", num(1.0)), ("b", num(3.0))]);
            store.fail_all_reads();

            let err = Merger::new(&store, options)
                .merge_values(&base, &ours, &theirs)
                .unwrap_err();
            assert!(matches!(err, MergeError::StorageRead(_)));
        }
    }
}
