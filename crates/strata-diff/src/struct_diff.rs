//! Field-by-field diff of two structs.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::vec;

use strata_value::{Struct, Value};

use crate::change::ValueChanged;
use crate::error::DiffResult;

/// Lazy diff over the fields of two structs, in field-name order.
///
/// Keys are the field names as string values. The struct names are not
/// compared here; a merge treats structs with different names as
/// unmergeable before it ever diffs their fields.
#[derive(Debug)]
pub struct StructDiff {
    old: Peekable<vec::IntoIter<(String, Value)>>,
    new: Peekable<vec::IntoIter<(String, Value)>>,
}

impl StructDiff {
    pub fn new(old: &Struct, new: &Struct) -> Self {
        Self {
            old: owned_fields(old).into_iter().peekable(),
            new: owned_fields(new).into_iter().peekable(),
        }
    }
}

fn owned_fields(s: &Struct) -> Vec<(String, Value)> {
    s.fields().map(|(k, v)| (k.clone(), v.clone())).collect()
}

impl Iterator for StructDiff {
    type Item = DiffResult<ValueChanged>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let order = match (self.old.peek(), self.new.peek()) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((a, _)), Some((b, _))) => a.cmp(b),
            };
            match order {
                Ordering::Less => {
                    let (name, old) = self.old.next()?;
                    return Some(Ok(ValueChanged::removed(Value::String(name), old)));
                }
                Ordering::Greater => {
                    let (name, new) = self.new.next()?;
                    return Some(Ok(ValueChanged::added(Value::String(name), new)));
                }
                Ordering::Equal => {
                    let (name, old) = self.old.next()?;
                    let (_, new) = self.new.next()?;
                    if old != new {
                        return Some(Ok(ValueChanged::modified(Value::String(name), old, new)));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;

    #[test]
    fn diff_of_equal_structs_is_empty() {
        let s = Struct::new("P", [("x", Value::from(1.0))]);
        assert_eq!(StructDiff::new(&s, &s).count(), 0);
    }

    #[test]
    fn reports_fields_in_name_order() {
        let old = Struct::new(
            "P",
            [("a", Value::from(1.0)), ("b", Value::from(2.0)), ("c", Value::from(3.0))],
        );
        let new = Struct::new(
            "P",
            [("b", Value::from(2.0)), ("c", Value::from(30.0)), ("d", Value::from(true))],
        );
        let changes: Vec<_> = StructDiff::new(&old, &new).map(|c| c.unwrap()).collect();
        let summary: Vec<_> = changes.iter().map(|c| (c.key.clone(), c.kind)).collect();
        assert_eq!(
            summary,
            vec![
                (Value::from("a"), ChangeKind::Removed),
                (Value::from("c"), ChangeKind::Modified),
                (Value::from("d"), ChangeKind::Added),
            ]
        );
        assert_eq!(changes[1].new_value, Some(Value::from(30.0)));
    }

    #[test]
    fn struct_name_is_not_a_change() {
        let old = Struct::new("Old", [("x", Value::from(1.0))]);
        let new = Struct::new("New", [("x", Value::from(1.0))]);
        assert_eq!(StructDiff::new(&old, &new).count(), 0);
    }
}
