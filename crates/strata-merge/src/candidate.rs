//! A uniform view over the mergeable collection kinds.

use strata_diff::{diff_maps, diff_sets, diff_structs, DiffStream, ValueChanged};
use strata_store::ObjectStore;
use strata_types::ObjectId;
use strata_value::{Kind, Map, MapEditor, Set, SetEditor, Struct, StructEditor, Value};

use crate::error::{MergeError, MergeResult};
use crate::path::{Path, PathElement};

/// A map, set or struct taking part in a merge.
///
/// The variant is fixed at construction. Everything the merger needs
/// (diffing, lookup, addressing, rebuilding) goes through this type so the
/// merge itself never cares which kind of collection it is walking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidate {
    Map(Map),
    Set(Set),
    Struct(Struct),
}

impl Candidate {
    /// Wrap a value, or `None` if it is not a collection.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(m) => Some(Self::Map(*m)),
            Value::Set(s) => Some(Self::Set(*s)),
            Value::Struct(s) => Some(Self::Struct(s.clone())),
            _ => None,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Map(_) => Kind::Map,
            Self::Set(_) => Kind::Set,
            Self::Struct(_) => Kind::Struct,
        }
    }

    pub fn same_variant(&self, other: &Candidate) -> bool {
        self.kind() == other.kind()
    }

    /// Whether the two can be merged entry by entry: same variant and, for
    /// structs, the same name.
    pub fn mergeable_with(&self, other: &Candidate) -> bool {
        match (self, other) {
            (Self::Struct(a), Self::Struct(b)) => a.name() == b.name(),
            _ => self.same_variant(other),
        }
    }

    /// The wrapped value.
    pub fn value(&self) -> Value {
        match self {
            Self::Map(m) => Value::Map(*m),
            Self::Set(s) => Value::Set(*s),
            Self::Struct(s) => Value::Struct(s.clone()),
        }
    }

    pub fn hash(&self) -> ObjectId {
        self.value().hash()
    }

    /// Changes from `parent` to `self`, in key (or field-name) order.
    pub fn diff<'a>(
        &self,
        store: &'a dyn ObjectStore,
        parent: &Candidate,
    ) -> MergeResult<DiffStream<'a>> {
        match (parent, self) {
            (Self::Map(old), Self::Map(new)) => Ok(diff_maps(store, old, new)),
            (Self::Set(old), Self::Set(new)) => Ok(diff_sets(store, old, new)),
            (Self::Struct(old), Self::Struct(new)) => Ok(diff_structs(old, new)),
            _ => Err(MergeError::InvariantViolation(format!(
                "cannot diff a {} against a {}",
                self.kind(),
                parent.kind()
            ))),
        }
    }

    /// Look up `key`. Sets return the key itself when it is a member.
    pub fn get(&self, store: &dyn ObjectStore, key: &Value) -> MergeResult<Option<Value>> {
        match self {
            Self::Map(m) => Ok(m.get(store, key)?),
            Self::Set(s) => Ok(s.contains(store, key)?.then(|| key.clone())),
            Self::Struct(s) => {
                let field = field_name(key)?;
                Ok(s.get(field).cloned())
            }
        }
    }

    /// `path` extended by the element that addresses `change.key` here.
    pub fn path_concat(&self, change: &ValueChanged, path: &Path) -> MergeResult<Path> {
        let element = match self {
            Self::Map(_) | Self::Set(_) => PathElement::for_key(&change.key),
            Self::Struct(_) => PathElement::Field(field_name(&change.key)?.to_string()),
        };
        Ok(path.child(element))
    }

    /// An empty collection of the same variant. Structs keep their name.
    pub fn empty_like(&self, store: &dyn ObjectStore) -> MergeResult<Candidate> {
        Ok(match self {
            Self::Map(_) => Self::Map(Map::empty(store)?),
            Self::Set(_) => Self::Set(Set::empty(store)?),
            Self::Struct(s) => Self::Struct(Struct::new(s.name(), Vec::<(String, Value)>::new())),
        })
    }

    pub(crate) fn editor(&self) -> CandidateEditor {
        match self {
            Self::Map(m) => CandidateEditor::Map(m.edit()),
            Self::Set(s) => CandidateEditor::Set(s.edit()),
            Self::Struct(s) => CandidateEditor::Struct(s.edit()),
        }
    }
}

impl From<Candidate> for Value {
    fn from(candidate: Candidate) -> Self {
        match candidate {
            Candidate::Map(m) => Value::Map(m),
            Candidate::Set(s) => Value::Set(s),
            Candidate::Struct(s) => Value::Struct(s),
        }
    }
}

fn field_name(key: &Value) -> MergeResult<&str> {
    key.as_str().ok_or_else(|| {
        MergeError::InvariantViolation(format!("struct field names must be strings, not {}", key.kind()))
    })
}

/// Accumulates the merged result on top of a candidate.
pub(crate) enum CandidateEditor {
    Map(MapEditor),
    Set(SetEditor),
    Struct(StructEditor),
}

impl CandidateEditor {
    /// Make `key` hold `value`, or remove it when `value` is `None`.
    pub(crate) fn put(&mut self, key: &Value, value: Option<&Value>) -> MergeResult<()> {
        match self {
            Self::Map(editor) => match value {
                Some(v) => {
                    editor.set(key.clone(), v.clone());
                }
                None => {
                    editor.remove(key.clone());
                }
            },
            Self::Set(editor) => match value {
                Some(_) => {
                    editor.insert(key.clone());
                }
                None => {
                    editor.remove(key.clone());
                }
            },
            Self::Struct(editor) => {
                let field = field_name(key)?;
                match value {
                    Some(v) => {
                        editor.set(field, v.clone());
                    }
                    None => {
                        editor.remove(field);
                    }
                }
            }
        }
        Ok(())
    }

    /// Take the struct name of `like`. A no-op for maps and sets.
    pub(crate) fn adopt_name(&mut self, like: &Candidate) {
        if let (Self::Struct(editor), Candidate::Struct(s)) = (self, like) {
            editor.rename(s.name());
        }
    }

    /// Apply a change as its descendant saw it.
    pub(crate) fn apply(&mut self, change: &ValueChanged) -> MergeResult<()> {
        self.put(&change.key, change.new_value.as_ref())
    }

    pub(crate) fn finish(self, store: &dyn ObjectStore) -> MergeResult<Candidate> {
        Ok(match self {
            Self::Map(editor) => Candidate::Map(editor.apply(store)?),
            Self::Set(editor) => Candidate::Set(editor.apply(store)?),
            Self::Struct(editor) => Candidate::Struct(editor.finish()),
        })
    }
}
