//! Addresses of changes inside nested collections.

use std::fmt;

use strata_types::ObjectId;
use strata_value::Value;

/// One step from a collection to one of its children.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// A map key or set element that is a bool, float or string.
    Index(Value),
    /// A map key or set element of any other kind, addressed by its hash.
    HashIndex(ObjectId),
    /// A struct field.
    Field(String),
}

impl PathElement {
    /// The element addressing `key` inside a map or set.
    pub fn for_key(key: &Value) -> Self {
        if key.kind().is_primitive() {
            Self::Index(key.clone())
        } else {
            Self::HashIndex(key.hash())
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(value) => write!(f, "[{value}]"),
            Self::HashIndex(id) => write!(f, "[#{}]", id.to_hex()),
            Self::Field(name) => write!(f, ".{name}"),
        }
    }
}

/// A root-to-leaf sequence of [`PathElement`]s. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathElement>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    /// A new path one step below this one.
    pub fn child(&self, element: PathElement) -> Self {
        let mut elements = Vec::with_capacity(self.0.len() + 1);
        elements.extend_from_slice(&self.0);
        elements.push(element);
        Self(elements)
    }
}

impl From<Vec<PathElement>> for Path {
    fn from(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}
