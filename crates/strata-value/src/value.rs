use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use strata_crypto::ContentHasher;
use strata_types::ObjectId;

use crate::map::Map;
use crate::sequence::Sequence;
use crate::set::Set;
use crate::structs::Struct;

/// The discriminant of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    Float,
    String,
    Ref,
    Map,
    Set,
    Struct,
}

impl Kind {
    /// Bool, Float and String carry their own meaning and order by value.
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::Bool | Self::Float | Self::String)
    }

    /// Rank used as the first ordering criterion. All composites share a rank.
    fn rank(self) -> u8 {
        match self {
            Self::Bool => 0,
            Self::Float => 1,
            Self::String => 2,
            Self::Ref | Self::Map | Self::Set | Self::Struct => 3,
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Bool => 0x01,
            Self::Float => 0x02,
            Self::String => 0x03,
            Self::Ref => 0x04,
            Self::Map => 0x05,
            Self::Set => 0x06,
            Self::Struct => 0x07,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::String => "string",
            Self::Ref => "ref",
            Self::Map => "map",
            Self::Set => "set",
            Self::Struct => "struct",
        };
        f.write_str(name)
    }
}

/// A 64-bit float with total ordering and bitwise equality.
///
/// `-0.0` is stored as `0.0` and every NaN as the canonical NaN, so equal
/// numbers always have equal bits (and therefore equal hashes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct Float(u64);

impl Float {
    pub fn new(value: f64) -> Self {
        let normalized = if value == 0.0 {
            0.0
        } else if value.is_nan() {
            f64::NAN
        } else {
            value
        };
        Self(normalized.to_bits())
    }

    pub fn get(self) -> f64 {
        f64::from_bits(self.0)
    }

    pub fn to_bits(self) -> u64 {
        self.0
    }
}

impl From<u64> for Float {
    fn from(bits: u64) -> Self {
        Self::new(f64::from_bits(bits))
    }
}

impl From<Float> for u64 {
    fn from(value: Float) -> Self {
        value.0
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().total_cmp(&other.get())
    }
}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.get())
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// An immutable, content-addressed value.
///
/// Two values are equal exactly when their structure is equal, and equal
/// values always have the same [`hash`](Value::hash).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Float(Float),
    String(String),
    /// A reference to another stored value by its hash.
    Ref(ObjectId),
    Map(Map),
    Set(Set),
    Struct(Struct),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::Ref(_) => Kind::Ref,
            Self::Map(_) => Kind::Map,
            Self::Set(_) => Kind::Set,
            Self::Struct(_) => Kind::Struct,
        }
    }

    /// Content hash of the canonical encoding.
    pub fn hash(&self) -> ObjectId {
        ContentHasher::VALUE.hash(&self.encode())
    }

    /// Canonical byte encoding: a kind tag followed by a fixed payload layout.
    ///
    /// Collections encode as their root chunk id, tree level and length, so
    /// the encoding is independent of how the collection was built.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        self.encode_into(&mut out);
        out
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.kind().tag());
        match self {
            Self::Bool(b) => out.push(u8::from(*b)),
            Self::Float(f) => out.extend_from_slice(&f.to_bits().to_be_bytes()),
            Self::String(s) => encode_str(s, out),
            Self::Ref(id) => out.extend_from_slice(id.as_bytes()),
            Self::Map(m) => encode_sequence(m.sequence(), out),
            Self::Set(s) => encode_sequence(s.sequence(), out),
            Self::Struct(s) => {
                encode_str(s.name(), out);
                out.extend_from_slice(&(s.len() as u64).to_be_bytes());
                for (field, value) in s.fields() {
                    encode_str(field, out);
                    value.encode_into(out);
                }
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f.get()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Self::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }
}

fn encode_str(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(s.len() as u64).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn encode_sequence(seq: &Sequence, out: &mut Vec<u8>) {
    out.extend_from_slice(seq.root().as_bytes());
    out.push(seq.level());
    out.extend_from_slice(&seq.len().to_be_bytes());
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.kind().rank().cmp(&other.kind().rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ if self == other => Ordering::Equal,
            _ => self.hash().cmp(&other.hash()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Ref(id) => write!(f, "ref#{}", id.short_hex()),
            Self::Map(m) => write!(f, "map({} entries)#{}", m.len(), self.hash().short_hex()),
            Self::Set(s) => write!(f, "set({} elements)#{}", s.len(), self.hash().short_hex()),
            Self::Struct(s) => {
                write!(f, "{} {{", s.name())?;
                for (i, (name, value)) in s.fields().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{name}: {value}")?;
                }
                if s.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(Float::new(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Self::Map(m)
    }
}

impl From<Set> for Value {
    fn from(s: Set) -> Self {
        Self::Set(s)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Self::Struct(s)
    }
}
