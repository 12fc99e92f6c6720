use serde::{Deserialize, Serialize};
use strata_crypto::ContentHasher;
use strata_store::{ObjectKind, ObjectStore, StoreError, StoredObject};
use strata_types::ObjectId;

use crate::error::ValueResult;
use crate::value::Value;

/// One element of a sequence. Map entries carry a value; set entries do not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Entry {
    pub fn map(key: Value, value: Value) -> Self {
        Self {
            key,
            value: Some(value),
        }
    }

    pub fn set(key: Value) -> Self {
        Self { key, value: None }
    }

    /// Fingerprint of the entry's canonical encoding, used for chunking.
    pub(crate) fn fingerprint(&self) -> u32 {
        let mut bytes = self.key.encode();
        if let Some(value) = &self.value {
            value.encode_into(&mut bytes);
        }
        let digest = ContentHasher::raw_hash(&bytes);
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

/// Reference from an index chunk to a chunk one level down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: ObjectId,
    /// Largest key stored under this child.
    pub last_key: Value,
    /// Number of entries stored under this child.
    pub count: u64,
}

/// A decoded chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Leaf(Vec<Entry>),
    Index { level: u8, children: Vec<ChildRef> },
}

impl Node {
    pub fn level(&self) -> u8 {
        match self {
            Self::Leaf(_) => 0,
            Self::Index { level, .. } => *level,
        }
    }

    pub fn to_stored_object(&self) -> ValueResult<StoredObject> {
        let kind = match self {
            Self::Leaf(_) => ObjectKind::Leaf,
            Self::Index { .. } => ObjectKind::Index,
        };
        let data = serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(kind, data))
    }

    pub fn from_stored_object(obj: &StoredObject) -> ValueResult<Self> {
        let node: Node = serde_json::from_slice(&obj.data).map_err(|e| StoreError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })?;
        let expected = match node {
            Self::Leaf(_) => ObjectKind::Leaf,
            Self::Index { .. } => ObjectKind::Index,
        };
        if expected != obj.kind {
            return Err(StoreError::CorruptObject {
                id: obj.compute_id(),
                reason: format!("{expected} payload stored as {}", obj.kind),
            }
            .into());
        }
        Ok(node)
    }

    /// Read and decode a chunk. A missing chunk is an error.
    pub fn load(store: &dyn ObjectStore, id: &ObjectId) -> ValueResult<Self> {
        let stored = store.read(id)?.ok_or(StoreError::NotFound(*id))?;
        Self::from_stored_object(&stored)
    }

    pub fn save(&self, store: &dyn ObjectStore) -> ValueResult<ObjectId> {
        Ok(store.write(&self.to_stored_object()?)?)
    }
}
