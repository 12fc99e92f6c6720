use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use strata_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Store wrapper that fails reads on demand.
///
/// Writes always pass through. A read fails with [`StoreError::Io`] when its id
/// has been marked with [`fail_reads_of`](Self::fail_reads_of), or for every id
/// once [`fail_all_reads`](Self::fail_all_reads) is set. Used to exercise
/// storage-failure paths in diff and merge.
pub struct FaultInjectingStore<S> {
    inner: S,
    failing: RwLock<HashSet<ObjectId>>,
    fail_all: AtomicBool,
}

impl<S: ObjectStore> FaultInjectingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: RwLock::new(HashSet::new()),
            fail_all: AtomicBool::new(false),
        }
    }

    /// Make every subsequent read of `id` fail.
    pub fn fail_reads_of(&self, id: ObjectId) {
        self.failing.write().expect("lock poisoned").insert(id);
    }

    /// Make every subsequent read fail.
    pub fn fail_all_reads(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Clear all injected faults.
    pub fn heal(&self) {
        self.failing.write().expect("lock poisoned").clear();
        self.fail_all.store(false, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn should_fail(&self, id: &ObjectId) -> bool {
        self.fail_all.load(Ordering::SeqCst) || self.failing.read().expect("lock poisoned").contains(id)
    }
}

impl<S: ObjectStore> ObjectStore for FaultInjectingStore<S> {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        if self.should_fail(id) {
            debug!(id = %id.short_hex(), "injected read failure");
            return Err(StoreError::Io(io::Error::other(format!(
                "injected read failure for {}",
                id.short_hex()
            ))));
        }
        self.inner.read(id)
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        self.inner.write(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryObjectStore;
    use crate::object::ObjectKind;

    #[test]
    fn marked_id_fails_others_pass() {
        let store = FaultInjectingStore::new(InMemoryObjectStore::new());
        let bad = store.write(&StoredObject::new(ObjectKind::Leaf, b"bad".to_vec())).unwrap();
        let good = store.write(&StoredObject::new(ObjectKind::Leaf, b"good".to_vec())).unwrap();

        store.fail_reads_of(bad);
        assert!(matches!(store.read(&bad), Err(StoreError::Io(_))));
        assert!(store.read(&good).unwrap().is_some());

        store.heal();
        assert!(store.read(&bad).unwrap().is_some());
    }

    #[test]
    fn fail_all_reads_blocks_everything() {
        let store = FaultInjectingStore::new(InMemoryObjectStore::new());
        let id = store.write(&StoredObject::new(ObjectKind::Index, b"x".to_vec())).unwrap();
        store.fail_all_reads();
        assert!(store.read(&id).is_err());
        // Writes still land in the wrapped store.
        let other = store.write(&StoredObject::new(ObjectKind::Leaf, b"y".to_vec())).unwrap();
        assert_ne!(other, id);
        assert_eq!(store.inner().len(), 2);
    }
}
