use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::shared::{read_record, SharedRecord};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Holds shared handles behind a `RwLock`. Handles are cloned on read, so
/// a snapshot from `all()` keeps pointing at live records while the map
/// itself stays private.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, SharedRecord>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records currently registered.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_map()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_map()?.is_empty())
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, SharedRecord>>> {
        self.objects
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write_map(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, SharedRecord>>> {
        self.objects
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn register(&self, record: SharedRecord) -> StoreResult<String> {
        let (key, id) = {
            let guard = read_record(&record)?;
            (guard.key(), guard.id().clone())
        };
        if id.is_empty() {
            return Err(StoreError::InvalidArgument(
                "cannot register a record with a blank identity".into(),
            ));
        }

        let mut map = self.write_map()?;
        if let Some(existing) = map.keys().find(|existing| {
            **existing != key
                && existing
                    .split_once('.')
                    .is_some_and(|(_, held)| held == id.as_str())
        }) {
            return Err(StoreError::InvalidArgument(format!(
                "identity {id} is already registered as {existing}"
            )));
        }

        map.insert(key.clone(), record);
        debug!(%key, "registered record");
        Ok(key)
    }

    fn all(&self) -> StoreResult<BTreeMap<String, SharedRecord>> {
        let map = self.read_map()?;
        Ok(map
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect())
    }

    fn get(&self, key: &str) -> StoreResult<Option<SharedRecord>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn replace_all(&self, records: BTreeMap<String, SharedRecord>) -> StoreResult<()> {
        let mut map = self.write_map()?;
        *map = records.into_iter().collect();
        debug!(records = map.len(), "replaced store contents");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.read_map().map(|map| map.len()).unwrap_or_default();
        f.debug_struct("InMemoryObjectStore")
            .field("record_count", &count)
            .finish()
    }
}
