use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use hbnb_model::{EntityKind, Record, TypeRegistry};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{StorageConfig, SyncMode};
use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryObjectStore;
use crate::shared::{read_record, share, write_record, SharedRecord};
use crate::traits::ObjectStore;

/// Persistence engine: an object store flushed to, and rebuilt from, one
/// JSON file.
///
/// On-disk format is a single JSON object:
/// ```text
/// {
///   "State.3f29...": {"id": "3f29...", "created_at": "...", "updated_at": "...",
///                     "name": "Texas", "__class__": "State"},
///   ...
/// }
/// ```
///
/// Construct once at process start and pass by reference. [`close`]
/// is the final flush.
///
/// [`close`]: Self::close
pub struct FileStorage {
    config: StorageConfig,
    objects: Arc<dyn ObjectStore>,
    registry: TypeRegistry,
}

impl FileStorage {
    /// An empty in-memory store persisting to `config.path`. Does no I/O.
    pub fn new(config: StorageConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryObjectStore::new()), TypeRegistry::builtin())
    }

    /// Build on an existing store and registry.
    pub fn with_store(
        config: StorageConfig,
        objects: Arc<dyn ObjectStore>,
        registry: TypeRegistry,
    ) -> Self {
        Self {
            config,
            objects,
            registry,
        }
    }

    /// Create storage and load whatever the persistence file holds.
    pub fn open(config: StorageConfig) -> StoreResult<Self> {
        let storage = Self::new(config);
        storage.reload()?;
        Ok(storage)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    // ---- Records ----

    /// Build a fresh record of `kind` and register it.
    pub fn create_new(&self, kind: EntityKind) -> StoreResult<SharedRecord> {
        let record = share(Record::create_new(kind));
        self.objects.register(Arc::clone(&record))?;
        Ok(record)
    }

    /// Register a record under its composite key.
    pub fn register(&self, record: SharedRecord) -> StoreResult<String> {
        self.objects.register(record)
    }

    pub fn all(&self) -> StoreResult<BTreeMap<String, SharedRecord>> {
        self.objects.all()
    }

    pub fn all_of(&self, kind: EntityKind) -> StoreResult<BTreeMap<String, SharedRecord>> {
        self.objects.all_of(kind)
    }

    pub fn get(&self, key: &str) -> StoreResult<Option<SharedRecord>> {
        self.objects.get(key)
    }

    /// Advance the record's `updated_at`, then flush the whole store.
    pub fn save_record(&self, record: &SharedRecord) -> StoreResult<usize> {
        write_record(record)?.touch();
        self.save()
    }

    // ---- Persistence ----

    /// Write every registered record to the persistence file.
    ///
    /// Overwrites the whole file. Not atomic: a failure mid-write can leave
    /// it truncated. Returns the number of records written.
    pub fn save(&self) -> StoreResult<usize> {
        let mut container = serde_json::Map::new();
        for (key, record) in self.objects.all()? {
            let dict = read_record(&record)?.to_dict();
            container.insert(key, Value::Object(dict));
        }
        let count = container.len();

        self.write_file(&Value::Object(container))?;
        info!(path = %self.config.path.display(), records = count, "saved object store");
        Ok(count)
    }

    /// Replace the store contents with the records in the persistence file.
    ///
    /// A missing file leaves the store as it is. Any malformed entry,
    /// unknown `__class__`, or key that is not the entry's
    /// `"{__class__}.{id}"` aborts the reload before the store is touched.
    /// Returns the number of records loaded.
    pub fn reload(&self) -> StoreResult<usize> {
        let text = match fs::read_to_string(&self.config.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.config.path.display(), "no persistence file; nothing to reload");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let container: Container = serde_json::from_str(&text).map_err(|e| {
            StoreError::Deserialization(format!("{}: {e}", self.config.path.display()))
        })?;

        let mut rebuilt = BTreeMap::new();
        let mut identities = HashSet::new();
        for (key, entry) in container.0 {
            let record = self.rebuild_entry(&key, entry)?;
            if !identities.insert(record.id().clone()) {
                return Err(StoreError::Deserialization(format!(
                    "{key}: identity {} appears more than once",
                    record.id()
                )));
            }
            rebuilt.insert(key, share(record));
        }

        let count = rebuilt.len();
        self.objects.replace_all(rebuilt)?;
        info!(path = %self.config.path.display(), records = count, "reloaded object store");
        Ok(count)
    }

    /// Final flush. Consumes the storage.
    pub fn close(self) -> StoreResult<()> {
        self.save()?;
        Ok(())
    }

    fn rebuild_entry(&self, key: &str, entry: Value) -> StoreResult<Record> {
        let Value::Object(fields) = entry else {
            return Err(StoreError::Deserialization(format!(
                "{key}: entry is not a JSON object"
            )));
        };

        let record = self
            .registry
            .reconstruct_tagged(fields)
            .map_err(|e| match StoreError::from(e) {
                StoreError::Deserialization(reason) => {
                    StoreError::Deserialization(format!("{key}: {reason}"))
                }
                other => other,
            })?;

        if record.id().is_empty() {
            return Err(StoreError::Deserialization(format!("{key}: blank identity")));
        }
        if record.key() != key {
            return Err(StoreError::Deserialization(format!(
                "{key}: entry holds {}",
                record.key()
            )));
        }
        Ok(record)
    }

    fn write_file(&self, container: &Value) -> StoreResult<()> {
        let path = &self.config.path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        if self.config.pretty {
            serde_json::to_writer_pretty(&mut writer, container).map_err(io::Error::from)?;
        } else {
            serde_json::to_writer(&mut writer, container).map_err(io::Error::from)?;
        }
        writer.flush()?;

        if self.config.sync_mode == SyncMode::EveryWrite {
            writer.get_ref().sync_all()?;
        }
        debug!(path = %path.display(), sync = ?self.config.sync_mode, "wrote persistence file");
        Ok(())
    }
}

impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.config.path)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// The top-level object of the persistence file.
///
/// Unlike `serde_json::Map`, a key that appears twice is an error instead
/// of the later entry replacing the earlier one.
struct Container(BTreeMap<String, Value>);

impl<'de> Deserialize<'de> for Container {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ContainerVisitor)
    }
}

struct ContainerVisitor;

impl<'de> Visitor<'de> for ContainerVisitor {
    type Value = Container;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object of records keyed by \"{class}.{id}\"")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Container, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some(key) = access.next_key::<String>()? {
            match entries.entry(key) {
                Entry::Occupied(slot) => {
                    return Err(de::Error::custom(format!("duplicate key {}", slot.key())));
                }
                Entry::Vacant(slot) => {
                    slot.insert(access.next_value::<Value>()?);
                }
            }
        }
        Ok(Container(entries))
    }
}

/// Per-record save: advance `updated_at`, then flush the owning storage.
pub trait Persist {
    fn save(&self, storage: &FileStorage) -> StoreResult<()>;
}

impl Persist for SharedRecord {
    fn save(&self, storage: &FileStorage) -> StoreResult<()> {
        storage.save_record(self)?;
        Ok(())
    }
}
