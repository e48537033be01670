//! Object registry and file persistence for HBnB records.
//!
//! Live records are held in an [`ObjectStore`] keyed by their composite key
//! `"{kind}.{id}"`. [`FileStorage`] owns a store plus the
//! [`TypeRegistry`](hbnb_model::TypeRegistry) and flushes the whole store to
//! a single JSON file, or rebuilds it from that file.
//!
//! # Storage Backends
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based registry behind a `RwLock`
//!
//! # Design Rules
//!
//! 1. A key is always `"{kind}.{id}"` of the record it maps to.
//! 2. An identity appears under at most one key.
//! 3. `all()` hands out a copied map; holding it never blocks or corrupts
//!    the store.
//! 4. Reload swaps the store contents only after every entry rebuilt;
//!    any bad entry, or a key repeated in the file, aborts it with the
//!    live store untouched.
//! 5. Save overwrites the whole file. It is not atomic: a crash mid-write
//!    can leave a truncated file.
//! 6. No locking across processes. Concurrent writers to the same file
//!    produce undefined results.
//! 7. All errors are returned to the caller, never logged and dropped.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod shared;
pub mod traits;

pub use config::{StorageConfig, SyncMode, DEFAULT_FILE_PATH};
pub use error::{StoreError, StoreResult};
pub use file::{FileStorage, Persist};
pub use memory::InMemoryObjectStore;
pub use shared::{read_record, share, write_record, SharedRecord};
pub use traits::ObjectStore;
