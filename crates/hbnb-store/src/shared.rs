//! Shared record handles.
//!
//! The store and its callers hold the same record through an
//! `Arc<RwLock<_>>`, so a field assigned through a handle from
//! [`FileStorage::create_new`](crate::FileStorage::create_new) or
//! [`ObjectStore::all`](crate::ObjectStore::all) is what the next save
//! writes.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hbnb_model::Record;

use crate::error::{StoreError, StoreResult};

/// A record shared between the store and its callers.
pub type SharedRecord = Arc<RwLock<Record>>;

/// Wrap a record in a shared handle.
pub fn share(record: Record) -> SharedRecord {
    Arc::new(RwLock::new(record))
}

pub fn read_record(record: &SharedRecord) -> StoreResult<RwLockReadGuard<'_, Record>> {
    record
        .read()
        .map_err(|e| StoreError::Poisoned(e.to_string()))
}

pub fn write_record(record: &SharedRecord) -> StoreResult<RwLockWriteGuard<'_, Record>> {
    record
        .write()
        .map_err(|e| StoreError::Poisoned(e.to_string()))
}
