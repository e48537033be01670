use std::collections::BTreeMap;

use hbnb_model::EntityKind;

use crate::error::StoreResult;
use crate::shared::SharedRecord;

/// Registry of live records keyed by `"{kind}.{id}"`.
///
/// All implementations must satisfy these invariants:
/// - Every key equals the composite key of the record it maps to.
/// - An identity is held under at most one key.
/// - Maps returned by [`all`](Self::all) are copies; mutating them never
///   changes the store.
pub trait ObjectStore: Send + Sync {
    /// Register a record under its composite key and return that key.
    ///
    /// Re-registering the same record replaces it. Fails with
    /// `InvalidArgument` for a blank identity, or one already registered
    /// under another kind.
    fn register(&self, record: SharedRecord) -> StoreResult<String>;

    /// Every registered record, keyed and sorted by composite key.
    fn all(&self) -> StoreResult<BTreeMap<String, SharedRecord>>;

    /// Look up a record by composite key.
    fn get(&self, key: &str) -> StoreResult<Option<SharedRecord>>;

    /// Swap the entire contents for `records` in one step.
    ///
    /// Callers are responsible for the key invariants of `records`.
    fn replace_all(&self, records: BTreeMap<String, SharedRecord>) -> StoreResult<()>;

    /// Records of a single kind.
    ///
    /// Default implementation filters [`all`](Self::all) by key prefix.
    fn all_of(&self, kind: EntityKind) -> StoreResult<BTreeMap<String, SharedRecord>> {
        let prefix = format!("{kind}.");
        Ok(self
            .all()?
            .into_iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .collect())
    }
}
