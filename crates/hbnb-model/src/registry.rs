use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::record::{json_type_name, FieldMap, Record, CLASS_KEY};

/// Rebuilds a record of one kind from its serialized field map.
pub type Factory = Box<dyn Fn(FieldMap) -> ModelResult<Record> + Send + Sync>;

/// Maps a `__class__` tag to the factory that reconstructs that kind.
///
/// Dispatch is an explicit lookup: an unregistered tag is an
/// [`ModelError::UnknownType`], never a fallback.
pub struct TypeRegistry {
    factories: HashMap<String, Factory>,
}

impl TypeRegistry {
    /// A registry with no factories.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with one factory per [`EntityKind`].
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for kind in EntityKind::ALL {
            registry.register(kind.name(), move |map| Record::reconstruct(kind, map));
        }
        registry
    }

    /// Register (or replace) the factory for a class tag.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(FieldMap) -> ModelResult<Record> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered tags, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Rebuild a record using the factory registered for `tag`.
    pub fn reconstruct(&self, tag: &str, map: FieldMap) -> ModelResult<Record> {
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| ModelError::UnknownType(tag.to_string()))?;
        factory(map)
    }

    /// Rebuild a record, dispatching on the map's own `__class__` entry.
    pub fn reconstruct_tagged(&self, map: FieldMap) -> ModelResult<Record> {
        let tag = match map.get(CLASS_KEY) {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => {
                return Err(ModelError::InvalidFieldType {
                    field: CLASS_KEY.to_string(),
                    expected: "string",
                    found: json_type_name(other),
                })
            }
            None => return Err(ModelError::MissingField(CLASS_KEY)),
        };
        self.reconstruct(&tag, map)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tagged(class: &str) -> FieldMap {
        let value = json!({
            "id": "42",
            "created_at": "2024-01-01T00:00:00.000000",
            "updated_at": "2024-01-02T00:00:00.000000",
            "__class__": class,
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn builtin_covers_every_kind() {
        let registry = TypeRegistry::builtin();
        assert_eq!(registry.len(), EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            assert!(registry.contains(kind.name()));
        }
        assert_eq!(registry.names()[0], "Amenity");
    }

    #[test]
    fn dispatches_to_matching_kind() {
        let registry = TypeRegistry::builtin();
        for kind in EntityKind::ALL {
            let record = registry.reconstruct_tagged(tagged(kind.name())).unwrap();
            assert_eq!(record.kind(), kind);
            assert_eq!(record.id().as_str(), "42");
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let registry = TypeRegistry::builtin();
        let err = registry.reconstruct_tagged(tagged("Planet")).unwrap_err();
        assert_eq!(err, ModelError::UnknownType("Planet".into()));
    }

    #[test]
    fn missing_or_non_string_tag_is_rejected() {
        let registry = TypeRegistry::builtin();

        let mut untagged = tagged("State");
        untagged.remove(CLASS_KEY);
        assert_eq!(
            registry.reconstruct_tagged(untagged).unwrap_err(),
            ModelError::MissingField(CLASS_KEY)
        );

        let mut null_tag = tagged("State");
        null_tag.insert(CLASS_KEY.into(), Value::Null);
        assert!(matches!(
            registry.reconstruct_tagged(null_tag).unwrap_err(),
            ModelError::InvalidFieldType { found: "null", .. }
        ));
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let registry = TypeRegistry::empty();
        assert!(registry.is_empty());
        let err = registry.reconstruct("State", tagged("State")).unwrap_err();
        assert!(matches!(err, ModelError::UnknownType(_)));
    }

    #[test]
    fn custom_factory_can_be_registered() {
        let mut registry = TypeRegistry::empty();
        registry.register("Place", |map| {
            let mut record = Record::reconstruct(EntityKind::Place, map)?;
            record.set_field("imported", true)?;
            Ok(record)
        });
        let record = registry.reconstruct_tagged(tagged("Place")).unwrap();
        assert_eq!(record.field("imported"), Some(json!(true)));
    }

    #[test]
    fn debug_lists_types() {
        let debug = format!("{:?}", TypeRegistry::builtin());
        assert!(debug.contains("TypeRegistry"));
        assert!(debug.contains("Review"));
    }
}
