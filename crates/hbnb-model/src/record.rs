use std::fmt;

use hbnb_types::{RecordId, Timestamp};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;

/// A record's named attributes, as written to storage.
pub type FieldMap = serde_json::Map<String, Value>;

/// Serialized key carrying the concrete kind.
pub const CLASS_KEY: &str = "__class__";
pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "created_at";
pub const UPDATED_AT_KEY: &str = "updated_at";

const RESERVED_KEYS: [&str; 4] = [ID_KEY, CREATED_AT_KEY, UPDATED_AT_KEY, CLASS_KEY];

/// Store key for a record: `"{kind}.{id}"`.
pub fn composite_key(kind: EntityKind, id: &RecordId) -> String {
    format!("{kind}.{id}")
}

/// A domain object: identity, timestamps, and named fields.
///
/// Field reads fall back to the kind's defaults; only values assigned on
/// this instance (or loaded from storage) are held in `overrides`. Every
/// field, default or not, is serialized by [`to_dict`](Self::to_dict).
///
/// Invariant: `created_at <= updated_at`.
#[derive(Clone, Debug)]
pub struct Record {
    kind: EntityKind,
    id: RecordId,
    created_at: Timestamp,
    updated_at: Timestamp,
    overrides: FieldMap,
}

impl Record {
    /// Build a fresh record with a new identity and `created_at == updated_at`.
    ///
    /// The record is not registered anywhere; stores wrap this to
    /// self-register.
    pub fn create_new(kind: EntityKind) -> Self {
        let now = Timestamp::now();
        Self {
            kind,
            id: RecordId::generate(),
            created_at: now,
            updated_at: now,
            overrides: FieldMap::new(),
        }
    }

    /// Rebuild a record from a serialized field map.
    ///
    /// `id`, `created_at` and `updated_at` must be present and must be
    /// strings; the timestamps are parsed, never generated. A `__class__`
    /// entry, if present, must name `kind` and is not kept as a field. Other
    /// entries are kept as instance values unless they equal the kind's
    /// default, so a record renders the same before and after a round trip.
    pub fn reconstruct(kind: EntityKind, map: FieldMap) -> ModelResult<Self> {
        if map.is_empty() {
            return Err(ModelError::InvalidCall(
                "reconstruct requires a non-empty field map".into(),
            ));
        }

        let mut id = None;
        let mut created_at = None;
        let mut updated_at = None;
        let mut overrides = FieldMap::new();
        let defaults = kind.default_fields();

        for (key, value) in map {
            match key.as_str() {
                ID_KEY => id = Some(RecordId::from_raw(require_str(ID_KEY, &value)?)),
                CREATED_AT_KEY => created_at = Some(parse_timestamp(CREATED_AT_KEY, &value)?),
                UPDATED_AT_KEY => updated_at = Some(parse_timestamp(UPDATED_AT_KEY, &value)?),
                CLASS_KEY => {
                    let tag = require_str(CLASS_KEY, &value)?;
                    if tag != kind.name() {
                        return Err(ModelError::ClassMismatch {
                            expected: kind,
                            found: tag.to_string(),
                        });
                    }
                }
                _ => {
                    if defaults.get(&key) != Some(&value) {
                        overrides.insert(key, value);
                    }
                }
            }
        }

        let id = id.ok_or(ModelError::MissingField(ID_KEY))?;
        let created_at = created_at.ok_or(ModelError::MissingField(CREATED_AT_KEY))?;
        let updated_at = updated_at.ok_or(ModelError::MissingField(UPDATED_AT_KEY))?;
        if updated_at < created_at {
            return Err(ModelError::TimestampOrder {
                created_at,
                updated_at,
            });
        }

        Ok(Self {
            kind,
            id,
            created_at,
            updated_at,
            overrides,
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// The store key, `"{kind}.{id}"`.
    pub fn key(&self) -> String {
        composite_key(self.kind, &self.id)
    }

    /// Current value of a field: the instance value, else the kind default.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| self.kind.default_value(name))
    }

    /// Assign a field on this instance.
    ///
    /// Names outside the kind's default set are allowed. Identity,
    /// timestamps and the class tag are not fields and are rejected.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ModelResult<()> {
        let name = name.into();
        if RESERVED_KEYS.contains(&name.as_str()) {
            return Err(ModelError::ReservedField(name));
        }
        self.overrides.insert(name, value.into());
        Ok(())
    }

    /// All fields: kind defaults overlaid with instance values.
    pub fn fields(&self) -> FieldMap {
        let mut merged = self.kind.default_fields();
        for (name, value) in &self.overrides {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Only the values assigned on this instance.
    pub fn overrides(&self) -> &FieldMap {
        &self.overrides
    }

    /// Advance `updated_at` without persisting.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::advance(&self.updated_at);
    }

    /// Serialize: every field, ISO timestamps, and the `__class__` tag.
    pub fn to_dict(&self) -> FieldMap {
        let mut dict = self.fields();
        dict.insert(ID_KEY.into(), Value::String(self.id.to_string()));
        dict.insert(CREATED_AT_KEY.into(), Value::String(self.created_at.to_iso()));
        dict.insert(UPDATED_AT_KEY.into(), Value::String(self.updated_at.to_iso()));
        dict.insert(CLASS_KEY.into(), Value::String(self.kind.name().into()));
        dict
    }

    /// Identity, timestamps and instance values; defaults are left out.
    fn instance_dict(&self) -> FieldMap {
        let mut dict = self.overrides.clone();
        dict.insert(ID_KEY.into(), Value::String(self.id.to_string()));
        dict.insert(CREATED_AT_KEY.into(), Value::String(self.created_at.to_iso()));
        dict.insert(UPDATED_AT_KEY.into(), Value::String(self.updated_at.to_iso()));
        dict
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.id == other.id
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
            && self.fields() == other.fields()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {}",
            self.kind,
            self.id,
            Value::Object(self.instance_dict())
        )
    }
}

fn require_str<'a>(field: &'static str, value: &'a Value) -> ModelResult<&'a str> {
    value.as_str().ok_or_else(|| ModelError::InvalidFieldType {
        field: field.to_string(),
        expected: "string",
        found: json_type_name(value),
    })
}

fn parse_timestamp(field: &'static str, value: &Value) -> ModelResult<Timestamp> {
    let raw = require_str(field, value)?;
    Timestamp::parse(raw).map_err(|source| ModelError::InvalidTimestamp { field, source })
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
