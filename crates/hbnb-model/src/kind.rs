use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::error::ModelError;
use crate::record::FieldMap;

/// The concrete type of a record.
///
/// The variant name is the `__class__` tag written to storage and the
/// prefix of the record's composite key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Bare record with no fields of its own.
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 7] = [
        Self::BaseModel,
        Self::User,
        Self::State,
        Self::City,
        Self::Amenity,
        Self::Place,
        Self::Review,
    ];

    /// The class tag for this kind.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
            Self::Review => "Review",
        }
    }

    /// Look up a kind by its exact class tag.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The fields every record of this kind carries, with their defaults.
    pub fn default_fields(&self) -> FieldMap {
        let defaults = match self {
            Self::BaseModel => json!({}),
            Self::User => json!({
                "email": "",
                "password": "",
                "first_name": "",
                "last_name": "",
            }),
            Self::State | Self::Amenity => json!({ "name": "" }),
            Self::City => json!({ "state_id": "", "name": "" }),
            Self::Place => json!({
                "city_id": "",
                "user_id": "",
                "name": "",
                "description": "",
                "number_rooms": 0,
                "number_bathrooms": 0,
                "max_guest": 0,
                "price_by_night": 0,
                "latitude": 0.0,
                "longitude": 0.0,
                "amenity_ids": [],
            }),
            Self::Review => json!({ "place_id": "", "user_id": "", "text": "" }),
        };
        match defaults {
            Value::Object(map) => map,
            _ => FieldMap::new(),
        }
    }

    /// Default for a single field, or `None` if the kind has no such field.
    pub fn default_value(&self, field: &str) -> Option<Value> {
        self.default_fields().remove(field)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ModelError::UnknownType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_name(kind.name()), Some(kind));
            assert_eq!(kind.name().parse::<EntityKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(EntityKind::from_name("state"), None);
        let err = "Planet".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, ModelError::UnknownType("Planet".into()));
    }

    #[test]
    fn string_defaults_are_empty() {
        let user = EntityKind::User.default_fields();
        assert_eq!(user.len(), 4);
        for field in ["email", "password", "first_name", "last_name"] {
            assert_eq!(user[field], json!(""));
        }
        assert_eq!(EntityKind::City.default_value("state_id"), Some(json!("")));
        assert_eq!(EntityKind::Review.default_value("text"), Some(json!("")));
    }

    #[test]
    fn place_defaults_are_typed() {
        let place = EntityKind::Place.default_fields();
        assert_eq!(place["number_rooms"], json!(0));
        assert_eq!(place["latitude"], json!(0.0));
        assert_eq!(place["amenity_ids"], json!([]));
    }

    #[test]
    fn base_model_has_no_fields() {
        assert!(EntityKind::BaseModel.default_fields().is_empty());
        assert_eq!(EntityKind::State.default_value("email"), None);
    }
}
