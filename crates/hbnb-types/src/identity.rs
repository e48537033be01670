use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a stored record.
///
/// Fresh records get a random (v4) UUID in canonical hyphenated form.
/// Reconstructed records keep whatever identity they were saved with, so
/// the inner value is not required to be a UUID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Adopt an existing identity verbatim.
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identity, which no store accepts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_canonical_uuids() {
        let id = RecordId::generate();
        let parsed = uuid::Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.as_str(), parsed.hyphenated().to_string());
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1_000).map(|_| RecordId::generate()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn raw_ids_are_kept_verbatim() {
        let id = RecordId::from_raw("123");
        assert_eq!(id.as_str(), "123");
        assert_eq!(id.to_string(), "123");
        assert!(!id.is_empty());
        assert!(RecordId::from_raw("").is_empty());
    }

    #[test]
    fn serde_is_transparent() {
        let id = RecordId::from_raw("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let parsed: RecordId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(parsed, id);
    }
}
