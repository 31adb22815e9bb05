use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a catalog entry (feat, class, ancestry, ...).
///
/// Catalog ids come from the reference data and never change between
/// releases, so they are plain strings rather than generated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CatalogId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for CatalogId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CatalogId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CatalogId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// Namespace for deterministic selection ids (UUIDv5).
const SELECTION_NAMESPACE: Uuid = Uuid::from_u128(0x5e1e_c710_4a2b_4f3e_9d1c_8b7a_6e5f_4d3c);

/// Identifier of one Selection inside a character's selection arena.
///
/// Derived deterministically from the selection's identifying fields so that
/// re-deriving the same grant on every recalculation yields the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelectionId(Uuid);

impl SelectionId {
    /// Derive an id from the ordered identifying parts of a selection.
    pub fn derive(parts: &[&str]) -> Self {
        let name = parts.join("\u{1f}");
        Self(Uuid::new_v5(&SELECTION_NAMESPACE, name.as_bytes()))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SelectionId> for Uuid {
    fn from(value: SelectionId) -> Self {
        value.0
    }
}
