//! Selections: the feats and features a character has acquired.
//!
//! A selection is either chosen by the player (`granted_by == None`) or
//! granted automatically, in which case it carries a back-reference to its
//! granter. The arena of selections is the authoritative record of what a
//! character holds; everything else is derived from it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{CatalogId, SelectionId};

/// Which slot family a selection was taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    Ancestry,
    Class,
    Background,
    Skill,
    General,
    Bonus,
}

impl SelectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionSource::Ancestry => "ancestry",
            SelectionSource::Class => "class",
            SelectionSource::Background => "background",
            SelectionSource::Skill => "skill",
            SelectionSource::General => "general",
            SelectionSource::Bonus => "bonus",
        }
    }
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(source, level, slot_type)` tuple that identifies a slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotKey {
    pub source: SelectionSource,
    pub level: u8,
    pub slot_type: Option<String>,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot_type {
            Some(slot) => write!(f, "{}@{}/{}", self.source, self.level, slot),
            None => write!(f, "{}@{}", self.source, self.level),
        }
    }
}

/// Where an automatically granted selection came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Provenance {
    /// Granted by another selection with this catalog id
    Selection(CatalogId),
    Ancestry(CatalogId),
    Heritage(CatalogId),
    Background(CatalogId),
    Class(CatalogId),
    Specialization(CatalogId),
}

impl Provenance {
    /// Catalog id of the granter.
    pub fn granter(&self) -> &CatalogId {
        match self {
            Provenance::Selection(id)
            | Provenance::Ancestry(id)
            | Provenance::Heritage(id)
            | Provenance::Background(id)
            | Provenance::Class(id)
            | Provenance::Specialization(id) => id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Provenance::Selection(_) => "selection",
            Provenance::Ancestry(_) => "ancestry",
            Provenance::Heritage(_) => "heritage",
            Provenance::Background(_) => "background",
            Provenance::Class(_) => "class",
            Provenance::Specialization(_) => "specialization",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.granter())
    }
}

/// One acquired item on a character.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub catalog_id: CatalogId,
    /// Character level at which it was taken
    pub level: u8,
    pub source: SelectionSource,
    /// Disambiguates several slots of the same source and level
    #[serde(default)]
    pub slot_type: Option<String>,
    /// Choice flag -> chosen value
    #[serde(default)]
    pub choices: BTreeMap<String, String>,
    /// Back-reference to the granter for automatic selections
    #[serde(default)]
    pub granted_by: Option<Provenance>,
}

impl Selection {
    /// A selection the player chose directly.
    pub fn chosen(catalog_id: impl Into<CatalogId>, level: u8, source: SelectionSource) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            level,
            source,
            slot_type: None,
            choices: BTreeMap::new(),
            granted_by: None,
        }
    }

    /// An automatically granted selection in a private bonus slot.
    pub fn granted(catalog_id: impl Into<CatalogId>, level: u8, provenance: Provenance) -> Self {
        let catalog_id = catalog_id.into();
        let slot_type = Some(format!("{}>{}", provenance, catalog_id));
        Self {
            catalog_id,
            level,
            source: SelectionSource::Bonus,
            slot_type,
            choices: BTreeMap::new(),
            granted_by: Some(provenance),
        }
    }

    pub fn with_slot_type(mut self, slot_type: impl Into<String>) -> Self {
        self.slot_type = Some(slot_type.into());
        self
    }

    pub fn with_choice(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.insert(flag.into(), value.into());
        self
    }

    pub fn with_choices(mut self, choices: BTreeMap<String, String>) -> Self {
        self.choices = choices;
        self
    }

    /// Deterministic arena id derived from the identifying fields.
    pub fn id(&self) -> SelectionId {
        let level = self.level.to_string();
        let provenance = self
            .granted_by
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        SelectionId::derive(&[
            self.catalog_id.as_str(),
            self.source.as_str(),
            &level,
            self.slot_type.as_deref().unwrap_or(""),
            &provenance,
        ])
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            source: self.source,
            level: self.level,
            slot_type: self.slot_type.clone(),
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted_by.is_some()
    }

    /// Whether this selection was granted by the selection holding `catalog_id`.
    pub fn granted_by_selection(&self, catalog_id: &CatalogId) -> bool {
        matches!(&self.granted_by, Some(Provenance::Selection(id)) if id == catalog_id)
    }

    pub fn choice(&self, flag: &str) -> Option<&str> {
        self.choices
            .get(flag)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_ignore_choices() {
        let plain = Selection::chosen("skill-mastery", 5, SelectionSource::Skill);
        let with_choice = plain.clone().with_choice("skill", "Athletics");
        assert_eq!(plain.id(), with_choice.id());
    }

    #[test]
    fn ids_differ_by_provenance() {
        let a = Selection::granted("shield-block", 1, Provenance::Class("fighter".into()));
        let b = Selection::granted("shield-block", 1, Provenance::Selection("bulwark".into()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn granted_selections_get_private_bonus_slots() {
        let grant = Selection::granted("shield-block", 1, Provenance::Class("fighter".into()));
        assert_eq!(grant.source, SelectionSource::Bonus);
        assert_eq!(grant.slot_type.as_deref(), Some("class:fighter>shield-block"));
        assert!(grant.is_granted());
    }

    #[test]
    fn empty_choices_read_as_absent() {
        let selection =
            Selection::chosen("assurance", 1, SelectionSource::Skill).with_choice("skill", " ");
        assert_eq!(selection.choice("skill"), None);
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let json = r#"{"catalogId": "toughness", "level": 3, "source": "general"}"#;
        let selection: Selection = serde_json::from_str(json).expect("deserialize");
        assert!(selection.choices.is_empty());
        assert!(!selection.is_granted());
        assert_eq!(selection.key().to_string(), "general@3");
    }

    #[test]
    fn provenance_serializes_with_kind_and_id() {
        let json = serde_json::to_string(&Provenance::Specialization("dragon-instinct".into()))
            .expect("serialize");
        assert_eq!(json, r#"{"kind":"specialization","id":"dragon-instinct"}"#);
    }
}
