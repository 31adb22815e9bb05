//! The raw, authoritative state of a character.
//!
//! A snapshot holds only what the player decided. It is the only record that
//! is persisted; every derived number is recomputed from it. All fields
//! default when missing so that snapshots written by older schema versions
//! still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::CatalogId;
use crate::value_objects::{Ability, AbilityScores, Skill};

use super::selection::{Selection, SelectionSource, SlotKey};

/// Where a set of ability boosts comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostSource {
    Ancestry,
    Background,
    Class,
    Free,
    LevelUp,
}

impl std::fmt::Display for BoostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BoostSource::Ancestry => "ancestry",
            BoostSource::Background => "background",
            BoostSource::Class => "class",
            BoostSource::Free => "free",
            BoostSource::LevelUp => "level-up",
        };
        f.write_str(name)
    }
}

/// One set of boosts applied together at a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostAssignment {
    pub source: BoostSource,
    #[serde(default = "default_level")]
    pub level: u8,
    pub abilities: Vec<Ability>,
}

impl BoostAssignment {
    pub fn new(source: BoostSource, level: u8, abilities: impl IntoIterator<Item = Ability>) -> Self {
        Self {
            source,
            level,
            abilities: abilities.into_iter().collect(),
        }
    }
}

fn default_level() -> u8 {
    1
}

/// The raw input to recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterSnapshot {
    pub level: u8,
    pub ancestry_id: Option<CatalogId>,
    pub heritage_id: Option<CatalogId>,
    pub heritage_choice: Option<String>,
    pub background_id: Option<CatalogId>,
    /// One class, or two for dual-class characters
    pub class_ids: Vec<CatalogId>,
    pub specialization_ids: Vec<CatalogId>,
    pub base_scores: AbilityScores,
    /// Every acquired selection, in insertion order
    pub selections: Vec<Selection>,
    pub boosts: Vec<BoostAssignment>,
    /// Skills picked with the class's additional trainings
    pub trained_skills: Vec<Skill>,
    /// Skills picked with trainings granted by the Intelligence modifier
    pub int_bonus_skills: Vec<Skill>,
    /// Skill increase taken at each level
    pub skill_increases: BTreeMap<u8, Skill>,
}

impl Default for CharacterSnapshot {
    fn default() -> Self {
        Self {
            level: 1,
            ancestry_id: None,
            heritage_id: None,
            heritage_choice: None,
            background_id: None,
            class_ids: Vec::new(),
            specialization_ids: Vec::new(),
            base_scores: AbilityScores::default(),
            selections: Vec::new(),
            boosts: Vec::new(),
            trained_skills: Vec::new(),
            int_bonus_skills: Vec::new(),
            skill_increases: BTreeMap::new(),
        }
    }
}

impl CharacterSnapshot {
    pub fn new(level: u8) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    // Builder-style methods

    pub fn with_ancestry(mut self, ancestry_id: impl Into<CatalogId>) -> Self {
        self.ancestry_id = Some(ancestry_id.into());
        self
    }

    pub fn with_heritage(mut self, heritage_id: impl Into<CatalogId>) -> Self {
        self.heritage_id = Some(heritage_id.into());
        self
    }

    pub fn with_background(mut self, background_id: impl Into<CatalogId>) -> Self {
        self.background_id = Some(background_id.into());
        self
    }

    pub fn with_class(mut self, class_id: impl Into<CatalogId>) -> Self {
        self.class_ids.push(class_id.into());
        self
    }

    pub fn with_specialization(mut self, specialization_id: impl Into<CatalogId>) -> Self {
        self.specialization_ids.push(specialization_id.into());
        self
    }

    pub fn with_base_scores(mut self, scores: AbilityScores) -> Self {
        self.base_scores = scores;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selections.push(selection);
        self
    }

    pub fn with_boosts(mut self, boosts: BoostAssignment) -> Self {
        self.boosts.push(boosts);
        self
    }

    pub fn with_trained_skill(mut self, skill: Skill) -> Self {
        self.trained_skills.push(skill);
        self
    }

    pub fn with_skill_increase(mut self, level: u8, skill: Skill) -> Self {
        self.skill_increases.insert(level, skill);
        self
    }

    // Queries

    /// First selection of the given catalog entry.
    pub fn selection(&self, catalog_id: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.catalog_id == *catalog_id)
    }

    pub fn has_selection(&self, catalog_id: &str) -> bool {
        self.selection(catalog_id).is_some()
    }

    /// Selection occupying the given slot, if any.
    pub fn occupant(&self, key: &SlotKey) -> Option<&Selection> {
        self.selections.iter().find(|s| s.key() == *key)
    }

    /// Selections the player chose directly.
    pub fn player_selections(&self) -> impl Iterator<Item = &Selection> {
        self.selections.iter().filter(|s| !s.is_granted())
    }

    /// Selections taken from the given source.
    pub fn selections_from(&self, source: SelectionSource) -> impl Iterator<Item = &Selection> {
        self.selections.iter().filter(move |s| s.source == source)
    }
}
