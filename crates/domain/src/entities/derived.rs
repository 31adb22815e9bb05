//! The fully derived character produced by recalculation.
//!
//! A `DerivedCharacter` is never patched in place: every edit produces a new
//! one from the snapshot it carries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::CatalogId;
use crate::value_objects::{AbilityScores, ProficiencyRank, Save, Skill};
use crate::warnings::EngineWarning;

use super::selection::Selection;
use super::snapshot::CharacterSnapshot;

/// Result of checking an entry's requirements against a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub met: bool,
    /// Human-readable reasons for every unmet requirement, level first
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Requirement texts that were not understood and assumed satisfied
    #[serde(default)]
    pub unparsed: Vec<String>,
}

impl Eligibility {
    /// Every requirement met.
    pub fn met() -> Self {
        Self {
            met: true,
            reasons: Vec::new(),
            unparsed: Vec::new(),
        }
    }

    /// Failed for a single reason.
    pub fn unmet(reason: impl Into<String>) -> Self {
        Self {
            met: false,
            reasons: vec![reason.into()],
            unparsed: Vec::new(),
        }
    }

    /// Met, but only because some requirements could not be checked.
    pub fn is_assumed(&self) -> bool {
        self.met && !self.unparsed.is_empty()
    }
}

/// A selection annotated with its current eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedSelection {
    pub selection: Selection,
    pub eligibility: Eligibility,
}

/// State of the archetype dedication constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DedicationState {
    /// Any archetype may be drawn from
    #[default]
    Free,
    /// Archetype feats are restricted to `archetype` until `remaining`
    /// further family feats have been taken
    #[serde(rename_all = "camelCase")]
    Locked {
        archetype: String,
        dedication_id: CatalogId,
        taken_at_level: u8,
        feats_taken: u8,
        remaining: u8,
    },
}

impl DedicationState {
    pub fn is_locked(&self) -> bool {
        matches!(self, DedicationState::Locked { .. })
    }

    /// Archetype family the character is locked into, if any.
    pub fn locked_archetype(&self) -> Option<&str> {
        match self {
            DedicationState::Locked { archetype, .. } => Some(archetype),
            DedicationState::Free => None,
        }
    }
}

/// Output of recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedCharacter {
    pub level: u8,
    pub ability_scores: AbilityScores,
    pub skills: BTreeMap<Skill, ProficiencyRank>,
    pub perception: ProficiencyRank,
    pub saves: BTreeMap<Save, ProficiencyRank>,
    pub max_hit_points: i32,
    /// Resource name -> uses
    pub resources: BTreeMap<String, u32>,
    pub selections: Vec<AnnotatedSelection>,
    pub dedication: DedicationState,
    pub warnings: Vec<EngineWarning>,
    /// Snapshot after grant reconciliation
    snapshot: CharacterSnapshot,
}

impl DerivedCharacter {
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        snapshot: CharacterSnapshot,
        ability_scores: AbilityScores,
        skills: BTreeMap<Skill, ProficiencyRank>,
        perception: ProficiencyRank,
        saves: BTreeMap<Save, ProficiencyRank>,
        max_hit_points: i32,
        resources: BTreeMap<String, u32>,
        selections: Vec<AnnotatedSelection>,
        dedication: DedicationState,
        warnings: Vec<EngineWarning>,
    ) -> Self {
        Self {
            level: snapshot.level,
            ability_scores,
            skills,
            perception,
            saves,
            max_hit_points,
            resources,
            selections,
            dedication,
            warnings,
            snapshot,
        }
    }

    /// The reconciled snapshot this character was derived from.
    pub fn snapshot(&self) -> &CharacterSnapshot {
        &self.snapshot
    }

    /// Owned copy of the reconciled snapshot, ready to persist or edit.
    pub fn to_snapshot(&self) -> CharacterSnapshot {
        self.snapshot.clone()
    }

    pub fn skill_rank(&self, skill: &Skill) -> ProficiencyRank {
        self.skills.get(skill).copied().unwrap_or_default()
    }

    pub fn save_rank(&self, save: Save) -> ProficiencyRank {
        self.saves.get(&save).copied().unwrap_or_default()
    }

    /// Annotated selection of a catalog entry, if held.
    pub fn selection(&self, catalog_id: &str) -> Option<&AnnotatedSelection> {
        self.selections
            .iter()
            .find(|s| s.selection.catalog_id == *catalog_id)
    }

    /// Selections flagged as no longer eligible.
    pub fn ineligible(&self) -> impl Iterator<Item = &AnnotatedSelection> {
        self.selections.iter().filter(|s| !s.eligibility.met)
    }
}
