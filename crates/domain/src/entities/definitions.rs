//! Ancestry, heritage, background, class and specialization definitions.
//!
//! Read-only reference data the engine consults while recalculating: base hit
//! points, fixed boosts and trainings, proficiency progressions and the
//! entries each element grants automatically.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::CatalogId;
use crate::value_objects::{Ability, DefenseTarget, ProficiencyRank, Save, Skill};

use super::selection::SelectionSource;

/// An entry granted automatically once the character reaches `level`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelGrant {
    #[serde(default = "default_level")]
    pub level: u8,
    pub entry: CatalogId,
    /// Slot the granted selection occupies. `None` means a private bonus slot
    /// that never collides with player choices.
    #[serde(default)]
    pub slot: Option<GrantSlot>,
}

fn default_level() -> u8 {
    1
}

impl LevelGrant {
    pub fn new(level: u8, entry: impl Into<CatalogId>) -> Self {
        Self {
            level,
            entry: entry.into(),
            slot: None,
        }
    }

    /// Occupy a regular player slot instead of a private bonus slot.
    pub fn in_slot(mut self, source: SelectionSource, slot_type: Option<String>) -> Self {
        self.slot = Some(GrantSlot { source, slot_type });
        self
    }
}

/// A regular selection slot filled by a grant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrantSlot {
    pub source: SelectionSource,
    #[serde(default)]
    pub slot_type: Option<String>,
}

/// An ancestry (e.g. dwarf, elf, human).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AncestryDef {
    pub id: CatalogId,
    pub name: String,
    /// Ancestry hit points, added once
    pub hit_points: i32,
    /// Fixed ability boosts
    #[serde(default)]
    pub boosts: Vec<Ability>,
    /// Fixed ability flaws
    #[serde(default)]
    pub flaws: Vec<Ability>,
    /// Number of free boosts the player assigns
    #[serde(default)]
    pub free_boosts: u8,
    #[serde(default)]
    pub grants: Vec<LevelGrant>,
    #[serde(default)]
    pub traits: BTreeSet<String>,
}

impl AncestryDef {
    pub fn new(id: impl Into<CatalogId>, name: impl Into<String>, hit_points: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hit_points,
            boosts: Vec::new(),
            flaws: Vec::new(),
            free_boosts: 0,
            grants: Vec::new(),
            traits: BTreeSet::new(),
        }
    }

    pub fn with_boosts(mut self, boosts: impl IntoIterator<Item = Ability>) -> Self {
        self.boosts.extend(boosts);
        self
    }

    pub fn with_flaws(mut self, flaws: impl IntoIterator<Item = Ability>) -> Self {
        self.flaws.extend(flaws);
        self
    }

    pub fn with_free_boosts(mut self, count: u8) -> Self {
        self.free_boosts = count;
        self
    }

    pub fn with_grant(mut self, grant: LevelGrant) -> Self {
        self.grants.push(grant);
        self
    }
}

/// A heritage within an ancestry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeritageDef {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub ancestry_id: Option<CatalogId>,
    #[serde(default)]
    pub grants: Vec<LevelGrant>,
}

impl HeritageDef {
    pub fn new(id: impl Into<CatalogId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ancestry_id: None,
            grants: Vec::new(),
        }
    }

    pub fn for_ancestry(mut self, ancestry_id: impl Into<CatalogId>) -> Self {
        self.ancestry_id = Some(ancestry_id.into());
        self
    }

    pub fn with_grant(mut self, grant: LevelGrant) -> Self {
        self.grants.push(grant);
        self
    }
}

/// A background.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundDef {
    pub id: CatalogId,
    pub name: String,
    /// Abilities one of the background boosts must go to
    #[serde(default)]
    pub boost_options: Vec<Ability>,
    #[serde(default)]
    pub trained_skills: Vec<Skill>,
    #[serde(default)]
    pub grants: Vec<LevelGrant>,
}

impl BackgroundDef {
    pub fn new(id: impl Into<CatalogId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            boost_options: Vec::new(),
            trained_skills: Vec::new(),
            grants: Vec::new(),
        }
    }

    pub fn with_boost_options(mut self, abilities: impl IntoIterator<Item = Ability>) -> Self {
        self.boost_options.extend(abilities);
        self
    }

    pub fn with_trained_skills(mut self, skills: impl IntoIterator<Item = Skill>) -> Self {
        self.trained_skills.extend(skills);
        self
    }

    pub fn with_grant(mut self, grant: LevelGrant) -> Self {
        self.grants.push(grant);
        self
    }
}

/// A proficiency upgrade a class gains at a given level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RankUpgrade {
    pub level: u8,
    pub target: DefenseTarget,
    pub rank: ProficiencyRank,
}

/// A class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassDef {
    pub id: CatalogId,
    pub name: String,
    /// Hit points gained per level (before the CON modifier)
    pub hit_points: i32,
    /// Key ability options
    #[serde(default)]
    pub key_ability: Vec<Ability>,
    /// Skills the class always trains
    #[serde(default)]
    pub trained_skills: Vec<Skill>,
    /// Number of additional skills the player picks
    #[serde(default)]
    pub additional_trained_skills: u8,
    #[serde(default)]
    pub perception: ProficiencyRank,
    #[serde(default)]
    pub saves: BTreeMap<Save, ProficiencyRank>,
    #[serde(default)]
    pub rank_upgrades: Vec<RankUpgrade>,
    /// Class features granted by level
    #[serde(default)]
    pub features: Vec<LevelGrant>,
    /// Prerequisite keywords satisfied by this class ("rage", "spellcasting")
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ClassDef {
    pub fn new(id: impl Into<CatalogId>, name: impl Into<String>, hit_points: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hit_points,
            key_ability: Vec::new(),
            trained_skills: Vec::new(),
            additional_trained_skills: 0,
            perception: ProficiencyRank::Trained,
            saves: Save::ALL
                .iter()
                .map(|save| (*save, ProficiencyRank::Trained))
                .collect(),
            rank_upgrades: Vec::new(),
            features: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn with_key_ability(mut self, abilities: impl IntoIterator<Item = Ability>) -> Self {
        self.key_ability.extend(abilities);
        self
    }

    pub fn with_trained_skills(mut self, skills: impl IntoIterator<Item = Skill>) -> Self {
        self.trained_skills.extend(skills);
        self
    }

    pub fn with_additional_trained_skills(mut self, count: u8) -> Self {
        self.additional_trained_skills = count;
        self
    }

    pub fn with_perception(mut self, rank: ProficiencyRank) -> Self {
        self.perception = rank;
        self
    }

    pub fn with_save(mut self, save: Save, rank: ProficiencyRank) -> Self {
        self.saves.insert(save, rank);
        self
    }

    pub fn with_rank_upgrade(mut self, level: u8, target: DefenseTarget, rank: ProficiencyRank) -> Self {
        self.rank_upgrades.push(RankUpgrade {
            level,
            target,
            rank,
        });
        self
    }

    pub fn with_feature(mut self, grant: LevelGrant) -> Self {
        self.features.push(grant);
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn save_rank(&self, save: Save) -> ProficiencyRank {
        self.saves.get(&save).copied().unwrap_or_default()
    }
}

/// A class specialization (instinct, muse, doctrine, bloodline, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationDef {
    pub id: CatalogId,
    /// Display name, e.g. "Dragon Instinct"
    pub name: String,
    /// Category word, e.g. "instinct"
    pub category: String,
    #[serde(default)]
    pub class_id: Option<CatalogId>,
    #[serde(default)]
    pub grants: Vec<LevelGrant>,
}

impl SpecializationDef {
    pub fn new(
        id: impl Into<CatalogId>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            class_id: None,
            grants: Vec::new(),
        }
    }

    pub fn for_class(mut self, class_id: impl Into<CatalogId>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn with_grant(mut self, grant: LevelGrant) -> Self {
        self.grants.push(grant);
        self
    }
}
