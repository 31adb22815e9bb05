//! A read-only view of a character for prerequisite and option checks.
//!
//! Views are cheap to clone. The choice resolver clones one and applies an
//! entry's effects to it to ask "what would this character look like with
//! this feat", without touching the real snapshot.

use std::collections::{BTreeMap, BTreeSet};

use sheetsmith_domain::{
    AbilityScores, CatalogEntry, CatalogId, DedicationState, DefenseTarget, DerivedCharacter,
    FeatEffect, ProficiencyRank, Save, Skill,
};

use crate::infrastructure::RulesConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterView {
    pub level: u8,
    pub ability_scores: AbilityScores,
    pub skills: BTreeMap<Skill, ProficiencyRank>,
    pub perception: ProficiencyRank,
    pub saves: BTreeMap<Save, ProficiencyRank>,
    pub ancestry_id: Option<CatalogId>,
    pub heritage_id: Option<CatalogId>,
    pub class_ids: Vec<CatalogId>,
    pub specialization_ids: Vec<CatalogId>,
    /// Catalog ids of every held selection, player-chosen or granted
    pub held: BTreeSet<CatalogId>,
    pub dedication: DedicationState,
}

impl CharacterView {
    /// An untrained level-`level` character with no selections.
    pub fn blank(level: u8) -> Self {
        Self {
            level,
            ability_scores: AbilityScores::default(),
            skills: Skill::CORE
                .iter()
                .map(|skill| (skill.clone(), ProficiencyRank::Untrained))
                .collect(),
            perception: ProficiencyRank::Untrained,
            saves: Save::ALL
                .iter()
                .map(|save| (*save, ProficiencyRank::Untrained))
                .collect(),
            ancestry_id: None,
            heritage_id: None,
            class_ids: Vec::new(),
            specialization_ids: Vec::new(),
            held: BTreeSet::new(),
            dedication: DedicationState::Free,
        }
    }

    pub fn from_derived(derived: &DerivedCharacter) -> Self {
        let snapshot = derived.snapshot();
        Self {
            level: derived.level,
            ability_scores: derived.ability_scores.clone(),
            skills: derived.skills.clone(),
            perception: derived.perception,
            saves: derived.saves.clone(),
            ancestry_id: snapshot.ancestry_id.clone(),
            heritage_id: snapshot.heritage_id.clone(),
            class_ids: snapshot.class_ids.clone(),
            specialization_ids: snapshot.specialization_ids.clone(),
            held: snapshot
                .selections
                .iter()
                .map(|s| s.catalog_id.clone())
                .collect(),
            dedication: derived.dedication.clone(),
        }
    }

    /// Same character, checked as if at `level`.
    pub fn at_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn skill_rank(&self, skill: &Skill) -> ProficiencyRank {
        self.skills.get(skill).copied().unwrap_or_default()
    }

    pub fn defense_rank(&self, target: DefenseTarget) -> ProficiencyRank {
        match target.save() {
            Some(save) => self.saves.get(&save).copied().unwrap_or_default(),
            None => self.perception,
        }
    }

    pub fn holds(&self, catalog_id: &str) -> bool {
        self.held.contains(catalog_id)
    }

    /// Raise a skill to at least `rank`. Never lowers.
    pub fn raise_skill(&mut self, skill: &Skill, rank: ProficiencyRank) {
        let current = self.skills.entry(skill.clone()).or_default();
        if *current < rank {
            *current = rank;
        }
    }

    /// Raise perception or a save to at least `rank`.
    pub fn raise_defense(&mut self, target: DefenseTarget, rank: ProficiencyRank) {
        let current = match target.save() {
            Some(save) => self.saves.entry(save).or_default(),
            None => &mut self.perception,
        };
        if *current < rank {
            *current = rank;
        }
    }

    /// Apply the proficiency effects of `entry`, taken with `choices`.
    ///
    /// Effects naming a choice flag that is unanswered are skipped. A fixed
    /// training on an already trained skill falls through to the
    /// replacement skill chosen for it, if any.
    pub fn apply_effects(
        &mut self,
        entry: &CatalogEntry,
        choices: &BTreeMap<String, String>,
        rules: &RulesConfig,
    ) {
        let chosen_skill = |flag: &str| {
            choices
                .get(flag)
                .filter(|value| !value.trim().is_empty())
                .and_then(|value| rules.parse_skill(value))
        };

        for effect in &entry.effects {
            match effect {
                FeatEffect::TrainSkill { skill } => {
                    if self.skill_rank(skill).is_trained() {
                        if let Some(replacement) = chosen_skill(&FeatEffect::replacement_flag(skill))
                        {
                            self.raise_skill(&replacement, ProficiencyRank::Trained);
                        }
                    } else {
                        self.raise_skill(skill, ProficiencyRank::Trained);
                    }
                }
                FeatEffect::TrainChosenSkill { flag } => {
                    if let Some(skill) = chosen_skill(flag) {
                        self.raise_skill(&skill, ProficiencyRank::Trained);
                    }
                }
                FeatEffect::IncreaseSkill { skill, rank } => self.raise_skill(skill, *rank),
                FeatEffect::IncreaseChosenSkill { flag, rank } => {
                    if let Some(skill) = chosen_skill(flag) {
                        self.raise_skill(&skill, *rank);
                    }
                }
                FeatEffect::DefenseRank { target, rank } => self.raise_defense(*target, *rank),
                FeatEffect::BonusHitPoints { .. } | FeatEffect::Resource { .. } => {}
            }
        }
    }

    /// A hypothetical copy of this view with `entry` held and its effects
    /// applied.
    pub fn with_entry(
        &self,
        entry: &CatalogEntry,
        choices: &BTreeMap<String, String>,
        rules: &RulesConfig,
    ) -> Self {
        let mut hypothetical = self.clone();
        hypothetical.apply_effects(entry, choices, rules);
        hypothetical.held.insert(entry.id.clone());
        hypothetical
    }
}
