//! Test fixtures: a small PF2e-flavoured catalog and common helpers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{editor, fighter_snapshot};
//!
//! #[test]
//! fn fighter_blocks_with_shields() {
//!     let derived = editor().recalculate(&fighter_snapshot(1));
//!     assert!(derived.selection("shield-block").is_some());
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use sheetsmith_domain::{
    Ability, AncestryDef, BackgroundDef, CatalogEntry, CharacterSnapshot, ChoiceSpec, ClassDef,
    DefenseTarget, EntryKind, FeatEffect, GrantRef, HeritageDef, LevelGrant, OptionFilter,
    ProficiencyRank, Save, Selection, SelectionSource, Skill, SpecializationDef, StaticCatalog,
    UsesFormula,
};

use crate::infrastructure::RulesConfig;
use crate::use_cases::CharacterEditor;

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load a JSON fixture from the test_data/ directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read or parsed.
pub fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

// =============================================================================
// Catalog
// =============================================================================

fn class_feature(id: &str, name: &str, level: u8) -> CatalogEntry {
    CatalogEntry::new(id, name, EntryKind::ClassFeature, level)
}

/// Ancestries, backgrounds, three classes and a handful of feats covering
/// every prerequisite style.
pub fn sample_catalog() -> StaticCatalog {
    StaticCatalog::new()
        // Ancestries and heritages
        .with_ancestry(
            AncestryDef::new("dwarf", "Dwarf", 10)
                .with_boosts([Ability::Constitution, Ability::Wisdom])
                .with_flaws([Ability::Charisma])
                .with_free_boosts(1)
                .with_grant(LevelGrant::new(1, "darkvision")),
        )
        .with_ancestry(AncestryDef::new("human", "Human", 8).with_free_boosts(2))
        .with_heritage(HeritageDef::new("rock-dwarf", "Rock Dwarf").for_ancestry("dwarf"))
        .with_heritage(
            HeritageDef::new("versatile-human", "Versatile Human").for_ancestry("human"),
        )
        // Backgrounds
        .with_background(
            BackgroundDef::new("acrobat", "Acrobat")
                .with_trained_skills([Skill::Acrobatics, Skill::lore("circus")]),
        )
        .with_background(
            BackgroundDef::new("warrior", "Warrior")
                .with_boost_options([Ability::Strength, Ability::Constitution])
                .with_trained_skills([Skill::Intimidation, Skill::lore("warfare")]),
        )
        // Classes
        .with_class(
            ClassDef::new("fighter", "Fighter", 10)
                .with_key_ability([Ability::Strength, Ability::Dexterity])
                .with_trained_skills([Skill::Athletics])
                .with_additional_trained_skills(3)
                .with_perception(ProficiencyRank::Expert)
                .with_save(Save::Fortitude, ProficiencyRank::Expert)
                .with_save(Save::Reflex, ProficiencyRank::Expert)
                .with_feature(LevelGrant::new(1, "shield-block"))
                .with_feature(LevelGrant::new(3, "bravery")),
        )
        .with_class(
            ClassDef::new("barbarian", "Barbarian", 12)
                .with_trained_skills([Skill::Athletics])
                .with_additional_trained_skills(3)
                .with_perception(ProficiencyRank::Expert)
                .with_save(Save::Fortitude, ProficiencyRank::Expert)
                .with_save(Save::Will, ProficiencyRank::Expert)
                .with_keywords(["rage"])
                .with_feature(LevelGrant::new(1, "rage")),
        )
        .with_class(
            ClassDef::new("rogue", "Rogue", 8)
                .with_key_ability([Ability::Dexterity])
                .with_trained_skills([Skill::Stealth])
                .with_additional_trained_skills(7)
                .with_perception(ProficiencyRank::Expert)
                .with_save(Save::Reflex, ProficiencyRank::Expert)
                .with_save(Save::Will, ProficiencyRank::Expert)
                .with_rank_upgrade(7, DefenseTarget::Perception, ProficiencyRank::Master),
        )
        .with_specialization(
            SpecializationDef::new("dragon-instinct", "Dragon Instinct", "instinct")
                .for_class("barbarian")
                .with_grant(LevelGrant::new(1, "dragon-rage")),
        )
        .with_specialization(
            SpecializationDef::new("animal-instinct", "Animal Instinct", "instinct")
                .for_class("barbarian"),
        )
        // Class features
        .with_entry(class_feature("darkvision", "Darkvision", 1))
        .with_entry(class_feature("shield-block", "Shield Block", 1))
        .with_entry(class_feature("bravery", "Bravery", 3).with_effect(
            FeatEffect::DefenseRank {
                target: DefenseTarget::Will,
                rank: ProficiencyRank::Expert,
            },
        ))
        .with_entry(class_feature("rage", "Rage", 1))
        .with_entry(
            class_feature("dragon-rage", "Dragon Rage", 1)
                .with_choice(ChoiceSpec::new(
                    "dragon",
                    "Choose a dragon",
                    OptionFilter::Fixed {
                        options: vec!["red".to_string(), "blue".to_string(), "gold".to_string()],
                    },
                ))
                .with_effect(FeatEffect::Resource {
                    name: "Rage Breath".to_string(),
                    uses: UsesFormula::Fixed { value: 1 },
                }),
        )
        // Class feats
        .with_entry(CatalogEntry::feat("power-attack", "Power Attack", 1).with_traits(["fighter"]))
        .with_entry(
            CatalogEntry::feat("moment-of-clarity", "Moment of Clarity", 1)
                .with_traits(["barbarian"])
                .with_prerequisite("rage"),
        )
        .with_entry(
            CatalogEntry::feat("draconic-arrogance", "Draconic Arrogance", 2)
                .with_traits(["barbarian"])
                .with_prerequisite("dragon instinct"),
        )
        // General and skill feats
        .with_entry(
            CatalogEntry::feat("martial-training", "Martial Training", 1)
                .with_traits(["general"])
                .with_grant(GrantRef::entry("armor-proficiency")),
        )
        .with_entry(
            CatalogEntry::feat("armor-proficiency", "Armor Proficiency", 1)
                .with_traits(["general"]),
        )
        .with_entry(
            CatalogEntry::feat("toughness", "Toughness", 1)
                .with_traits(["general"])
                .with_effect(FeatEffect::BonusHitPoints {
                    fixed: 0,
                    per_level: 1,
                }),
        )
        .with_entry(
            CatalogEntry::feat("incredible-initiative", "Incredible Initiative", 1)
                .with_traits(["general"]),
        )
        .with_entry(
            CatalogEntry::feat("hefty-hauler", "Hefty Hauler", 1)
                .with_traits(["general", "skill"])
                .with_prerequisite("Strength 14"),
        )
        .with_entry(
            CatalogEntry::feat("skill-training", "Skill Training", 1)
                .with_traits(["general"])
                .repeatable()
                .with_choice(ChoiceSpec::new(
                    "skill",
                    "Choose an untrained skill",
                    OptionFilter::Skill {
                        min_rank: None,
                        max_rank: Some(ProficiencyRank::Untrained),
                    },
                ))
                .with_effect(FeatEffect::TrainChosenSkill {
                    flag: "skill".to_string(),
                }),
        )
        .with_entry(
            CatalogEntry::feat("skill-mastery", "Skill Mastery", 2)
                .with_traits(["general"])
                .with_choice(ChoiceSpec::new(
                    "skill",
                    "Choose a trained skill",
                    OptionFilter::Skill {
                        min_rank: Some(ProficiencyRank::Trained),
                        max_rank: Some(ProficiencyRank::Trained),
                    },
                ))
                .with_choice(ChoiceSpec::new(
                    "feat",
                    "Choose a skill feat",
                    OptionFilter::feat_with_traits(["skill"]),
                ))
                .with_effect(FeatEffect::IncreaseChosenSkill {
                    flag: "skill".to_string(),
                    rank: ProficiencyRank::Expert,
                })
                .with_grant(GrantRef::chosen("feat")),
        )
        .with_entry(
            CatalogEntry::feat("quick-jump", "Quick Jump", 1)
                .with_traits(["general", "skill"])
                .with_prerequisite("trained in Athletics"),
        )
        .with_entry(
            CatalogEntry::feat("rapid-mantel", "Rapid Mantel", 2)
                .with_traits(["general", "skill"])
                .with_prerequisite("trained in Athletics"),
        )
        .with_entry(
            CatalogEntry::feat("powerful-leap", "Powerful Leap", 2)
                .with_traits(["general", "skill"])
                .with_prerequisite("expert in Athletics"),
        )
        .with_entry(
            CatalogEntry::feat("cat-fall", "Cat Fall", 1)
                .with_traits(["general", "skill"])
                .with_prerequisite("trained in Acrobatics"),
        )
        .with_entry(
            CatalogEntry::feat("recognize-spell", "Recognize Spell", 1)
                .with_traits(["general", "skill"])
                .with_prerequisite("trained in Arcana, Nature, Occultism, or Religion"),
        )
        // Ancestry feats
        .with_entry(
            CatalogEntry::feat("rock-runner", "Rock Runner", 1)
                .with_traits(["dwarf"])
                .with_prerequisite("dwarf"),
        )
        .with_entry(
            CatalogEntry::feat("bird-speaker", "Bird Speaker", 1)
                .with_traits(["human"])
                .with_prerequisite("ability to speak with birds"),
        )
        // Archetypes
        .with_entry(
            CatalogEntry::feat("duelist-dedication", "Duelist Dedication", 2)
                .with_traits(["archetype", "dedication"])
                .with_archetype("duelist")
                .with_effect(FeatEffect::TrainSkill {
                    skill: Skill::Acrobatics,
                }),
        )
        .with_entry(
            CatalogEntry::feat("duelist-quick-draw", "Quick Draw (Duelist)", 4)
                .with_traits(["archetype"])
                .with_archetype("duelist")
                .with_prerequisite("Duelist Dedication"),
        )
        .with_entry(
            CatalogEntry::feat("assassin-dedication", "Assassin Dedication", 2)
                .with_traits(["archetype", "dedication"])
                .with_archetype("assassin")
                .with_effect(FeatEffect::TrainSkill {
                    skill: Skill::Deception,
                }),
        )
        .with_entry(
            CatalogEntry::feat("assassins-trick", "Assassin's Trick", 4)
                .with_traits(["archetype"])
                .with_archetype("assassin")
                .with_prerequisite("Assassin Dedication"),
        )
}

/// The sample catalog plus the archetype entries in
/// `test_data/archetypes.json`.
pub fn archetype_catalog() -> StaticCatalog {
    let entries: Vec<CatalogEntry> = load_fixture("archetypes.json");
    entries
        .into_iter()
        .fold(sample_catalog(), StaticCatalog::with_entry)
}

// =============================================================================
// Characters
// =============================================================================

pub fn editor() -> CharacterEditor {
    CharacterEditor::new(Arc::new(sample_catalog()), RulesConfig::default())
}

/// Dwarf fighter with the warrior background.
pub fn fighter_snapshot(level: u8) -> CharacterSnapshot {
    CharacterSnapshot::new(level)
        .with_ancestry("dwarf")
        .with_background("warrior")
        .with_class("fighter")
}

/// Add a player-chosen general feat, bypassing validation.
pub fn with_feat(snapshot: CharacterSnapshot, catalog_id: &str, level: u8) -> CharacterSnapshot {
    snapshot.with_selection(
        Selection::chosen(catalog_id, level, SelectionSource::General).with_slot_type(catalog_id),
    )
}
