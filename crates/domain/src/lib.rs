//! SheetSmith domain: the vocabulary of the character derivation engine.
//!
//! ## Structure
//!
//! - `value_objects/` - abilities, skills, proficiency ranks
//! - `entities/` - catalog entries, selections, snapshots, derived characters
//! - `catalog` - the read-only catalog port and its in-memory implementation
//! - `warnings` - recoverable conditions reported by the engine

pub mod catalog;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;
pub mod warnings;

pub use catalog::{Catalog, CatalogData, StaticCatalog};
pub use error::DomainError;
pub use ids::{CatalogId, SelectionId};
pub use warnings::EngineWarning;

pub use entities::{
    AncestryDef, AnnotatedSelection, BackgroundDef, BoostAssignment, BoostSource, CatalogEntry,
    CharacterSnapshot, ChoiceSpec, ClassDef, DedicationState, DerivedCharacter, Eligibility,
    EntryKind, FeatEffect, GrantRef, GrantSlot, HeritageDef, LevelBound, LevelGrant, OptionFilter,
    Provenance, RankUpgrade, Selection, SelectionSource, SlotKey, SpecializationDef, UsesFormula,
};

pub use value_objects::{
    ability_modifier, Ability, AbilityScores, DefenseTarget, ProficiencyRank, Save, Skill,
};
