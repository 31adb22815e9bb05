//! Recoverable conditions reported alongside a derived character.
//!
//! None of these abort an edit or a recalculation: the engine always produces
//! a valid result and lists what it could not fully interpret.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::BoostSource;
use crate::ids::CatalogId;
use crate::value_objects::{Ability, Skill};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineWarning {
    /// Prerequisite text matched no known pattern and was assumed satisfied
    #[error("Unrecognized prerequisite on {entry}: \"{text}\"")]
    UnparseablePrerequisite { entry: CatalogId, text: String },

    /// A grant referenced a choice flag that was not answered
    #[error("Grant on {entry} refers to unanswered choice \"{flag}\"")]
    UnresolvedDynamicGrant { entry: CatalogId, flag: String },

    /// A snapshot or grant referenced an id missing from the catalog
    #[error("Unknown catalog entry: {id}")]
    UnknownCatalogEntry { id: CatalogId },

    /// The same ability appeared twice in one boost set
    #[error("Ability {ability} boosted twice in one set at level {level}")]
    DuplicateBoost { ability: Ability, level: u8 },

    /// A boost set holds more abilities than its source allows; the
    /// extra ones are ignored
    #[error("{origin} boosts allow {max} abilities, got {count}")]
    BoostAllowanceExceeded {
        origin: BoostSource,
        max: u8,
        count: usize,
    },

    /// None of the abilities in a restricted boost set is one its source
    /// offers
    #[error("{origin} boosts must include one of {}", options.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", "))]
    BoostOutsideOptions {
        origin: BoostSource,
        options: Vec<Ability>,
    },

    /// A level-up boost set was assigned to a level that grants none
    #[error("Level {level} does not grant ability boosts")]
    BoostLevelNotEligible { level: u8 },

    /// A skill increase was assigned to a level that grants none
    #[error("Level {level} does not grant a skill increase")]
    SkillIncreaseLevelNotEligible { level: u8 },

    /// More skill trainings chosen than slots available
    #[error("{skill} exceeds the available {pool} trainings")]
    ExcessSkillChoice { skill: Skill, pool: String },

    /// A chosen training targeted a skill that was already trained
    #[error("{skill} was already trained")]
    RedundantSkillTraining { skill: Skill },

    /// A skill increase would exceed the rank allowed at its level
    #[error("{skill} cannot be increased beyond its level cap at level {level}")]
    SkillRankCapped { skill: Skill, level: u8 },

    /// A grant was skipped because it would re-grant one of its own granters
    #[error("Grant cycle through {entry} skipped")]
    GrantCycle { entry: CatalogId },
}
