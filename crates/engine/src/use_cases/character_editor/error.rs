//! Character editor errors.

use sheetsmith_domain::{Ability, BoostSource, CatalogId, Provenance, SlotKey};

use crate::rules::selection_graph::GraphError;

/// Reasons an edit is refused. The snapshot is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("Unknown catalog entry: {0}")]
    UnknownEntry(CatalogId),

    #[error("Slot {slot} is held by {catalog_id}, granted by {granted_by}")]
    SlotHeldByGrant {
        slot: SlotKey,
        catalog_id: CatalogId,
        granted_by: Provenance,
    },

    #[error("{entry} cannot be taken: {reason}")]
    DedicationLocked { entry: CatalogId, reason: String },

    #[error("Prerequisites not met for {entry}: {}", reasons.join("; "))]
    PrerequisitesUnmet {
        entry: CatalogId,
        reasons: Vec<String>,
    },

    #[error("{entry} is missing choices: {}", flags.join(", "))]
    IncompleteChoices { entry: CatalogId, flags: Vec<String> },

    #[error("{0} is already selected")]
    AlreadySelected(CatalogId),

    #[error("\"{value}\" is not a valid option for {flag} on {entry}")]
    InvalidOption {
        entry: CatalogId,
        flag: String,
        value: String,
    },

    #[error("{entry} has no choice \"{flag}\"")]
    UnknownChoice { entry: CatalogId, flag: String },

    #[error("{0} is not selected")]
    NotSelected(CatalogId),

    #[error("{catalog_id} was granted by {granted_by} and cannot be removed directly")]
    GrantedSelection {
        catalog_id: CatalogId,
        granted_by: Provenance,
    },

    #[error("A character has at most two classes, got {0}")]
    TooManyClasses(usize),

    #[error("Heritage {heritage} does not belong to ancestry {ancestry}")]
    HeritageMismatch {
        heritage: CatalogId,
        ancestry: CatalogId,
    },

    #[error("Specialization {specialization} requires class {class}")]
    SpecializationMismatch {
        specialization: CatalogId,
        class: CatalogId,
    },

    #[error("Level {level} is outside 1..={max}")]
    InvalidLevel { level: u8, max: u8 },

    #[error("Slot level {level} is above the character's level {character_level}")]
    SlotAboveLevel { level: u8, character_level: u8 },

    #[error("{origin} boosts at level {level} allow {max} abilities, got {count}")]
    TooManyBoosts {
        origin: BoostSource,
        level: u8,
        max: u8,
        count: usize,
    },

    #[error("{origin} boosts must include one of {}", join_abilities(options))]
    BoostOutsideOptions {
        origin: BoostSource,
        options: Vec<Ability>,
    },
}

fn join_abilities(abilities: &[Ability]) -> String {
    abilities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<GraphError> for CommitError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::SlotHeldByGrant {
                slot,
                catalog_id,
                granted_by,
            } => CommitError::SlotHeldByGrant {
                slot,
                catalog_id,
                granted_by,
            },
        }
    }
}
