//! Proficiency ranks and the statistics they apply to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ability::Ability;
use crate::error::DomainError;

/// Proficiency ranks, totally ordered from untrained to legendary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyRank {
    /// Not trained
    #[default]
    Untrained,
    /// Basic training
    Trained,
    /// Advanced training
    Expert,
    /// Mastery
    Master,
    /// Ultimate mastery
    Legendary,
}

impl ProficiencyRank {
    pub const ALL: [ProficiencyRank; 5] = [
        ProficiencyRank::Untrained,
        ProficiencyRank::Trained,
        ProficiencyRank::Expert,
        ProficiencyRank::Master,
        ProficiencyRank::Legendary,
    ];

    /// Position in the total order (0 for untrained, 4 for legendary).
    pub fn index(&self) -> usize {
        match self {
            ProficiencyRank::Untrained => 0,
            ProficiencyRank::Trained => 1,
            ProficiencyRank::Expert => 2,
            ProficiencyRank::Master => 3,
            ProficiencyRank::Legendary => 4,
        }
    }

    /// The next rank up, or `None` at legendary.
    pub fn next(&self) -> Option<ProficiencyRank> {
        match self {
            ProficiencyRank::Untrained => Some(ProficiencyRank::Trained),
            ProficiencyRank::Trained => Some(ProficiencyRank::Expert),
            ProficiencyRank::Expert => Some(ProficiencyRank::Master),
            ProficiencyRank::Master => Some(ProficiencyRank::Legendary),
            ProficiencyRank::Legendary => None,
        }
    }

    pub fn is_trained(&self) -> bool {
        *self >= ProficiencyRank::Trained
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProficiencyRank::Untrained => "untrained",
            ProficiencyRank::Trained => "trained",
            ProficiencyRank::Expert => "expert",
            ProficiencyRank::Master => "master",
            ProficiencyRank::Legendary => "legendary",
        }
    }
}

impl fmt::Display for ProficiencyRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProficiencyRank {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "untrained" => Ok(ProficiencyRank::Untrained),
            "trained" => Ok(ProficiencyRank::Trained),
            "expert" => Ok(ProficiencyRank::Expert),
            "master" => Ok(ProficiencyRank::Master),
            "legendary" => Ok(ProficiencyRank::Legendary),
            other => Err(DomainError::parse(format!("Unknown proficiency rank: {}", other))),
        }
    }
}

/// Saving throws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Save {
    Fortitude,
    Reflex,
    Will,
}

impl Save {
    pub const ALL: [Save; 3] = [Save::Fortitude, Save::Reflex, Save::Will];

    pub fn key_ability(&self) -> Ability {
        match self {
            Save::Fortitude => Ability::Constitution,
            Save::Reflex => Ability::Dexterity,
            Save::Will => Ability::Wisdom,
        }
    }
}

impl fmt::Display for Save {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Save::Fortitude => "Fortitude",
            Save::Reflex => "Reflex",
            Save::Will => "Will",
        };
        f.write_str(name)
    }
}

/// A non-skill statistic whose proficiency a class or feat can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefenseTarget {
    Perception,
    Fortitude,
    Reflex,
    Will,
}

impl DefenseTarget {
    /// The save this target refers to, if it is one.
    pub fn save(&self) -> Option<Save> {
        match self {
            DefenseTarget::Perception => None,
            DefenseTarget::Fortitude => Some(Save::Fortitude),
            DefenseTarget::Reflex => Some(Save::Reflex),
            DefenseTarget::Will => Some(Save::Will),
        }
    }
}
