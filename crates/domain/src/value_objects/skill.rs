//! Skills, including the open-ended Lore family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ability::Ability;
use crate::error::DomainError;

/// A skill. `Lore` carries its normalized (lower-case) subject.
///
/// Serialized as its display name ("Athletics", "Warfare Lore") so that skill
/// tables can be stored as JSON objects keyed by skill.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Skill {
    Acrobatics,
    Arcana,
    Athletics,
    Crafting,
    Deception,
    Diplomacy,
    Intimidation,
    Lore(String),
    Medicine,
    Nature,
    Occultism,
    Performance,
    Religion,
    Society,
    Stealth,
    Survival,
    Thievery,
}

impl Skill {
    /// Every skill except Lore, in sheet order.
    pub const CORE: [Skill; 16] = [
        Skill::Acrobatics,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Crafting,
        Skill::Deception,
        Skill::Diplomacy,
        Skill::Intimidation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Occultism,
        Skill::Performance,
        Skill::Religion,
        Skill::Society,
        Skill::Stealth,
        Skill::Survival,
        Skill::Thievery,
    ];

    /// A Lore skill on the given subject.
    pub fn lore(subject: impl AsRef<str>) -> Self {
        Skill::Lore(subject.as_ref().trim().to_ascii_lowercase())
    }

    /// The ability that keys this skill.
    pub fn key_ability(&self) -> Ability {
        match self {
            Skill::Acrobatics | Skill::Stealth | Skill::Thievery => Ability::Dexterity,
            Skill::Athletics => Ability::Strength,
            Skill::Arcana
            | Skill::Crafting
            | Skill::Lore(_)
            | Skill::Occultism
            | Skill::Society => Ability::Intelligence,
            Skill::Medicine | Skill::Nature | Skill::Religion | Skill::Survival => {
                Ability::Wisdom
            }
            Skill::Deception | Skill::Diplomacy | Skill::Intimidation | Skill::Performance => {
                Ability::Charisma
            }
        }
    }

    /// Lower-case slug usable inside choice flags ("athletics", "warfare-lore").
    pub fn slug(&self) -> String {
        self.to_string().to_ascii_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Skill::Acrobatics => "Acrobatics",
            Skill::Arcana => "Arcana",
            Skill::Athletics => "Athletics",
            Skill::Crafting => "Crafting",
            Skill::Deception => "Deception",
            Skill::Diplomacy => "Diplomacy",
            Skill::Intimidation => "Intimidation",
            Skill::Lore(subject) => {
                let mut chars = subject.chars();
                return match chars.next() {
                    Some(first) => {
                        write!(f, "{}{} Lore", first.to_ascii_uppercase(), chars.as_str())
                    }
                    None => f.write_str("Lore"),
                };
            }
            Skill::Medicine => "Medicine",
            Skill::Nature => "Nature",
            Skill::Occultism => "Occultism",
            Skill::Performance => "Performance",
            Skill::Religion => "Religion",
            Skill::Society => "Society",
            Skill::Stealth => "Stealth",
            Skill::Survival => "Survival",
            Skill::Thievery => "Thievery",
        };
        f.write_str(name)
    }
}

impl FromStr for Skill {
    type Err = DomainError;

    /// Parses canonical skill names case-insensitively. Lore skills are
    /// written "<subject> lore"; slugs ("warfare-lore") are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', " ");
        if let Some(subject) = normalized.strip_suffix(" lore") {
            if subject.trim().is_empty() {
                return Err(DomainError::parse(format!("Lore skill without subject: {}", s)));
            }
            return Ok(Skill::lore(subject));
        }
        Skill::CORE
            .iter()
            .find(|skill| skill.to_string().eq_ignore_ascii_case(&normalized))
            .cloned()
            .ok_or_else(|| DomainError::parse(format!("Unknown skill: {}", s.trim())))
    }
}

impl From<Skill> for String {
    fn from(skill: Skill) -> Self {
        skill.to_string()
    }
}

impl TryFrom<String> for Skill {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
