//! Catalog entries: feats, class features and specializations.
//!
//! Entries are immutable reference data. Besides the descriptive fields they
//! carry the structured pieces the engine interprets: free-text
//! prerequisites, an embedded choice schema, grants of further entries, and
//! mechanical effects applied during recalculation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::CatalogId;
use crate::value_objects::{Ability, DefenseTarget, ProficiencyRank, Skill};

/// What kind of catalog entry this is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Feat,
    ClassFeature,
    Specialization,
}

/// A feat, class feature or specialization from the catalog.
///
/// Simple data struct: any combination of fields is a valid entry, so the
/// fields are public. Traits are compared case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Stable identifier
    pub id: CatalogId,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub kind: EntryKind,
    /// Minimum character level to take this entry
    #[serde(default)]
    pub level: u8,
    /// Trait tags ("general", "skill", "archetype", "dedication", ...)
    #[serde(default)]
    pub traits: BTreeSet<String>,
    /// Free-text prerequisites, one requirement per string
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Decisions that must be made when taking this entry
    #[serde(default)]
    pub choice_schema: Vec<ChoiceSpec>,
    /// Entries granted automatically when this entry is taken
    #[serde(default)]
    pub grants: Vec<GrantRef>,
    /// Mechanical effects applied by recalculation
    #[serde(default)]
    pub effects: Vec<FeatEffect>,
    /// Whether this entry can be taken multiple times
    #[serde(default)]
    pub repeatable: bool,
    /// Archetype family this entry belongs to (archetype feats only)
    #[serde(default)]
    pub archetype: Option<String>,
    /// For dedications: further family feats needed before another
    /// dedication may be taken. Falls back to the ruleset default.
    #[serde(default)]
    pub additional_feats_required: Option<u8>,
}

impl CatalogEntry {
    /// Create a new entry with required fields.
    pub fn new(id: impl Into<CatalogId>, name: impl Into<String>, kind: EntryKind, level: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            level,
            traits: BTreeSet::new(),
            prerequisites: Vec::new(),
            choice_schema: Vec::new(),
            grants: Vec::new(),
            effects: Vec::new(),
            repeatable: false,
            archetype: None,
            additional_feats_required: None,
        }
    }

    /// Shorthand for a feat entry.
    pub fn feat(id: impl Into<CatalogId>, name: impl Into<String>, level: u8) -> Self {
        Self::new(id, name, EntryKind::Feat, level)
    }

    // Builder-style methods

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.traits
            .extend(traits.into_iter().map(|t| t.as_ref().to_ascii_lowercase()));
        self
    }

    pub fn with_prerequisite(mut self, text: impl Into<String>) -> Self {
        self.prerequisites.push(text.into());
        self
    }

    pub fn with_choice(mut self, choice: ChoiceSpec) -> Self {
        self.choice_schema.push(choice);
        self
    }

    pub fn with_grant(mut self, grant: GrantRef) -> Self {
        self.grants.push(grant);
        self
    }

    pub fn with_effect(mut self, effect: FeatEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_archetype(mut self, family: impl Into<String>) -> Self {
        self.archetype = Some(family.into());
        self
    }

    pub fn with_additional_feats_required(mut self, count: u8) -> Self {
        self.additional_feats_required = Some(count);
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    // Queries

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    pub fn is_archetype(&self) -> bool {
        self.has_trait("archetype")
    }

    pub fn is_dedication(&self) -> bool {
        self.is_archetype() && self.has_trait("dedication")
    }

    /// Archetype family, lower-cased.
    ///
    /// Uses the explicit archetype; dedications without one fall back to
    /// their name minus the "Dedication" suffix.
    pub fn family(&self) -> Option<String> {
        if let Some(archetype) = &self.archetype {
            return Some(archetype.trim().to_ascii_lowercase());
        }
        if self.is_dedication() {
            let name = self.name.trim().to_ascii_lowercase();
            let family = name.strip_suffix("dedication").unwrap_or(&name).trim();
            if !family.is_empty() {
                return Some(family.to_string());
            }
        }
        None
    }

    /// Whether this entry belongs to the named archetype family.
    pub fn in_family(&self, family: &str) -> bool {
        self.family()
            .is_some_and(|own| own.eq_ignore_ascii_case(family.trim()))
    }
}

/// One decision embedded in a catalog entry ("pick a skill", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSpec {
    /// Key under which the chosen value is recorded on the selection
    pub flag: String,
    /// Prompt shown to the player
    pub prompt: String,
    /// Which options are legal
    pub filter: OptionFilter,
    /// Minimum character level at which this choice appears
    #[serde(default)]
    pub min_level: u8,
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl ChoiceSpec {
    pub fn new(flag: impl Into<String>, prompt: impl Into<String>, filter: OptionFilter) -> Self {
        Self {
            flag: flag.into(),
            prompt: prompt.into(),
            filter,
            min_level: 0,
            required: true,
        }
    }

    pub fn from_level(mut self, level: u8) -> Self {
        self.min_level = level;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// The legal option set of a choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionFilter {
    /// Pick a skill whose current rank lies within the bounds
    Skill {
        #[serde(default)]
        min_rank: Option<ProficiencyRank>,
        #[serde(default)]
        max_rank: Option<ProficiencyRank>,
    },
    /// Pick a catalog feat carrying every listed trait
    Feat {
        #[serde(default)]
        traits: Vec<String>,
        #[serde(default)]
        max_level: LevelBound,
    },
    /// Pick an ability
    Ability,
    /// Pick one of a fixed list of values
    Fixed { options: Vec<String> },
}

impl OptionFilter {
    /// A feat with the given traits up to the character's level.
    pub fn feat_with_traits<I, S>(traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionFilter::Feat {
            traits: traits.into_iter().map(Into::into).collect(),
            max_level: LevelBound::CharacterLevel,
        }
    }
}

/// Upper bound on the level of feats offered by a feat choice.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LevelBound {
    #[default]
    CharacterLevel,
    HalfCharacterLevel,
    Fixed(u8),
}

impl LevelBound {
    pub fn resolve(&self, character_level: u8) -> u8 {
        match self {
            LevelBound::CharacterLevel => character_level,
            LevelBound::HalfCharacterLevel => character_level / 2,
            LevelBound::Fixed(level) => *level,
        }
    }
}

/// A reference to something an entry grants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrantRef {
    /// A fixed catalog entry
    Entry { id: CatalogId },
    /// Whatever catalog entry was chosen for `flag` on the granting selection
    ChosenValue { flag: String },
}

impl GrantRef {
    pub fn entry(id: impl Into<CatalogId>) -> Self {
        GrantRef::Entry { id: id.into() }
    }

    pub fn chosen(flag: impl Into<String>) -> Self {
        GrantRef::ChosenValue { flag: flag.into() }
    }
}

/// A mechanical effect of an entry, interpreted by recalculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatEffect {
    /// Become trained in a skill. On dedications, if the skill is already
    /// trained the player picks a replacement skill instead.
    TrainSkill { skill: Skill },
    /// Become trained in the skill chosen for `flag`
    TrainChosenSkill { flag: String },
    /// Raise a skill to at least `rank`
    IncreaseSkill { skill: Skill, rank: ProficiencyRank },
    /// Raise the skill chosen for `flag` to at least `rank`
    IncreaseChosenSkill { flag: String, rank: ProficiencyRank },
    /// Raise perception or a save to at least `rank`
    DefenseRank {
        target: DefenseTarget,
        rank: ProficiencyRank,
    },
    /// Additional hit points
    BonusHitPoints {
        #[serde(default)]
        fixed: i32,
        #[serde(default)]
        per_level: i32,
    },
    /// A limited-use resource pool (focus points, daily uses, ...)
    Resource { name: String, uses: UsesFormula },
}

impl FeatEffect {
    /// Flag of the replacement-skill choice offered when a dedication's
    /// trained skill is already trained.
    pub fn replacement_flag(skill: &Skill) -> String {
        format!("{}-replacement", skill.slug())
    }
}

/// Formula for the size of a resource pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UsesFormula {
    /// Fixed number of uses
    Fixed { value: u8 },
    /// Uses equal to an ability modifier (with a floor)
    AbilityModifier {
        ability: Ability,
        #[serde(default = "default_one_i32")]
        min: i32,
    },
    /// Uses equal to half the character level, minimum 1
    HalfLevel,
}

fn default_one_i32() -> i32 {
    1
}

impl UsesFormula {
    /// Evaluate the formula for a character of `level` whose modifier for the
    /// formula's ability (if any) is `modifier_of(ability)`.
    pub fn evaluate(&self, level: u8, modifier_of: impl Fn(Ability) -> i32) -> u32 {
        match self {
            UsesFormula::Fixed { value } => u32::from(*value),
            UsesFormula::AbilityModifier { ability, min } => {
                modifier_of(*ability).max(*min).max(0).unsigned_abs()
            }
            UsesFormula::HalfLevel => u32::from((level / 2).max(1)),
        }
    }
}
