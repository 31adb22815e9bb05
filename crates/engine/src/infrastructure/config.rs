//! Engine configuration
//!
//! Ruleset constants (boost levels, rank caps, proficiency bonuses, keyword
//! tables) live here rather than in the rules code, so a different ruleset
//! revision only needs a different rules file.
//!
//! Layering, lowest priority first:
//! 1. Built-in defaults (`RulesConfig::default()`)
//! 2. Optional rules file (TOML, JSON or YAML, chosen by extension)
//! 3. `SHEETSMITH__*` environment variables, `__` separating nested keys,
//!    e.g. `SHEETSMITH__RULES__DEDICATION_FEATS_REQUIRED=2`

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use sheetsmith_domain::{ProficiencyRank, Skill};

/// Environment variable naming the rules file for [`EngineConfig::from_env`].
pub const RULES_FILE_ENV: &str = "SHEETSMITH_RULES_FILE";

const ENV_PREFIX: &str = "SHEETSMITH";

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    pub rules: RulesConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: "sheetsmith_engine=info".to_string(),
            rules: RulesConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load defaults, the optional rules file and environment overrides.
    pub fn load(rules_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = rules_file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().with_context(|| match rules_file {
            Some(path) => format!("Failed to read rules file {}", path.display()),
            None => "Failed to read engine configuration".to_string(),
        })?;

        config
            .try_deserialize()
            .context("Engine configuration has an invalid shape")
    }

    /// Load configuration, taking the rules file path from
    /// `SHEETSMITH_RULES_FILE` when it is set.
    pub fn from_env() -> Result<Self> {
        let rules_file = env::var(RULES_FILE_ENV)
            .ok()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        Self::load(rules_file.as_deref())
    }
}

/// Minimum character level at which each rank may be reached through skill
/// increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankLevelCaps {
    pub expert: u8,
    pub master: u8,
    pub legendary: u8,
}

impl Default for RankLevelCaps {
    fn default() -> Self {
        Self {
            expert: 1,
            master: 7,
            legendary: 15,
        }
    }
}

/// Flat proficiency bonus per rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankBonuses {
    pub untrained: i32,
    pub trained: i32,
    pub expert: i32,
    pub master: i32,
    pub legendary: i32,
    /// Whether trained and better ranks also add the character level
    pub add_level: bool,
}

impl Default for RankBonuses {
    fn default() -> Self {
        Self {
            untrained: 0,
            trained: 2,
            expert: 4,
            master: 6,
            legendary: 8,
            add_level: true,
        }
    }
}

/// Ruleset constants consumed by the rules modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub max_level: u8,
    /// Levels at which a set of level-up boosts is granted
    pub boost_levels: Vec<u8>,
    /// Number of abilities boosted by each level-up set
    pub boosts_per_level: u8,
    /// Background boost set size; one must come from the background's options
    pub background_boosts: u8,
    /// Class boost set size, taken from the class's key ability options
    pub class_boosts: u8,
    /// Free boosts assigned at character creation
    pub free_boosts: u8,
    /// Scores at or above this value gain the smaller boost
    pub boost_threshold: i32,
    pub boost_below_threshold: i32,
    pub boost_at_threshold: i32,
    pub flaw_amount: i32,
    /// Levels at which one skill increase is granted
    pub skill_increase_levels: Vec<u8>,
    pub rank_level_caps: RankLevelCaps,
    pub rank_bonuses: RankBonuses,
    /// Further family feats required after a dedication, unless the
    /// dedication says otherwise
    pub dedication_feats_required: u8,
    /// Prerequisite keyword -> class ids that satisfy it
    pub class_keywords: BTreeMap<String, Vec<String>>,
    /// Abbreviation -> canonical skill name
    pub skill_aliases: BTreeMap<String, String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let class_keywords = [
            ("rage", &["barbarian"][..]),
            (
                "spellcasting",
                &[
                    "bard", "cleric", "druid", "magus", "oracle", "sorcerer", "summoner",
                    "witch", "wizard",
                ][..],
            ),
            ("sneak attack", &["rogue"][..]),
            ("hunt prey", &["ranger"][..]),
            ("panache", &["swashbuckler"][..]),
            ("divine font", &["cleric"][..]),
            ("bardic muse", &["bard"][..]),
            ("wild shape", &["druid"][..]),
            ("champion's reaction", &["champion"][..]),
            ("flurry of blows", &["monk"][..]),
        ]
        .into_iter()
        .map(|(keyword, classes)| {
            (
                keyword.to_string(),
                classes.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect();

        let skill_aliases = [
            ("acro", "Acrobatics"),
            ("athl", "Athletics"),
            ("craft", "Crafting"),
            ("decep", "Deception"),
            ("diplo", "Diplomacy"),
            ("intim", "Intimidation"),
            ("intimidate", "Intimidation"),
            ("med", "Medicine"),
            ("occult", "Occultism"),
            ("perf", "Performance"),
            ("perform", "Performance"),
            ("relig", "Religion"),
            ("soc", "Society"),
            ("surv", "Survival"),
            ("thief", "Thievery"),
        ]
        .into_iter()
        .map(|(alias, skill)| (alias.to_string(), skill.to_string()))
        .collect();

        Self {
            max_level: 20,
            boost_levels: vec![5, 10, 15, 20],
            boosts_per_level: 4,
            background_boosts: 2,
            class_boosts: 1,
            free_boosts: 4,
            boost_threshold: 18,
            boost_below_threshold: 2,
            boost_at_threshold: 1,
            flaw_amount: 2,
            skill_increase_levels: (3..=19).step_by(2).collect(),
            rank_level_caps: RankLevelCaps::default(),
            rank_bonuses: RankBonuses::default(),
            dedication_feats_required: 1,
            class_keywords,
            skill_aliases,
        }
    }
}

impl RulesConfig {
    pub fn is_boost_level(&self, level: u8) -> bool {
        self.boost_levels.contains(&level)
    }

    /// Amount a single boost adds to `score`.
    pub fn boost_amount(&self, score: i32) -> i32 {
        if score >= self.boost_threshold {
            self.boost_at_threshold
        } else {
            self.boost_below_threshold
        }
    }

    pub fn is_skill_increase_level(&self, level: u8) -> bool {
        self.skill_increase_levels.contains(&level)
    }

    /// Character level needed before a skill increase may reach `rank`.
    pub fn min_level_for_rank(&self, rank: ProficiencyRank) -> u8 {
        match rank {
            ProficiencyRank::Untrained | ProficiencyRank::Trained => 1,
            ProficiencyRank::Expert => self.rank_level_caps.expert,
            ProficiencyRank::Master => self.rank_level_caps.master,
            ProficiencyRank::Legendary => self.rank_level_caps.legendary,
        }
    }

    /// Proficiency bonus for a rank at a character level.
    pub fn proficiency_bonus(&self, rank: ProficiencyRank, level: u8) -> i32 {
        let bonuses = &self.rank_bonuses;
        let flat = match rank {
            ProficiencyRank::Untrained => bonuses.untrained,
            ProficiencyRank::Trained => bonuses.trained,
            ProficiencyRank::Expert => bonuses.expert,
            ProficiencyRank::Master => bonuses.master,
            ProficiencyRank::Legendary => bonuses.legendary,
        };
        if bonuses.add_level && rank.is_trained() {
            flat + i32::from(level)
        } else {
            flat
        }
    }

    /// Class ids that satisfy a class-feature keyword, if it is known.
    pub fn classes_for_keyword(&self, keyword: &str) -> Option<&[String]> {
        let keyword = keyword.trim().to_ascii_lowercase();
        self.class_keywords.get(&keyword).map(Vec::as_slice)
    }

    /// Parse a skill name, accepting configured abbreviations.
    pub fn parse_skill(&self, text: &str) -> Option<Skill> {
        let normalized = text.trim().trim_end_matches('.').to_ascii_lowercase();
        let canonical = self
            .skill_aliases
            .get(&normalized)
            .map(String::as_str)
            .unwrap_or(&normalized);
        canonical.parse().ok()
    }
}
