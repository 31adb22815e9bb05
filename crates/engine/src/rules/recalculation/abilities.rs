//! Ability scores.
//!
//! One boost function serves every level; which levels grant level-up boosts
//! is ruleset configuration.

use std::collections::BTreeSet;

use sheetsmith_domain::{Ability, AbilityScores, BoostSource, CharacterSnapshot, EngineWarning};

use super::Definitions;
use crate::infrastructure::RulesConfig;

/// Apply one set of boosts. An ability listed twice only counts once.
pub fn apply_boost_set(
    scores: &mut AbilityScores,
    abilities: &[Ability],
    level: u8,
    rules: &RulesConfig,
) -> Vec<EngineWarning> {
    let mut warnings = Vec::new();
    let mut seen = BTreeSet::new();
    for ability in abilities {
        if !seen.insert(*ability) {
            warnings.push(EngineWarning::DuplicateBoost {
                ability: *ability,
                level,
            });
            continue;
        }
        let score = scores.get(*ability);
        scores.set(*ability, score + rules.boost_amount(score));
    }
    warnings
}

/// How many abilities a boost set from one source may hold, and the
/// abilities at least one of them must come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostAllowance {
    pub max: u8,
    /// Empty when any ability will do
    pub options: Vec<Ability>,
}

impl BoostAllowance {
    pub fn allows_count(&self, count: usize) -> bool {
        count <= usize::from(self.max)
    }

    /// A non-empty set must include one of the options, if there are any.
    pub fn allows_abilities(&self, abilities: &[Ability]) -> bool {
        self.options.is_empty()
            || abilities.is_empty()
            || abilities.iter().any(|ability| self.options.contains(ability))
    }

    /// Warnings for `abilities`, and the part of the set that is applied.
    fn enforce<'s>(
        &self,
        origin: BoostSource,
        abilities: &'s [Ability],
    ) -> (&'s [Ability], Vec<EngineWarning>) {
        let mut warnings = Vec::new();
        let mut applied = abilities;
        if !self.allows_count(abilities.len()) {
            warnings.push(EngineWarning::BoostAllowanceExceeded {
                origin,
                max: self.max,
                count: abilities.len(),
            });
            applied = &abilities[..usize::from(self.max)];
        }
        if !self.allows_abilities(abilities) {
            warnings.push(EngineWarning::BoostOutsideOptions {
                origin,
                options: self.options.clone(),
            });
        }
        (applied, warnings)
    }
}

/// Allowance for boost sets of `source`, from the character's definitions
/// and the ruleset.
pub fn boost_allowance(
    source: BoostSource,
    definitions: &Definitions<'_>,
    rules: &RulesConfig,
) -> BoostAllowance {
    match source {
        BoostSource::Ancestry => BoostAllowance {
            max: definitions.ancestry.map_or(0, |ancestry| ancestry.free_boosts),
            options: Vec::new(),
        },
        BoostSource::Background => match definitions.background {
            Some(background) => BoostAllowance {
                max: rules.background_boosts,
                options: background.boost_options.clone(),
            },
            None => BoostAllowance {
                max: 0,
                options: Vec::new(),
            },
        },
        BoostSource::Class => {
            let mut options: Vec<Ability> = Vec::new();
            for ability in definitions.classes.iter().flat_map(|c| c.key_ability.iter()) {
                if !options.contains(ability) {
                    options.push(*ability);
                }
            }
            BoostAllowance {
                max: if definitions.classes.is_empty() {
                    0
                } else {
                    rules.class_boosts
                },
                options,
            }
        }
        BoostSource::Free => BoostAllowance {
            max: rules.free_boosts,
            options: Vec::new(),
        },
        BoostSource::LevelUp => BoostAllowance {
            max: rules.boosts_per_level,
            options: Vec::new(),
        },
    }
}

/// Base scores plus ancestry boosts and flaws plus every boost assignment up
/// to the character's level.
///
/// The ancestry's fixed boosts and its free boosts form a single set, so a
/// free boost may not repeat a fixed one. Sets larger than their source
/// allows are cut to size with a warning.
pub fn ability_scores(
    snapshot: &CharacterSnapshot,
    definitions: &Definitions<'_>,
    rules: &RulesConfig,
) -> (AbilityScores, Vec<EngineWarning>) {
    let mut scores = snapshot.base_scores.clone();
    let mut warnings = Vec::new();
    let ancestry = definitions.ancestry;

    let free: Vec<Ability> = snapshot
        .boosts
        .iter()
        .filter(|assignment| assignment.source == BoostSource::Ancestry)
        .flat_map(|assignment| assignment.abilities.iter().copied())
        .collect();
    let (free, free_warnings) = boost_allowance(BoostSource::Ancestry, definitions, rules)
        .enforce(BoostSource::Ancestry, &free);
    warnings.extend(free_warnings);

    let mut ancestry_set: Vec<Ability> = ancestry
        .map(|ancestry| ancestry.boosts.clone())
        .unwrap_or_default();
    ancestry_set.extend_from_slice(free);
    warnings.extend(apply_boost_set(&mut scores, &ancestry_set, 1, rules));
    if let Some(ancestry) = ancestry {
        for flaw in &ancestry.flaws {
            let score = scores.get(*flaw);
            scores.set(*flaw, score - rules.flaw_amount);
        }
    }

    let mut assignments: Vec<_> = snapshot
        .boosts
        .iter()
        .filter(|assignment| assignment.source != BoostSource::Ancestry)
        .collect();
    assignments.sort_by_key(|assignment| (assignment.level, assignment.source));

    for assignment in assignments {
        if assignment.level > snapshot.level {
            continue;
        }
        if assignment.source == BoostSource::LevelUp && !rules.is_boost_level(assignment.level) {
            warnings.push(EngineWarning::BoostLevelNotEligible {
                level: assignment.level,
            });
            continue;
        }
        let (applied, allowance_warnings) = boost_allowance(assignment.source, definitions, rules)
            .enforce(assignment.source, &assignment.abilities);
        warnings.extend(allowance_warnings);
        warnings.extend(apply_boost_set(&mut scores, applied, assignment.level, rules));
    }

    (scores, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsmith_domain::{AncestryDef, BackgroundDef, BoostAssignment, ClassDef};

    #[test]
    fn boost_is_smaller_at_the_threshold() {
        let rules = RulesConfig::default();
        let mut scores = AbilityScores::default()
            .with(Ability::Strength, 17)
            .with(Ability::Dexterity, 18);
        let warnings = apply_boost_set(
            &mut scores,
            &[Ability::Strength, Ability::Dexterity],
            5,
            &rules,
        );
        assert!(warnings.is_empty());
        assert_eq!(scores.get(Ability::Strength), 19);
        assert_eq!(scores.get(Ability::Dexterity), 19);
    }

    #[test]
    fn duplicates_in_one_set_count_once() {
        let rules = RulesConfig::default();
        let mut scores = AbilityScores::default();
        let warnings = apply_boost_set(
            &mut scores,
            &[Ability::Wisdom, Ability::Wisdom],
            1,
            &rules,
        );
        assert_eq!(scores.get(Ability::Wisdom), 12);
        assert_eq!(
            warnings,
            vec![EngineWarning::DuplicateBoost {
                ability: Ability::Wisdom,
                level: 1
            }]
        );
    }

    #[test]
    fn ancestry_free_boost_cannot_repeat_fixed_boost() {
        let rules = RulesConfig::default();
        let dwarf = AncestryDef::new("dwarf", "Dwarf", 10)
            .with_boosts([Ability::Constitution, Ability::Wisdom])
            .with_flaws([Ability::Charisma])
            .with_free_boosts(1);
        let snapshot = CharacterSnapshot::new(1).with_boosts(BoostAssignment::new(
            BoostSource::Ancestry,
            1,
            [Ability::Constitution],
        ));
        let definitions = Definitions {
            ancestry: Some(&dwarf),
            ..Definitions::default()
        };
        let (scores, warnings) = ability_scores(&snapshot, &definitions, &rules);
        assert_eq!(scores.get(Ability::Constitution), 12);
        assert_eq!(scores.get(Ability::Charisma), 8);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn level_up_boosts_need_an_eligible_level() {
        let rules = RulesConfig::default();
        let snapshot = CharacterSnapshot::new(10)
            .with_boosts(BoostAssignment::new(BoostSource::LevelUp, 4, [Ability::Strength]))
            .with_boosts(BoostAssignment::new(BoostSource::LevelUp, 5, [Ability::Strength]))
            .with_boosts(BoostAssignment::new(BoostSource::LevelUp, 10, [Ability::Strength]));
        let (scores, warnings) = ability_scores(&snapshot, &Definitions::default(), &rules);
        assert_eq!(scores.get(Ability::Strength), 14);
        assert_eq!(
            warnings,
            vec![EngineWarning::BoostLevelNotEligible { level: 4 }]
        );
    }

    #[test]
    fn future_boosts_wait_for_their_level() {
        let rules = RulesConfig::default();
        let snapshot = CharacterSnapshot::new(4).with_boosts(BoostAssignment::new(
            BoostSource::LevelUp,
            5,
            [Ability::Dexterity],
        ));
        let (scores, warnings) = ability_scores(&snapshot, &Definitions::default(), &rules);
        assert_eq!(scores.get(Ability::Dexterity), 10);
        assert!(warnings.is_empty());
    }

    #[test]
    fn ancestry_free_boosts_are_capped() {
        let rules = RulesConfig::default();
        let human = AncestryDef::new("human", "Human", 8).with_free_boosts(2);
        let definitions = Definitions {
            ancestry: Some(&human),
            ..Definitions::default()
        };
        let snapshot = CharacterSnapshot::new(1).with_boosts(BoostAssignment::new(
            BoostSource::Ancestry,
            1,
            Ability::ALL,
        ));
        let (scores, warnings) = ability_scores(&snapshot, &definitions, &rules);
        assert_eq!(scores.get(Ability::Strength), 12);
        assert_eq!(scores.get(Ability::Dexterity), 12);
        assert_eq!(scores.get(Ability::Constitution), 10);
        assert_eq!(
            warnings,
            vec![EngineWarning::BoostAllowanceExceeded {
                origin: BoostSource::Ancestry,
                max: 2,
                count: 6
            }]
        );
    }

    #[test]
    fn background_and_class_sets_follow_their_definitions() {
        let rules = RulesConfig::default();
        let warrior = BackgroundDef::new("warrior", "Warrior")
            .with_boost_options([Ability::Strength, Ability::Constitution]);
        let fighter = ClassDef::new("fighter", "Fighter", 10)
            .with_key_ability([Ability::Strength, Ability::Dexterity]);
        let definitions = Definitions {
            background: Some(&warrior),
            classes: vec![&fighter],
            ..Definitions::default()
        };

        let allowance = boost_allowance(BoostSource::Background, &definitions, &rules);
        assert_eq!(allowance.max, 2);
        assert!(allowance.allows_abilities(&[Ability::Wisdom, Ability::Constitution]));
        assert!(!allowance.allows_abilities(&[Ability::Wisdom, Ability::Charisma]));

        let snapshot = CharacterSnapshot::new(1)
            .with_boosts(BoostAssignment::new(
                BoostSource::Background,
                1,
                [Ability::Wisdom, Ability::Charisma],
            ))
            .with_boosts(BoostAssignment::new(
                BoostSource::Class,
                1,
                [Ability::Strength, Ability::Dexterity],
            ));
        let (scores, warnings) = ability_scores(&snapshot, &definitions, &rules);
        assert_eq!(scores.get(Ability::Wisdom), 12);
        assert_eq!(scores.get(Ability::Strength), 12);
        // Only one class boost is applied
        assert_eq!(scores.get(Ability::Dexterity), 10);
        assert!(warnings.contains(&EngineWarning::BoostOutsideOptions {
            origin: BoostSource::Background,
            options: vec![Ability::Strength, Ability::Constitution],
        }));
        assert!(warnings.contains(&EngineWarning::BoostAllowanceExceeded {
            origin: BoostSource::Class,
            max: 1,
            count: 2,
        }));
    }

    #[test]
    fn boost_sets_without_their_element_are_ignored() {
        let rules = RulesConfig::default();
        let snapshot = CharacterSnapshot::new(1).with_boosts(BoostAssignment::new(
            BoostSource::Background,
            1,
            [Ability::Strength],
        ));
        let (scores, warnings) = ability_scores(&snapshot, &Definitions::default(), &rules);
        assert_eq!(scores.get(Ability::Strength), 10);
        assert_eq!(warnings.len(), 1);
    }
}
