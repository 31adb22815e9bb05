//! Skill, perception and save ranks before selection effects.

use std::collections::BTreeMap;

use sheetsmith_domain::{
    Ability, AbilityScores, BackgroundDef, CharacterSnapshot, ClassDef, EngineWarning,
    ProficiencyRank, Save, Skill,
};

use crate::infrastructure::RulesConfig;

/// Skill ranks from class and background trainings, manual trainings,
/// INT-bonus trainings and per-level skill increases, in that order.
pub fn skill_table(
    snapshot: &CharacterSnapshot,
    classes: &[&ClassDef],
    background: Option<&BackgroundDef>,
    scores: &AbilityScores,
    rules: &RulesConfig,
) -> (BTreeMap<Skill, ProficiencyRank>, Vec<EngineWarning>) {
    let mut skills: BTreeMap<Skill, ProficiencyRank> = Skill::CORE
        .iter()
        .map(|skill| (skill.clone(), ProficiencyRank::Untrained))
        .collect();
    let mut warnings = Vec::new();

    let fixed = classes
        .iter()
        .flat_map(|class| class.trained_skills.iter())
        .chain(background.into_iter().flat_map(|bg| bg.trained_skills.iter()));
    for skill in fixed {
        train(&mut skills, skill);
    }

    let class_pool: usize = classes
        .iter()
        .map(|class| usize::from(class.additional_trained_skills))
        .sum();
    train_from_pool(
        &mut skills,
        &snapshot.trained_skills,
        class_pool,
        "class",
        &mut warnings,
    );

    let int_pool = usize::try_from(scores.modifier(Ability::Intelligence).max(0)).unwrap_or(0);
    train_from_pool(
        &mut skills,
        &snapshot.int_bonus_skills,
        int_pool,
        "intelligence",
        &mut warnings,
    );

    for (level, skill) in &snapshot.skill_increases {
        let level = *level;
        if level > snapshot.level {
            continue;
        }
        if !rules.is_skill_increase_level(level) {
            warnings.push(EngineWarning::SkillIncreaseLevelNotEligible { level });
            continue;
        }
        let current = skills.get(skill).copied().unwrap_or_default();
        match current.next() {
            Some(next) if level >= rules.min_level_for_rank(next) => {
                skills.insert(skill.clone(), next);
            }
            _ => warnings.push(EngineWarning::SkillRankCapped {
                skill: skill.clone(),
                level,
            }),
        }
    }

    (skills, warnings)
}

fn train(skills: &mut BTreeMap<Skill, ProficiencyRank>, skill: &Skill) {
    let rank = skills.entry(skill.clone()).or_default();
    if !rank.is_trained() {
        *rank = ProficiencyRank::Trained;
    }
}

/// Train each chosen skill while the pool lasts. Already trained skills do
/// not consume a slot.
fn train_from_pool(
    skills: &mut BTreeMap<Skill, ProficiencyRank>,
    chosen: &[Skill],
    pool: usize,
    pool_name: &str,
    warnings: &mut Vec<EngineWarning>,
) {
    let mut used = 0;
    for skill in chosen {
        if skills.get(skill).is_some_and(ProficiencyRank::is_trained) {
            warnings.push(EngineWarning::RedundantSkillTraining {
                skill: skill.clone(),
            });
            continue;
        }
        if used >= pool {
            warnings.push(EngineWarning::ExcessSkillChoice {
                skill: skill.clone(),
                pool: pool_name.to_string(),
            });
            continue;
        }
        train(skills, skill);
        used += 1;
    }
}

/// Perception and save ranks: the best base rank across classes, raised by
/// every class upgrade reached by `level`.
pub fn defenses(
    classes: &[&ClassDef],
    level: u8,
) -> (ProficiencyRank, BTreeMap<Save, ProficiencyRank>) {
    let mut perception = classes
        .iter()
        .map(|class| class.perception)
        .max()
        .unwrap_or_default();
    let mut saves: BTreeMap<Save, ProficiencyRank> = Save::ALL
        .iter()
        .map(|save| {
            let rank = classes
                .iter()
                .map(|class| class.save_rank(*save))
                .max()
                .unwrap_or_default();
            (*save, rank)
        })
        .collect();

    let upgrades = classes
        .iter()
        .flat_map(|class| class.rank_upgrades.iter())
        .filter(|upgrade| upgrade.level <= level);
    for upgrade in upgrades {
        let current = match upgrade.target.save() {
            Some(save) => saves.entry(save).or_default(),
            None => &mut perception,
        };
        if *current < upgrade.rank {
            *current = upgrade.rank;
        }
    }

    (perception, saves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsmith_domain::DefenseTarget;

    fn fighter() -> ClassDef {
        ClassDef::new("fighter", "Fighter", 10)
            .with_trained_skills([Skill::Athletics])
            .with_additional_trained_skills(2)
            .with_perception(ProficiencyRank::Expert)
            .with_save(Save::Fortitude, ProficiencyRank::Expert)
            .with_rank_upgrade(9, DefenseTarget::Fortitude, ProficiencyRank::Master)
    }

    fn rogue() -> ClassDef {
        ClassDef::new("rogue", "Rogue", 8)
            .with_trained_skills([Skill::Stealth])
            .with_additional_trained_skills(1)
            .with_save(Save::Reflex, ProficiencyRank::Expert)
    }

    #[test]
    fn trainings_are_applied_in_order_with_pools() {
        let rules = RulesConfig::default();
        let fighter = fighter();
        let background = BackgroundDef::new("acrobat", "Acrobat")
            .with_trained_skills([Skill::Acrobatics, Skill::lore("circus")]);
        let mut snapshot = CharacterSnapshot::new(1);
        snapshot.trained_skills = vec![Skill::Athletics, Skill::Medicine, Skill::Nature, Skill::Society];
        snapshot.int_bonus_skills = vec![Skill::Arcana];
        let scores = AbilityScores::default().with(Ability::Intelligence, 12);

        let (skills, warnings) =
            skill_table(&snapshot, &[&fighter], Some(&background), &scores, &rules);

        assert_eq!(skills[&Skill::Acrobatics], ProficiencyRank::Trained);
        assert_eq!(skills[&Skill::lore("circus")], ProficiencyRank::Trained);
        assert_eq!(skills[&Skill::Medicine], ProficiencyRank::Trained);
        assert_eq!(skills[&Skill::Nature], ProficiencyRank::Trained);
        assert_eq!(skills[&Skill::Society], ProficiencyRank::Untrained);
        assert_eq!(skills[&Skill::Arcana], ProficiencyRank::Trained);
        assert_eq!(
            warnings,
            vec![
                EngineWarning::RedundantSkillTraining {
                    skill: Skill::Athletics
                },
                EngineWarning::ExcessSkillChoice {
                    skill: Skill::Society,
                    pool: "class".to_string()
                },
            ]
        );
    }

    #[test]
    fn low_intelligence_grants_no_bonus_trainings() {
        let rules = RulesConfig::default();
        let mut snapshot = CharacterSnapshot::new(1);
        snapshot.int_bonus_skills = vec![Skill::Crafting];
        let scores = AbilityScores::default().with(Ability::Intelligence, 8);
        let (skills, warnings) = skill_table(&snapshot, &[], None, &scores, &rules);
        assert_eq!(skills[&Skill::Crafting], ProficiencyRank::Untrained);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn skill_increases_respect_level_caps() {
        let rules = RulesConfig::default();
        let snapshot = CharacterSnapshot::new(7)
            .with_skill_increase(3, Skill::Thievery)
            .with_skill_increase(4, Skill::Thievery)
            .with_skill_increase(5, Skill::Thievery)
            .with_skill_increase(7, Skill::Thievery);
        let (skills, warnings) =
            skill_table(&snapshot, &[&rogue()], None, &AbilityScores::default(), &rules);

        // 3: trained, 5: expert, 7: master
        assert_eq!(skills[&Skill::Thievery], ProficiencyRank::Master);
        assert_eq!(
            warnings,
            vec![EngineWarning::SkillIncreaseLevelNotEligible { level: 4 }]
        );
    }

    #[test]
    fn master_is_out_of_reach_before_level_seven() {
        let rules = RulesConfig::default();
        let snapshot = CharacterSnapshot::new(5)
            .with_skill_increase(3, Skill::Stealth)
            .with_skill_increase(5, Skill::Stealth);
        let (skills, warnings) =
            skill_table(&snapshot, &[&rogue()], None, &AbilityScores::default(), &rules);
        assert_eq!(skills[&Skill::Stealth], ProficiencyRank::Expert);
        assert_eq!(
            warnings,
            vec![EngineWarning::SkillRankCapped {
                skill: Skill::Stealth,
                level: 5
            }]
        );
    }

    #[test]
    fn dual_class_defenses_take_the_best_rank() {
        let (perception, saves) = defenses(&[&fighter(), &rogue()], 9);
        assert_eq!(perception, ProficiencyRank::Expert);
        assert_eq!(saves[&Save::Fortitude], ProficiencyRank::Master);
        assert_eq!(saves[&Save::Reflex], ProficiencyRank::Expert);
        assert_eq!(saves[&Save::Will], ProficiencyRank::Trained);

        let (_, saves) = defenses(&[&fighter()], 8);
        assert_eq!(saves[&Save::Fortitude], ProficiencyRank::Expert);
    }

    #[test]
    fn no_class_means_untrained_defenses() {
        let (perception, saves) = defenses(&[], 1);
        assert_eq!(perception, ProficiencyRank::Untrained);
        assert!(saves.values().all(|rank| *rank == ProficiencyRank::Untrained));
    }
}
