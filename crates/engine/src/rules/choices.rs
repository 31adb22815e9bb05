//! Choice schemas embedded in catalog entries.
//!
//! Turns an entry's static schema into the list of decisions a character
//! must make, computes legal options for each decision, and checks that a
//! set of answers is complete.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sheetsmith_domain::{
    Ability, CatalogEntry, ChoiceSpec, EntryKind, Eligibility, FeatEffect, OptionFilter,
    ProficiencyRank, Skill,
};

use super::dedication;
use super::prerequisites::evaluate;
use super::{CharacterView, RuleContext};

/// A candidate option with its eligibility, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    /// Value recorded on the selection when picked
    pub id: String,
    pub label: String,
    pub eligibility: Eligibility,
}

/// Decisions required when taking `entry`, given the character.
///
/// Static choices are filtered by their minimum level. Dedications also get
/// one replacement skill choice per fixed training that the character
/// already has.
pub fn choices_for(entry: &CatalogEntry, view: &CharacterView) -> Vec<ChoiceSpec> {
    let mut specs: Vec<ChoiceSpec> = entry
        .choice_schema
        .iter()
        .filter(|spec| view.level >= spec.min_level)
        .cloned()
        .collect();

    if entry.is_dedication() {
        for effect in &entry.effects {
            if let FeatEffect::TrainSkill { skill } = effect {
                if view.skill_rank(skill).is_trained() {
                    specs.push(ChoiceSpec::new(
                        FeatEffect::replacement_flag(skill),
                        format!("Already trained in {}: choose another skill", skill),
                        OptionFilter::Skill {
                            min_rank: None,
                            max_rank: Some(ProficiencyRank::Untrained),
                        },
                    ));
                }
            }
        }
    }

    specs
}

/// Every candidate for `choice`, annotated with whether it may be picked.
///
/// Options are judged against a hypothetical character that already holds
/// `entry` with the earlier answers in `prior` applied; the real character
/// is never modified.
pub fn annotated_options_for(
    entry: &CatalogEntry,
    choice: &ChoiceSpec,
    view: &CharacterView,
    prior: &BTreeMap<String, String>,
    ctx: &RuleContext<'_>,
) -> Vec<ChoiceOption> {
    let earlier: BTreeMap<String, String> = prior
        .iter()
        .filter(|(flag, _)| **flag != choice.flag)
        .map(|(flag, value)| (flag.clone(), value.clone()))
        .collect();
    let hypothetical = view.with_entry(entry, &earlier, ctx.rules);

    match &choice.filter {
        OptionFilter::Skill { min_rank, max_rank } => skill_candidates(&hypothetical)
            .into_iter()
            .map(|skill| {
                let rank = hypothetical.skill_rank(&skill);
                let eligibility = match (*min_rank, *max_rank) {
                    (Some(min), _) if rank < min => {
                        Eligibility::unmet(format!("Requires {} in {}", min, skill))
                    }
                    (_, Some(max)) if rank > max => {
                        Eligibility::unmet(format!("Already {} in {}", rank, skill))
                    }
                    _ => Eligibility::met(),
                };
                ChoiceOption {
                    id: skill.to_string(),
                    label: skill.to_string(),
                    eligibility,
                }
            })
            .collect(),
        OptionFilter::Feat { traits, max_level } => {
            let max_level = max_level.resolve(view.level);
            ctx.catalog
                .entries_with_traits(traits)
                .into_iter()
                .filter(|candidate| candidate.kind == EntryKind::Feat && candidate.id != entry.id)
                .filter(|candidate| candidate.level <= max_level)
                .map(|candidate| {
                    let mut eligibility = evaluate(candidate, &hypothetical, ctx);
                    if !candidate.repeatable && hypothetical.holds(candidate.id.as_str()) {
                        eligibility.reasons.push(format!("{} is already taken", candidate.name));
                    }
                    if let Err(reason) = dedication::permits(candidate, &view.dedication) {
                        eligibility.reasons.push(reason);
                    }
                    eligibility.met = eligibility.reasons.is_empty();
                    ChoiceOption {
                        id: candidate.id.to_string(),
                        label: candidate.name.clone(),
                        eligibility,
                    }
                })
                .collect()
        }
        OptionFilter::Ability => Ability::ALL
            .iter()
            .map(|ability| ChoiceOption {
                id: ability.name().to_ascii_lowercase(),
                label: ability.name().to_string(),
                eligibility: Eligibility::met(),
            })
            .collect(),
        OptionFilter::Fixed { options } => options
            .iter()
            .map(|option| ChoiceOption {
                id: option.clone(),
                label: option.clone(),
                eligibility: Eligibility::met(),
            })
            .collect(),
    }
}

/// Legal option ids for `choice`.
pub fn options_for(
    entry: &CatalogEntry,
    choice: &ChoiceSpec,
    view: &CharacterView,
    prior: &BTreeMap<String, String>,
    ctx: &RuleContext<'_>,
) -> Vec<String> {
    annotated_options_for(entry, choice, view, prior, ctx)
        .into_iter()
        .filter(|option| option.eligibility.met)
        .map(|option| option.id)
        .collect()
}

/// The option `value` names, ignoring case and surrounding whitespace.
pub fn matching_option<'o>(options: &'o [String], value: &str) -> Option<&'o String> {
    let value = value.trim();
    options.iter().find(|option| option.eq_ignore_ascii_case(value))
}

/// Flags of required choices that have no non-empty answer.
pub fn missing_choices(specs: &[ChoiceSpec], choices: &BTreeMap<String, String>) -> Vec<String> {
    specs
        .iter()
        .filter(|spec| spec.required)
        .filter(|spec| {
            choices
                .get(&spec.flag)
                .map_or(true, |value| value.trim().is_empty())
        })
        .map(|spec| spec.flag.clone())
        .collect()
}

fn skill_candidates(view: &CharacterView) -> Vec<Skill> {
    let mut skills: Vec<Skill> = Skill::CORE.to_vec();
    skills.extend(
        view.skills
            .keys()
            .filter(|skill| matches!(skill, Skill::Lore(_)))
            .cloned(),
    );
    skills
}
