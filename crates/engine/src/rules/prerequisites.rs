//! Prerequisite parsing and evaluation.
//!
//! Free-text prerequisites are parsed into typed matchers, tried in a fixed
//! order (first match wins):
//!
//! 1. `<rank> in <skill>` (also perception and saves)
//! 2. `<ability> +<N>`, satisfied when the score is at least `10 + 2N`
//! 3. `<ability> <N>`, satisfied when the score is at least `N`
//! 4. a class-feature keyword ("rage", "spellcasting")
//! 5. an ancestry name
//! 6. `<name> <category>` for a specialization ("dragon instinct")
//! 7. the name of a catalog entry the character must hold
//! 8. alternatives joined by "or", each parsed with the rules above
//!
//! Anything else becomes [`Prerequisite::Unparsed`]: assumed satisfied, but
//! reported separately from requirements that were actually checked.
//!
//! Parsing depends only on the catalog and the ruleset, so a
//! [`PrerequisiteCache`] attached to the [`RuleContext`] parses each entry
//! once for the lifetime of an editor.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use regex_lite::Regex;

use sheetsmith_domain::{
    Ability, CatalogEntry, CatalogId, DefenseTarget, Eligibility, ProficiencyRank, Skill,
};

use super::{CharacterView, RuleContext};

static RANK_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(untrained|trained|expert|master|legendary)\s+in\s+(.+)$")
        .expect("valid regex")
});

static ABILITY_MODIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(strength|dexterity|constitution|intelligence|wisdom|charisma|str|dex|con|int|wis|cha)\s*\+\s*(\d{1,2})$",
    )
    .expect("valid regex")
});

static ABILITY_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(strength|dexterity|constitution|intelligence|wisdom|charisma|str|dex|con|int|wis|cha)\s+(\d{1,2})$",
    )
    .expect("valid regex")
});

static ALTERNATIVES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*,\s*(?:or\s+)?|\s+or\s+").expect("valid regex")
});

/// One parsed prerequisite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    SkillRank {
        skill: Skill,
        rank: ProficiencyRank,
    },
    /// Rank in perception or a saving throw
    DefenseRank {
        target: DefenseTarget,
        rank: ProficiencyRank,
    },
    /// Both the modifier style and the direct style resolve to a minimum
    /// score
    AbilityScore {
        ability: Ability,
        min_score: i32,
    },
    ClassFeature {
        keyword: String,
        class_ids: Vec<CatalogId>,
    },
    AncestryTag {
        ancestry_id: CatalogId,
        name: String,
    },
    SpecializationTag {
        name: String,
        category: String,
    },
    HasEntry {
        id: CatalogId,
        name: String,
    },
    AnyOf {
        text: String,
        options: Vec<Prerequisite>,
    },
    Unparsed {
        raw: String,
    },
}

/// Outcome of checking one prerequisite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrerequisiteCheck {
    Met,
    Unmet(String),
    /// Not understood; treated as met
    Unparsed(String),
}

impl Prerequisite {
    /// Parse one prerequisite string. Never fails: unknown text becomes
    /// `Unparsed`.
    pub fn parse(text: &str, ctx: &RuleContext<'_>) -> Self {
        let normalized = normalize(text);
        if let Some(parsed) = parse_single(&normalized, ctx) {
            return parsed;
        }
        if let Some(alternatives) = parse_alternatives(&normalized, ctx) {
            return alternatives;
        }
        Prerequisite::Unparsed {
            raw: text.trim().to_string(),
        }
    }

    pub fn check(&self, view: &CharacterView, ctx: &RuleContext<'_>) -> PrerequisiteCheck {
        match self {
            Prerequisite::SkillRank { skill, rank } => {
                let current = view.skill_rank(skill);
                if current >= *rank {
                    PrerequisiteCheck::Met
                } else {
                    PrerequisiteCheck::Unmet(format!(
                        "Requires {} in {} (currently {})",
                        rank, skill, current
                    ))
                }
            }
            Prerequisite::DefenseRank { target, rank } => {
                let current = view.defense_rank(*target);
                if current >= *rank {
                    PrerequisiteCheck::Met
                } else {
                    PrerequisiteCheck::Unmet(format!(
                        "Requires {} in {} (currently {})",
                        rank,
                        defense_name(*target),
                        current
                    ))
                }
            }
            Prerequisite::AbilityScore { ability, min_score } => {
                let score = view.ability_scores.get(*ability);
                if score >= *min_score {
                    PrerequisiteCheck::Met
                } else {
                    PrerequisiteCheck::Unmet(format!(
                        "Requires {} {} (currently {})",
                        ability, min_score, score
                    ))
                }
            }
            Prerequisite::ClassFeature { keyword, class_ids } => {
                let by_class = view.class_ids.iter().any(|id| class_ids.contains(id));
                if by_class || view.holds(&slug(keyword)) {
                    PrerequisiteCheck::Met
                } else {
                    PrerequisiteCheck::Unmet(format!("Requires the {} class feature", keyword))
                }
            }
            Prerequisite::AncestryTag { ancestry_id, name } => {
                if view.ancestry_id.as_ref() == Some(ancestry_id) {
                    PrerequisiteCheck::Met
                } else {
                    PrerequisiteCheck::Unmet(format!("Requires the {} ancestry", name))
                }
            }
            Prerequisite::SpecializationTag { name, category } => {
                let matched = view
                    .specialization_ids
                    .iter()
                    .filter_map(|id| ctx.catalog.specialization(id.as_str()))
                    .any(|def| {
                        def.category.eq_ignore_ascii_case(category)
                            && def.name.to_ascii_lowercase().contains(name.as_str())
                    });
                if matched {
                    PrerequisiteCheck::Met
                } else {
                    PrerequisiteCheck::Unmet(format!("Requires the {} {}", name, category))
                }
            }
            Prerequisite::HasEntry { id, name } => {
                if view.holds(id.as_str()) {
                    PrerequisiteCheck::Met
                } else {
                    PrerequisiteCheck::Unmet(format!("Requires {}", name))
                }
            }
            Prerequisite::AnyOf { text, options } => {
                let checks: Vec<_> = options.iter().map(|p| p.check(view, ctx)).collect();
                if checks.iter().any(|c| matches!(c, PrerequisiteCheck::Met)) {
                    PrerequisiteCheck::Met
                } else if checks.iter().any(|c| matches!(c, PrerequisiteCheck::Unparsed(_))) {
                    PrerequisiteCheck::Unparsed(text.clone())
                } else {
                    PrerequisiteCheck::Unmet(format!("Requires {}", text))
                }
            }
            Prerequisite::Unparsed { raw } => PrerequisiteCheck::Unparsed(raw.clone()),
        }
    }
}

/// Parsed prerequisites keyed by catalog entry.
#[derive(Debug, Default)]
pub struct PrerequisiteCache {
    parsed: RwLock<HashMap<CatalogId, Arc<[Prerequisite]>>>,
}

impl PrerequisiteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries parsed so far.
    pub fn len(&self) -> usize {
        self.parsed.read().map_or(0, |parsed| parsed.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_or_parse(&self, entry: &CatalogEntry, ctx: &RuleContext<'_>) -> Arc<[Prerequisite]> {
        if let Ok(parsed) = self.parsed.read() {
            if let Some(hit) = parsed.get(&entry.id) {
                return Arc::clone(hit);
            }
        }
        let fresh = parse_entry(entry, ctx);
        if let Ok(mut parsed) = self.parsed.write() {
            parsed.insert(entry.id.clone(), Arc::clone(&fresh));
        }
        fresh
    }
}

fn parse_entry(entry: &CatalogEntry, ctx: &RuleContext<'_>) -> Arc<[Prerequisite]> {
    entry
        .prerequisites
        .iter()
        .map(|text| Prerequisite::parse(text, ctx))
        .collect()
}

/// An entry's parsed prerequisites, through the context's cache when it has
/// one.
pub fn parsed_prerequisites(entry: &CatalogEntry, ctx: &RuleContext<'_>) -> Arc<[Prerequisite]> {
    match ctx.prerequisites {
        Some(cache) => cache.get_or_parse(entry, ctx),
        None => parse_entry(entry, ctx),
    }
}

/// Check an entry's level and every prerequisite against a character.
///
/// Does not short-circuit: the level reason comes first, followed by every
/// unmet text prerequisite.
pub fn evaluate(entry: &CatalogEntry, view: &CharacterView, ctx: &RuleContext<'_>) -> Eligibility {
    let mut eligibility = Eligibility::met();

    if view.level < entry.level {
        eligibility.reasons.push(format!(
            "Requires character level {} (currently {})",
            entry.level, view.level
        ));
    }

    for prerequisite in parsed_prerequisites(entry, ctx).iter() {
        match prerequisite.check(view, ctx) {
            PrerequisiteCheck::Met => {}
            PrerequisiteCheck::Unmet(reason) => eligibility.reasons.push(reason),
            PrerequisiteCheck::Unparsed(raw) => {
                tracing::debug!(
                    entry = %entry.id,
                    text = %raw,
                    "Unrecognized prerequisite assumed satisfied"
                );
                eligibility.unparsed.push(raw);
            }
        }
    }

    eligibility.met = eligibility.reasons.is_empty();
    eligibility
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ';'])
        .to_string()
}

fn slug(text: &str) -> String {
    text.trim().to_ascii_lowercase().replace(' ', "-")
}

fn defense_name(target: DefenseTarget) -> &'static str {
    match target {
        DefenseTarget::Perception => "Perception",
        DefenseTarget::Fortitude => "Fortitude saves",
        DefenseTarget::Reflex => "Reflex saves",
        DefenseTarget::Will => "Will saves",
    }
}

fn parse_defense(text: &str) -> Option<DefenseTarget> {
    let lowered = text.to_ascii_lowercase();
    let name = lowered
        .trim_end_matches(" saving throws")
        .trim_end_matches(" saving throw")
        .trim_end_matches(" saves")
        .trim_end_matches(" save")
        .trim();
    match name {
        "perception" => Some(DefenseTarget::Perception),
        "fortitude" => Some(DefenseTarget::Fortitude),
        "reflex" => Some(DefenseTarget::Reflex),
        "will" => Some(DefenseTarget::Will),
        _ => None,
    }
}

/// Rules 1-7.
fn parse_single(text: &str, ctx: &RuleContext<'_>) -> Option<Prerequisite> {
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = RANK_IN.captures(text) {
        let rank: ProficiencyRank = caps[1].parse().ok()?;
        let target = caps[2].trim();
        if let Some(skill) = ctx.rules.parse_skill(target) {
            return Some(Prerequisite::SkillRank { skill, rank });
        }
        if let Some(target) = parse_defense(target) {
            return Some(Prerequisite::DefenseRank { target, rank });
        }
    }

    if let Some(caps) = ABILITY_MODIFIER.captures(text) {
        let ability: Ability = caps[1].parse().ok()?;
        let modifier: i32 = caps[2].parse().ok()?;
        return Some(Prerequisite::AbilityScore {
            ability,
            min_score: 10 + 2 * modifier,
        });
    }

    if let Some(caps) = ABILITY_SCORE.captures(text) {
        let ability: Ability = caps[1].parse().ok()?;
        let min_score: i32 = caps[2].parse().ok()?;
        return Some(Prerequisite::AbilityScore { ability, min_score });
    }

    let lowered = text.to_ascii_lowercase();

    if let Some(parsed) = parse_class_feature(&lowered, ctx) {
        return Some(parsed);
    }

    let ancestry_name = lowered.trim_end_matches(" ancestry").trim();
    if let Some(ancestry) = ctx.catalog.ancestries().into_iter().find(|a| {
        a.id.as_str().eq_ignore_ascii_case(ancestry_name) || a.name.eq_ignore_ascii_case(ancestry_name)
    }) {
        return Some(Prerequisite::AncestryTag {
            ancestry_id: ancestry.id.clone(),
            name: ancestry.name.clone(),
        });
    }

    if let Some(parsed) = parse_specialization(&lowered, ctx) {
        return Some(parsed);
    }

    let entry = ctx
        .catalog
        .entry_by_name(text)
        .or_else(|| ctx.catalog.entry(&lowered));
    entry.map(|entry| Prerequisite::HasEntry {
        id: entry.id.clone(),
        name: entry.name.clone(),
    })
}

fn parse_class_feature(lowered: &str, ctx: &RuleContext<'_>) -> Option<Prerequisite> {
    let keyword = lowered.trim_end_matches(" class feature").trim();

    let mut class_ids: Vec<CatalogId> = ctx
        .rules
        .classes_for_keyword(keyword)
        .map(|ids| ids.iter().map(|id| CatalogId::new(id.as_str())).collect())
        .unwrap_or_default();
    for class in ctx.catalog.classes() {
        let has_keyword = class.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword));
        if has_keyword && !class_ids.contains(&class.id) {
            class_ids.push(class.id.clone());
        }
    }

    if class_ids.is_empty() {
        return None;
    }
    Some(Prerequisite::ClassFeature {
        keyword: keyword.to_string(),
        class_ids,
    })
}

fn parse_specialization(lowered: &str, ctx: &RuleContext<'_>) -> Option<Prerequisite> {
    ctx.catalog.specializations().into_iter().find_map(|def| {
        let category = def.category.to_ascii_lowercase();
        let name = lowered.strip_suffix(category.as_str())?.trim_end();
        if name.is_empty() || name.len() == lowered.len() - category.len() {
            // Category must be a separate word
            return None;
        }
        Some(Prerequisite::SpecializationTag {
            name: name.to_string(),
            category,
        })
    })
}

/// Rule 8. Every alternative must parse; otherwise the whole text is
/// unparsed, since an unknown alternative could be the satisfied one.
fn parse_alternatives(text: &str, ctx: &RuleContext<'_>) -> Option<Prerequisite> {
    let parts: Vec<&str> = ALTERNATIVES
        .split(text)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() < 2 {
        return None;
    }

    let mut options = Vec::with_capacity(parts.len());
    let mut carried_rank: Option<ProficiencyRank> = None;
    for part in parts {
        let parsed = parse_single(part, ctx).or_else(|| {
            // "trained in Arcana or Nature": the rank carries over
            let rank = carried_rank?;
            parse_single(&format!("{} in {}", rank, part), ctx)
        })?;
        if let Prerequisite::SkillRank { rank, .. } | Prerequisite::DefenseRank { rank, .. } =
            &parsed
        {
            carried_rank = Some(*rank);
        }
        options.push(parsed);
    }

    Some(Prerequisite::AnyOf {
        text: text.to_string(),
        options,
    })
}
