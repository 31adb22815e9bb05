//! Recalculation: snapshot in, fully derived character out.
//!
//! Recalculation is pure and total. It never fails; anything it cannot fully
//! interpret is reported as an [`EngineWarning`] on the result. Running it on
//! its own output snapshot yields an identical character.
//!
//! Stage order:
//! 1. grant reconciliation (reads only the snapshot and the catalog)
//! 2. ability scores
//! 3. skill table
//! 4. perception and saves
//! 5. selection effects on skills and defenses
//! 6. hit points and resource pools
//! 7. dedication state
//! 8. eligibility annotation
//!
//! Player selections in slots above the character's level (left behind when
//! the level is lowered) are dormant: kept and flagged, but their effects
//! and grants do not apply.

mod abilities;
mod grants;
mod hit_points;
mod proficiencies;

pub use abilities::{ability_scores, apply_boost_set, boost_allowance, BoostAllowance};
pub use grants::{reconcile, Reconciled};
pub use hit_points::{max_hit_points, resources};
pub use proficiencies::{defenses, skill_table};

use sheetsmith_domain::{
    AncestryDef, AnnotatedSelection, BackgroundDef, CatalogEntry, CharacterSnapshot, ClassDef,
    DerivedCharacter, Eligibility, EngineWarning, HeritageDef, Selection, SpecializationDef,
};

use super::dedication::{dedication_state, lock_violations, permits};
use super::prerequisites;
use super::view::CharacterView;
use super::RuleContext;

/// Character-building definitions named by a snapshot, resolved once.
#[derive(Debug, Default)]
pub struct Definitions<'a> {
    pub ancestry: Option<&'a AncestryDef>,
    pub heritage: Option<&'a HeritageDef>,
    pub background: Option<&'a BackgroundDef>,
    pub classes: Vec<&'a ClassDef>,
    pub specializations: Vec<&'a SpecializationDef>,
}

impl<'a> Definitions<'a> {
    /// Look up every definition the snapshot names. Ids missing from the
    /// catalog are reported and otherwise ignored.
    pub fn resolve(
        snapshot: &CharacterSnapshot,
        ctx: &RuleContext<'a>,
        warnings: &mut Vec<EngineWarning>,
    ) -> Self {
        let mut lookup = |id: &sheetsmith_domain::CatalogId, found: bool| {
            if !found {
                warnings.push(EngineWarning::UnknownCatalogEntry { id: id.clone() });
            }
        };

        let ancestry = snapshot.ancestry_id.as_ref().and_then(|id| {
            let def = ctx.catalog.ancestry(id.as_str());
            lookup(id, def.is_some());
            def
        });
        let heritage = snapshot.heritage_id.as_ref().and_then(|id| {
            let def = ctx.catalog.heritage(id.as_str());
            lookup(id, def.is_some());
            def
        });
        let background = snapshot.background_id.as_ref().and_then(|id| {
            let def = ctx.catalog.background(id.as_str());
            lookup(id, def.is_some());
            def
        });
        let classes = snapshot
            .class_ids
            .iter()
            .filter_map(|id| {
                let def = ctx.catalog.class(id.as_str());
                lookup(id, def.is_some());
                def
            })
            .collect();
        let specializations = snapshot
            .specialization_ids
            .iter()
            .filter_map(|id| {
                let def = ctx.catalog.specialization(id.as_str());
                lookup(id, def.is_some());
                def
            })
            .collect();

        Self {
            ancestry,
            heritage,
            background,
            classes,
            specializations,
        }
    }
}

/// Derive a character from `snapshot`.
pub fn recalculate(snapshot: &CharacterSnapshot, ctx: &RuleContext<'_>) -> DerivedCharacter {
    let mut warnings = Vec::new();

    let mut snapshot = snapshot.clone();
    snapshot.level = snapshot.level.clamp(1, ctx.rules.max_level.max(1));
    let definitions = Definitions::resolve(&snapshot, ctx, &mut warnings);

    let reconciled = reconcile(&snapshot, &definitions, ctx);
    warnings.extend(reconciled.warnings);
    snapshot.selections = reconciled.selections;

    let (scores, ability_warnings) = ability_scores(&snapshot, &definitions, ctx.rules);
    warnings.extend(ability_warnings);

    let (skills, skill_warnings) = skill_table(
        &snapshot,
        &definitions.classes,
        definitions.background,
        &scores,
        ctx.rules,
    );
    warnings.extend(skill_warnings);

    let (perception, saves) = defenses(&definitions.classes, snapshot.level);

    let mut view = CharacterView::blank(snapshot.level);
    view.ability_scores = scores;
    view.skills.extend(skills);
    view.perception = perception;
    view.saves = saves;
    view.ancestry_id = snapshot.ancestry_id.clone();
    view.heritage_id = snapshot.heritage_id.clone();
    view.class_ids = snapshot.class_ids.clone();
    view.specialization_ids = snapshot.specialization_ids.clone();
    view.held = snapshot
        .selections
        .iter()
        .filter(|s| !is_dormant(s, snapshot.level))
        .map(|s| s.catalog_id.clone())
        .collect();

    let entries: Vec<Option<&CatalogEntry>> = snapshot
        .selections
        .iter()
        .map(|s| ctx.catalog.entry(s.catalog_id.as_str()))
        .collect();
    let mut active: Vec<&CatalogEntry> = Vec::with_capacity(entries.len());
    for (selection, entry) in snapshot.selections.iter().zip(&entries) {
        if is_dormant(selection, snapshot.level) {
            continue;
        }
        if let Some(entry) = *entry {
            view.apply_effects(entry, &selection.choices, ctx.rules);
            active.push(entry);
        }
    }

    let held_entries = || active.iter().copied();
    let max_hit_points = max_hit_points(
        snapshot.level,
        definitions.ancestry,
        &definitions.classes,
        &view.ability_scores,
        held_entries(),
    );
    let resources = resources(snapshot.level, &view.ability_scores, held_entries());

    let dedication = dedication_state(&snapshot.selections, ctx);
    view.dedication = dedication.clone();
    let violations = lock_violations(&snapshot.selections, &dedication, ctx);

    let mut check_view = view.clone();
    let mut annotated = Vec::with_capacity(snapshot.selections.len());
    for (index, (selection, entry)) in snapshot.selections.iter().zip(&entries).enumerate() {
        let eligibility = match entry {
            _ if selection.is_granted() => Eligibility::met(),
            None => {
                warnings.push(EngineWarning::UnknownCatalogEntry {
                    id: selection.catalog_id.clone(),
                });
                Eligibility::unmet(format!("Unknown catalog entry {}", selection.catalog_id))
            }
            Some(entry) => {
                check_view.level = selection.level.min(view.level);
                let mut eligibility = prerequisites::evaluate(entry, &check_view, ctx);
                if is_dormant(selection, view.level) {
                    eligibility.met = false;
                    eligibility.reasons.insert(
                        0,
                        format!(
                            "Requires character level {} (currently {})",
                            selection.level, view.level
                        ),
                    );
                }
                if violations.contains(&index) {
                    if let Err(reason) = permits(entry, &dedication) {
                        eligibility.met = false;
                        eligibility.reasons.push(reason);
                    }
                }
                warnings.extend(eligibility.unparsed.iter().map(|text| {
                    EngineWarning::UnparseablePrerequisite {
                        entry: entry.id.clone(),
                        text: text.clone(),
                    }
                }));
                eligibility
            }
        };
        annotated.push(AnnotatedSelection {
            selection: selection.clone(),
            eligibility,
        });
    }

    let warnings = dedupe(warnings);
    for warning in &warnings {
        tracing::debug!(warning = %warning, "Recalculation warning");
    }
    tracing::debug!(
        level = snapshot.level,
        selections = annotated.len(),
        ineligible = annotated.iter().filter(|s| !s.eligibility.met).count(),
        warnings = warnings.len(),
        max_hit_points,
        "Character recalculated"
    );

    DerivedCharacter::from_parts(
        snapshot,
        view.ability_scores,
        view.skills,
        view.perception,
        view.saves,
        max_hit_points,
        resources,
        annotated,
        dedication,
        warnings,
    )
}

/// A player selection whose slot lies above the character's level.
fn is_dormant(selection: &Selection, level: u8) -> bool {
    !selection.is_granted() && selection.level > level
}

fn dedupe(warnings: Vec<EngineWarning>) -> Vec<EngineWarning> {
    let mut unique: Vec<EngineWarning> = Vec::with_capacity(warnings.len());
    for warning in warnings {
        if !unique.contains(&warning) {
            unique.push(warning);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::RulesConfig;
    use crate::test_fixtures::{sample_catalog, with_feat};
    use sheetsmith_domain::{Ability, ProficiencyRank, Save, SelectionSource, Skill};

    fn fighter(level: u8) -> CharacterSnapshot {
        CharacterSnapshot::new(level)
            .with_ancestry("dwarf")
            .with_background("warrior")
            .with_class("fighter")
    }

    #[test]
    fn recalculation_is_idempotent() {
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let snapshot = with_feat(fighter(3), "martial-training", 1);

        let first = recalculate(&snapshot, &ctx);
        let second = recalculate(&first.to_snapshot(), &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn class_features_gate_on_level() {
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);

        let level_one = recalculate(&fighter(1), &ctx);
        assert!(level_one.selection("shield-block").is_some());
        assert!(level_one.selection("bravery").is_none());
        assert_eq!(level_one.save_rank(Save::Will), ProficiencyRank::Trained);

        let level_three = recalculate(&fighter(3), &ctx);
        assert!(level_three.selection("bravery").is_some());
        assert_eq!(level_three.save_rank(Save::Will), ProficiencyRank::Expert);
    }

    #[test]
    fn granted_entries_feed_the_skill_table() {
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let snapshot = fighter(1).with_selection(
            sheetsmith_domain::Selection::chosen("skill-training", 1, SelectionSource::Skill)
                .with_choice("skill", "Medicine"),
        );
        let derived = recalculate(&snapshot, &ctx);
        assert_eq!(derived.skill_rank(&Skill::Medicine), ProficiencyRank::Trained);
        assert_eq!(derived.skill_rank(&Skill::Athletics), ProficiencyRank::Trained);
    }

    #[test]
    fn unknown_ids_warn_but_do_not_fail() {
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let snapshot = with_feat(fighter(1).with_heritage("moon-elf"), "no-such-feat", 1);

        let derived = recalculate(&snapshot, &ctx);
        assert!(derived.warnings.contains(&EngineWarning::UnknownCatalogEntry {
            id: "moon-elf".into()
        }));
        let unknown = derived.selection("no-such-feat").expect("kept");
        assert!(!unknown.eligibility.met);
    }

    #[test]
    fn level_is_clamped_to_the_ruleset() {
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let derived = recalculate(&CharacterSnapshot::new(0), &ctx);
        assert_eq!(derived.level, 1);
        let derived = recalculate(&CharacterSnapshot::new(25), &ctx);
        assert_eq!(derived.level, 20);
    }

    #[test]
    fn ability_boosts_reach_modifiers() {
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let derived = recalculate(&fighter(1), &ctx);
        // Dwarf: +2 Con, +2 Wis, -2 Cha
        assert_eq!(derived.ability_scores.get(Ability::Constitution), 12);
        assert_eq!(derived.ability_scores.get(Ability::Charisma), 8);
    }

    #[test]
    fn selections_above_the_level_are_kept_dormant_and_flagged() {
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let tough = with_feat(fighter(3), "toughness", 3);
        let full = recalculate(&tough, &ctx);

        let mut lowered = tough.clone();
        lowered.level = 2;
        let derived = recalculate(&lowered, &ctx);
        let toughness = derived.selection("toughness").expect("kept");
        assert!(!toughness.eligibility.met);
        assert_eq!(
            toughness.eligibility.reasons[0],
            "Requires character level 3 (currently 2)"
        );
        // Dwarf 10 + (fighter 10 + Con 1) x 2, without Toughness
        assert_eq!(derived.max_hit_points, 32);
        assert_eq!(full.max_hit_points, 46);
    }
}
