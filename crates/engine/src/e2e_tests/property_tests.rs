//! Randomized edit sequences: whatever the player does, the derived
//! character stays consistent.

use std::collections::BTreeSet;

use proptest::prelude::*;
use sheetsmith_domain::{
    Catalog, CharacterSnapshot, DedicationState, DerivedCharacter, ProficiencyRank,
    SelectionSource, Skill, StaticCatalog,
};

use crate::infrastructure::RulesConfig;
use crate::rules::prerequisites::evaluate;
use crate::rules::selection_graph::orphaned;
use crate::rules::RuleContext;
use crate::test_fixtures::{editor, fighter_snapshot, sample_catalog};
use crate::use_cases::{CharacterEditor, CommitRequest, EditOutcome};

/// Requests chosen so that several compete for the same slot.
const CANDIDATES: &[(&str, u8, SelectionSource, &[(&str, &str)])] = &[
    ("power-attack", 1, SelectionSource::Class, &[]),
    ("duelist-dedication", 2, SelectionSource::Class, &[]),
    ("assassin-dedication", 2, SelectionSource::Class, &[]),
    ("duelist-quick-draw", 4, SelectionSource::Class, &[]),
    ("assassins-trick", 4, SelectionSource::Class, &[]),
    ("assassin-dedication", 6, SelectionSource::Class, &[]),
    ("assassins-trick", 8, SelectionSource::Class, &[]),
    ("martial-training", 3, SelectionSource::General, &[]),
    ("toughness", 3, SelectionSource::General, &[]),
    ("incredible-initiative", 7, SelectionSource::General, &[]),
    ("skill-training", 1, SelectionSource::General, &[("skill", "Medicine")]),
    (
        "skill-mastery",
        2,
        SelectionSource::Skill,
        &[("skill", "Athletics"), ("feat", "powerful-leap")],
    ),
    ("quick-jump", 2, SelectionSource::Skill, &[]),
    ("rapid-mantel", 2, SelectionSource::Skill, &[]),
    ("powerful-leap", 4, SelectionSource::Skill, &[]),
    ("rock-runner", 1, SelectionSource::Ancestry, &[]),
];

#[derive(Debug, Clone)]
enum Op {
    Commit(usize),
    Retract(usize),
    Level(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..CANDIDATES.len()).prop_map(Op::Commit),
        2 => (0..CANDIDATES.len()).prop_map(Op::Retract),
        1 => (1u8..=8).prop_map(Op::Level),
    ]
}

fn request(index: usize) -> CommitRequest {
    let (id, level, source, choices) = CANDIDATES[index];
    choices
        .iter()
        .fold(CommitRequest::new(id, level, source), |request, (flag, value)| {
            request.with_choice(*flag, *value)
        })
}

fn apply(editor: &CharacterEditor, snapshot: &CharacterSnapshot, op: &Op) -> Option<EditOutcome> {
    match op {
        Op::Commit(index) => editor.commit(snapshot, request(*index)).ok(),
        Op::Retract(index) => editor.retract(snapshot, CANDIDATES[*index].0).ok(),
        Op::Level(level) => editor.set_level(snapshot, *level).ok(),
    }
}

fn check_consistent(editor: &CharacterEditor, outcome: &EditOutcome) -> Result<(), TestCaseError> {
    prop_assert_eq!(&editor.recalculate(&outcome.snapshot), &outcome.derived);
    prop_assert!(orphaned(&outcome.snapshot).is_empty());

    let mut keys = BTreeSet::new();
    for selection in &outcome.snapshot.selections {
        prop_assert!(
            keys.insert(selection.key()),
            "slot {} filled twice",
            selection.key()
        );
    }
    Ok(())
}

/// A level change keeps every player choice; those above the new level are
/// flagged.
fn check_level_keeps_choices(
    before: &CharacterSnapshot,
    outcome: &EditOutcome,
    level: u8,
) -> Result<(), TestCaseError> {
    for selection in before.player_selections() {
        let Some(kept) = outcome
            .derived
            .selections
            .iter()
            .find(|s| s.selection.id() == selection.id())
        else {
            return Err(TestCaseError::fail(format!(
                "{} at level {} lost when moving to level {}",
                selection.catalog_id, selection.level, level
            )));
        };
        if selection.level > level {
            prop_assert!(
                !kept.eligibility.met,
                "{} at level {} not flagged at level {}",
                selection.catalog_id,
                selection.level,
                level
            );
        }
    }
    prop_assert_eq!(&outcome.snapshot.boosts, &before.boosts);
    prop_assert_eq!(&outcome.snapshot.skill_increases, &before.skill_increases);
    Ok(())
}

/// Archetype feats from another family, taken after the locking dedication,
/// must be flagged.
fn check_lock_respected(
    derived: &DerivedCharacter,
    catalog: &StaticCatalog,
) -> Result<(), TestCaseError> {
    let DedicationState::Locked {
        archetype,
        dedication_id,
        taken_at_level,
        ..
    } = &derived.dedication
    else {
        return Ok(());
    };
    let Some(lock) = derived.selections.iter().position(|s| {
        s.selection.catalog_id == *dedication_id && s.selection.level == *taken_at_level
    }) else {
        return Err(TestCaseError::fail(format!(
            "locking dedication {} is not held",
            dedication_id
        )));
    };

    for (index, annotated) in derived.selections.iter().enumerate() {
        let selection = &annotated.selection;
        if selection.is_granted() || (selection.level, index) <= (*taken_at_level, lock) {
            continue;
        }
        let Some(entry) = catalog.entry(selection.catalog_id.as_str()) else {
            continue;
        };
        if entry.is_archetype() && !entry.in_family(archetype) {
            prop_assert!(
                !annotated.eligibility.met,
                "{} taken while locked into {}",
                entry.id,
                archetype
            );
        }
    }
    Ok(())
}

fn arb_skill() -> impl Strategy<Value = Skill> {
    prop::sample::select(Skill::CORE.to_vec())
}

fn arb_rank() -> impl Strategy<Value = ProficiencyRank> {
    prop::sample::select(ProficiencyRank::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn edit_sequences_keep_the_character_consistent(ops in prop::collection::vec(arb_op(), 1..24)) {
        let editor = editor();
        let catalog = sample_catalog();
        let mut snapshot = fighter_snapshot(8);

        for op in &ops {
            let Some(outcome) = apply(&editor, &snapshot, op) else {
                continue;
            };
            check_consistent(&editor, &outcome)?;
            check_lock_respected(&outcome.derived, &catalog)?;

            if let Op::Level(level) = op {
                check_level_keeps_choices(&snapshot, &outcome, *level)?;
            }

            if let Op::Commit(index) = op {
                let (id, level, source, _) = CANDIDATES[*index];
                let committed = outcome
                    .derived
                    .selections
                    .iter()
                    .find(|s| {
                        !s.selection.is_granted()
                            && s.selection.catalog_id == id
                            && s.selection.level == level
                            && s.selection.source == source
                    });
                prop_assert!(committed.is_some(), "{} missing after commit", id);
                // Its prerequisites held when committed; only a lock exposed
                // by satisfying a later dedication may flag it
                if let Some(committed) = committed {
                    prop_assert!(
                        committed
                            .eligibility
                            .reasons
                            .iter()
                            .all(|reason| reason.starts_with("Locked into")),
                        "{} flagged right after commit: {:?}",
                        id,
                        committed.eligibility.reasons
                    );
                }
            }

            for flagged in outcome.derived.ineligible() {
                prop_assert!(!flagged.selection.is_granted());
            }
            snapshot = outcome.snapshot;
        }
    }

    #[test]
    fn raising_a_skill_never_breaks_a_met_prerequisite(
        level in 1u8..=20,
        skill in arb_skill(),
        rank in arb_rank(),
    ) {
        let editor = editor();
        let catalog = sample_catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);

        let view = editor.view(&fighter_snapshot(level));
        let mut raised = view.clone();
        raised.raise_skill(&skill, rank);

        for entry in catalog.entries() {
            if evaluate(entry, &view, &ctx).met {
                prop_assert!(
                    evaluate(entry, &raised, &ctx).met,
                    "{} lost after raising {} to {}",
                    entry.id,
                    skill,
                    rank
                );
            }
        }
    }
}
