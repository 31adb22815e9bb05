//! The archetype dedication lock.
//!
//! Taking a dedication commits the character to its archetype: no feat from
//! another archetype may be taken until enough further feats of the same
//! family have been. The state is derived from the selections on every
//! recalculation and never stored.

use std::collections::BTreeSet;

use sheetsmith_domain::{CatalogEntry, DedicationState, Selection};

use super::RuleContext;

/// Further family feats a dedication requires.
pub fn required_feats(entry: &CatalogEntry, ctx: &RuleContext<'_>) -> u8 {
    entry
        .additional_feats_required
        .unwrap_or(ctx.rules.dedication_feats_required)
}

/// Player-chosen, non-dedication archetype feats of `family`.
fn family_feats_taken(selections: &[Selection], family: &str, ctx: &RuleContext<'_>) -> u8 {
    let count = selections
        .iter()
        .filter(|selection| !selection.is_granted())
        .filter_map(|selection| ctx.catalog.entry(selection.catalog_id.as_str()))
        .filter(|entry| entry.is_archetype() && !entry.is_dedication())
        .filter(|entry| entry.in_family(family))
        .count();
    u8::try_from(count).unwrap_or(u8::MAX)
}

/// Derive the lock from the selections.
///
/// The most recent dedication (by level, then insertion order) whose family
/// still lacks its required feats locks the character.
pub fn dedication_state(selections: &[Selection], ctx: &RuleContext<'_>) -> DedicationState {
    let mut locking: Option<((u8, usize), DedicationState)> = None;

    for (index, selection) in selections.iter().enumerate() {
        let Some(entry) = ctx.catalog.entry(selection.catalog_id.as_str()) else {
            continue;
        };
        if !entry.is_dedication() {
            continue;
        }
        let Some(family) = entry.family() else {
            continue;
        };

        let required = required_feats(entry, ctx);
        let taken = family_feats_taken(selections, &family, ctx);
        if taken >= required {
            continue;
        }

        let order = (selection.level, index);
        if locking.as_ref().is_some_and(|(best, _)| *best > order) {
            continue;
        }
        locking = Some((
            order,
            DedicationState::Locked {
                archetype: family,
                dedication_id: entry.id.clone(),
                taken_at_level: selection.level,
                feats_taken: taken,
                remaining: required - taken,
            },
        ));
    }

    locking.map(|(_, state)| state).unwrap_or_default()
}

/// Whether `entry` may be taken under `state`.
pub fn permits(entry: &CatalogEntry, state: &DedicationState) -> Result<(), String> {
    let DedicationState::Locked {
        archetype,
        remaining,
        ..
    } = state
    else {
        return Ok(());
    };
    if !entry.is_archetype() || entry.in_family(archetype) {
        return Ok(());
    }
    Err(format!(
        "Locked into the {} archetype until {} more {} feat{} taken",
        archetype,
        remaining,
        archetype,
        if *remaining == 1 { " is" } else { "s are" }
    ))
}

/// Indices of player selections taken after the locking dedication from
/// outside its family.
///
/// Commits never create these; they appear when a retraction re-locks an
/// earlier dedication.
pub fn lock_violations(
    selections: &[Selection],
    state: &DedicationState,
    ctx: &RuleContext<'_>,
) -> BTreeSet<usize> {
    let DedicationState::Locked {
        dedication_id,
        taken_at_level,
        ..
    } = state
    else {
        return BTreeSet::new();
    };
    let Some(locked_at) = selections
        .iter()
        .position(|s| s.catalog_id == *dedication_id && s.level == *taken_at_level)
    else {
        return BTreeSet::new();
    };
    let lock_order = (*taken_at_level, locked_at);

    selections
        .iter()
        .enumerate()
        .filter(|(index, selection)| {
            !selection.is_granted() && (selection.level, *index) > lock_order
        })
        .filter(|(_, selection)| {
            ctx.catalog
                .entry(selection.catalog_id.as_str())
                .is_some_and(|entry| permits(entry, state).is_err())
        })
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::RulesConfig;
    use sheetsmith_domain::{Catalog, SelectionSource, StaticCatalog};

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_entry(
                CatalogEntry::feat("duelist-dedication", "Duelist Dedication", 2)
                    .with_traits(["archetype", "dedication"])
                    .with_archetype("Duelist"),
            )
            .with_entry(
                CatalogEntry::feat("duelist-quick-draw", "Quick Draw (Duelist)", 4)
                    .with_traits(["archetype"])
                    .with_archetype("duelist"),
            )
            .with_entry(
                CatalogEntry::feat("assassin-dedication", "Assassin Dedication", 2)
                    .with_traits(["archetype", "dedication"]),
            )
            .with_entry(
                CatalogEntry::feat("assassins-trick", "Assassin's Trick", 4)
                    .with_traits(["archetype"])
                    .with_archetype("assassin"),
            )
            .with_entry(
                CatalogEntry::feat("medic-dedication", "Medic Dedication", 2)
                    .with_traits(["archetype", "dedication"])
                    .with_archetype("medic")
                    .with_additional_feats_required(2),
            )
    }

    fn class_feat(id: &str, level: u8) -> Selection {
        Selection::chosen(id, level, SelectionSource::Class)
    }

    #[test]
    fn family_falls_back_to_dedication_name() {
        let catalog = catalog();
        let assassin = catalog.entries_with_traits(&["dedication".to_string()]);
        assert!(assassin
            .iter()
            .any(|entry| entry.in_family("assassin")));
    }

    #[test]
    fn dedication_locks_until_family_feat_taken() {
        let catalog = catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);

        let mut selections = vec![class_feat("duelist-dedication", 2)];
        let state = dedication_state(&selections, &ctx);
        assert_eq!(state.locked_archetype(), Some("duelist"));
        assert!(matches!(state, DedicationState::Locked { remaining: 1, .. }));

        let trick = catalog.entry("assassins-trick").expect("entry");
        assert!(permits(trick, &state).is_err());

        selections.push(class_feat("duelist-quick-draw", 4));
        assert_eq!(dedication_state(&selections, &ctx), DedicationState::Free);
    }

    #[test]
    fn granted_family_feats_do_not_count() {
        let catalog = catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let selections = vec![
            class_feat("duelist-dedication", 2),
            Selection::granted(
                "duelist-quick-draw",
                2,
                sheetsmith_domain::Provenance::Selection("duelist-dedication".into()),
            ),
        ];
        assert!(dedication_state(&selections, &ctx).is_locked());
    }

    #[test]
    fn most_recent_unsatisfied_dedication_wins() {
        let catalog = catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let selections = vec![
            class_feat("medic-dedication", 6),
            class_feat("duelist-dedication", 2),
        ];
        let state = dedication_state(&selections, &ctx);
        assert_eq!(state.locked_archetype(), Some("medic"));
        assert!(matches!(state, DedicationState::Locked { remaining: 2, .. }));
    }

    #[test]
    fn violations_only_after_the_locking_dedication() {
        let catalog = catalog();
        let rules = RulesConfig::default();
        let ctx = RuleContext::new(&catalog, &rules);
        let reordered = vec![
            class_feat("duelist-dedication", 2),
            class_feat("assassin-dedication", 4),
        ];
        let state = dedication_state(&reordered, &ctx);
        // The later dedication locks; the earlier one is not a violation
        assert_eq!(state.locked_archetype(), Some("assassin"));
        assert!(lock_violations(&reordered, &state, &ctx).is_empty());

        let violating = vec![
            class_feat("duelist-dedication", 2),
            class_feat("assassins-trick", 4),
        ];
        let state = dedication_state(&violating, &ctx);
        assert_eq!(
            lock_violations(&violating, &state, &ctx),
            BTreeSet::from([1])
        );
    }
}
