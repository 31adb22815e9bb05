//! Grant reconciliation.
//!
//! Every automatic selection is rebuilt from scratch on each pass: stale
//! grants vanish, missing ones appear. Choices recorded on a grant survive
//! as long as a grant with the same id is produced again. Player selections
//! above the character's level grant nothing until the level is reached.

use std::collections::{BTreeMap, VecDeque};

use sheetsmith_domain::{
    CatalogId, CharacterSnapshot, EngineWarning, LevelGrant, Provenance, Selection, SelectionId,
};

use super::Definitions;
use crate::rules::selection_graph::resolve_grants;
use crate::rules::RuleContext;

/// Selections after reconciliation: player choices first, in their original
/// order, followed by every grant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub selections: Vec<Selection>,
    pub warnings: Vec<EngineWarning>,
}

pub fn reconcile(
    snapshot: &CharacterSnapshot,
    definitions: &Definitions<'_>,
    ctx: &RuleContext<'_>,
) -> Reconciled {
    let previous_choices: BTreeMap<SelectionId, BTreeMap<String, String>> = snapshot
        .selections
        .iter()
        .filter(|s| s.is_granted() && !s.choices.is_empty())
        .map(|s| (s.id(), s.choices.clone()))
        .collect();
    let restore = |mut selection: Selection| {
        if let Some(choices) = previous_choices.get(&selection.id()) {
            selection.choices = choices.clone();
        }
        selection
    };

    let mut warnings = Vec::new();
    let mut selections: Vec<Selection> = snapshot.player_selections().cloned().collect();

    for (grant, provenance) in element_grants(definitions, snapshot.level) {
        if ctx.catalog.entry(grant.entry.as_str()).is_none() {
            warnings.push(EngineWarning::UnknownCatalogEntry {
                id: grant.entry.clone(),
            });
            continue;
        }

        if selections.iter().any(|s| s.catalog_id == grant.entry) {
            continue;
        }

        let mut selection = Selection::granted(grant.entry.clone(), grant.level, provenance);
        if let Some(slot) = &grant.slot {
            selection.source = slot.source;
            selection.slot_type = slot.slot_type.clone();
            let key = selection.key();
            if let Some(index) = selections.iter().position(|s| s.key() == key) {
                if selections[index].is_granted() {
                    continue;
                }
                let displaced = selections.remove(index);
                tracing::warn!(
                    catalog_id = %displaced.catalog_id,
                    slot = %key,
                    granted = %selection.catalog_id,
                    "Player selection displaced by a grant occupying its slot"
                );
            }
        }
        selections.push(restore(selection));
    }

    // Breadth-first over held selections; each carries the chain of entries
    // that led to it so cycles are caught.
    let mut queue: VecDeque<(usize, Vec<CatalogId>)> = selections
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_granted() || s.level <= snapshot.level)
        .map(|(index, s)| (index, vec![s.catalog_id.clone()]))
        .collect();

    while let Some((index, chain)) = queue.pop_front() {
        let granter = &selections[index];
        let Some(entry) = ctx.catalog.entry(granter.catalog_id.as_str()) else {
            continue;
        };
        let (grant_ids, grant_warnings) = resolve_grants(entry, &granter.choices);
        warnings.extend(grant_warnings);
        let level = granter.level;

        for id in grant_ids {
            if chain.contains(&id) {
                tracing::debug!(entry = %entry.id, granted = %id, "Grant cycle skipped");
                warnings.push(EngineWarning::GrantCycle { entry: id });
                continue;
            }
            if ctx.catalog.entry(id.as_str()).is_none() {
                warnings.push(EngineWarning::UnknownCatalogEntry { id });
                continue;
            }
            if selections.iter().any(|s| s.catalog_id == id) {
                continue;
            }

            let grant = restore(Selection::granted(
                id.clone(),
                level,
                Provenance::Selection(entry.id.clone()),
            ));
            let mut next_chain = chain.clone();
            next_chain.push(id);
            selections.push(grant);
            queue.push_back((selections.len() - 1, next_chain));
        }
    }

    Reconciled {
        selections,
        warnings,
    }
}

/// Grants of the ancestry, heritage, background, classes and
/// specializations that apply at `level`, in that order.
fn element_grants(definitions: &Definitions<'_>, level: u8) -> Vec<(LevelGrant, Provenance)> {
    let mut grants = Vec::new();
    let mut push = |list: &[LevelGrant], provenance: Provenance| {
        grants.extend(
            list.iter()
                .filter(|grant| grant.level <= level)
                .map(|grant| (grant.clone(), provenance.clone())),
        );
    };

    if let Some(ancestry) = definitions.ancestry {
        push(&ancestry.grants, Provenance::Ancestry(ancestry.id.clone()));
    }
    if let Some(heritage) = definitions.heritage {
        push(&heritage.grants, Provenance::Heritage(heritage.id.clone()));
    }
    if let Some(background) = definitions.background {
        push(&background.grants, Provenance::Background(background.id.clone()));
    }
    for class in &definitions.classes {
        push(&class.features, Provenance::Class(class.id.clone()));
    }
    for specialization in &definitions.specializations {
        push(
            &specialization.grants,
            Provenance::Specialization(specialization.id.clone()),
        );
    }
    grants
}
