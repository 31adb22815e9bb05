//! The provenance-aware selection arena.
//!
//! Selections are kept in insertion order; automatically granted ones point
//! at their granter through `granted_by`. Removing a granter removes
//! everything whose provenance chain leads back to it. Recalculation
//! re-derives all grants anyway, so the cascades here only need to leave a
//! consistent arena behind for the next pass.

use std::collections::BTreeMap;

use sheetsmith_domain::{
    CatalogEntry, CatalogId, CharacterSnapshot, EngineWarning, GrantRef, Provenance, Selection,
    SelectionId, SlotKey,
};

use super::RuleContext;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Slot {slot} is held by {catalog_id}, granted by {granted_by}")]
    SlotHeldByGrant {
        slot: SlotKey,
        catalog_id: CatalogId,
        granted_by: Provenance,
    },
}

/// Arena after removing selections, with what was removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    pub selections: Vec<Selection>,
    pub removed: Vec<Selection>,
}

/// Arena after adding a selection and its direct grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub selections: Vec<Selection>,
    /// Selections granted by the new one
    pub granted: Vec<Selection>,
    pub warnings: Vec<EngineWarning>,
}

/// Result of a full commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    pub selections: Vec<Selection>,
    pub removed: Vec<Selection>,
    pub granted: Vec<Selection>,
    pub warnings: Vec<EngineWarning>,
}

/// Replace whatever occupies `selection`'s slot with it, then add its grants.
pub fn commit(
    selections: &[Selection],
    entry: &CatalogEntry,
    selection: Selection,
    ctx: &RuleContext<'_>,
) -> Result<CommitOutcome, GraphError> {
    let vacated = vacate(selections, &selection.key(), entry, ctx)?;
    let placed = place(vacated.selections, entry, selection, ctx);
    Ok(CommitOutcome {
        selections: placed.selections,
        removed: vacated.removed,
        granted: placed.granted,
        warnings: placed.warnings,
    })
}

/// Clear the slot `key` for `incoming`.
///
/// Fails when the occupant was granted. Otherwise the occupant is removed
/// along with its grants; replacing a dedication with an entry of another
/// archetype family also removes every player-chosen feat of the old family.
pub fn vacate(
    selections: &[Selection],
    key: &SlotKey,
    incoming: &CatalogEntry,
    ctx: &RuleContext<'_>,
) -> Result<Removal, GraphError> {
    let Some(occupant) = selections.iter().find(|s| s.key() == *key) else {
        return Ok(Removal {
            selections: selections.to_vec(),
            removed: Vec::new(),
        });
    };

    if let Some(granted_by) = &occupant.granted_by {
        return Err(GraphError::SlotHeldByGrant {
            slot: key.clone(),
            catalog_id: occupant.catalog_id.clone(),
            granted_by: granted_by.clone(),
        });
    }

    let mut doomed = vec![occupant.id()];

    let old_family = ctx
        .catalog
        .entry(occupant.catalog_id.as_str())
        .filter(|entry| entry.is_dedication())
        .and_then(CatalogEntry::family);
    if let Some(old_family) = old_family {
        if !incoming.in_family(&old_family) {
            doomed.extend(
                selections
                    .iter()
                    .filter(|s| !s.is_granted())
                    .filter(|s| {
                        ctx.catalog
                            .entry(s.catalog_id.as_str())
                            .is_some_and(|entry| {
                                entry.is_archetype()
                                    && entry.in_family(&old_family)
                            })
                    })
                    .map(Selection::id),
            );
        }
    }

    Ok(remove_with_cascade(selections, &doomed))
}

/// Append `selection` and one bonus selection per grant of `entry`.
///
/// A grant is skipped when the character already holds that entry, when it
/// is unknown to the catalog, or when it names an unanswered choice.
pub fn place(
    mut selections: Vec<Selection>,
    entry: &CatalogEntry,
    selection: Selection,
    ctx: &RuleContext<'_>,
) -> Placement {
    let (grant_ids, mut warnings) = resolve_grants(entry, &selection.choices);
    let level = selection.level;
    selections.push(selection);

    let mut granted = Vec::new();
    for id in grant_ids {
        if ctx.catalog.entry(id.as_str()).is_none() {
            warnings.push(EngineWarning::UnknownCatalogEntry { id });
            continue;
        }
        if selections.iter().any(|s| s.catalog_id == id) {
            continue;
        }
        let grant = Selection::granted(id, level, Provenance::Selection(entry.id.clone()));
        selections.push(grant.clone());
        granted.push(grant);
    }

    Placement {
        selections,
        granted,
        warnings,
    }
}

/// Catalog ids granted by `entry` when taken with `choices`.
///
/// Dynamic grants that name an unanswered choice are skipped with a warning.
pub fn resolve_grants(
    entry: &CatalogEntry,
    choices: &BTreeMap<String, String>,
) -> (Vec<CatalogId>, Vec<EngineWarning>) {
    let mut ids = Vec::new();
    let mut warnings = Vec::new();

    for grant in &entry.grants {
        match grant {
            GrantRef::Entry { id } => ids.push(id.clone()),
            GrantRef::ChosenValue { flag } => {
                match choices
                    .get(flag)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                {
                    Some(value) => ids.push(CatalogId::new(value)),
                    None => {
                        tracing::debug!(
                            entry = %entry.id,
                            flag = %flag,
                            "Dynamic grant skipped: choice unanswered"
                        );
                        warnings.push(EngineWarning::UnresolvedDynamicGrant {
                            entry: entry.id.clone(),
                            flag: flag.clone(),
                        });
                    }
                }
            }
        }
    }

    (ids, warnings)
}

/// Remove the selection with `id` and everything granted through it.
pub fn retract(selections: &[Selection], id: SelectionId) -> Removal {
    remove_with_cascade(selections, &[id])
}

/// Selections whose provenance no longer resolves.
pub fn orphaned(snapshot: &CharacterSnapshot) -> Vec<&Selection> {
    snapshot
        .selections
        .iter()
        .filter(|selection| match &selection.granted_by {
            None => false,
            Some(Provenance::Selection(id)) => !snapshot
                .selections
                .iter()
                .any(|other| other.catalog_id == *id),
            Some(Provenance::Ancestry(id)) => snapshot.ancestry_id.as_ref() != Some(id),
            Some(Provenance::Heritage(id)) => snapshot.heritage_id.as_ref() != Some(id),
            Some(Provenance::Background(id)) => snapshot.background_id.as_ref() != Some(id),
            Some(Provenance::Class(id)) => !snapshot.class_ids.contains(id),
            Some(Provenance::Specialization(id)) => !snapshot.specialization_ids.contains(id),
        })
        .collect()
}

fn remove_with_cascade(selections: &[Selection], ids: &[SelectionId]) -> Removal {
    let mut kept: Vec<Selection> = Vec::with_capacity(selections.len());
    let mut removed: Vec<Selection> = Vec::new();
    for selection in selections {
        if ids.contains(&selection.id()) {
            removed.push(selection.clone());
        } else {
            kept.push(selection.clone());
        }
    }

    // A granter is gone once no remaining selection holds its entry
    let mut frontier: Vec<CatalogId> = removed.iter().map(|s| s.catalog_id.clone()).collect();
    while !frontier.is_empty() {
        frontier.retain(|id| !kept.iter().any(|s| s.catalog_id == *id));
        let (orphans, rest): (Vec<Selection>, Vec<Selection>) = kept
            .into_iter()
            .partition(|s| frontier.iter().any(|id| s.granted_by_selection(id)));
        kept = rest;
        frontier = orphans.iter().map(|s| s.catalog_id.clone()).collect();
        removed.extend(orphans);
    }

    Removal {
        selections: kept,
        removed,
    }
}
