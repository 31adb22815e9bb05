//! Character editor use cases.
//!
//! The synchronous entry point for presentation code. Every operation takes
//! the caller's snapshot by reference, validates the edit against the rules
//! core and returns a new snapshot together with a freshly recalculated
//! character. The input snapshot is never modified; a refused edit returns a
//! [`CommitError`] and nothing else.

mod error;

pub use error::CommitError;

use std::collections::BTreeMap;
use std::sync::Arc;

use sheetsmith_domain::{
    Ability, BoostAssignment, BoostSource, Catalog, CatalogEntry, CatalogId, CharacterSnapshot,
    ChoiceSpec, DerivedCharacter, Eligibility, Save, Selection, SelectionId, SelectionSource,
    Skill,
};

use crate::infrastructure::{EngineConfig, RulesConfig};
use crate::rules::choices::{self, ChoiceOption};
use crate::rules::recalculation::{boost_allowance, recalculate, Definitions};
use crate::rules::{
    dedication, prerequisites, selection_graph, CharacterView, PrerequisiteCache, RuleContext,
};

// =============================================================================
// Request / Result Types
// =============================================================================

/// A request to fill a slot with a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub catalog_id: CatalogId,
    pub level: u8,
    pub source: SelectionSource,
    pub slot_type: Option<String>,
    pub choices: BTreeMap<String, String>,
}

impl CommitRequest {
    pub fn new(catalog_id: impl Into<CatalogId>, level: u8, source: SelectionSource) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            level,
            source,
            slot_type: None,
            choices: BTreeMap::new(),
        }
    }

    pub fn with_slot_type(mut self, slot_type: impl Into<String>) -> Self {
        self.slot_type = Some(slot_type.into());
        self
    }

    pub fn with_choice(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.insert(flag.into(), value.into());
        self
    }

    pub fn with_choices(mut self, choices: BTreeMap<String, String>) -> Self {
        self.choices.extend(choices);
        self
    }

    fn into_selection(self) -> Selection {
        let mut selection = Selection::chosen(self.catalog_id, self.level, self.source)
            .with_choices(self.choices);
        selection.slot_type = self.slot_type;
        selection
    }
}

impl From<&Selection> for CommitRequest {
    fn from(selection: &Selection) -> Self {
        Self {
            catalog_id: selection.catalog_id.clone(),
            level: selection.level,
            source: selection.source,
            slot_type: selection.slot_type.clone(),
            choices: selection.choices.clone(),
        }
    }
}

/// Result of an accepted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// The new snapshot, already reconciled
    pub snapshot: CharacterSnapshot,
    pub derived: DerivedCharacter,
    /// Selections removed by the edit, cascades included
    pub removed: Vec<Selection>,
}

// =============================================================================
// Use Cases
// =============================================================================

/// Character building operations over a catalog and a ruleset.
#[derive(Clone)]
pub struct CharacterEditor {
    catalog: Arc<dyn Catalog>,
    rules: RulesConfig,
    /// Parsed prerequisites of the catalog's entries
    prerequisites: Arc<PrerequisiteCache>,
}

impl std::fmt::Debug for CharacterEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterEditor")
            .field("rules", &self.rules)
            .field("cached_prerequisites", &self.prerequisites.len())
            .finish_non_exhaustive()
    }
}

impl CharacterEditor {
    pub fn new(catalog: Arc<dyn Catalog>, rules: RulesConfig) -> Self {
        Self {
            catalog,
            rules,
            prerequisites: Arc::new(PrerequisiteCache::new()),
        }
    }

    pub fn from_config(catalog: Arc<dyn Catalog>, config: &EngineConfig) -> Self {
        Self::new(catalog, config.rules.clone())
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    fn ctx(&self) -> RuleContext<'_> {
        RuleContext::new(self.catalog.as_ref(), &self.rules)
            .with_prerequisites(&self.prerequisites)
    }

    fn entry(&self, catalog_id: &str) -> Result<&CatalogEntry, CommitError> {
        self.catalog
            .entry(catalog_id)
            .ok_or_else(|| CommitError::UnknownEntry(CatalogId::new(catalog_id)))
    }

    fn outcome(&self, snapshot: CharacterSnapshot, removed: Vec<Selection>) -> EditOutcome {
        let derived = recalculate(&snapshot, &self.ctx());
        EditOutcome {
            snapshot: derived.to_snapshot(),
            derived,
            removed,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn recalculate(&self, snapshot: &CharacterSnapshot) -> DerivedCharacter {
        recalculate(snapshot, &self.ctx())
    }

    /// Read-only view of the recalculated character.
    pub fn view(&self, snapshot: &CharacterSnapshot) -> CharacterView {
        CharacterView::from_derived(&self.recalculate(snapshot))
    }

    /// Whether the character could take `catalog_id` at its current level.
    pub fn evaluate(
        &self,
        snapshot: &CharacterSnapshot,
        catalog_id: &str,
    ) -> Result<Eligibility, CommitError> {
        let entry = self.entry(catalog_id)?;
        let view = self.view(snapshot);
        let mut eligibility = prerequisites::evaluate(entry, &view, &self.ctx());
        if let Err(reason) = dedication::permits(entry, &view.dedication) {
            eligibility.met = false;
            eligibility.reasons.push(reason);
        }
        Ok(eligibility)
    }

    /// Choices the character must make when taking `catalog_id`.
    pub fn choices_for(
        &self,
        snapshot: &CharacterSnapshot,
        catalog_id: &str,
    ) -> Result<Vec<ChoiceSpec>, CommitError> {
        let entry = self.entry(catalog_id)?;
        Ok(choices::choices_for(entry, &self.view(snapshot)))
    }

    /// Legal values for the choice `flag` of `catalog_id`.
    pub fn options_for(
        &self,
        snapshot: &CharacterSnapshot,
        catalog_id: &str,
        flag: &str,
        prior: &BTreeMap<String, String>,
    ) -> Result<Vec<String>, CommitError> {
        let entry = self.entry(catalog_id)?;
        let view = self.view(snapshot);
        let spec = find_spec(entry, &choices::choices_for(entry, &view), flag)?;
        Ok(choices::options_for(entry, &spec, &view, prior, &self.ctx()))
    }

    /// Every candidate for the choice `flag`, with its eligibility.
    pub fn annotated_options_for(
        &self,
        snapshot: &CharacterSnapshot,
        catalog_id: &str,
        flag: &str,
        prior: &BTreeMap<String, String>,
    ) -> Result<Vec<ChoiceOption>, CommitError> {
        let entry = self.entry(catalog_id)?;
        let view = self.view(snapshot);
        let spec = find_spec(entry, &choices::choices_for(entry, &view), flag)?;
        Ok(choices::annotated_options_for(
            entry,
            &spec,
            &view,
            prior,
            &self.ctx(),
        ))
    }

    /// Skill check modifier: ability modifier plus proficiency bonus.
    pub fn skill_modifier(&self, derived: &DerivedCharacter, skill: &Skill) -> i32 {
        derived.ability_scores.modifier(skill.key_ability())
            + self
                .rules
                .proficiency_bonus(derived.skill_rank(skill), derived.level)
    }

    pub fn save_modifier(&self, derived: &DerivedCharacter, save: Save) -> i32 {
        derived.ability_scores.modifier(save.key_ability())
            + self
                .rules
                .proficiency_bonus(derived.save_rank(save), derived.level)
    }

    pub fn perception_modifier(&self, derived: &DerivedCharacter) -> i32 {
        derived.ability_scores.modifier(Ability::Wisdom)
            + self
                .rules
                .proficiency_bonus(derived.perception, derived.level)
    }

    // -------------------------------------------------------------------------
    // Selections
    // -------------------------------------------------------------------------

    /// Fill a slot, replacing its current occupant. Slots above the
    /// character's level cannot be filled.
    pub fn commit(
        &self,
        snapshot: &CharacterSnapshot,
        request: CommitRequest,
    ) -> Result<EditOutcome, CommitError> {
        let catalog_id = request.catalog_id.clone();
        let result = self.try_commit(snapshot, request);
        if let Err(error) = &result {
            tracing::info!(catalog_id = %catalog_id, error = %error, "Commit rejected");
        }
        result
    }

    fn try_commit(
        &self,
        snapshot: &CharacterSnapshot,
        request: CommitRequest,
    ) -> Result<EditOutcome, CommitError> {
        let ctx = self.ctx();
        let entry = self.entry(request.catalog_id.as_str())?;
        if request.level > snapshot.level {
            return Err(CommitError::SlotAboveLevel {
                level: request.level,
                character_level: snapshot.level,
            });
        }
        let mut selection = request.into_selection();
        let key = selection.key();

        let vacated = selection_graph::vacate(&snapshot.selections, &key, entry, &ctx)?;
        if !entry.repeatable && vacated.selections.iter().any(|s| s.catalog_id == entry.id) {
            return Err(CommitError::AlreadySelected(entry.id.clone()));
        }

        let mut base = snapshot.clone();
        base.selections = vacated.selections;
        let current = recalculate(&base, &ctx);
        let view = CharacterView::from_derived(&current).at_level(selection.level);

        dedication::permits(entry, &view.dedication).map_err(|reason| {
            CommitError::DedicationLocked {
                entry: entry.id.clone(),
                reason,
            }
        })?;

        let eligibility = prerequisites::evaluate(entry, &view, &ctx);
        if !eligibility.met {
            return Err(CommitError::PrerequisitesUnmet {
                entry: entry.id.clone(),
                reasons: eligibility.reasons,
            });
        }

        let specs = choices::choices_for(entry, &view);
        selection.choices = validate_choices(entry, &specs, &selection.choices, &view, &ctx)?;

        let committed = selection_graph::commit(&snapshot.selections, entry, selection, &ctx)?;
        base.selections = committed.selections;

        tracing::info!(
            catalog_id = %entry.id,
            slot = %key,
            removed = committed.removed.len(),
            granted = committed.granted.len(),
            "Selection committed"
        );
        Ok(self.outcome(base, committed.removed))
    }

    /// Remove a player-chosen selection and everything it granted.
    pub fn retract(
        &self,
        snapshot: &CharacterSnapshot,
        catalog_id: &str,
    ) -> Result<EditOutcome, CommitError> {
        let Some(target) = snapshot
            .player_selections()
            .find(|s| s.catalog_id == *catalog_id)
        else {
            return Err(match snapshot.selection(catalog_id) {
                Some(Selection {
                    granted_by: Some(granted_by),
                    ..
                }) => CommitError::GrantedSelection {
                    catalog_id: CatalogId::new(catalog_id),
                    granted_by: granted_by.clone(),
                },
                _ => CommitError::NotSelected(CatalogId::new(catalog_id)),
            });
        };

        let removal = selection_graph::retract(&snapshot.selections, target.id());
        let mut next = snapshot.clone();
        next.selections = removal.selections;
        tracing::info!(
            catalog_id = %catalog_id,
            removed = removal.removed.len(),
            "Selection retracted"
        );
        Ok(self.outcome(next, removal.removed))
    }

    /// Answer (or re-answer) choices on a held selection.
    ///
    /// Player selections go through a full re-commit so their options are
    /// checked against the character without them. Granted selections are
    /// answered in place.
    pub fn resolve_choices(
        &self,
        snapshot: &CharacterSnapshot,
        catalog_id: &str,
        answers: BTreeMap<String, String>,
    ) -> Result<EditOutcome, CommitError> {
        if let Some(held) = snapshot
            .player_selections()
            .find(|s| s.catalog_id == *catalog_id)
        {
            let request = CommitRequest::from(held).with_choices(answers);
            return self.commit(snapshot, request);
        }

        let Some(index) = snapshot
            .selections
            .iter()
            .position(|s| s.catalog_id == *catalog_id)
        else {
            return Err(CommitError::NotSelected(CatalogId::new(catalog_id)));
        };

        let ctx = self.ctx();
        let entry = self.entry(catalog_id)?;
        let mut cleared = snapshot.clone();
        cleared.selections[index].choices.clear();
        let view = CharacterView::from_derived(&recalculate(&cleared, &ctx));

        let mut merged = snapshot.selections[index].choices.clone();
        merged.extend(answers);
        let specs = choices::choices_for(entry, &view);
        let validated = validate_choices(entry, &specs, &merged, &view, &ctx)?;

        let mut next = snapshot.clone();
        next.selections[index].choices = validated;
        tracing::info!(catalog_id = %catalog_id, "Choices resolved");
        Ok(self.outcome(next, Vec::new()))
    }

    // -------------------------------------------------------------------------
    // Character elements
    // -------------------------------------------------------------------------

    /// Change ancestry. Ancestry feats and ancestry boosts of the old
    /// ancestry are cleared, as is a heritage of another ancestry.
    pub fn set_ancestry(
        &self,
        snapshot: &CharacterSnapshot,
        ancestry_id: Option<&str>,
    ) -> Result<EditOutcome, CommitError> {
        if let Some(id) = ancestry_id {
            if self.catalog.ancestry(id).is_none() {
                return Err(CommitError::UnknownEntry(CatalogId::new(id)));
            }
        }
        if snapshot.ancestry_id.as_ref().map(CatalogId::as_str) == ancestry_id {
            return Ok(self.outcome(snapshot.clone(), Vec::new()));
        }

        let mut next = snapshot.clone();
        next.ancestry_id = ancestry_id.map(CatalogId::new);
        next.boosts.retain(|b| b.source != BoostSource::Ancestry);
        let heritage_fits = next
            .heritage_id
            .as_ref()
            .and_then(|id| self.catalog.heritage(id.as_str()))
            .is_some_and(|heritage| {
                heritage.ancestry_id.is_none() || heritage.ancestry_id == next.ancestry_id
            });
        if !heritage_fits {
            next.heritage_id = None;
            next.heritage_choice = None;
        }
        let removed = remove_sourced(&mut next, SelectionSource::Ancestry);
        tracing::info!(ancestry = ?ancestry_id, removed = removed.len(), "Ancestry changed");
        Ok(self.outcome(next, removed))
    }

    pub fn set_heritage(
        &self,
        snapshot: &CharacterSnapshot,
        heritage_id: Option<&str>,
        heritage_choice: Option<String>,
    ) -> Result<EditOutcome, CommitError> {
        if let Some(id) = heritage_id {
            let heritage = self
                .catalog
                .heritage(id)
                .ok_or_else(|| CommitError::UnknownEntry(CatalogId::new(id)))?;
            if let (Some(required), Some(current)) = (&heritage.ancestry_id, &snapshot.ancestry_id)
            {
                if required != current {
                    return Err(CommitError::HeritageMismatch {
                        heritage: heritage.id.clone(),
                        ancestry: current.clone(),
                    });
                }
            }
        }

        let mut next = snapshot.clone();
        next.heritage_id = heritage_id.map(CatalogId::new);
        next.heritage_choice = heritage_id
            .and(heritage_choice)
            .map(|choice| choice.trim().to_string())
            .filter(|choice| !choice.is_empty());
        tracing::info!(heritage = ?heritage_id, "Heritage changed");
        Ok(self.outcome(next, Vec::new()))
    }

    /// Change background. Background feats and boosts are cleared.
    pub fn set_background(
        &self,
        snapshot: &CharacterSnapshot,
        background_id: Option<&str>,
    ) -> Result<EditOutcome, CommitError> {
        if let Some(id) = background_id {
            if self.catalog.background(id).is_none() {
                return Err(CommitError::UnknownEntry(CatalogId::new(id)));
            }
        }
        if snapshot.background_id.as_ref().map(CatalogId::as_str) == background_id {
            return Ok(self.outcome(snapshot.clone(), Vec::new()));
        }

        let mut next = snapshot.clone();
        next.background_id = background_id.map(CatalogId::new);
        next.boosts.retain(|b| b.source != BoostSource::Background);
        let removed = remove_sourced(&mut next, SelectionSource::Background);
        tracing::info!(background = ?background_id, removed = removed.len(), "Background changed");
        Ok(self.outcome(next, removed))
    }

    /// Set one class, or two for a dual-class character.
    ///
    /// Adding a class keeps everything. Dropping one clears class boosts,
    /// manual skill trainings, specializations of classes no longer held
    /// and the class feats of the dropped class; a class feat naming a kept
    /// class stays.
    pub fn set_classes(
        &self,
        snapshot: &CharacterSnapshot,
        class_ids: &[&str],
    ) -> Result<EditOutcome, CommitError> {
        if class_ids.len() > 2 {
            return Err(CommitError::TooManyClasses(class_ids.len()));
        }
        if let Some(unknown) = class_ids.iter().find(|id| self.catalog.class(id).is_none()) {
            return Err(CommitError::UnknownEntry(CatalogId::new(*unknown)));
        }
        let class_ids: Vec<CatalogId> = class_ids.iter().map(|id| CatalogId::new(*id)).collect();
        if snapshot.class_ids == class_ids {
            return Ok(self.outcome(snapshot.clone(), Vec::new()));
        }

        let (kept, dropped): (Vec<CatalogId>, Vec<CatalogId>) = snapshot
            .class_ids
            .iter()
            .cloned()
            .partition(|id| class_ids.contains(id));

        let mut next = snapshot.clone();
        next.class_ids = class_ids;
        let mut removed = Vec::new();
        if !dropped.is_empty() {
            next.boosts.retain(|b| b.source != BoostSource::Class);
            next.trained_skills.clear();
            let catalog = &self.catalog;
            let classes = next.class_ids.clone();
            next.specialization_ids.retain(|id| {
                catalog
                    .specialization(id.as_str())
                    .and_then(|spec| spec.class_id.as_ref())
                    .map_or(true, |class| classes.contains(class))
            });
            let orphaned: Vec<SelectionId> = next
                .player_selections()
                .filter(|s| s.source == SelectionSource::Class)
                .filter(|s| {
                    kept.is_empty()
                        || catalog.entry(s.catalog_id.as_str()).is_some_and(|entry| {
                            names_any_class(entry, &dropped) && !names_any_class(entry, &kept)
                        })
                })
                .map(Selection::id)
                .collect();
            removed = remove_all(&mut next, &orphaned);
        }
        tracing::info!(
            classes = ?next.class_ids,
            dropped = ?dropped,
            removed = removed.len(),
            "Classes changed"
        );
        Ok(self.outcome(next, removed))
    }

    pub fn set_specializations(
        &self,
        snapshot: &CharacterSnapshot,
        specialization_ids: &[&str],
    ) -> Result<EditOutcome, CommitError> {
        for id in specialization_ids {
            let specialization = self
                .catalog
                .specialization(id)
                .ok_or_else(|| CommitError::UnknownEntry(CatalogId::new(*id)))?;
            if let Some(class) = &specialization.class_id {
                if !snapshot.class_ids.contains(class) {
                    return Err(CommitError::SpecializationMismatch {
                        specialization: specialization.id.clone(),
                        class: class.clone(),
                    });
                }
            }
        }

        let mut next = snapshot.clone();
        next.specialization_ids = specialization_ids.iter().map(|id| CatalogId::new(*id)).collect();
        tracing::info!(specializations = ?next.specialization_ids, "Specializations changed");
        Ok(self.outcome(next, Vec::new()))
    }

    /// Change level. Selections, boosts and skill increases assigned above
    /// the new level are kept. They stay dormant until the level is raised
    /// again, and such selections are flagged in their eligibility.
    pub fn set_level(
        &self,
        snapshot: &CharacterSnapshot,
        level: u8,
    ) -> Result<EditOutcome, CommitError> {
        let max = self.rules.max_level;
        if level == 0 || level > max {
            return Err(CommitError::InvalidLevel { level, max });
        }

        let mut next = snapshot.clone();
        next.level = level;
        let dormant = next.player_selections().filter(|s| s.level > level).count();
        tracing::info!(level, dormant, "Level changed");
        Ok(self.outcome(next, Vec::new()))
    }

    /// Assign the boost set for `(source, level)`, replacing any earlier
    /// one. An empty set clears the assignment.
    ///
    /// The set must fit the source's allowance: the ancestry's free boosts,
    /// the background's options, the classes' key abilities or the
    /// ruleset's free and level-up counts.
    pub fn apply_boosts(
        &self,
        snapshot: &CharacterSnapshot,
        source: BoostSource,
        level: u8,
        abilities: &[Ability],
    ) -> Result<EditOutcome, CommitError> {
        let ctx = self.ctx();
        let mut unresolved = Vec::new();
        let definitions = Definitions::resolve(snapshot, &ctx, &mut unresolved);
        let allowance = boost_allowance(source, &definitions, &self.rules);
        if !allowance.allows_count(abilities.len()) {
            return Err(CommitError::TooManyBoosts {
                origin: source,
                level,
                max: allowance.max,
                count: abilities.len(),
            });
        }
        if !allowance.allows_abilities(abilities) {
            return Err(CommitError::BoostOutsideOptions {
                origin: source,
                options: allowance.options,
            });
        }

        let mut next = snapshot.clone();
        next.boosts
            .retain(|b| !(b.source == source && b.level == level));
        if !abilities.is_empty() {
            next.boosts.push(BoostAssignment::new(
                source,
                level,
                abilities.iter().copied(),
            ));
        }
        Ok(self.outcome(next, Vec::new()))
    }

    /// Assign (or with `None`, clear) the skill increase of `level`.
    pub fn set_skill_increase(
        &self,
        snapshot: &CharacterSnapshot,
        level: u8,
        skill: Option<Skill>,
    ) -> Result<EditOutcome, CommitError> {
        let mut next = snapshot.clone();
        match skill {
            Some(skill) => {
                next.skill_increases.insert(level, skill);
            }
            None => {
                next.skill_increases.remove(&level);
            }
        }
        Ok(self.outcome(next, Vec::new()))
    }

    /// Skills trained with the classes' additional training slots.
    pub fn set_trained_skills(
        &self,
        snapshot: &CharacterSnapshot,
        skills: Vec<Skill>,
    ) -> Result<EditOutcome, CommitError> {
        let mut next = snapshot.clone();
        next.trained_skills = skills;
        Ok(self.outcome(next, Vec::new()))
    }

    /// Skills trained with the Intelligence bonus.
    pub fn set_int_bonus_skills(
        &self,
        snapshot: &CharacterSnapshot,
        skills: Vec<Skill>,
    ) -> Result<EditOutcome, CommitError> {
        let mut next = snapshot.clone();
        next.int_bonus_skills = skills;
        Ok(self.outcome(next, Vec::new()))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn find_spec(
    entry: &CatalogEntry,
    specs: &[ChoiceSpec],
    flag: &str,
) -> Result<ChoiceSpec, CommitError> {
    specs
        .iter()
        .find(|spec| spec.flag == flag)
        .cloned()
        .ok_or_else(|| CommitError::UnknownChoice {
            entry: entry.id.clone(),
            flag: flag.to_string(),
        })
}

/// Check answers against the entry's choices, returning them with each value
/// normalized to the matching option id.
fn validate_choices(
    entry: &CatalogEntry,
    specs: &[ChoiceSpec],
    answers: &BTreeMap<String, String>,
    view: &CharacterView,
    ctx: &RuleContext<'_>,
) -> Result<BTreeMap<String, String>, CommitError> {
    let missing = choices::missing_choices(specs, answers);
    if !missing.is_empty() {
        return Err(CommitError::IncompleteChoices {
            entry: entry.id.clone(),
            flags: missing,
        });
    }

    let mut validated = BTreeMap::new();
    for (flag, value) in answers {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let spec = find_spec(entry, specs, flag)?;
        let options = choices::options_for(entry, &spec, view, answers, ctx);
        let Some(option) = choices::matching_option(&options, value) else {
            return Err(CommitError::InvalidOption {
                entry: entry.id.clone(),
                flag: flag.clone(),
                value: value.to_string(),
            });
        };
        validated.insert(flag.clone(), option.clone());
    }
    Ok(validated)
}

/// Remove player selections filling slots of `source`, with their grants.
fn remove_sourced(snapshot: &mut CharacterSnapshot, source: SelectionSource) -> Vec<Selection> {
    let ids: Vec<SelectionId> = snapshot
        .player_selections()
        .filter(|s| s.source == source)
        .map(Selection::id)
        .collect();
    remove_all(snapshot, &ids)
}

fn names_any_class(entry: &CatalogEntry, classes: &[CatalogId]) -> bool {
    classes.iter().any(|class| entry.has_trait(class.as_str()))
}

fn remove_all(snapshot: &mut CharacterSnapshot, ids: &[SelectionId]) -> Vec<Selection> {
    let mut removed = Vec::new();
    for id in ids {
        let removal = selection_graph::retract(&snapshot.selections, *id);
        snapshot.selections = removal.selections;
        removed.extend(removal.removed);
    }
    removed
}
