//! Domain entities: catalog reference data, selections, snapshots and the
//! derived character.

mod catalog_entry;
mod definitions;
mod derived;
mod selection;
mod snapshot;

pub use catalog_entry::{
    CatalogEntry, ChoiceSpec, EntryKind, FeatEffect, GrantRef, LevelBound, OptionFilter,
    UsesFormula,
};
pub use definitions::{
    AncestryDef, BackgroundDef, ClassDef, GrantSlot, HeritageDef, LevelGrant, RankUpgrade,
    SpecializationDef,
};
pub use derived::{AnnotatedSelection, DedicationState, DerivedCharacter, Eligibility};
pub use selection::{Provenance, Selection, SelectionSource, SlotKey};
pub use snapshot::{BoostAssignment, BoostSource, CharacterSnapshot};
