//! The read-only reference catalog.
//!
//! The engine never owns or mutates catalog data; it queries it through the
//! [`Catalog`] port. [`StaticCatalog`] is the in-memory implementation used
//! by hosts that load the whole catalog once (e.g. from JSON).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{
    AncestryDef, BackgroundDef, CatalogEntry, ClassDef, HeritageDef, SpecializationDef,
};
use crate::ids::CatalogId;

/// Read-only access to the reference data.
///
/// Implementations must be cheap to query by id; the engine performs many
/// lookups per recalculation.
pub trait Catalog: Send + Sync {
    /// Feat, class feature or specialization entry by id.
    fn entry(&self, id: &str) -> Option<&CatalogEntry>;

    /// All feat-like entries, in a stable order.
    fn entries(&self) -> Vec<&CatalogEntry>;

    fn ancestry(&self, id: &str) -> Option<&AncestryDef>;

    fn ancestries(&self) -> Vec<&AncestryDef>;

    fn heritage(&self, id: &str) -> Option<&HeritageDef>;

    fn background(&self, id: &str) -> Option<&BackgroundDef>;

    fn class(&self, id: &str) -> Option<&ClassDef>;

    fn classes(&self) -> Vec<&ClassDef>;

    fn specialization(&self, id: &str) -> Option<&SpecializationDef>;

    fn specializations(&self) -> Vec<&SpecializationDef>;

    /// Entries carrying every one of the given traits.
    fn entries_with_traits(&self, traits: &[String]) -> Vec<&CatalogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| traits.iter().all(|t| entry.has_trait(t)))
            .collect()
    }

    /// Entry whose display name matches, case-insensitively.
    fn entry_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        let name = name.trim();
        self.entries()
            .into_iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}

/// Serializable form of a whole catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogData {
    pub entries: Vec<CatalogEntry>,
    pub ancestries: Vec<AncestryDef>,
    pub heritages: Vec<HeritageDef>,
    pub backgrounds: Vec<BackgroundDef>,
    pub classes: Vec<ClassDef>,
    pub specializations: Vec<SpecializationDef>,
}

/// In-memory catalog keyed by id, with a lower-cased name index for
/// prerequisite lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "CatalogData")]
pub struct StaticCatalog {
    entries: BTreeMap<CatalogId, CatalogEntry>,
    names: BTreeMap<String, CatalogId>,
    ancestries: BTreeMap<CatalogId, AncestryDef>,
    heritages: BTreeMap<CatalogId, HeritageDef>,
    backgrounds: BTreeMap<CatalogId, BackgroundDef>,
    classes: BTreeMap<CatalogId, ClassDef>,
    specializations: BTreeMap<CatalogId, SpecializationDef>,
}

impl From<CatalogData> for StaticCatalog {
    fn from(data: CatalogData) -> Self {
        let catalog = Self {
            ancestries: data.ancestries.into_iter().map(|a| (a.id.clone(), a)).collect(),
            heritages: data.heritages.into_iter().map(|h| (h.id.clone(), h)).collect(),
            backgrounds: data.backgrounds.into_iter().map(|b| (b.id.clone(), b)).collect(),
            classes: data.classes.into_iter().map(|c| (c.id.clone(), c)).collect(),
            specializations: data
                .specializations
                .into_iter()
                .map(|s| (s.id.clone(), s))
                .collect(),
            ..Self::default()
        };
        data.entries.into_iter().fold(catalog, Self::with_entry)
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // Builder-style methods; later inserts replace earlier ones with the same id.

    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        if let Some(replaced) = self.entries.get(&entry.id) {
            let stale = name_key(&replaced.name);
            if self.names.get(&stale) == Some(&entry.id) {
                self.names.remove(&stale);
            }
        }
        // First entry with a given name keeps it
        self.names
            .entry(name_key(&entry.name))
            .or_insert_with(|| entry.id.clone());
        self.entries.insert(entry.id.clone(), entry);
        self
    }

    pub fn with_ancestry(mut self, ancestry: AncestryDef) -> Self {
        self.ancestries.insert(ancestry.id.clone(), ancestry);
        self
    }

    pub fn with_heritage(mut self, heritage: HeritageDef) -> Self {
        self.heritages.insert(heritage.id.clone(), heritage);
        self
    }

    pub fn with_background(mut self, background: BackgroundDef) -> Self {
        self.backgrounds.insert(background.id.clone(), background);
        self
    }

    pub fn with_class(mut self, class: ClassDef) -> Self {
        self.classes.insert(class.id.clone(), class);
        self
    }

    pub fn with_specialization(mut self, specialization: SpecializationDef) -> Self {
        self.specializations
            .insert(specialization.id.clone(), specialization);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    fn entries(&self) -> Vec<&CatalogEntry> {
        self.entries.values().collect()
    }

    fn entry_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.names
            .get(&name_key(name))
            .and_then(|id| self.entries.get(id))
    }

    fn ancestry(&self, id: &str) -> Option<&AncestryDef> {
        self.ancestries.get(id)
    }

    fn ancestries(&self) -> Vec<&AncestryDef> {
        self.ancestries.values().collect()
    }

    fn heritage(&self, id: &str) -> Option<&HeritageDef> {
        self.heritages.get(id)
    }

    fn background(&self, id: &str) -> Option<&BackgroundDef> {
        self.backgrounds.get(id)
    }

    fn class(&self, id: &str) -> Option<&ClassDef> {
        self.classes.get(id)
    }

    fn classes(&self) -> Vec<&ClassDef> {
        self.classes.values().collect()
    }

    fn specialization(&self, id: &str) -> Option<&SpecializationDef> {
        self.specializations.get(id)
    }

    fn specializations(&self) -> Vec<&SpecializationDef> {
        self.specializations.values().collect()
    }
}
