//! The rules core.
//!
//! Every function here is pure: it reads a snapshot (or a view derived from
//! one) and the catalog, and returns new values. Nothing holds a "current
//! character".
//!
//! - `prerequisites` - typed prerequisite matchers and eligibility
//! - `choices` - choice schemas, option sets and completeness
//! - `selection_graph` - commit, cascading retraction, orphan detection
//! - `dedication` - the archetype dedication lock
//! - `recalculation` - full re-derivation of a character

pub mod choices;
pub mod dedication;
pub mod prerequisites;
pub mod recalculation;
pub mod selection_graph;
pub mod view;

use sheetsmith_domain::Catalog;

use crate::infrastructure::RulesConfig;

pub use prerequisites::PrerequisiteCache;
pub use view::CharacterView;

/// Read-only inputs shared by every rule: the catalog, the ruleset
/// constants and, optionally, a cache of parsed prerequisites.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub catalog: &'a dyn Catalog,
    pub rules: &'a RulesConfig,
    pub prerequisites: Option<&'a PrerequisiteCache>,
}

impl<'a> RuleContext<'a> {
    pub fn new(catalog: &'a dyn Catalog, rules: &'a RulesConfig) -> Self {
        Self {
            catalog,
            rules,
            prerequisites: None,
        }
    }

    /// Reuse parsed prerequisites across calls. The cache must only ever be
    /// used with this catalog and ruleset.
    pub fn with_prerequisites(mut self, cache: &'a PrerequisiteCache) -> Self {
        self.prerequisites = Some(cache);
        self
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("entries", &self.catalog.entries().len())
            .field("rules", &self.rules)
            .field("cached", &self.prerequisites.map_or(0, PrerequisiteCache::len))
            .finish()
    }
}
