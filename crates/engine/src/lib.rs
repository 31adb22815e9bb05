//! SheetSmith Engine library.
//!
//! Derives a full character from the raw selections a player made and
//! decides which further selections are legal.
//!
//! ## Structure
//!
//! - `rules/` - prerequisite evaluation, choices, the selection graph, the
//!   dedication lock and recalculation
//! - `use_cases/` - the character editor that validates and applies edits
//! - `infrastructure/` - ruleset configuration and tracing setup

pub mod infrastructure;
pub mod rules;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end character building scenarios and property tests.
#[cfg(test)]
mod e2e_tests;

pub use infrastructure::{EngineConfig, RulesConfig};
pub use rules::recalculation::recalculate;
pub use rules::{CharacterView, RuleContext};
pub use use_cases::{CharacterEditor, CommitError, CommitRequest, EditOutcome};
