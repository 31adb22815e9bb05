//! Use cases - edits a player makes to a character.
//!
//! Each edit validates the request against the rules core, applies it to a
//! copy of the snapshot and returns the recalculated character.

pub mod character_editor;

pub use character_editor::{CharacterEditor, CommitError, CommitRequest, EditOutcome};
