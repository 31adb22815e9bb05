//! End-to-end tests of the character editor.
//!
//! These tests drive the editor the way a sheet would: build a character,
//! commit and retract selections, change its elements and level, then check
//! the derived character.
//!
//! # Running
//!
//! ```bash
//! cargo test -p sheetsmith-engine --lib e2e_tests
//! ```

mod property_tests;
