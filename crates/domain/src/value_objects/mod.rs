//! Value objects: small, immutable rules vocabulary shared by every layer.

mod ability;
mod proficiency;
mod skill;

pub use ability::{ability_modifier, Ability, AbilityScores};
pub use proficiency::{DefenseTarget, ProficiencyRank, Save};
pub use skill::Skill;
