//! Infrastructure: configuration loading and tracing setup.

pub mod config;
pub mod telemetry;

pub use config::{EngineConfig, RankBonuses, RankLevelCaps, RulesConfig, RULES_FILE_ENV};
pub use telemetry::init_tracing;
