// src/models/mod.rs

//! Domain models for the watcher.
//!
//! Posts and matches produced each tick, the condition table, and the
//! configuration structures.

mod conditions;
mod config;
mod post;

// Re-export all public types
pub use conditions::{ConditionEntry, ConditionTable};
pub use config::{
    Config, ConditionsConfig, ExtractionConfig, MessagesConfig, NotifierConfig, WatcherConfig,
    parse_selector,
};
pub use post::{MatchResult, Post};
