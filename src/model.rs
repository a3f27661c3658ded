//! Core data model.
//!
//! Catalog types (tasks, stations, items) are read-only snapshots of game data.
//! User state types (completion states, station levels, inventory, settings)
//! are what the storage backends persist.

mod hideout;
mod item;
mod settings;
mod task;

pub use hideout::{
    HideoutLevel, HideoutStation, ItemCount, SkillRequirement, StationLevelRequirement,
    StationLevels, TraderRequirement,
};
pub use item::{Inventory, Item, UserItemRecord};
pub use settings::{GameEdition, MAX_PLAYER_LEVEL, Setting, Settings, clamp_player_level};
pub use task::{
    CompletionStates, ItemRequirement, RequirementSource, SourceKind, SourcedRequirement,
    StatusChange, Task, TaskStatus,
};

/// Everything the engine knows about one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    pub completions: CompletionStates,
    pub station_levels: StationLevels,
    pub inventory: Inventory,
    pub settings: Settings,
}
