//! Per-user settings.

use serde::{Deserialize, Serialize};

/// Highest player level the game allows.
pub const MAX_PLAYER_LEVEL: u32 = 79;

/// Purchased game edition. Some editions start with upgraded stations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEdition {
    #[default]
    #[serde(rename = "Standard Edition")]
    Standard,

    #[serde(rename = "Left Behind Edition")]
    LeftBehind,

    #[serde(rename = "Prepare for Escape Edition")]
    PrepareForEscape,

    #[serde(rename = "Edge of Darkness Edition")]
    EdgeOfDarkness,

    #[serde(rename = "The Unheard Edition")]
    TheUnheard,
}

impl GameEdition {
    pub const ALL: [Self; 5] = [
        Self::Standard,
        Self::LeftBehind,
        Self::PrepareForEscape,
        Self::EdgeOfDarkness,
        Self::TheUnheard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Edition",
            Self::LeftBehind => "Left Behind Edition",
            Self::PrepareForEscape => "Prepare for Escape Edition",
            Self::EdgeOfDarkness => "Edge of Darkness Edition",
            Self::TheUnheard => "The Unheard Edition",
        }
    }
}

/// User settings. Every field has a default so partial documents load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// When false, only Kappa-required tasks are shown and counted.
    pub show_non_kappa_tasks: bool,

    pub game_edition: GameEdition,

    pub hardcore_mode: bool,

    /// Clamped to `1..=MAX_PLAYER_LEVEL`.
    pub player_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_non_kappa_tasks: true,
            game_edition: GameEdition::Standard,
            hardcore_mode: false,
            player_level: 1,
        }
    }
}

impl Settings {
    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::ShowNonKappaTasks(v) => self.show_non_kappa_tasks = v,
            Setting::GameEdition(v) => self.game_edition = v,
            Setting::HardcoreMode(v) => self.hardcore_mode = v,
            Setting::PlayerLevel(v) => self.player_level = clamp_player_level(v),
        }
    }
}

/// A single settings write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum Setting {
    ShowNonKappaTasks(bool),
    GameEdition(GameEdition),
    HardcoreMode(bool),
    PlayerLevel(u32),
}

impl Setting {
    /// Storage key, matching the `Settings` field name.
    pub fn key(self) -> &'static str {
        match self {
            Self::ShowNonKappaTasks(_) => "showNonKappaTasks",
            Self::GameEdition(_) => "gameEdition",
            Self::HardcoreMode(_) => "hardcoreMode",
            Self::PlayerLevel(_) => "playerLevel",
        }
    }

    /// The value as JSON, for key/value storage.
    pub fn value(self) -> serde_json::Value {
        match self {
            Self::ShowNonKappaTasks(v) | Self::HardcoreMode(v) => serde_json::Value::Bool(v),
            Self::GameEdition(v) => serde_json::Value::String(v.label().to_string()),
            Self::PlayerLevel(v) => serde_json::Value::from(clamp_player_level(v)),
        }
    }
}

pub fn clamp_player_level(level: u32) -> u32 {
    level.clamp(1, MAX_PLAYER_LEVEL)
}
