//! Hideout types: stations and their upgrade levels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::task::{ItemRequirement, RequirementSource, SourceKind, SourcedRequirement};

/// A hideout station with its sequential upgrade levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HideoutStation {
    pub id: String,

    pub name: String,

    /// Levels numbered contiguously from 1.
    #[serde(default)]
    pub levels: Vec<HideoutLevel>,
}

impl HideoutStation {
    pub fn level(&self, level: u32) -> Option<&HideoutLevel> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Source id for one of this station's levels, e.g. `workbench_2`.
    pub fn level_source_id(&self, level: u32) -> String {
        format!("{}_{level}", self.id)
    }

    /// Requirements of a level, tagged with the level as their source.
    ///
    /// Hideout items are always found-in-raid.
    pub fn sourced_requirements<'a>(
        &'a self,
        level: &'a HideoutLevel,
    ) -> impl Iterator<Item = SourcedRequirement> + 'a {
        level.item_requirements().map(move |requirement| SourcedRequirement {
            requirement,
            source: RequirementSource {
                kind: SourceKind::Hideout,
                id: self.level_source_id(level.level),
                label: format!("{} Level {}", self.name, level.level),
                trader: None,
            },
        })
    }
}

/// One upgrade tier of a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HideoutLevel {
    pub level: u32,

    /// Items consumed by building this level.
    #[serde(default)]
    pub requirements: Vec<ItemCount>,

    /// Other stations that must already be at a given level.
    #[serde(default)]
    pub station_level_requirements: Vec<StationLevelRequirement>,

    /// Informational only; not checked by the progression rules.
    #[serde(default)]
    pub skill_requirements: Vec<SkillRequirement>,

    /// Informational only; not checked by the progression rules.
    #[serde(default)]
    pub trader_requirements: Vec<TraderRequirement>,

    #[serde(default)]
    pub construction_time: Option<String>,
}

impl HideoutLevel {
    pub fn item_requirements(&self) -> impl Iterator<Item = ItemRequirement> + '_ {
        self.requirements.iter().map(|c| ItemRequirement {
            item_id: c.item_id.clone(),
            quantity: c.quantity,
            found_in_raid: true,
        })
    }
}

/// A bare item count. Hideout requirements carry no FIR flag of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCount {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLevelRequirement {
    pub station_id: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequirement {
    pub skill: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderRequirement {
    pub trader: String,
    pub level: u32,
}

/// Current level of every station a user has built. Unseen stations are at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationLevels(BTreeMap<String, u32>);

impl StationLevels {
    pub fn level(&self, station_id: &str) -> u32 {
        self.0.get(station_id).copied().unwrap_or(0)
    }

    /// Whether `level` is already attained at the station.
    pub fn has_reached(&self, station_id: &str, level: u32) -> bool {
        self.level(station_id) >= level
    }

    pub fn set(&mut self, station_id: impl Into<String>, level: u32) {
        self.0.insert(station_id.into(), level);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(id, level)| (id.as_str(), *level))
    }
}

impl FromIterator<(String, u32)> for StationLevels {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
