//! Hideout progression: which station levels can be built.
//!
//! Levels are built in order. Level `n` needs level `n - 1` at the same
//! station plus every cross-station level requirement. Skill and trader
//! requirements are informational and never gate a build.
//!
//! Some game editions start with stations already upgraded. Those starting
//! levels are floors: applying them only ever raises a station.

use serde::Serialize;

use crate::ledger;
use crate::model::{GameEdition, HideoutLevel, HideoutStation, StationLevels};

/// Starting levels granted by an edition: `(edition, station id, level)`.
pub const EDITION_FLOORS: [(GameEdition, &str, u32); 3] = [
    (GameEdition::EdgeOfDarkness, "stash", 4),
    (GameEdition::TheUnheard, "stash", 4),
    (GameEdition::TheUnheard, "cultist-circle", 1),
];

pub fn is_level_complete(levels: &StationLevels, station_id: &str, level: u32) -> bool {
    levels.has_reached(station_id, level)
}

/// Whether every cross-station requirement of `level` is met.
///
/// An entry naming the evaluated station itself is ignored: a station's own
/// ordering is covered by the sequential rule.
pub fn station_requirements_met(
    station: &HideoutStation,
    level: &HideoutLevel,
    levels: &StationLevels,
) -> bool {
    level
        .station_level_requirements
        .iter()
        .filter(|req| req.station_id != station.id)
        .all(|req| levels.has_reached(&req.station_id, req.level))
}

pub fn is_level_buildable(
    station: &HideoutStation,
    level: &HideoutLevel,
    levels: &StationLevels,
) -> bool {
    if level.level > 1 && !levels.has_reached(&station.id, level.level - 1) {
        return false;
    }
    station_requirements_met(station, level, levels)
}

/// Whether the next level of the station exists and is buildable.
pub fn can_upgrade(station: &HideoutStation, levels: &StationLevels) -> bool {
    next_level(station, levels).is_some_and(|next| is_level_buildable(station, next, levels))
}

pub fn next_level<'a>(station: &'a HideoutStation, levels: &StationLevels) -> Option<&'a HideoutLevel> {
    station.level(levels.level(&station.id) + 1)
}

/// How a level shows up in the hideout view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelState {
    Complete,
    Buildable,
    Locked,
}

pub fn level_state(station: &HideoutStation, level: &HideoutLevel, levels: &StationLevels) -> LevelState {
    if is_level_complete(levels, &station.id, level.level) {
        LevelState::Complete
    } else if is_level_buildable(station, level, levels) {
        LevelState::Buildable
    } else {
        LevelState::Locked
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelFilter {
    All,
    /// Not complete and buildable.
    #[default]
    Available,
    /// Not complete and not buildable.
    Locked,
}

pub fn matches_filter(
    station: &HideoutStation,
    level: &HideoutLevel,
    filter: LevelFilter,
    levels: &StationLevels,
) -> bool {
    match filter {
        LevelFilter::All => true,
        LevelFilter::Available => level_state(station, level, levels) == LevelState::Buildable,
        LevelFilter::Locked => level_state(station, level, levels) == LevelState::Locked,
    }
}

pub fn filtered_levels<'a>(
    station: &'a HideoutStation,
    filter: LevelFilter,
    levels: &StationLevels,
) -> Vec<&'a HideoutLevel> {
    station
        .levels
        .iter()
        .filter(|level| matches_filter(station, level, filter, levels))
        .collect()
}

pub fn count_levels(stations: &[HideoutStation], filter: LevelFilter, levels: &StationLevels) -> usize {
    stations
        .iter()
        .map(|station| filtered_levels(station, filter, levels).len())
        .sum()
}

pub fn completed_levels(station: &HideoutStation, levels: &StationLevels) -> usize {
    station
        .levels
        .iter()
        .filter(|l| is_level_complete(levels, &station.id, l.level))
        .count()
}

/// Share of the station's levels already built, as a rounded percentage.
pub fn station_progress(station: &HideoutStation, levels: &StationLevels) -> u8 {
    if station.levels.is_empty() {
        return 0;
    }
    ledger::percentage(
        count_u32(completed_levels(station, levels)),
        count_u32(station.levels.len()),
    )
}

/// Share of all levels across all stations already built. 0 with no levels.
pub fn overall_progress(stations: &[HideoutStation], levels: &StationLevels) -> u8 {
    let total: usize = stations.iter().map(|s| s.levels.len()).sum();
    if total == 0 {
        return 0;
    }
    let done: usize = stations.iter().map(|s| completed_levels(s, levels)).sum();
    ledger::percentage(count_u32(done), count_u32(total))
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Starting level an edition grants a station. 0 when it grants nothing.
pub fn starting_level(edition: GameEdition, station_id: &str) -> u32 {
    EDITION_FLOORS
        .iter()
        .filter(|(e, id, _)| *e == edition && *id == station_id)
        .map(|(_, _, level)| *level)
        .max()
        .unwrap_or(0)
}

/// Stations the edition's floors would raise, with their new levels.
///
/// Only stations present in the catalog are considered, and a station is
/// listed only when the floor is above its current level.
pub fn floor_adjustments(
    edition: GameEdition,
    stations: &[HideoutStation],
    levels: &StationLevels,
) -> Vec<(String, u32)> {
    EDITION_FLOORS
        .iter()
        .filter(|(e, _, _)| *e == edition)
        .filter(|(_, id, _)| stations.iter().any(|s| s.id == *id))
        .filter(|(_, id, floor)| *floor > levels.level(id))
        .map(|(_, id, floor)| ((*id).to_string(), *floor))
        .collect()
}
