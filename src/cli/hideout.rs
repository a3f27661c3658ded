//! Hideout commands: list levels, upgrade, downgrade.

use crate::hideout::{self, LevelFilter};
use crate::tracker::Tracker;

use super::LevelFilterArg;
use super::format::format_level_state;

impl LevelFilterArg {
    fn to_domain(self) -> LevelFilter {
        match self {
            Self::All => LevelFilter::All,
            Self::Available => LevelFilter::Available,
            Self::Locked => LevelFilter::Locked,
        }
    }
}

pub(super) fn cmd_list(tracker: &Tracker<'_>, filter: LevelFilterArg) -> Result<(), String> {
    let levels = &tracker.state().station_levels;
    let stations = tracker.catalog().stations();
    let filter = filter.to_domain();

    println!(
        "{} levels shown, overall {}% built",
        hideout::count_levels(stations, filter, levels),
        hideout::overall_progress(stations, levels)
    );
    for station in stations {
        let shown = hideout::filtered_levels(station, filter, levels);
        if shown.is_empty() {
            continue;
        }
        println!(
            "{} (level {}, {}%)",
            station.name,
            levels.level(&station.id),
            hideout::station_progress(station, levels)
        );
        for level in shown {
            let state = hideout::level_state(station, level, levels);
            println!("  {:>2}  {}", level.level, format_level_state(state));
        }
    }
    Ok(())
}

pub(super) fn cmd_upgrade(tracker: &mut Tracker<'_>, station_id: &str) -> Result<(), String> {
    let upgraded = tracker
        .upgrade_next(station_id)
        .map_err(|e| format!("failed to upgrade station: {e}"))?;
    let level = tracker.state().station_levels.level(station_id);
    if upgraded {
        eprintln!("{} upgraded to level {level}", station_name(tracker, station_id));
        Ok(())
    } else {
        Err(format!(
            "{} cannot be upgraded from level {level}",
            station_name(tracker, station_id)
        ))
    }
}

pub(super) fn cmd_downgrade(tracker: &mut Tracker<'_>, station_id: &str, target: u32) -> Result<(), String> {
    let downgraded = tracker
        .downgrade_station(station_id, target)
        .map_err(|e| format!("failed to downgrade station: {e}"))?;
    let name = station_name(tracker, station_id);
    if downgraded {
        eprintln!("{name} downgraded to level {target}");
    } else {
        eprintln!(
            "{name} is already at level {}, nothing to do",
            tracker.state().station_levels.level(station_id)
        );
    }
    Ok(())
}

fn station_name(tracker: &Tracker<'_>, station_id: &str) -> String {
    tracker
        .catalog()
        .station(station_id)
        .map_or_else(|| station_id.to_string(), |s| s.name.clone())
}
