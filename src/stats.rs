//! Summary numbers for a user's progress.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::model::UserState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    /// Sum of item quantities across the inventory.
    pub total_items: u64,

    pub total_fir_items: u64,

    pub completed_tasks: usize,

    pub total_tasks: usize,

    /// Mean current level over catalog stations, rounded to one decimal.
    pub average_hideout_level: f64,

    pub max_hideout_level: u32,
}

pub fn compute(catalog: &Catalog, state: &UserState) -> UserStatistics {
    let (total_items, total_fir_items) = state
        .inventory
        .iter()
        .fold((0u64, 0u64), |(q, f), (_, record)| {
            (q + u64::from(record.quantity), f + u64::from(record.found_in_raid))
        });

    let current: Vec<u32> = catalog
        .stations()
        .iter()
        .map(|s| state.station_levels.level(&s.id))
        .collect();
    let sum: f64 = current.iter().copied().map(f64::from).sum();
    let average_hideout_level = if current.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let count = current.len() as f64;
        (sum / count * 10.0).round() / 10.0
    };

    UserStatistics {
        total_items,
        total_fir_items,
        completed_tasks: state.completions.completed_count(),
        total_tasks: catalog.tasks().len(),
        average_hideout_level,
        max_hideout_level: current.iter().copied().max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::catalog::CatalogData;
    use crate::model::{TaskStatus, UserItemRecord};

    fn catalog() -> Catalog {
        let data: CatalogData = serde_json::from_str(
            r#"{
                "tasks": [
                    {"id": "a", "name": "A", "trader": "Prapor"},
                    {"id": "b", "name": "B", "trader": "Prapor"},
                    {"id": "c", "name": "C", "trader": "Skier"}
                ],
                "hideoutStations": [
                    {"id": "stash", "name": "Stash"},
                    {"id": "vents", "name": "Vents"},
                    {"id": "lavatory", "name": "Lavatory"}
                ]
            }"#,
        )
        .unwrap();
        Catalog::new(data, Timestamp::UNIX_EPOCH)
    }

    #[test]
    fn empty_state() {
        let stats = compute(&catalog(), &UserState::default());
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.completed_tasks, 0);
        assert_eq!(stats.total_tasks, 3);
        assert!(stats.average_hideout_level.abs() < f64::EPSILON);
        assert_eq!(stats.max_hideout_level, 0);
    }

    #[test]
    fn sums_and_averages() {
        let mut state = UserState::default();
        state.inventory.set("bolts", UserItemRecord::new(2, 5));
        state.inventory.set("screws", UserItemRecord::new(1, 1));
        state.completions.set("a", TaskStatus::Completed);
        state.completions.set("b", TaskStatus::Failed);
        state.station_levels.set("stash", 4);
        state.station_levels.set("vents", 1);
        // Not in the catalog.
        state.station_levels.set("gym", 9);

        let stats = compute(&catalog(), &state);
        assert_eq!(stats.total_items, 6);
        assert_eq!(stats.total_fir_items, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert!((stats.average_hideout_level - 1.7).abs() < 1e-9);
        assert_eq!(stats.max_hideout_level, 4);
    }

    #[test]
    fn empty_catalog_averages_to_zero() {
        let mut state = UserState::default();
        state.station_levels.set("stash", 2);
        let stats = compute(&Catalog::empty(), &state);
        assert!(stats.average_hideout_level.abs() < f64::EPSILON);
        assert_eq!(stats.max_hideout_level, 0);
        assert_eq!(stats.total_tasks, 0);
    }
}
