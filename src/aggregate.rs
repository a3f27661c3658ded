//! Requirement aggregation: one demand line per item across every open source.
//!
//! Open sources are tasks that are not completed (Kappa tasks only, unless
//! non-Kappa tasks are included) and every hideout level above the station's
//! current level. The result is recomputed from scratch on every call.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::model::{
    CompletionStates, ItemRequirement, RequirementSource, SourcedRequirement, StationLevels,
};

/// Total demand for one item, with where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedItemRequirement {
    pub item_id: String,

    pub item_name: String,

    /// Sum over all sources, FIR and non-FIR alike.
    pub total_quantity: u32,

    pub sources: Vec<Contribution>,
}

/// One source's share of a grouped requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub source: RequirementSource,
    pub quantity: u32,
    pub found_in_raid: bool,
}

impl GroupedItemRequirement {
    /// The group as a single requirement for progress tracking.
    ///
    /// Only found-in-raid stock counts when every source demands it.
    pub fn requirement(&self) -> ItemRequirement {
        ItemRequirement {
            item_id: self.item_id.clone(),
            quantity: self.total_quantity,
            found_in_raid: !self.sources.is_empty() && self.sources.iter().all(|s| s.found_in_raid),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.item_name.to_lowercase().contains(needle)
            || self
                .sources
                .iter()
                .any(|s| s.source.label.to_lowercase().contains(needle))
    }
}

/// Requirements of every open task and unbuilt level, in catalog order.
pub fn open_requirements(
    catalog: &Catalog,
    states: &CompletionStates,
    levels: &StationLevels,
    include_non_kappa: bool,
) -> Vec<SourcedRequirement> {
    let tasks = catalog
        .tasks()
        .iter()
        .filter(|t| include_non_kappa || t.kappa_required)
        .filter(|t| !states.is_completed(&t.id))
        .flat_map(|t| t.sourced_requirements());

    let hideout = catalog.stations().iter().flat_map(|station| {
        let current = levels.level(&station.id);
        station
            .levels
            .iter()
            .filter(move |l| l.level > current)
            .flat_map(move |l| station.sourced_requirements(l))
    });

    tasks.chain(hideout).collect()
}

/// Group open requirements by item, sorted by item name.
pub fn aggregate(
    catalog: &Catalog,
    states: &CompletionStates,
    levels: &StationLevels,
    include_non_kappa: bool,
) -> Vec<GroupedItemRequirement> {
    let mut groups: BTreeMap<String, GroupedItemRequirement> = BTreeMap::new();

    for SourcedRequirement {
        requirement,
        source,
    } in open_requirements(catalog, states, levels, include_non_kappa)
    {
        let group = groups
            .entry(requirement.item_id.clone())
            .or_insert_with(|| GroupedItemRequirement {
                item_name: catalog.item_name(&requirement.item_id).to_string(),
                item_id: requirement.item_id.clone(),
                total_quantity: 0,
                sources: Vec::new(),
            });
        group.total_quantity = group.total_quantity.saturating_add(requirement.quantity);
        group.sources.push(Contribution {
            source,
            quantity: requirement.quantity,
            found_in_raid: requirement.found_in_raid,
        });
    }

    let mut out: Vec<_> = groups.into_values().collect();
    out.sort_by(|a, b| {
        a.item_name
            .to_lowercase()
            .cmp(&b.item_name.to_lowercase())
            .then_with(|| a.item_name.cmp(&b.item_name))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    out
}

/// Groups whose item name or any source label contains `query`, ignoring case.
///
/// A blank query keeps everything.
pub fn search<'a>(
    groups: &'a [GroupedItemRequirement],
    query: &str,
) -> Vec<&'a GroupedItemRequirement> {
    let needle = query.trim().to_lowercase();
    groups
        .iter()
        .filter(|g| needle.is_empty() || g.matches(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::catalog::CatalogData;
    use crate::model::{SourceKind, TaskStatus};

    fn catalog() -> Catalog {
        let data: CatalogData = serde_json::from_str(
            r#"{
                "items": [
                    {"id": "x", "name": "screws"},
                    {"id": "y", "name": "Bolts"},
                    {"id": "z", "name": "Wires"}
                ],
                "tasks": [
                    {"id": "t1", "name": "Debut", "trader": "Prapor", "kappaRequired": true,
                     "requirements": [{"itemId": "x", "quantity": 3}]},
                    {"id": "t2", "name": "Shortage", "trader": "Therapist",
                     "requirements": [{"itemId": "y", "quantity": 1, "foundInRaid": true}]},
                    {"id": "t3", "name": "Sanitary", "trader": "Therapist", "kappaRequired": true,
                     "requirements": [{"itemId": "z", "quantity": 4}]}
                ],
                "hideoutStations": [
                    {"id": "workbench", "name": "Workbench", "levels": [
                        {"level": 1, "requirements": [{"itemId": "x", "quantity": 2}]},
                        {"level": 2, "requirements": [{"itemId": "y", "quantity": 5}]}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        Catalog::new(data, Timestamp::UNIX_EPOCH)
    }

    fn find<'a>(groups: &'a [GroupedItemRequirement], id: &str) -> &'a GroupedItemRequirement {
        groups.iter().find(|g| g.item_id == id).unwrap()
    }

    #[test]
    fn task_and_level_demand_merge_into_one_group() {
        let mut states = CompletionStates::default();
        states.set("t3", TaskStatus::Completed);
        let levels: StationLevels = [("workbench".to_string(), 0)].into_iter().collect();

        let groups = aggregate(&catalog(), &states, &levels, false);
        let x = find(&groups, "x");
        assert_eq!(x.total_quantity, 5);
        assert_eq!(x.sources.len(), 2);
        assert_eq!(x.sources[0].source.kind, SourceKind::Task);
        assert_eq!(x.sources[0].source.label, "Debut");
        assert_eq!(x.sources[1].source.kind, SourceKind::Hideout);
        assert_eq!(x.sources[1].source.id, "workbench_1");
        assert_eq!(x.sources[1].source.label, "Workbench Level 1");
    }

    #[test]
    fn kappa_only_skips_non_kappa_tasks() {
        let groups = aggregate(
            &catalog(),
            &CompletionStates::default(),
            &StationLevels::default(),
            false,
        );
        // Bolts only come from the workbench.
        let y = find(&groups, "y");
        assert_eq!(y.total_quantity, 5);
        assert_eq!(y.sources.len(), 1);

        let groups = aggregate(
            &catalog(),
            &CompletionStates::default(),
            &StationLevels::default(),
            true,
        );
        assert_eq!(find(&groups, "y").total_quantity, 6);
    }

    #[test]
    fn built_levels_and_completed_tasks_drop_out() {
        let mut states = CompletionStates::default();
        states.set("t1", TaskStatus::Completed);
        let levels: StationLevels = [("workbench".to_string(), 1)].into_iter().collect();

        let groups = aggregate(&catalog(), &states, &levels, true);
        assert!(groups.iter().all(|g| g.item_id != "x"));
    }

    #[test]
    fn failed_tasks_still_count() {
        let mut states = CompletionStates::default();
        states.set("t3", TaskStatus::Failed);
        let groups = aggregate(&catalog(), &states, &StationLevels::default(), false);
        assert_eq!(find(&groups, "z").total_quantity, 4);
    }

    #[test]
    fn groups_sort_by_name_ignoring_case() {
        let groups = aggregate(
            &catalog(),
            &CompletionStates::default(),
            &StationLevels::default(),
            true,
        );
        let names: Vec<&str> = groups.iter().map(|g| g.item_name.as_str()).collect();
        assert_eq!(names, ["Bolts", "screws", "Wires"]);
    }

    #[test]
    fn empty_catalog_has_no_demand() {
        let groups = aggregate(
            &Catalog::empty(),
            &CompletionStates::default(),
            &StationLevels::default(),
            true,
        );
        assert!(groups.is_empty());
    }

    #[test]
    fn group_needs_fir_only_when_every_source_does() {
        let groups = aggregate(
            &catalog(),
            &CompletionStates::default(),
            &StationLevels::default(),
            true,
        );
        assert!(find(&groups, "y").requirement().found_in_raid);
        assert!(!find(&groups, "x").requirement().found_in_raid);
    }

    #[test]
    fn search_matches_name_or_source() {
        let groups = aggregate(
            &catalog(),
            &CompletionStates::default(),
            &StationLevels::default(),
            true,
        );
        let ids = |q: &str| -> Vec<String> {
            search(&groups, q).iter().map(|g| g.item_id.clone()).collect()
        };
        assert_eq!(ids("BOLT"), ["y"]);
        assert_eq!(ids("workbench level 1"), ["x"]);
        assert_eq!(ids("  "), ["y", "x", "z"]);
        assert!(ids("nothing").is_empty());
    }
}
