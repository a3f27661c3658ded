//! Task graph evaluation: availability, exclusive branches, and list filters.
//!
//! A task is available once every prerequisite is completed. Tasks in a
//! parallel group are mutually exclusive: completing one fails the others,
//! and un-completing it puts the failed ones back to pending.
//!
//! Availability and completion eligibility are separate questions. A failed
//! task can still be "available" in the prerequisite sense; it just cannot be
//! completed.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{CompletionStates, StatusChange, Task, TaskStatus};

/// Traders in the order the game lists them.
pub const TRADER_ORDER: [&str; 11] = [
    "prapor",
    "therapist",
    "fence",
    "skier",
    "peacekeeper",
    "mechanic",
    "ragman",
    "jaeger",
    "ref",
    "btrdriver",
    "lightkeeper",
];

/// Whether every prerequisite of the task is completed.
pub fn is_available(task: &Task, states: &CompletionStates) -> bool {
    task.prerequisites.iter().all(|id| states.is_completed(id))
}

/// Whether the task may be marked completed: neither completed nor failed.
pub fn can_complete(task: &Task, states: &CompletionStates) -> bool {
    matches!(states.status(&task.id), TaskStatus::Pending)
}

/// Status changes for completing `task`.
///
/// The task becomes completed and every sibling in its parallel group that
/// is not already completed becomes failed.
pub fn completion_changes(task: &Task, states: &CompletionStates) -> Vec<StatusChange> {
    let mut changes = vec![StatusChange {
        task_id: task.id.clone(),
        status: TaskStatus::Completed,
    }];
    changes.extend(
        task.parallel_group
            .iter()
            .filter(|id| **id != task.id && !states.is_completed(id))
            .map(|id| StatusChange {
                task_id: id.clone(),
                status: TaskStatus::Failed,
            }),
    );
    changes
}

/// Status changes for un-completing `task`.
///
/// The task goes back to pending, and so does every sibling that is
/// currently failed, whichever completion failed it.
pub fn uncompletion_changes(task: &Task, states: &CompletionStates) -> Vec<StatusChange> {
    let mut changes = vec![StatusChange {
        task_id: task.id.clone(),
        status: TaskStatus::Pending,
    }];
    changes.extend(
        task.parallel_group
            .iter()
            .filter(|id| states.status(id) == TaskStatus::Failed)
            .map(|id| StatusChange {
                task_id: id.clone(),
                status: TaskStatus::Pending,
            }),
    );
    changes
}

/// Status filter for task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Everything that survives the trader, Kappa and level narrowing.
    #[default]
    All,
    /// Not completed, not failed, prerequisites met.
    Available,
    /// Not completed and above the player's level. Prerequisites are ignored.
    Locked,
    Completed,
}

/// Everything that narrows a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,

    /// Case-insensitive trader name.
    pub trader: Option<String>,

    pub show_non_kappa: bool,

    /// When false, tasks above `player_level` are hidden whatever the status filter.
    pub show_above_level: bool,

    pub player_level: u32,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            trader: None,
            show_non_kappa: true,
            show_above_level: true,
            player_level: 1,
        }
    }
}

/// Narrow a task list: trader, then Kappa, then level gate, then status.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    filter: &TaskFilter,
    states: &CompletionStates,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| {
            filter
                .trader
                .as_deref()
                .is_none_or(|trader| t.trader.eq_ignore_ascii_case(trader))
        })
        .filter(|t| filter.show_non_kappa || t.kappa_required)
        .filter(|t| filter.show_above_level || t.min_level <= filter.player_level)
        .filter(|t| matches_status(t, filter.status, filter.player_level, states))
        .collect()
}

fn matches_status(
    task: &Task,
    status: StatusFilter,
    player_level: u32,
    states: &CompletionStates,
) -> bool {
    let current = states.status(&task.id);
    match status {
        StatusFilter::All => true,
        StatusFilter::Available => current == TaskStatus::Pending && is_available(task, states),
        StatusFilter::Locked => current != TaskStatus::Completed && task.min_level > player_level,
        StatusFilter::Completed => current == TaskStatus::Completed,
    }
}

/// Distinct trader names across `tasks`, in game order.
///
/// Known traders come first in [`TRADER_ORDER`]; the rest follow by name.
pub fn traders(tasks: &[Task]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for task in tasks {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&task.trader)) {
            names.push(task.trader.clone());
        }
    }
    sort_traders(&mut names);
    names
}

pub fn sort_traders(names: &mut [String]) {
    names.sort_by(|a, b| match (trader_rank(a), trader_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
    });
}

fn trader_rank(name: &str) -> Option<usize> {
    TRADER_ORDER
        .iter()
        .position(|t| t.eq_ignore_ascii_case(name))
}

/// Make parallel groups symmetric and strip in-group prerequisites.
///
/// Groups are the connected components of the "parallel with" relation.
/// Every member lists every other member, and every member's prerequisites
/// become the union of all members' prerequisites that point outside the
/// group, in order of first appearance. Prerequisites between members of
/// the same group are modeling artifacts of exclusivity, not ordering.
pub fn normalize_parallel_groups(tasks: &mut [Task]) {
    let index: BTreeMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();

    let mut parent: Vec<usize> = (0..tasks.len()).collect();
    for (i, task) in tasks.iter().enumerate() {
        for sibling in &task.parallel_group {
            if let Some(&j) = index.get(sibling) {
                union(&mut parent, i, j);
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..tasks.len() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(i);
    }

    for members in groups.values().filter(|m| m.len() > 1) {
        let ids: BTreeSet<&str> = members.iter().map(|&i| tasks[i].id.as_str()).collect();

        let mut shared: Vec<String> = Vec::new();
        for &i in members {
            for prereq in &tasks[i].prerequisites {
                if !ids.contains(prereq.as_str()) && !shared.contains(prereq) {
                    shared.push(prereq.clone());
                }
            }
        }

        let ids: Vec<String> = members.iter().map(|&i| tasks[i].id.clone()).collect();
        for &i in members {
            let own = tasks[i].id.clone();
            tasks[i].parallel_group = ids.iter().filter(|id| **id != own).cloned().collect();
            tasks[i].prerequisites.clone_from(&shared);
        }
    }

    // Unknown sibling ids (not in the catalog) cannot be normalized; drop them
    // from singleton tasks so every remaining group entry is resolvable.
    for task in tasks.iter_mut() {
        let own = task.id.clone();
        task.parallel_group.retain(|id| *id != own && index.contains_key(id));
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::ItemRequirement;

    fn task(id: &str, trader: &str, min_level: u32) -> Task {
        Task {
            id: id.into(),
            name: format!("Task {id}"),
            trader: trader.into(),
            min_level,
            requirements: vec![],
            prerequisites: vec![],
            parallel_group: vec![],
            kappa_required: true,
        }
    }

    fn states(entries: &[(&str, TaskStatus)]) -> CompletionStates {
        entries
            .iter()
            .map(|(id, s)| ((*id).to_string(), *s))
            .collect()
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn task_without_prerequisites_is_available() {
        assert!(is_available(&task("a", "Prapor", 1), &CompletionStates::default()));
    }

    #[test]
    fn availability_requires_all_prerequisites_completed() {
        let mut t = task("c", "Prapor", 1);
        t.prerequisites = vec!["a".into(), "b".into()];

        let partial = states(&[("a", TaskStatus::Completed), ("b", TaskStatus::Failed)]);
        assert!(!is_available(&t, &partial));

        let done = states(&[("a", TaskStatus::Completed), ("b", TaskStatus::Completed)]);
        assert!(is_available(&t, &done));
    }

    #[test]
    fn failed_task_is_available_but_not_completable() {
        let t = task("a", "Prapor", 1);
        let s = states(&[("a", TaskStatus::Failed)]);
        assert!(is_available(&t, &s));
        assert!(!can_complete(&t, &s));
    }

    #[test]
    fn completing_fails_pending_siblings_only() {
        let mut a = task("a", "Prapor", 1);
        a.parallel_group = vec!["b".into(), "c".into()];
        let s = states(&[("c", TaskStatus::Completed)]);

        let changes = completion_changes(&a, &s);
        assert_eq!(
            changes,
            vec![
                StatusChange {
                    task_id: "a".into(),
                    status: TaskStatus::Completed
                },
                StatusChange {
                    task_id: "b".into(),
                    status: TaskStatus::Failed
                },
            ]
        );
    }

    #[test]
    fn uncompleting_restores_failed_siblings() {
        let mut a = task("a", "Prapor", 1);
        a.parallel_group = vec!["b".into(), "c".into()];
        let mut s = states(&[("a", TaskStatus::Completed)]);
        s.apply(&completion_changes(&a, &s));
        assert_eq!(s.status("b"), TaskStatus::Failed);
        assert_eq!(s.status("c"), TaskStatus::Failed);

        s.apply(&uncompletion_changes(&a, &s));
        assert_eq!(s.status("a"), TaskStatus::Pending);
        assert_eq!(s.status("b"), TaskStatus::Pending);
        assert_eq!(s.status("c"), TaskStatus::Pending);
    }

    #[test]
    fn uncompleting_leaves_completed_siblings() {
        let mut a = task("a", "Prapor", 1);
        a.parallel_group = vec!["b".into()];
        let s = states(&[("a", TaskStatus::Completed), ("b", TaskStatus::Completed)]);
        let changes = uncompletion_changes(&a, &s);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].task_id, "a");
    }

    #[test]
    fn all_filter_ignores_prerequisites_and_level() {
        let mut gated = task("b", "Prapor", 40);
        gated.prerequisites = vec!["a".into()];
        let tasks = vec![task("a", "Prapor", 1), gated];

        let filter = TaskFilter {
            player_level: 5,
            ..TaskFilter::default()
        };
        let out = filter_tasks(&tasks, &filter, &CompletionStates::default());
        assert_eq!(ids(&out), ["a", "b"]);
    }

    #[test]
    fn level_gate_applies_even_to_all_filter() {
        let tasks = vec![task("a", "Prapor", 1), task("b", "Prapor", 40)];
        let filter = TaskFilter {
            show_above_level: false,
            player_level: 5,
            ..TaskFilter::default()
        };
        let out = filter_tasks(&tasks, &filter, &CompletionStates::default());
        assert_eq!(ids(&out), ["a"]);
    }

    #[test]
    fn locked_is_level_gating_only() {
        // b has unmet prerequisites but its level is fine: not locked.
        let mut b = task("b", "Prapor", 3);
        b.prerequisites = vec!["a".into()];
        let high = task("c", "Prapor", 30);
        let mut done_high = task("d", "Prapor", 30);
        done_high.kappa_required = false;
        let tasks = vec![task("a", "Prapor", 1), b, high, done_high];

        let s = states(&[("d", TaskStatus::Completed)]);
        let filter = TaskFilter {
            status: StatusFilter::Locked,
            player_level: 10,
            ..TaskFilter::default()
        };
        let out = filter_tasks(&tasks, &filter, &s);
        assert_eq!(ids(&out), ["c"]);
    }

    #[test]
    fn available_excludes_failed_completed_and_blocked() {
        let mut blocked = task("blocked", "Prapor", 1);
        blocked.prerequisites = vec!["done".into(), "open".into()];
        let tasks = vec![
            task("done", "Prapor", 1),
            task("failed", "Prapor", 1),
            task("open", "Prapor", 1),
            blocked,
        ];
        let s = states(&[
            ("done", TaskStatus::Completed),
            ("failed", TaskStatus::Failed),
        ]);
        let filter = TaskFilter {
            status: StatusFilter::Available,
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter, &s)), ["open"]);

        let filter = TaskFilter {
            status: StatusFilter::Completed,
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter, &s)), ["done"]);
    }

    #[test]
    fn trader_filter_is_case_insensitive() {
        let tasks = vec![task("a", "Prapor", 1), task("b", "Therapist", 1)];
        let filter = TaskFilter {
            trader: Some("THERAPIST".into()),
            ..TaskFilter::default()
        };
        let out = filter_tasks(&tasks, &filter, &CompletionStates::default());
        assert_eq!(ids(&out), ["b"]);
    }

    #[test]
    fn kappa_filter_hides_optional_tasks() {
        let mut optional = task("b", "Prapor", 1);
        optional.kappa_required = false;
        let tasks = vec![task("a", "Prapor", 1), optional];
        let filter = TaskFilter {
            show_non_kappa: false,
            ..TaskFilter::default()
        };
        let out = filter_tasks(&tasks, &filter, &CompletionStates::default());
        assert_eq!(ids(&out), ["a"]);
    }

    #[test]
    fn traders_follow_game_order() {
        let tasks = vec![
            task("1", "Zeta", 1),
            task("2", "Mechanic", 1),
            task("3", "prapor", 1),
            task("4", "Alpha", 1),
            task("5", "Mechanic", 1),
        ];
        assert_eq!(traders(&tasks), ["prapor", "Mechanic", "Alpha", "Zeta"]);
    }

    #[test]
    fn normalization_makes_groups_symmetric() {
        let mut a = task("a", "Prapor", 1);
        a.parallel_group = vec!["b".into()];
        let mut c = task("c", "Prapor", 1);
        c.parallel_group = vec!["b".into()];
        let mut tasks = vec![a, task("b", "Prapor", 1), c, task("solo", "Prapor", 1)];

        normalize_parallel_groups(&mut tasks);

        assert_eq!(tasks[0].parallel_group, ["b", "c"]);
        assert_eq!(tasks[1].parallel_group, ["a", "c"]);
        assert_eq!(tasks[2].parallel_group, ["a", "b"]);
        assert!(tasks[3].parallel_group.is_empty());
    }

    #[test]
    fn normalization_strips_in_group_prerequisites() {
        let mut a = task("a", "Prapor", 1);
        a.parallel_group = vec!["b".into()];
        a.prerequisites = vec!["root".into(), "b".into()];
        let mut b = task("b", "Prapor", 1);
        b.parallel_group = vec!["a".into()];
        b.prerequisites = vec!["a".into(), "other".into(), "root".into()];
        let mut tasks = vec![task("root", "Prapor", 1), a, b];

        normalize_parallel_groups(&mut tasks);

        assert_eq!(tasks[1].prerequisites, ["root", "other"]);
        assert_eq!(tasks[2].prerequisites, ["root", "other"]);
        assert!(tasks[0].prerequisites.is_empty());
    }

    #[test]
    fn normalization_drops_unknown_siblings() {
        let mut a = task("a", "Prapor", 1);
        a.parallel_group = vec!["ghost".into()];
        a.prerequisites = vec!["root".into()];
        a.requirements = vec![ItemRequirement {
            item_id: "x".into(),
            quantity: 1,
            found_in_raid: false,
        }];
        let mut tasks = vec![a];

        normalize_parallel_groups(&mut tasks);

        assert!(tasks[0].parallel_group.is_empty());
        assert_eq!(tasks[0].prerequisites, ["root"]);
    }

    #[test]
    fn normalization_drops_self_reference() {
        let mut a = task("a", "Prapor", 1);
        a.parallel_group = vec!["a".into()];
        let mut tasks = vec![a, task("b", "Prapor", 1)];

        normalize_parallel_groups(&mut tasks);

        assert!(tasks[0].parallel_group.is_empty());
        assert!(tasks[1].parallel_group.is_empty());
    }
}
