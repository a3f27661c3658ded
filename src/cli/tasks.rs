//! Task commands: list, complete, uncomplete.

use crate::tasks::{self, StatusFilter, TaskFilter};
use crate::tracker::Tracker;

use super::TaskFilterArg;
use super::format::format_status;

impl TaskFilterArg {
    fn to_domain(self) -> StatusFilter {
        match self {
            Self::All => StatusFilter::All,
            Self::Available => StatusFilter::Available,
            Self::Locked => StatusFilter::Locked,
            Self::Completed => StatusFilter::Completed,
        }
    }
}

pub(super) fn cmd_list(
    tracker: &Tracker<'_>,
    filter: TaskFilterArg,
    trader: Option<String>,
    above_level: bool,
) -> Result<(), String> {
    let state = tracker.state();
    let filter = TaskFilter {
        status: filter.to_domain(),
        trader,
        show_non_kappa: state.settings.show_non_kappa_tasks,
        // Locked tasks are exactly the ones above the player's level.
        show_above_level: above_level || filter == TaskFilterArg::Locked,
        player_level: state.settings.player_level,
    };
    let all = tracker.catalog().tasks();
    let matching = tasks::filter_tasks(all, &filter, &state.completions);

    if matching.is_empty() {
        println!("No tasks");
        return Ok(());
    }

    for trader in tasks::traders(all) {
        let group: Vec<_> = matching
            .iter()
            .filter(|t| t.trader.eq_ignore_ascii_case(&trader))
            .collect();
        if group.is_empty() {
            continue;
        }
        println!("{trader}");
        for task in group {
            let kappa = if task.kappa_required { " [kappa]" } else { "" };
            println!(
                "  {:<8} lvl {:>2}  {}  ({}){kappa}",
                format_status(state.completions.status(&task.id)),
                task.min_level,
                task.name,
                task.id,
            );
        }
    }
    Ok(())
}

pub(super) fn cmd_complete(tracker: &mut Tracker<'_>, id: &str) -> Result<(), String> {
    if tracker.catalog().task(id).is_none() {
        return Err(format!("unknown task '{id}'"));
    }
    let name = task_name(tracker, id);
    let changed = tracker
        .complete_task(id)
        .map_err(|e| format!("failed to complete task: {e}"))?;
    if changed {
        eprintln!("Completed {name}");
    } else {
        eprintln!(
            "{name} is {}, nothing to do",
            format_status(tracker.state().completions.status(id))
        );
    }
    Ok(())
}

pub(super) fn cmd_uncomplete(tracker: &mut Tracker<'_>, id: &str) -> Result<(), String> {
    let name = task_name(tracker, id);
    let changed = tracker
        .uncomplete_task(id)
        .map_err(|e| format!("failed to uncomplete task: {e}"))?;
    if changed {
        eprintln!("Reverted {name}");
    } else {
        eprintln!("{name} is not completed, nothing to do");
    }
    Ok(())
}

fn task_name(tracker: &Tracker<'_>, id: &str) -> String {
    tracker
        .catalog()
        .task(id)
        .map_or_else(|| id.to_string(), |t| t.name.clone())
}
