//! Output formatting for CLI display.

use std::fmt::Write;

use crate::aggregate::GroupedItemRequirement;
use crate::hideout::LevelState;
use crate::ledger::{Progress, ProgressClass};
use crate::model::{Settings, SourceKind, TaskStatus, UserItemRecord};
use crate::stats::UserStatistics;

pub(super) fn format_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Completed => "done",
        TaskStatus::Failed => "failed",
    }
}

pub(super) fn format_level_state(state: LevelState) -> &'static str {
    match state {
        LevelState::Complete => "built",
        LevelState::Buildable => "buildable",
        LevelState::Locked => "locked",
    }
}

/// `3/5 (60%)`, with a marker for complete requirements.
pub(super) fn format_progress(progress: &Progress) -> String {
    let mark = match progress.class {
        ProgressClass::Complete => "✓",
        ProgressClass::Partial => "~",
        ProgressClass::None => " ",
    };
    format!(
        "{mark} {}/{} ({}%)",
        progress.current, progress.needed, progress.percentage
    )
}

pub(super) fn format_record(record: UserItemRecord) -> String {
    format!("{} total, {} found in raid", record.quantity, record.found_in_raid)
}

/// One demand line plus an indented line per source.
pub(super) fn format_group(group: &GroupedItemRequirement, progress: &Progress) -> String {
    let fir = if group.requirement().found_in_raid { " [FIR]" } else { "" };
    let mut out = format!("{}{fir}  {}\n", group.item_name, format_progress(progress));
    for contribution in &group.sources {
        let kind = match contribution.source.kind {
            SourceKind::Task => "task",
            SourceKind::Hideout => "hideout",
        };
        let trader = contribution
            .source
            .trader
            .as_deref()
            .map(|t| format!(" ({t})"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "    {}× {kind}: {}{trader}",
            contribution.quantity, contribution.source.label
        );
    }
    out
}

pub(super) fn format_settings(settings: &Settings) -> String {
    format!(
        "edition:        {}\n\
         player level:   {}\n\
         kappa only:     {}\n\
         hardcore mode:  {}\n",
        settings.game_edition.label(),
        settings.player_level,
        !settings.show_non_kappa_tasks,
        settings.hardcore_mode,
    )
}

pub(super) fn format_statistics(stats: &UserStatistics) -> String {
    format!(
        "items:          {} ({} found in raid)\n\
         tasks:          {}/{} completed\n\
         hideout level:  {:.1} average, {} max\n",
        stats.total_items,
        stats.total_fir_items,
        stats.completed_tasks,
        stats.total_tasks,
        stats.average_hideout_level,
        stats.max_hideout_level,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::aggregate::Contribution;
    use crate::ledger;
    use crate::model::{GameEdition, ItemRequirement, RequirementSource};

    #[test]
    fn format_progress_classes() {
        let req = ItemRequirement {
            item_id: "bolts".into(),
            quantity: 4,
            found_in_raid: false,
        };
        let cases = [
            (0, "  0/4 (0%)"),
            (1, "~ 1/4 (25%)"),
            (6, "✓ 6/4 (100%)"),
        ];
        for (have, expected) in cases {
            let record = UserItemRecord::new(0, have);
            assert_eq!(format_progress(&ledger::progress(&req, Some(&record))), expected);
        }
    }

    #[test]
    fn format_group_lists_sources() {
        let group = GroupedItemRequirement {
            item_id: "bolts".into(),
            item_name: "Bolts".into(),
            total_quantity: 5,
            sources: vec![
                Contribution {
                    source: RequirementSource {
                        kind: SourceKind::Task,
                        id: "t1".into(),
                        label: "Debut".into(),
                        trader: Some("Prapor".into()),
                    },
                    quantity: 3,
                    found_in_raid: false,
                },
                Contribution {
                    source: RequirementSource {
                        kind: SourceKind::Hideout,
                        id: "workbench_1".into(),
                        label: "Workbench Level 1".into(),
                        trader: None,
                    },
                    quantity: 2,
                    found_in_raid: true,
                },
            ],
        };
        let progress = ledger::progress(&group.requirement(), None);
        assert_eq!(
            format_group(&group, &progress),
            "Bolts    0/5 (0%)\n    3× task: Debut (Prapor)\n    2× hideout: Workbench Level 1\n"
        );
    }

    #[test]
    fn format_settings_block() {
        let settings = Settings {
            show_non_kappa_tasks: false,
            game_edition: GameEdition::EdgeOfDarkness,
            hardcore_mode: false,
            player_level: 42,
        };
        let out = format_settings(&settings);
        assert!(out.contains("Edge of Darkness Edition"));
        assert!(out.contains("player level:   42"));
        assert!(out.contains("kappa only:     true"));
    }

    #[test]
    fn format_statistics_rounds_average() {
        let stats = UserStatistics {
            total_items: 12,
            total_fir_items: 4,
            completed_tasks: 3,
            total_tasks: 10,
            average_hideout_level: 1.7,
            max_hideout_level: 4,
        };
        let out = format_statistics(&stats);
        assert!(out.contains("tasks:          3/10 completed"));
        assert!(out.contains("1.7 average, 4 max"));
    }

    #[test]
    fn format_labels() {
        assert_eq!(format_status(TaskStatus::Failed), "failed");
        assert_eq!(format_level_state(LevelState::Buildable), "buildable");
        assert_eq!(format_record(UserItemRecord::new(1, 3)), "3 total, 1 found in raid");
    }
}
