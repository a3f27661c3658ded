//! CLI interface for Quartermaster.
//!
//! Each subcommand is non-interactive: arguments in, plain text out.
//! Commands that change progress go through the [`Tracker`], so a failed
//! write leaves nothing half-applied.
//!
//! The session is picked once per invocation: `--guest` forces the local
//! guest store, otherwise `--account`, `QM_ACCOUNT` or the configured
//! account selects the signed-in store.

mod format;
mod hideout;
mod items;
mod tasks;

use clap::{Parser, Subcommand, ValueEnum};

use crate::model::{GameEdition, Setting};
use crate::tracker::Tracker;

/// Quartermaster: track tasks, hideout upgrades and the items they need.
#[derive(Debug, Parser)]
#[command(name = "qm", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Account id for the signed-in store.
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Use the local guest store even when an account is configured.
    #[arg(long, global = true, conflicts_with = "account")]
    pub guest: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow:
  1. qm settings edition edge-of-darkness
  2. qm level 15
  3. qm tasks --filter available --trader prapor
  4. qm task complete debut
  5. qm items needed --search bolts
  6. qm hideout upgrade workbench";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tasks.
    Tasks {
        #[arg(long, value_enum, default_value_t = TaskFilterArg::All)]
        filter: TaskFilterArg,

        /// Only tasks from this trader (case-insensitive).
        #[arg(long)]
        trader: Option<String>,

        /// Include tasks above the player's level.
        #[arg(long)]
        above_level: bool,
    },

    /// Complete or uncomplete a task.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// List hideout levels, or upgrade and downgrade stations.
    Hideout {
        #[arg(long, value_enum, default_value_t = LevelFilterArg::Available)]
        filter: LevelFilterArg,

        #[command(subcommand)]
        command: Option<HideoutCommand>,
    },

    /// Inspect and edit item stock.
    Items {
        #[command(subcommand)]
        command: ItemsCommand,
    },

    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Set the player level (clamped to 1..=79).
    Level { level: u32 },

    /// Show progress statistics.
    Stats,

    /// Delete all stored progress for the session's user.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Complete a task. Fails its parallel siblings and consumes its items.
    Complete { id: String },

    /// Revert a completed task. Restores failed siblings and consumed items.
    Uncomplete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum HideoutCommand {
    /// Build the next level of a station, consuming its items.
    Upgrade { station: String },

    /// Drop a station to a lower level, restoring the items of removed levels.
    Downgrade { station: String, level: u32 },
}

#[derive(Debug, Subcommand)]
pub enum ItemsCommand {
    /// Aggregated demand across open tasks and unbuilt levels.
    Needed {
        /// Filter by item name or source (case-insensitive).
        #[arg(long)]
        search: Option<String>,
    },

    /// Set an item's counts.
    Set {
        item: String,

        /// Found-in-raid count.
        #[arg(long)]
        fir: u32,

        /// Total count. Raised to at least `--fir`.
        #[arg(long)]
        quantity: Option<u32>,
    },

    /// Change an item's found-in-raid count by a signed amount.
    AddFir {
        item: String,

        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings.
    Show,

    /// Set the game edition. Raises stations the edition starts upgraded.
    Edition {
        #[arg(value_enum)]
        edition: EditionArg,
    },

    /// Only show and count Kappa-required tasks.
    KappaOnly {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Toggle hardcore mode.
    Hardcore {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

/// CLI-facing task status filter, mapped to the domain `StatusFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskFilterArg {
    All,
    /// Pending with prerequisites met.
    Available,
    /// Not completed and above the player's level.
    Locked,
    Completed,
}

/// CLI-facing hideout level filter, mapped to the domain `LevelFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelFilterArg {
    All,
    /// Buildable now.
    Available,
    /// Blocked by an earlier level or another station.
    Locked,
}

/// CLI-facing game edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EditionArg {
    Standard,
    LeftBehind,
    PrepareForEscape,
    EdgeOfDarkness,
    TheUnheard,
}

impl EditionArg {
    fn to_domain(self) -> GameEdition {
        match self {
            Self::Standard => GameEdition::Standard,
            Self::LeftBehind => GameEdition::LeftBehind,
            Self::PrepareForEscape => GameEdition::PrepareForEscape,
            Self::EdgeOfDarkness => GameEdition::EdgeOfDarkness,
            Self::TheUnheard => GameEdition::TheUnheard,
        }
    }
}

/// Run a parsed command, returning an error message on failure.
pub fn run(command: Command, tracker: &mut Tracker<'_>) -> Result<(), String> {
    match command {
        Command::Tasks {
            filter,
            trader,
            above_level,
        } => tasks::cmd_list(tracker, filter, trader, above_level),
        Command::Task { command } => match command {
            TaskCommand::Complete { id } => tasks::cmd_complete(tracker, &id),
            TaskCommand::Uncomplete { id } => tasks::cmd_uncomplete(tracker, &id),
        },
        Command::Hideout { filter, command } => match command {
            None => hideout::cmd_list(tracker, filter),
            Some(HideoutCommand::Upgrade { station }) => hideout::cmd_upgrade(tracker, &station),
            Some(HideoutCommand::Downgrade { station, level }) => {
                hideout::cmd_downgrade(tracker, &station, level)
            }
        },
        Command::Items { command } => match command {
            ItemsCommand::Needed { search } => items::cmd_needed(tracker, search.as_deref()),
            ItemsCommand::Set {
                item,
                fir,
                quantity,
            } => items::cmd_set(tracker, &item, fir, quantity),
            ItemsCommand::AddFir { item, delta } => items::cmd_add_fir(tracker, &item, delta),
        },
        Command::Settings { command } => match command {
            SettingsCommand::Show => {
                print!("{}", format::format_settings(&tracker.state().settings));
                Ok(())
            }
            SettingsCommand::Edition { edition } => cmd_edition(tracker, edition.to_domain()),
            SettingsCommand::KappaOnly { enabled } => {
                cmd_setting(tracker, Setting::ShowNonKappaTasks(!enabled))
            }
            SettingsCommand::Hardcore { enabled } => cmd_setting(tracker, Setting::HardcoreMode(enabled)),
        },
        Command::Level { level } => {
            let level = tracker
                .set_player_level(level)
                .map_err(|e| format!("failed to set player level: {e}"))?;
            println!("Player level {level}");
            Ok(())
        }
        Command::Stats => {
            print!("{}", format::format_statistics(&tracker.statistics()));
            Ok(())
        }
        Command::Reset { yes } => {
            if !yes {
                return Err("reset deletes all progress; pass --yes to confirm".to_string());
            }
            tracker
                .reset()
                .map_err(|e| format!("failed to reset progress: {e}"))?;
            eprintln!("Progress reset for {}", tracker.user());
            Ok(())
        }
    }
}

fn cmd_setting(tracker: &mut Tracker<'_>, setting: Setting) -> Result<(), String> {
    tracker
        .set_setting(setting)
        .map_err(|e| format!("failed to save {}: {e}", setting.key()))?;
    print!("{}", format::format_settings(&tracker.state().settings));
    Ok(())
}

fn cmd_edition(tracker: &mut Tracker<'_>, edition: GameEdition) -> Result<(), String> {
    let before = tracker.state().station_levels.clone();
    cmd_setting(tracker, Setting::GameEdition(edition))?;
    for (station_id, level) in tracker.state().station_levels.iter() {
        if before.level(station_id) != level {
            let name = tracker.catalog().station(station_id).map_or(station_id, |s| s.name.as_str());
            eprintln!("{name} raised to level {level}");
        }
    }
    Ok(())
}
