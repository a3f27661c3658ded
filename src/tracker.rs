//! Tracker: the user's in-memory progress, kept in step with a store.
//!
//! Every mutation updates the local state first, then persists the change
//! as one [`ChangeSet`]. When the write fails the local state is put back
//! exactly as it was and the error is returned, so memory never drifts from
//! storage. The one exception is the edition floor correction, which keeps
//! its local change and only logs a failed write.

use crate::aggregate::{self, GroupedItemRequirement};
use crate::catalog::Catalog;
use crate::hideout::{self, LevelState};
use crate::model::{Setting, StatusChange, TaskStatus, UserItemRecord, UserState};
use crate::reconcile;
use crate::stats::{self, UserStatistics};
use crate::storage::{ChangeSet, Result, Store};
use crate::tasks;

pub struct Tracker<'a> {
    store: &'a dyn Store,
    user: String,
    catalog: &'a Catalog,
    state: UserState,
}

impl<'a> Tracker<'a> {
    /// Loads the user's state and applies the edition's station floors.
    pub fn load(store: &'a dyn Store, user: impl Into<String>, catalog: &'a Catalog) -> Result<Self> {
        let user = user.into();
        let state = store.load_state(&user)?;
        let mut tracker = Self {
            store,
            user,
            catalog,
            state,
        };
        tracker.apply_edition_floors();
        Ok(tracker)
    }

    pub fn state(&self) -> &UserState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Aggregated demand under the current Kappa setting.
    pub fn needed_items(&self) -> Vec<GroupedItemRequirement> {
        aggregate::aggregate(
            self.catalog,
            &self.state.completions,
            &self.state.station_levels,
            self.state.settings.show_non_kappa_tasks,
        )
    }

    pub fn statistics(&self) -> UserStatistics {
        stats::compute(self.catalog, &self.state)
    }

    // ── Tasks ──

    /// Completes a pending task, failing its parallel siblings and
    /// consuming its required items.
    ///
    /// Returns `false` without writing when the task is not pending or is
    /// missing from the catalog, since its siblings and items are unknown.
    pub fn complete_task(&mut self, task_id: &str) -> Result<bool> {
        let Some(task) = self.catalog.task(task_id) else {
            return Ok(false);
        };
        if !tasks::can_complete(task, &self.state.completions) {
            return Ok(false);
        }
        let mut next = self.state.clone();
        let statuses = tasks::completion_changes(task, &next.completions);
        next.completions.apply(&statuses);
        let items = reconcile::deduct_all(&mut next.inventory, &task.requirements);
        let changes = ChangeSet {
            statuses,
            items,
            ..ChangeSet::default()
        };
        tracing::debug!(user = %self.user, task = task_id, ?changes, "completing task");
        self.commit(next, &changes)?;
        Ok(true)
    }

    /// Reverts a completed task to pending, restoring failed siblings and
    /// the items it consumed.
    ///
    /// Returns `false` without writing when the task is not completed. A
    /// completed id missing from the catalog is only set back to pending.
    pub fn uncomplete_task(&mut self, task_id: &str) -> Result<bool> {
        if !self.state.completions.is_completed(task_id) {
            return Ok(false);
        }
        let mut next = self.state.clone();
        let changes = match self.catalog.task(task_id) {
            Some(task) => {
                let statuses = tasks::uncompletion_changes(task, &next.completions);
                next.completions.apply(&statuses);
                let items = reconcile::restore_all(&mut next.inventory, &task.requirements);
                ChangeSet {
                    statuses,
                    items,
                    ..ChangeSet::default()
                }
            }
            None => self.status_only(&mut next, task_id, TaskStatus::Pending),
        };
        tracing::debug!(user = %self.user, task = task_id, ?changes, "uncompleting task");
        self.commit(next, &changes)?;
        Ok(true)
    }

    fn status_only(&self, next: &mut UserState, task_id: &str, status: TaskStatus) -> ChangeSet {
        let statuses = vec![StatusChange {
            task_id: task_id.to_string(),
            status,
        }];
        next.completions.apply(&statuses);
        ChangeSet {
            statuses,
            ..ChangeSet::default()
        }
    }

    // ── Hideout ──

    /// Builds `target` at a station, consuming its required items.
    ///
    /// Returns `false` without writing unless `target` is the station's next
    /// level and is buildable.
    pub fn upgrade_station(&mut self, station_id: &str, target: u32) -> Result<bool> {
        let Some(station) = self.catalog.station(station_id) else {
            return Ok(false);
        };
        let Some(level) = station.level(target) else {
            return Ok(false);
        };
        if hideout::level_state(station, level, &self.state.station_levels) != LevelState::Buildable {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.station_levels.set(station_id, target);
        let requirements: Vec<_> = level.item_requirements().collect();
        let changes = ChangeSet {
            items: reconcile::deduct_all(&mut next.inventory, &requirements),
            station_levels: vec![(station_id.to_string(), target)],
            ..ChangeSet::default()
        };
        tracing::debug!(user = %self.user, station = station_id, level = target, ?changes, "upgrading station");
        self.commit(next, &changes)?;
        Ok(true)
    }

    /// Builds the next level of a station. See [`upgrade_station`](Self::upgrade_station).
    pub fn upgrade_next(&mut self, station_id: &str) -> Result<bool> {
        let target = self.state.station_levels.level(station_id).saturating_add(1);
        self.upgrade_station(station_id, target)
    }

    /// Sets a station to a lower level, restoring the items of every level
    /// removed.
    ///
    /// Levels at or below the edition floor were granted, not built, so
    /// nothing is restored for them. Returns `false` without writing unless
    /// `target` is below the current level. No buildability check applies.
    pub fn downgrade_station(&mut self, station_id: &str, target: u32) -> Result<bool> {
        let current = self.state.station_levels.level(station_id);
        if target >= current {
            return Ok(false);
        }

        let floor = hideout::starting_level(self.state.settings.game_edition, station_id);
        let paid_from = target.max(floor);
        let mut next = self.state.clone();
        next.station_levels.set(station_id, target);
        let requirements: Vec<_> = self
            .catalog
            .station(station_id)
            .into_iter()
            .flat_map(|s| s.levels.iter())
            .filter(|l| l.level > paid_from && l.level <= current)
            .flat_map(|l| l.item_requirements())
            .collect();
        let changes = ChangeSet {
            items: reconcile::restore_all(&mut next.inventory, &requirements),
            station_levels: vec![(station_id.to_string(), target)],
            ..ChangeSet::default()
        };
        tracing::debug!(user = %self.user, station = station_id, from = current, to = target, ?changes, "downgrading station");
        self.commit(next, &changes)?;
        Ok(true)
    }

    // ── Inventory ──

    /// Replaces an item's counts. `quantity` is raised to cover `found_in_raid`.
    pub fn set_item(&mut self, item_id: &str, found_in_raid: u32, quantity: u32) -> Result<UserItemRecord> {
        let record = UserItemRecord::new(found_in_raid, quantity);
        self.write_item(item_id, record)?;
        Ok(record)
    }

    /// Moves an item's found-in-raid count by `delta`, never below zero.
    ///
    /// The total is raised when the new found-in-raid count exceeds it.
    pub fn adjust_found_in_raid(&mut self, item_id: &str, delta: i64) -> Result<UserItemRecord> {
        let current = self.state.inventory.record(item_id);
        let fir = (i64::from(current.found_in_raid) + delta).clamp(0, i64::from(u32::MAX));
        let fir = u32::try_from(fir).unwrap_or(u32::MAX);
        let record = UserItemRecord::new(fir, current.quantity);
        self.write_item(item_id, record)?;
        Ok(record)
    }

    fn write_item(&mut self, item_id: &str, record: UserItemRecord) -> Result<()> {
        let mut next = self.state.clone();
        next.inventory.set(item_id, record);
        let changes = ChangeSet {
            items: vec![(item_id.to_string(), record)],
            ..ChangeSet::default()
        };
        tracing::debug!(user = %self.user, item = item_id, ?record, "writing item");
        self.commit(next, &changes)
    }

    // ── Settings ──

    /// Writes one setting. A new game edition re-applies station floors.
    pub fn set_setting(&mut self, setting: Setting) -> Result<()> {
        let previous = self.state.clone();
        self.state.settings.apply(setting);
        tracing::debug!(user = %self.user, key = setting.key(), value = %setting.value(), "writing setting");
        if let Err(e) = self.store.set_setting(&self.user, setting) {
            self.state = previous;
            return Err(e);
        }
        if matches!(setting, Setting::GameEdition(_)) {
            self.apply_edition_floors();
        }
        Ok(())
    }

    pub fn set_player_level(&mut self, level: u32) -> Result<u32> {
        self.set_setting(Setting::PlayerLevel(level))?;
        Ok(self.state.settings.player_level)
    }

    /// Raises stations to the starting levels of the current edition.
    ///
    /// Best effort: each station is written on its own, and a failed write
    /// is logged while the raised level is kept. Returns the stations that
    /// were raised.
    pub fn apply_edition_floors(&mut self) -> Vec<(String, u32)> {
        let raised = hideout::floor_adjustments(
            self.state.settings.game_edition,
            self.catalog.stations(),
            &self.state.station_levels,
        );
        for (station_id, level) in &raised {
            tracing::info!(
                user = %self.user,
                station = %station_id,
                level,
                edition = self.state.settings.game_edition.label(),
                "raising station to edition floor"
            );
            self.state.station_levels.set(station_id.clone(), *level);
            if let Err(e) = self.store.set_station_level(&self.user, station_id, *level) {
                tracing::warn!(user = %self.user, station = %station_id, error = %e, "failed to persist edition floor, keeping local level");
            }
        }
        raised
    }

    /// Clears everything stored for the user.
    pub fn reset(&mut self) -> Result<()> {
        tracing::debug!(user = %self.user, "resetting all progress");
        self.store.reset_all(&self.user)?;
        self.state = UserState::default();
        Ok(())
    }

    fn commit(&mut self, next: UserState, changes: &ChangeSet) -> Result<()> {
        let previous = std::mem::replace(&mut self.state, next);
        if let Err(e) = self.store.commit(&self.user, changes) {
            tracing::debug!(user = %self.user, error = %e, "write failed, rolling back");
            self.state = previous;
            return Err(e);
        }
        Ok(())
    }
}
