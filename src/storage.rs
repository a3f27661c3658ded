//! Persistence of per-user progress.
//!
//! Two backends implement [`Store`]:
//!
//! ```text
//! <root>/accounts.sqlite     # AccountStore: signed-in users, one row per record
//! <root>/guest/<user>.json   # GuestStore: one document per local user
//! ```
//!
//! Which one is used is decided once, by [`open`], from the signed-in flag.
//! Every multi-record write goes through [`Store::commit`], which both
//! backends apply atomically.

mod account;
mod guest;

use std::{io, path::Path};

use serde::{Deserialize, Serialize};

use crate::model::{
    CompletionStates, Inventory, Setting, Settings, StationLevels, StatusChange, UserItemRecord,
    UserState, clamp_player_level,
};

pub use account::AccountStore;
pub use guest::GuestStore;

/// User id for the local guest partition.
pub const GUEST_USER_ID: &str = "guest";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// A batch of writes that must land together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub statuses: Vec<StatusChange>,

    /// Full replacement records, keyed by item id.
    pub items: Vec<(String, UserItemRecord)>,

    pub station_levels: Vec<(String, u32)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.items.is_empty() && self.station_levels.is_empty()
    }
}

/// Storage for one user's progress.
///
/// Reads of records that were never written return zero values.
pub trait Store {
    fn get_items(&self, user: &str) -> Result<Inventory>;

    fn get_completion_states(&self, user: &str) -> Result<CompletionStates>;

    fn get_station_levels(&self, user: &str) -> Result<StationLevels>;

    fn get_settings(&self, user: &str) -> Result<Settings>;

    fn set_setting(&self, user: &str, setting: Setting) -> Result<()>;

    /// Applies every write in `changes` atomically.
    fn commit(&self, user: &str, changes: &ChangeSet) -> Result<()>;

    /// Clears every collection for `user`.
    fn reset_all(&self, user: &str) -> Result<()>;

    fn upsert_item(&self, user: &str, item_id: &str, record: UserItemRecord) -> Result<()> {
        self.commit(
            user,
            &ChangeSet {
                items: vec![(item_id.to_string(), record)],
                ..ChangeSet::default()
            },
        )
    }

    fn set_completion_batch(&self, user: &str, changes: &[StatusChange]) -> Result<()> {
        self.commit(
            user,
            &ChangeSet {
                statuses: changes.to_vec(),
                ..ChangeSet::default()
            },
        )
    }

    fn set_station_level(&self, user: &str, station_id: &str, level: u32) -> Result<()> {
        self.commit(
            user,
            &ChangeSet {
                station_levels: vec![(station_id.to_string(), level)],
                ..ChangeSet::default()
            },
        )
    }

    /// Loads everything known about `user`.
    fn load_state(&self, user: &str) -> Result<UserState> {
        Ok(UserState {
            completions: self.get_completion_states(user)?,
            station_levels: self.get_station_levels(user)?,
            inventory: self.get_items(user)?,
            settings: self.get_settings(user)?,
        })
    }
}

/// Opens the backend for the session: the account store when signed in,
/// the guest store otherwise.
pub fn open(root: &Path, signed_in: bool) -> Result<Box<dyn Store>> {
    if signed_in {
        Ok(Box::new(AccountStore::new(root.join("accounts.sqlite"))?))
    } else {
        Ok(Box::new(GuestStore::new(root.join("guest"))?))
    }
}

/// Builds settings from stored key/value pairs. Unknown keys are ignored.
fn settings_from_pairs(
    pairs: impl IntoIterator<Item = (String, serde_json::Value)>,
) -> Result<Settings> {
    let map: serde_json::Map<String, serde_json::Value> = pairs.into_iter().collect();
    let mut settings: Settings = serde_json::from_value(serde_json::Value::Object(map))?;
    settings.player_level = clamp_player_level(settings.player_level);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::model::{GameEdition, TaskStatus};

    fn change(task_id: &str, status: TaskStatus) -> StatusChange {
        StatusChange {
            task_id: task_id.into(),
            status,
        }
    }

    /// Runs the same contract checks against a backend.
    pub(super) fn exercise_contract(store: &dyn Store) {
        let user = "u1";

        let state = store.load_state(user).unwrap();
        assert_eq!(state, UserState::default());

        store
            .set_completion_batch(
                user,
                &[change("a", TaskStatus::Completed), change("b", TaskStatus::Failed)],
            )
            .unwrap();
        store.upsert_item(user, "bolts", UserItemRecord::new(2, 5)).unwrap();
        store.set_station_level(user, "workbench", 2).unwrap();
        store.set_setting(user, Setting::GameEdition(GameEdition::TheUnheard)).unwrap();
        store.set_setting(user, Setting::PlayerLevel(200)).unwrap();

        let state = store.load_state(user).unwrap();
        assert_eq!(state.completions.status("a"), TaskStatus::Completed);
        assert_eq!(state.completions.status("b"), TaskStatus::Failed);
        assert_eq!(state.completions.status("c"), TaskStatus::Pending);
        assert_eq!(state.inventory.record("bolts"), UserItemRecord::new(2, 5));
        assert_eq!(state.station_levels.level("workbench"), 2);
        assert_eq!(state.settings.game_edition, GameEdition::TheUnheard);
        assert_eq!(state.settings.player_level, 79);
        assert!(state.settings.show_non_kappa_tasks);

        // Overwrites replace.
        store
            .commit(
                user,
                &ChangeSet {
                    statuses: vec![change("a", TaskStatus::Pending)],
                    items: vec![("bolts".into(), UserItemRecord::new(0, 1))],
                    station_levels: vec![("workbench".into(), 1)],
                },
            )
            .unwrap();
        let state = store.load_state(user).unwrap();
        assert_eq!(state.completions.status("a"), TaskStatus::Pending);
        assert_eq!(state.inventory.record("bolts").quantity, 1);
        assert_eq!(state.station_levels.level("workbench"), 1);

        // Other users are untouched by a reset.
        store.set_station_level("u2", "stash", 3).unwrap();
        store.reset_all(user).unwrap();
        assert_eq!(store.load_state(user).unwrap(), UserState::default());
        assert_eq!(store.get_station_levels("u2").unwrap().level("stash"), 3);
    }

    #[test]
    fn open_selects_backend_by_flag() {
        let dir = TempDir::new().unwrap();
        let guest = open(dir.path(), false).unwrap();
        guest.set_station_level(GUEST_USER_ID, "stash", 1).unwrap();
        assert!(dir.path().join("guest").join("guest.json").exists());
        assert!(!dir.path().join("accounts.sqlite").exists());

        let account = open(dir.path(), true).unwrap();
        account.set_station_level("someone", "stash", 2).unwrap();
        assert!(dir.path().join("accounts.sqlite").exists());
        // Partitions are separate.
        assert_eq!(guest.get_station_levels("someone").unwrap().level("stash"), 0);
    }

    #[test]
    fn settings_ignore_unknown_keys() {
        let settings = settings_from_pairs([
            ("hardcoreMode".to_string(), serde_json::Value::Bool(true)),
            ("theme".to_string(), serde_json::Value::from("dark")),
        ])
        .unwrap();
        assert!(settings.hardcore_mode);
        assert_eq!(settings.player_level, 1);
    }

    #[test]
    fn bad_setting_value_is_an_error() {
        let err = settings_from_pairs([("playerLevel".to_string(), serde_json::Value::from("x"))])
            .unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
