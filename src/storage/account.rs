//! Account store: signed-in users in a single `SQLite` file.

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rusqlite::{Connection, params};

use crate::model::{CompletionStates, Inventory, Setting, Settings, StationLevels, TaskStatus, UserItemRecord};

use super::{ChangeSet, Result, StorageError, Store, settings_from_pairs};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS user_items (
        user_id TEXT NOT NULL,
        item_id TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        found_in_raid INTEGER NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, item_id)
    );

    CREATE TABLE IF NOT EXISTS task_completions (
        user_id TEXT NOT NULL,
        task_id TEXT NOT NULL,
        status TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, task_id)
    );

    CREATE TABLE IF NOT EXISTS station_levels (
        user_id TEXT NOT NULL,
        station_id TEXT NOT NULL,
        level INTEGER NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, station_id)
    );

    CREATE TABLE IF NOT EXISTS user_settings (
        user_id TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, key)
    );
";

/// `SQLite`-backed store. A connection is opened per call.
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let store = Self { path };
        store.open_db()?.execute_batch(SCHEMA)?;
        Ok(store)
    }

    fn open_db(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }
}

impl Store for AccountStore {
    fn get_items(&self, user: &str) -> Result<Inventory> {
        let conn = self.open_db()?;
        let mut stmt =
            conn.prepare("SELECT item_id, quantity, found_in_raid FROM user_items WHERE user_id = ?1")?;
        let rows = stmt.query_map([user], |row| {
            Ok((
                row.get::<_, String>(0)?,
                UserItemRecord {
                    quantity: row.get(1)?,
                    found_in_raid: row.get(2)?,
                },
            ))
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn get_completion_states(&self, user: &str) -> Result<CompletionStates> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare("SELECT task_id, status FROM task_completions WHERE user_id = ?1")?;
        let rows = stmt.query_map([user], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut states = CompletionStates::default();
        for row in rows {
            let (task_id, status) = row?;
            let status = TaskStatus::parse(&status)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown task status: {status}")))?;
            states.set(task_id, status);
        }
        Ok(states)
    }

    fn get_station_levels(&self, user: &str) -> Result<StationLevels> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare("SELECT station_id, level FROM station_levels WHERE user_id = ?1")?;
        let rows = stmt.query_map([user], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn get_settings(&self, user: &str) -> Result<Settings> {
        let conn = self.open_db()?;
        let mut stmt = conn.prepare("SELECT key, value FROM user_settings WHERE user_id = ?1")?;
        let rows = stmt.query_map([user], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut pairs = Vec::new();
        for row in rows {
            let (key, value) = row?;
            pairs.push((key, serde_json::from_str(&value)?));
        }
        settings_from_pairs(pairs)
    }

    fn set_setting(&self, user: &str, setting: Setting) -> Result<()> {
        let conn = self.open_db()?;
        conn.execute(
            "INSERT INTO user_settings (user_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![user, setting.key(), setting.value().to_string(), Timestamp::now().to_string()],
        )?;
        Ok(())
    }

    fn commit(&self, user: &str, changes: &ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut conn = self.open_db()?;
        let tx = conn.transaction()?;
        let now = Timestamp::now().to_string();

        for change in &changes.statuses {
            tx.execute(
                "INSERT INTO task_completions (user_id, task_id, status, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, task_id) DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at",
                params![user, &change.task_id, change.status.as_str(), &now],
            )?;
        }
        for (item_id, record) in &changes.items {
            tx.execute(
                "INSERT INTO user_items (user_id, item_id, quantity, found_in_raid, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id, item_id) DO UPDATE SET
                    quantity = excluded.quantity,
                    found_in_raid = excluded.found_in_raid,
                    updated_at = excluded.updated_at",
                params![user, item_id, record.quantity, record.found_in_raid, &now],
            )?;
        }
        for (station_id, level) in &changes.station_levels {
            tx.execute(
                "INSERT INTO station_levels (user_id, station_id, level, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, station_id) DO UPDATE SET level = excluded.level, updated_at = excluded.updated_at",
                params![user, station_id, level, &now],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn reset_all(&self, user: &str) -> Result<()> {
        let mut conn = self.open_db()?;
        let tx = conn.transaction()?;
        for table in ["user_items", "task_completions", "station_levels", "user_settings"] {
            tx.execute(&format!("DELETE FROM {table} WHERE user_id = ?1"), [user])?;
        }
        tx.commit()?;
        Ok(())
    }
}
