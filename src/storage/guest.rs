//! Guest store: one JSON document per local user.
//!
//! Every write loads the document, changes it in memory, and replaces the
//! file through a rename, so readers see either the old or the new document.

use std::{fs, io, path::PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::model::{CompletionStates, Inventory, Setting, Settings, StationLevels};

use super::{ChangeSet, Result, Store, settings_from_pairs};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GuestDocument {
    items: Inventory,
    completions: CompletionStates,
    station_levels: StationLevels,
    settings: serde_json::Map<String, serde_json::Value>,
    updated_at: Option<Timestamp>,
}

/// File-backed store for users who are not signed in.
pub struct GuestStore {
    root: PathBuf,
}

impl GuestStore {
    /// Creates the store, creating `root` if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn document_path(&self, user: &str) -> PathBuf {
        self.root.join(format!("{user}.json"))
    }

    fn load(&self, user: &str) -> Result<GuestDocument> {
        match fs::read_to_string(self.document_path(user)) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(GuestDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &str, doc: &mut GuestDocument) -> Result<()> {
        doc.updated_at = Some(Timestamp::now());
        let json = serde_json::to_string_pretty(doc)?;
        let path = self.document_path(user);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn update(&self, user: &str, f: impl FnOnce(&mut GuestDocument)) -> Result<()> {
        let mut doc = self.load(user)?;
        f(&mut doc);
        self.save(user, &mut doc)
    }
}

impl Store for GuestStore {
    fn get_items(&self, user: &str) -> Result<Inventory> {
        Ok(self.load(user)?.items)
    }

    fn get_completion_states(&self, user: &str) -> Result<CompletionStates> {
        Ok(self.load(user)?.completions)
    }

    fn get_station_levels(&self, user: &str) -> Result<StationLevels> {
        Ok(self.load(user)?.station_levels)
    }

    fn get_settings(&self, user: &str) -> Result<Settings> {
        settings_from_pairs(self.load(user)?.settings)
    }

    fn set_setting(&self, user: &str, setting: Setting) -> Result<()> {
        self.update(user, |doc| {
            doc.settings.insert(setting.key().to_string(), setting.value());
        })
    }

    fn commit(&self, user: &str, changes: &ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.update(user, |doc| {
            doc.completions.apply(&changes.statuses);
            for (item_id, record) in &changes.items {
                doc.items.set(item_id.clone(), *record);
            }
            for (station_id, level) in &changes.station_levels {
                doc.station_levels.set(station_id.clone(), *level);
            }
        })
    }

    fn reset_all(&self, user: &str) -> Result<()> {
        match fs::remove_file(self.document_path(user)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
