//! Game data catalog: an immutable snapshot of tasks, stations and items.
//!
//! The snapshot is passed explicitly to everything that reads it. Refreshing
//! is the caller's decision: [`RefreshPolicy`] says whether a snapshot is
//! still fresh, and [`refresh`] replaces it from a [`CatalogSource`]. A failed
//! fetch keeps the old (possibly empty) snapshot rather than erroring, since
//! an empty catalog is a valid state during the first load.

mod cache;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::model::{HideoutStation, Item, Task};
use crate::tasks;

pub use cache::CatalogCache;

/// Errors that can occur while loading catalog data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cached catalog fingerprint mismatch (expected {expected}, found {found})")]
    FingerprintMismatch { expected: String, found: String },
}

/// Raw catalog data as delivered by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogData {
    pub items: Vec<Item>,
    pub tasks: Vec<Task>,
    pub hideout_stations: Vec<HideoutStation>,
}

/// Where catalog data comes from.
pub trait CatalogSource {
    fn fetch(&self) -> Result<CatalogData, CatalogError>;
}

/// A JSON dump of the upstream game data.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileSource {
    fn fetch(&self) -> Result<CatalogData, CatalogError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// An immutable catalog snapshot with normalized parallel groups.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tasks: Vec<Task>,
    stations: Vec<HideoutStation>,
    items: BTreeMap<String, Item>,
    fetched_at: Option<Timestamp>,
}

impl Catalog {
    /// A catalog with nothing in it, never fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(data: CatalogData, fetched_at: Timestamp) -> Self {
        let CatalogData {
            items,
            mut tasks,
            hideout_stations,
        } = data;
        tasks::normalize_parallel_groups(&mut tasks);
        Self {
            tasks,
            stations: hideout_stations,
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
            fetched_at: Some(fetched_at),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn stations(&self) -> &[HideoutStation] {
        &self.stations
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn station(&self, id: &str) -> Option<&HideoutStation> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Display name of an item, falling back to its id.
    pub fn item_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.items.get(id).map_or(id, |i| i.name.as_str())
    }

    pub fn fetched_at(&self) -> Option<Timestamp> {
        self.fetched_at
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.stations.is_empty()
    }

    /// The snapshot as raw data, for caching.
    pub fn to_data(&self) -> CatalogData {
        CatalogData {
            items: self.items.values().cloned().collect(),
            tasks: self.tasks.clone(),
            hideout_stations: self.stations.clone(),
        }
    }
}

/// How long a snapshot stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub ttl: SignedDuration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            ttl: SignedDuration::from_mins(5),
        }
    }
}

impl RefreshPolicy {
    pub fn from_secs(secs: u64) -> Self {
        Self {
            ttl: SignedDuration::from_secs(i64::try_from(secs).unwrap_or(i64::MAX)),
        }
    }

    /// Fresh means fetched, non-empty, and younger than the TTL.
    pub fn is_fresh(&self, catalog: &Catalog, now: Timestamp) -> bool {
        !catalog.is_empty()
            && catalog
                .fetched_at()
                .is_some_and(|at| now.duration_since(at) < self.ttl)
    }
}

/// Replace a stale snapshot from `source`.
///
/// Returns `current` untouched when it is still fresh or when the fetch fails.
pub fn refresh(
    current: Catalog,
    source: &dyn CatalogSource,
    policy: &RefreshPolicy,
    now: Timestamp,
) -> Catalog {
    if policy.is_fresh(&current, now) {
        return current;
    }
    match source.fetch() {
        Ok(data) => {
            let catalog = Catalog::new(data, now);
            tracing::info!(
                tasks = catalog.tasks().len(),
                stations = catalog.stations().len(),
                "catalog refreshed"
            );
            catalog
        }
        Err(e) => {
            tracing::warn!(error = %e, empty = current.is_empty(), "catalog refresh failed, keeping snapshot");
            current
        }
    }
}
