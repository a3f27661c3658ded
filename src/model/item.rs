//! Item types: catalog entries and the user's stock.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An item from the catalog. Only the display fields matter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub short_name: String,
}

/// How many of an item the user holds, and how many of those are found-in-raid.
///
/// `found_in_raid <= quantity` always holds for records produced by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserItemRecord {
    pub quantity: u32,
    pub found_in_raid: u32,
}

impl UserItemRecord {
    /// Builds a record from hand-entered counts, raising `quantity` to cover
    /// the found-in-raid stock.
    pub fn new(found_in_raid: u32, quantity: u32) -> Self {
        Self {
            quantity: quantity.max(found_in_raid),
            found_in_raid,
        }
    }

    /// Stock that was not found in raid.
    pub fn non_fir(self) -> u32 {
        self.quantity.saturating_sub(self.found_in_raid)
    }
}

/// The user's stock, keyed by item id. Missing items count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<String, UserItemRecord>);

impl Inventory {
    pub fn record(&self, item_id: &str) -> UserItemRecord {
        self.0.get(item_id).copied().unwrap_or_default()
    }

    pub fn set(&mut self, item_id: impl Into<String>, record: UserItemRecord) {
        self.0.insert(item_id.into(), record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UserItemRecord)> {
        self.0.iter().map(|(id, record)| (id.as_str(), *record))
    }
}

impl FromIterator<(String, UserItemRecord)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (String, UserItemRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
