//! Requirement ledger: how far the user's stock goes toward a requirement.
//!
//! Pure functions. A missing stock record counts as zero.

use serde::Serialize;

use crate::model::{ItemRequirement, UserItemRecord};

/// Progress toward a single requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current: u32,
    pub needed: u32,

    /// `0..=100`.
    pub percentage: u8,

    pub class: ProgressClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressClass {
    /// `current >= needed`.
    Complete,
    /// Some stock, but not enough.
    Partial,
    /// Nothing in stock.
    None,
}

/// Stock that counts toward the requirement: FIR stock for FIR requirements,
/// total stock otherwise.
pub fn usable_count(requirement: &ItemRequirement, record: Option<&UserItemRecord>) -> u32 {
    let record = record.copied().unwrap_or_default();
    if requirement.found_in_raid {
        record.found_in_raid
    } else {
        record.quantity
    }
}

pub fn progress(requirement: &ItemRequirement, record: Option<&UserItemRecord>) -> Progress {
    let current = usable_count(requirement, record);
    let needed = requirement.quantity;
    Progress {
        current,
        needed,
        percentage: percentage(current, needed),
        class: classify(current, needed),
    }
}

/// `min(round(current / needed * 100), 100)`. A zero `needed` is already met.
pub fn percentage(current: u32, needed: u32) -> u8 {
    if needed == 0 {
        return 100;
    }
    let pct = (f64::from(current) * 100.0 / f64::from(needed)).round();
    // Clamped to 100 first, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = pct.min(100.0) as u8;
    pct
}

pub fn classify(current: u32, needed: u32) -> ProgressClass {
    if current >= needed {
        ProgressClass::Complete
    } else if current > 0 {
        ProgressClass::Partial
    } else {
        ProgressClass::None
    }
}
