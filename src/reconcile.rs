//! Inventory reconciler: consume and give back stock as requirements are met.
//!
//! Stateless. Callers persist the records this module returns.
//!
//! Deduction consumes non-FIR stock first and only spills into FIR stock
//! once the non-FIR stock is gone. Restoration gives everything back as the
//! kind the requirement asked for, so a spilled deduction is not restored to
//! its original FIR/non-FIR split.

use crate::model::{Inventory, ItemRequirement, UserItemRecord};

/// Consume stock for one requirement.
pub fn deduct(record: UserItemRecord, requirement: &ItemRequirement) -> UserItemRecord {
    let wanted = requirement.quantity;

    if requirement.found_in_raid {
        return UserItemRecord {
            quantity: record.quantity.saturating_sub(wanted),
            found_in_raid: record.found_in_raid.saturating_sub(wanted),
        };
    }

    let non_fir = record.non_fir();
    if non_fir >= wanted {
        return UserItemRecord {
            quantity: record.quantity - wanted,
            found_in_raid: record.found_in_raid,
        };
    }

    UserItemRecord {
        quantity: record.quantity.saturating_sub(wanted),
        found_in_raid: record.found_in_raid.saturating_sub(wanted - non_fir),
    }
}

/// Give back stock for one requirement.
pub fn restore(record: UserItemRecord, requirement: &ItemRequirement) -> UserItemRecord {
    let found_in_raid = if requirement.found_in_raid {
        record.found_in_raid.saturating_add(requirement.quantity)
    } else {
        record.found_in_raid
    };
    UserItemRecord {
        quantity: record.quantity.saturating_add(requirement.quantity),
        found_in_raid,
    }
}

/// Deduct a batch of requirements in list order.
///
/// Each step sees the result of the previous one, so an item named by several
/// requirements is drawn down cumulatively. Returns the final record of every
/// touched item, in first-touched order.
pub fn deduct_all<'a>(
    inventory: &mut Inventory,
    requirements: impl IntoIterator<Item = &'a ItemRequirement>,
) -> Vec<(String, UserItemRecord)> {
    apply_all(inventory, requirements, deduct)
}

/// Restore a batch of requirements in list order. See [`deduct_all`].
pub fn restore_all<'a>(
    inventory: &mut Inventory,
    requirements: impl IntoIterator<Item = &'a ItemRequirement>,
) -> Vec<(String, UserItemRecord)> {
    apply_all(inventory, requirements, restore)
}

fn apply_all<'a>(
    inventory: &mut Inventory,
    requirements: impl IntoIterator<Item = &'a ItemRequirement>,
    step: fn(UserItemRecord, &ItemRequirement) -> UserItemRecord,
) -> Vec<(String, UserItemRecord)> {
    let mut touched: Vec<String> = Vec::new();
    for requirement in requirements {
        let next = step(inventory.record(&requirement.item_id), requirement);
        inventory.set(requirement.item_id.clone(), next);
        if !touched.contains(&requirement.item_id) {
            touched.push(requirement.item_id.clone());
        }
    }
    touched
        .into_iter()
        .map(|id| {
            let record = inventory.record(&id);
            (id, record)
        })
        .collect()
}
