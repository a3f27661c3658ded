//! Item commands: aggregated demand and stock edits.

use crate::aggregate;
use crate::ledger;
use crate::tracker::Tracker;

use super::format::{format_group, format_record};

pub(super) fn cmd_needed(tracker: &Tracker<'_>, search: Option<&str>) -> Result<(), String> {
    let groups = tracker.needed_items();
    let shown = aggregate::search(&groups, search.unwrap_or_default());
    if shown.is_empty() {
        println!("No items needed");
        return Ok(());
    }

    let inventory = &tracker.state().inventory;
    for group in shown {
        let record = inventory.record(&group.item_id);
        let progress = ledger::progress(&group.requirement(), Some(&record));
        print!("{}", format_group(group, &progress));
    }
    Ok(())
}

pub(super) fn cmd_set(
    tracker: &mut Tracker<'_>,
    item_id: &str,
    fir: u32,
    quantity: Option<u32>,
) -> Result<(), String> {
    let record = tracker
        .set_item(item_id, fir, quantity.unwrap_or(fir))
        .map_err(|e| format!("failed to update item: {e}"))?;
    println!(
        "{}: {}",
        tracker.catalog().item_name(item_id),
        format_record(record)
    );
    Ok(())
}

pub(super) fn cmd_add_fir(tracker: &mut Tracker<'_>, item_id: &str, delta: i64) -> Result<(), String> {
    let record = tracker
        .adjust_found_in_raid(item_id, delta)
        .map_err(|e| format!("failed to update item: {e}"))?;
    println!(
        "{}: {}",
        tracker.catalog().item_name(item_id),
        format_record(record)
    );
    Ok(())
}
