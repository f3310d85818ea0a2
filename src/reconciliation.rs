// ⚖️ Reconciliation - rebuild missing current values
//
// Some filings leave current_value at 0 and only report the movement:
//   current = previous + increase - decrease
//
// A genuine zero (nothing before, nothing added) must stay zero.

use serde::{Deserialize, Serialize};

use crate::disclosure::RawLineItem;

/// What reconciliation did to one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationOutcome {
    /// Reported value kept as-is
    Reported,
    /// Value rebuilt from previous value and deltas
    Reconstructed { from: i64, to: i64 },
}

impl ReconciliationOutcome {
    pub fn was_reconstructed(&self) -> bool {
        matches!(self, ReconciliationOutcome::Reconstructed { .. })
    }
}

/// Whether the item's current value needs rebuilding
pub fn needs_reconstruction(item: &RawLineItem) -> bool {
    item.current_value == 0 && (item.previous_value != 0 || item.increase.unwrap_or(0) > 0)
}

/// previous + increase - decrease, missing deltas counting as zero.
/// Saturates at the i64 bounds.
pub fn reconstructed_value(item: &RawLineItem) -> i64 {
    item.previous_value
        .saturating_add(item.increase.unwrap_or(0))
        .saturating_sub(item.decrease.unwrap_or(0))
}

/// Fix up `current_value` in place
pub fn reconcile_current_value(item: &mut RawLineItem) -> ReconciliationOutcome {
    if !needs_reconstruction(item) {
        return ReconciliationOutcome::Reported;
    }

    let from = item.current_value;
    item.current_value = reconstructed_value(item);
    ReconciliationOutcome::Reconstructed {
        from,
        to: item.current_value,
    }
}

/// Copying variant for callers holding shared references
pub fn reconciled(item: &RawLineItem) -> RawLineItem {
    let mut copy = item.clone();
    reconcile_current_value(&mut copy);
    copy
}
