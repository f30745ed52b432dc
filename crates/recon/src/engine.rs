use chrono::Duration;

use crate::discrepancy::find_amount_discrepancies;
use crate::matcher::match_by_key;
use crate::model::{ReconResult, TxnRecord};

/// Run the full reconciliation: key matching, then discrepancy detection.
///
/// Each pass builds its own grouping over the borrowed inputs, so neither
/// can see the other's sort order or consumption state. Pure and
/// single-shot; callers supply cleaned records and the tolerance window.
pub fn reconcile(bank: &[TxnRecord], sales: &[TxnRecord], tolerance: Duration) -> ReconResult {
    let output = match_by_key(bank, sales, tolerance);
    let discrepancies = find_amount_discrepancies(bank, sales, tolerance);

    ReconResult {
        matched: output.matched,
        unmatched_sales: output.unmatched_sales,
        unmatched_deposits: output.unmatched_deposits,
        discrepancies,
    }
}
