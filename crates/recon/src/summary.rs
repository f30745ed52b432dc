use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{ReconResult, TxnRecord};

/// Run-level statistics derived from a reconciliation result.
#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub bank_records: usize,
    pub sales_records: usize,
    pub matched: usize,
    /// matched pairs / sales records, as a percentage. 0 when no sales.
    pub match_rate_pct: f64,
    pub unmatched_sales: usize,
    pub unmatched_deposits: usize,
    pub discrepancies: usize,
    /// Sum of bank-minus-sale differences across all discrepancies.
    pub discrepancy_total_cents: i64,
    pub accounts: Vec<AccountSummary>,
}

/// Per-account breakdown over accounts present in the sales feed.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub account_id: String,
    pub sales_records: usize,
    pub matched: usize,
    pub match_rate_pct: f64,
}

/// Compute display statistics from a result plus the cleaned inputs it was
/// produced from. The sales input is needed because pair counting alone
/// cannot see sales that were covered by key membership without pairing.
pub fn compute_summary(
    result: &ReconResult,
    bank: &[TxnRecord],
    sales: &[TxnRecord],
) -> ReconSummary {
    let mut per_account: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for rec in sales {
        per_account.entry(rec.account_id.as_str()).or_default().0 += 1;
    }
    for pair in &result.matched {
        if let Some(entry) = per_account.get_mut(pair.sale.account_id.as_str()) {
            entry.1 += 1;
        }
    }

    let accounts: Vec<AccountSummary> = per_account
        .into_iter()
        .map(|(account_id, (sales_count, matched))| AccountSummary {
            account_id: account_id.to_string(),
            sales_records: sales_count,
            matched,
            match_rate_pct: rate_pct(matched, sales_count),
        })
        .collect();

    ReconSummary {
        bank_records: bank.len(),
        sales_records: sales.len(),
        matched: result.matched.len(),
        match_rate_pct: rate_pct(result.matched.len(), sales.len()),
        unmatched_sales: result.unmatched_sales.len(),
        unmatched_deposits: result.unmatched_deposits.len(),
        discrepancies: result.discrepancies.len(),
        discrepancy_total_cents: result.discrepancies.iter().map(|d| d.difference_cents).sum(),
        accounts,
    }
}

fn rate_pct(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64 * 100.0
    }
}
