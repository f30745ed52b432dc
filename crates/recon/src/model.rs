use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which feed a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Bank,
    Sale,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bank => write!(f, "bank"),
            Self::Sale => write!(f, "sale"),
        }
    }
}

/// A single cleaned transaction from either feed.
///
/// `amount_cents` is the amount in minor units, rounded to two decimals
/// before the record is built. `raw_fields` keeps the original CSV cells
/// (header name to value) for export.
#[derive(Debug, Clone, Serialize)]
pub struct TxnRecord {
    pub source: Source,
    pub account_id: String,
    pub amount_cents: i64,
    pub posted_at: NaiveDateTime,
    pub raw_fields: HashMap<String, String>,
}

impl TxnRecord {
    pub fn match_key(&self) -> MatchKey {
        MatchKey {
            account_id: self.account_id.clone(),
            amount_cents: self.amount_cents,
        }
    }
}

// ---------------------------------------------------------------------------
// Match key
// ---------------------------------------------------------------------------

/// Candidate grouping key = (account_id, amount_cents). Timestamp is never
/// part of the key; it is what the matcher resolves within a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    pub account_id: String,
    pub amount_cents: i64,
}

// ---------------------------------------------------------------------------
// Pair matching
// ---------------------------------------------------------------------------

/// A bank deposit paired with the nearest-in-time sale sharing its key.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedPair {
    pub bank: TxnRecord,
    pub sale: TxnRecord,
    /// bank.posted_at - sale.posted_at, whole seconds, signed.
    pub offset_seconds: i64,
}

#[derive(Debug)]
pub struct MatchOutput {
    pub matched: Vec<MatchedPair>,
    pub unmatched_sales: Vec<TxnRecord>,
    pub unmatched_deposits: Vec<TxnRecord>,
}

// ---------------------------------------------------------------------------
// Discrepancies
// ---------------------------------------------------------------------------

/// Same account, nearest timestamps, different amounts.
#[derive(Debug, Clone, Serialize)]
pub struct AmountDiscrepancy {
    pub bank: TxnRecord,
    pub sale: TxnRecord,
    /// bank.amount_cents - sale.amount_cents.
    pub difference_cents: i64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub matched: Vec<MatchedPair>,
    pub unmatched_sales: Vec<TxnRecord>,
    pub unmatched_deposits: Vec<TxnRecord>,
    pub discrepancies: Vec<AmountDiscrepancy>,
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render minor units as a fixed two-decimal string, e.g. -1250 -> "-12.50".
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_cents_basic() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(150000), "1500.00");
        assert_eq!(format_cents(-1250), "-12.50");
        assert_eq!(format_cents(-7), "-0.07");
    }

    #[test]
    fn source_display() {
        assert_eq!(Source::Bank.to_string(), "bank");
        assert_eq!(Source::Sale.to_string(), "sale");
    }

    #[test]
    fn match_key_ignores_timestamp() {
        let a = TxnRecord {
            source: Source::Bank,
            account_id: "ACC001".into(),
            amount_cents: 150000,
            posted_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            raw_fields: HashMap::new(),
        };
        let mut b = a.clone();
        b.source = Source::Sale;
        b.posted_at = chrono::NaiveDate::from_ymd_opt(2026, 1, 16)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(a.match_key(), b.match_key());
    }
}
