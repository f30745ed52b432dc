use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::FeedConfig;
use crate::error::ReconError;
use crate::model::{Source, TxnRecord};

// ---------------------------------------------------------------------------
// Loaded feed + cleaning stats
// ---------------------------------------------------------------------------

/// One feed after load + clean.
#[derive(Debug)]
pub struct LoadedFeed {
    /// Header row in file order, for export.
    pub headers: Vec<String>,
    pub records: Vec<TxnRecord>,
    pub stats: CleanStats,
}

/// Per-category counts of rows dropped during cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub rows_read: usize,
    pub missing_fields: usize,
    pub duplicates: usize,
    pub bad_amounts: usize,
    pub bad_timestamps: usize,
}

impl CleanStats {
    pub fn dropped(&self) -> usize {
        self.missing_fields + self.duplicates + self.bad_amounts + self.bad_timestamps
    }
}

// ---------------------------------------------------------------------------
// Load + clean
// ---------------------------------------------------------------------------

/// Load one feed's CSV text into cleaned records.
///
/// Dirty rows are dropped and counted, never fatal: blank mapped fields,
/// exact duplicates of an earlier raw row, unparseable amounts, unparseable
/// timestamps. A mapped column missing from the header row is a hard error
/// since that is a config mistake, not dirty data.
pub fn load_feed(
    feed_name: &str,
    csv_data: &str,
    config: &FeedConfig,
    source: Source,
) -> Result<LoadedFeed, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col = &config.columns;

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ReconError::MissingColumn {
                feed: feed_name.into(),
                column: name.into(),
            }
        })
    };

    let account_idx = idx(&col.account)?;
    let amount_idx = idx(&col.amount)?;
    let timestamp_idx = idx(&col.timestamp)?;

    let mut stats = CleanStats::default();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| ReconError::Io(e.to_string()))?;
        stats.rows_read += 1;

        let account = row.get(account_idx).unwrap_or("").trim();
        let amount_str = row.get(amount_idx).unwrap_or("").trim();
        let timestamp_str = row.get(timestamp_idx).unwrap_or("").trim();

        if account.is_empty() || amount_str.is_empty() || timestamp_str.is_empty() {
            stats.missing_fields += 1;
            continue;
        }

        // Dedup on the full raw row, before any parsing.
        let raw: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        if !seen.insert(raw) {
            stats.duplicates += 1;
            continue;
        }

        let Some(amount_cents) = parse_amount_cents(amount_str) else {
            stats.bad_amounts += 1;
            continue;
        };

        let Some(posted_at) = parse_timestamp(timestamp_str) else {
            stats.bad_timestamps += 1;
            continue;
        };

        let mut raw_fields = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            if let Some(val) = row.get(i) {
                raw_fields.insert(h.clone(), val.to_string());
            }
        }

        records.push(TxnRecord {
            source,
            account_id: account.to_string(),
            amount_cents,
            posted_at,
            raw_fields,
        });
    }

    Ok(LoadedFeed {
        headers,
        records,
        stats,
    })
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Parse a financial amount into minor units, rounded to two decimals:
/// - Strip `$`, commas, whitespace
/// - Handle `(123.45)` → `-123.45`
/// - Returns None if non-numeric characters remain after stripping
pub fn parse_amount_cents(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Check for parenthesized negatives: (123.45) → -123.45
    let (is_negative, inner) = if trimmed.starts_with('(') && trimmed.ends_with(')') {
        (true, &trimmed[1..trimmed.len() - 1])
    } else {
        (false, trimmed)
    };

    // Strip allowed non-numeric characters: $, commas, whitespace
    let cleaned: String = inner
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    // After stripping, only digits, '.', '-', '+' should remain
    // Allow leading minus (but not if already negative from parens)
    for (i, c) in cleaned.chars().enumerate() {
        match c {
            '0'..='9' | '.' => {}
            '-' | '+' if i == 0 && !is_negative => {}
            _ => return None,
        }
    }

    let value: f64 = cleaned.parse().ok()?;
    let value = if is_negative { -value } else { value };
    if !value.is_finite() {
        return None;
    }
    Some((value * 100.0).round() as i64)
}

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp, falling back to date-only (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
