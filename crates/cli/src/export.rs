//! CSV table export for reconciliation results.
//!
//! Four tables land in the output directory. Paired tables (matched,
//! discrepancies) put both sides next to each other with `_bank` / `_sale`
//! suffixes on the original header names; residual tables keep the feed's
//! own headers untouched. Cell values come from the records' raw CSV
//! fields, so whatever extra columns the feeds carried ride along.

use std::path::{Path, PathBuf};

use bankrec_recon::model::{format_cents, AmountDiscrepancy, MatchedPair, TxnRecord};
use bankrec_recon::ReconResult;

use crate::CliError;

pub const MATCHED_FILE: &str = "matched.csv";
pub const UNMATCHED_SALES_FILE: &str = "unmatched_sales.csv";
pub const UNMATCHED_DEPOSITS_FILE: &str = "unmatched_deposits.csv";
pub const DISCREPANCIES_FILE: &str = "discrepancies.csv";

/// Write all four result tables under `dir`, creating it if needed.
/// Returns the written paths in a fixed order. Empty tables still get a
/// header-only file so downstream scripts can rely on the files existing.
pub fn export_tables(
    dir: &Path,
    result: &ReconResult,
    bank_headers: &[String],
    sales_headers: &[String],
) -> Result<Vec<PathBuf>, CliError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::runtime(format!("cannot create {}: {}", dir.display(), e)))?;

    let matched_path = dir.join(MATCHED_FILE);
    write_matched(&matched_path, &result.matched, bank_headers, sales_headers)?;

    let sales_path = dir.join(UNMATCHED_SALES_FILE);
    write_records(&sales_path, &result.unmatched_sales, sales_headers)?;

    let deposits_path = dir.join(UNMATCHED_DEPOSITS_FILE);
    write_records(&deposits_path, &result.unmatched_deposits, bank_headers)?;

    let discrepancies_path = dir.join(DISCREPANCIES_FILE);
    write_discrepancies(
        &discrepancies_path,
        &result.discrepancies,
        bank_headers,
        sales_headers,
    )?;

    Ok(vec![matched_path, sales_path, deposits_path, discrepancies_path])
}

fn write_matched(
    path: &Path,
    pairs: &[MatchedPair],
    bank_headers: &[String],
    sales_headers: &[String],
) -> Result<(), CliError> {
    let mut wtr = writer(path)?;
    let mut header = suffixed(bank_headers, "_bank");
    header.extend(suffixed(sales_headers, "_sale"));
    wtr.write_record(&header).map_err(|e| write_err(path, e))?;

    for pair in pairs {
        let mut row = row_values(bank_headers, &pair.bank);
        row.extend(row_values(sales_headers, &pair.sale));
        wtr.write_record(&row).map_err(|e| write_err(path, e))?;
    }
    finish(path, wtr)
}

fn write_records(
    path: &Path,
    records: &[TxnRecord],
    headers: &[String],
) -> Result<(), CliError> {
    let mut wtr = writer(path)?;
    wtr.write_record(headers).map_err(|e| write_err(path, e))?;

    for rec in records {
        wtr.write_record(&row_values(headers, rec))
            .map_err(|e| write_err(path, e))?;
    }
    finish(path, wtr)
}

fn write_discrepancies(
    path: &Path,
    discrepancies: &[AmountDiscrepancy],
    bank_headers: &[String],
    sales_headers: &[String],
) -> Result<(), CliError> {
    let mut wtr = writer(path)?;
    let mut header = suffixed(bank_headers, "_bank");
    header.extend(suffixed(sales_headers, "_sale"));
    header.push("difference".to_string());
    wtr.write_record(&header).map_err(|e| write_err(path, e))?;

    for disc in discrepancies {
        let mut row = row_values(bank_headers, &disc.bank);
        row.extend(row_values(sales_headers, &disc.sale));
        row.push(format_cents(disc.difference_cents));
        wtr.write_record(&row).map_err(|e| write_err(path, e))?;
    }
    finish(path, wtr)
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, CliError> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| CliError::runtime(format!("cannot create {}: {}", path.display(), e)))
}

fn finish(path: &Path, mut wtr: csv::Writer<std::fs::File>) -> Result<(), CliError> {
    wtr.flush()
        .map_err(|e| CliError::runtime(format!("CSV flush error for {}: {}", path.display(), e)))
}

fn write_err(path: &Path, e: csv::Error) -> CliError {
    CliError::runtime(format!("CSV write error for {}: {}", path.display(), e))
}

fn suffixed(headers: &[String], suffix: &str) -> Vec<String> {
    headers.iter().map(|h| format!("{h}{suffix}")).collect()
}

/// Cells in header order. A header the record never had becomes an empty
/// cell, which keeps ragged feeds exportable.
fn row_values(headers: &[String], rec: &TxnRecord) -> Vec<String> {
    headers
        .iter()
        .map(|h| rec.raw_fields.get(h).cloned().unwrap_or_default())
        .collect()
}
