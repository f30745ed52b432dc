//! Run report assembly: JSON payload shape and the stderr summary block.

use serde::Serialize;

use bankrec_recon::model::format_cents;
use bankrec_recon::summary::ReconSummary;
use bankrec_recon::ReconResult;

/// Identifies one reconciliation run in the JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub tolerance_hours: u32,
    pub engine_version: String,
    pub run_at: String,
}

/// Full payload written by `bankrec run`.
///
/// The result tables are flattened so consumers find `matched`,
/// `unmatched_sales`, `unmatched_deposits` and `discrepancies` at the top
/// level next to `meta` and `summary`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub summary: ReconSummary,
    #[serde(flatten)]
    pub result: ReconResult,
}

/// Render the human summary printed to stderr after a run.
pub fn render_summary(meta: &RunMeta, summary: &ReconSummary) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "recon '{}': {} bank / {} sales records, window {}h",
        meta.config_name, summary.bank_records, summary.sales_records, meta.tolerance_hours,
    );
    let _ = writeln!(
        out,
        "matched {} ({:.2}% of sales), {} sales without deposit, {} deposits without sale",
        summary.matched,
        summary.match_rate_pct,
        summary.unmatched_sales,
        summary.unmatched_deposits,
    );
    let _ = writeln!(
        out,
        "amount discrepancies: {}, net difference {}",
        summary.discrepancies,
        format_cents(summary.discrepancy_total_cents),
    );
    for account in &summary.accounts {
        let _ = writeln!(
            out,
            "  {}: {}/{} matched ({:.2}%)",
            account.account_id, account.matched, account.sales_records, account.match_rate_pct,
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankrec_recon::engine::reconcile;
    use bankrec_recon::model::{Source, TxnRecord};
    use bankrec_recon::summary::compute_summary;
    use chrono::{Duration, NaiveDateTime};
    use std::collections::HashMap;

    fn rec(source: Source, account: &str, cents: i64, ts: &str) -> TxnRecord {
        TxnRecord {
            source,
            account_id: account.into(),
            amount_cents: cents,
            posted_at: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            raw_fields: HashMap::new(),
        }
    }

    fn meta() -> RunMeta {
        RunMeta {
            config_name: "Daily close".into(),
            tolerance_hours: 24,
            engine_version: "0.4.0".into(),
            run_at: "2026-03-02T18:00:00+00:00".into(),
        }
    }

    #[test]
    fn summary_block_lines() {
        let bank = vec![
            rec(Source::Bank, "ACC001", 150000, "2026-03-02 09:15:00"),
            rec(Source::Bank, "ACC002", 84025, "2026-03-02 10:00:00"),
        ];
        let sales = vec![
            rec(Source::Sale, "ACC001", 150000, "2026-03-01 16:45:00"),
            rec(Source::Sale, "ACC002", 84000, "2026-03-02 09:30:00"),
        ];
        let result = reconcile(&bank, &sales, Duration::hours(24));
        let summary = compute_summary(&result, &bank, &sales);

        let rendered = render_summary(&meta(), &summary);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "recon 'Daily close': 2 bank / 2 sales records, window 24h");
        assert_eq!(
            lines[1],
            "matched 1 (50.00% of sales), 1 sales without deposit, 1 deposits without sale"
        );
        assert_eq!(lines[2], "amount discrepancies: 1, net difference 0.25");
        assert_eq!(lines[3], "  ACC001: 1/1 matched (100.00%)");
        assert_eq!(lines[4], "  ACC002: 0/1 matched (0.00%)");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn report_flattens_result_tables() {
        let bank = vec![rec(Source::Bank, "ACC001", 150000, "2026-03-02 09:15:00")];
        let sales = vec![rec(Source::Sale, "ACC001", 150000, "2026-03-01 16:45:00")];
        let result = reconcile(&bank, &sales, Duration::hours(24));
        let summary = compute_summary(&result, &bank, &sales);
        let report = RunReport { meta: meta(), summary, result };

        let value: serde_json::Value = serde_json::from_str(
            &serde_json::to_string(&report).unwrap(),
        )
        .unwrap();
        assert_eq!(value["meta"]["config_name"], "Daily close");
        assert_eq!(value["summary"]["matched"], 1);
        assert!(value["matched"].is_array());
        assert!(value["unmatched_sales"].is_array());
        assert!(value["discrepancies"].is_array());
        assert!(value.get("result").is_none());
    }
}
