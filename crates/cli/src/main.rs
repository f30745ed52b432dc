// bankrec CLI - bank statement vs sales ledger reconciliation

mod exit_codes;
mod export;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bankrec_recon::config::FeedConfig;
use bankrec_recon::ingest::{load_feed, CleanStats, LoadedFeed};
use bankrec_recon::model::Source;
use bankrec_recon::summary::compute_summary;
use bankrec_recon::{reconcile, ReconConfig, ReconError};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_UNRECONCILED};
use export::export_tables;
use report::{render_summary, RunMeta, RunReport};

#[derive(Parser)]
#[command(name = "bankrec")]
#[command(about = "Reconcile a bank statement feed against a sales ledger")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation from a TOML config file
    #[command(after_help = "\
Exit code 1 means the run completed but unmatched records or amount
discrepancies remain; 3 is a config error, 4 a runtime failure.

Examples:
  bankrec run daily.toml
  bankrec run daily.toml --json
  bankrec run daily.toml --output report.json
  bankrec run daily.toml --out-dir /tmp/close -q")]
    Run {
        /// Path to the recon TOML config file
        config: PathBuf,

        /// Print the full JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Directory for the CSV tables (default: output.dir from the config)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Suppress stderr notes (dropped-row counts, wrote lines)
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a recon config without running it
    #[command(after_help = "\
Examples:
  bankrec validate daily.toml")]
    Validate {
        /// Path to the recon TOML config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, json, output, out_dir, quiet } => {
            cmd_run(config, json, output, out_dir, quiet)
        }
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read {}: {}", config_path.display(), e)))?;

    let config = ReconConfig::from_toml(&config_str)
        .map_err(|e| CliError::invalid_config(e.to_string()))?;

    // Feed and output paths resolve relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let bank = load_feed_file(base_dir, "bank", &config.bank, Source::Bank)?;
    let sales = load_feed_file(base_dir, "sales", &config.sales, Source::Sale)?;

    if !quiet {
        report_drops("bank", &bank.stats);
        report_drops("sales", &sales.stats);
    }

    let result = reconcile(&bank.records, &sales.records, config.tolerance.window());
    let summary = compute_summary(&result, &bank.records, &sales.records);

    let export_dir = out_dir.unwrap_or_else(|| base_dir.join(&config.output.dir));
    let written = export_tables(&export_dir, &result, &bank.headers, &sales.headers)?;
    if !quiet {
        for path in &written {
            eprintln!("wrote {}", path.display());
        }
    }

    let meta = RunMeta {
        config_name: config.name.clone(),
        tolerance_hours: config.tolerance.hours,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
    };

    let unreconciled =
        summary.unmatched_sales + summary.unmatched_deposits + summary.discrepancies;
    let rendered = render_summary(&meta, &summary);

    let report = RunReport { meta, summary, result };
    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {}", e)))?;

    let json_path =
        output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = json_path {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {}", path.display(), e)))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json_output {
        println!("{json_str}");
    }

    eprintln!("{rendered}");

    if unreconciled > 0 {
        return Err(CliError {
            code: EXIT_UNRECONCILED,
            message: format!("{} unreconciled item(s)", unreconciled),
            hint: None,
        });
    }

    Ok(())
}

fn load_feed_file(
    base_dir: &Path,
    feed_name: &str,
    feed: &FeedConfig,
    source: Source,
) -> Result<LoadedFeed, CliError> {
    let csv_path = base_dir.join(&feed.file);
    let csv_data = std::fs::read_to_string(&csv_path)
        .map_err(|e| CliError::runtime(format!("cannot read {}: {}", csv_path.display(), e)))?;

    load_feed(feed_name, &csv_data, feed, source).map_err(|e| match e {
        ReconError::MissingColumn { .. } => {
            CliError::invalid_config(e.to_string()).with_hint(format!(
                "check the [{}.columns] mapping against {}",
                feed_name,
                csv_path.display(),
            ))
        }
        other => CliError::runtime(other.to_string()),
    })
}

fn report_drops(feed_name: &str, stats: &CleanStats) {
    if stats.dropped() == 0 {
        return;
    }
    eprintln!(
        "note: {}: dropped {} of {} rows ({} missing fields, {} duplicates, {} bad amounts, {} bad timestamps)",
        feed_name,
        stats.dropped(),
        stats.rows_read,
        stats.missing_fields,
        stats.duplicates,
        stats.bad_amounts,
        stats.bad_timestamps,
    );
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read {}: {}", config_path.display(), e)))?;

    match ReconConfig::from_toml(&config_str) {
        Ok(config) => {
            eprintln!(
                "valid: recon '{}', bank '{}' vs sales '{}', window {}h",
                config.name, config.bank.file, config.sales.file, config.tolerance.hours,
            );
            Ok(())
        }
        Err(e) => Err(CliError::invalid_config(e.to_string())),
    }
}
