use chrono::Duration;
use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    pub bank: FeedConfig,
    pub sales: FeedConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Feed + column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub file: String,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_account_column")]
    pub account: String,
    #[serde(default = "default_amount_column")]
    pub amount: String,
    #[serde(default = "default_timestamp_column")]
    pub timestamp: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            account: default_account_column(),
            amount: default_amount_column(),
            timestamp: default_timestamp_column(),
        }
    }
}

fn default_account_column() -> String {
    "account_id".into()
}

fn default_amount_column() -> String {
    "amount".into()
}

fn default_timestamp_column() -> String {
    "posted_at".into()
}

// ---------------------------------------------------------------------------
// Tolerance + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default = "default_tolerance_hours")]
    pub hours: u32,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            hours: default_tolerance_hours(),
        }
    }
}

impl ToleranceConfig {
    /// The inclusive pairing window as a signed duration.
    pub fn window(&self) -> Duration {
        Duration::hours(i64::from(self.hours))
    }
}

fn default_tolerance_hours() -> u32 {
    24
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default)]
    pub json: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            json: None,
        }
    }
}

fn default_output_dir() -> String {
    "reconciled".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        validate_feed("bank", &self.bank)?;
        validate_feed("sales", &self.sales)?;
        Ok(())
    }
}

fn validate_feed(feed_name: &str, feed: &FeedConfig) -> Result<(), ReconError> {
    if feed.file.trim().is_empty() {
        return Err(ReconError::ConfigValidation(format!(
            "feed '{feed_name}': file must not be empty"
        )));
    }

    let cols = [
        ("account", &feed.columns.account),
        ("amount", &feed.columns.amount),
        ("timestamp", &feed.columns.timestamp),
    ];
    for (label, value) in cols {
        if value.trim().is_empty() {
            return Err(ReconError::ConfigValidation(format!(
                "feed '{feed_name}': column mapping '{label}' must not be empty"
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Daily close"

[bank]
file = "bank.csv"

[bank.columns]
account   = "idcuenta"
amount    = "importe"
timestamp = "fecha"

[sales]
file = "sales.csv"

[tolerance]
hours = 48

[output]
dir = "out"
json = "result.json"
"#;

    #[test]
    fn parse_valid() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Daily close");
        assert_eq!(config.bank.file, "bank.csv");
        assert_eq!(config.bank.columns.account, "idcuenta");
        assert_eq!(config.bank.columns.amount, "importe");
        assert_eq!(config.bank.columns.timestamp, "fecha");
        assert_eq!(config.tolerance.hours, 48);
        assert_eq!(config.output.dir, "out");
        assert_eq!(config.output.json.as_deref(), Some("result.json"));
    }

    #[test]
    fn defaults_applied() {
        let input = r#"
name = "Minimal"

[bank]
file = "bank.csv"

[sales]
file = "sales.csv"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.sales.columns.account, "account_id");
        assert_eq!(config.sales.columns.amount, "amount");
        assert_eq!(config.sales.columns.timestamp, "posted_at");
        assert_eq!(config.tolerance.hours, 24);
        assert_eq!(config.tolerance.window(), Duration::hours(24));
        assert_eq!(config.output.dir, "reconciled");
        assert!(config.output.json.is_none());
    }

    #[test]
    fn reject_empty_file() {
        let input = r#"
name = "Bad"

[bank]
file = ""

[sales]
file = "sales.csv"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'bank'"));
        assert!(err.to_string().contains("file must not be empty"));
    }

    #[test]
    fn reject_blank_column_mapping() {
        let input = r#"
name = "Bad"

[bank]
file = "bank.csv"

[sales]
file = "sales.csv"

[sales.columns]
amount = " "
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'sales'"));
        assert!(err.to_string().contains("'amount'"));
    }

    #[test]
    fn zero_hour_window_allowed() {
        let input = r#"
name = "Exact only"

[bank]
file = "bank.csv"

[sales]
file = "sales.csv"

[tolerance]
hours = 0
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.tolerance.window(), Duration::zero());
    }
}
