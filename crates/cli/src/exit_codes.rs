//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract, scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                                 |
//! |------|---------------------------------------------------------|
//! | 0    | Success, every record reconciled                        |
//! | 1    | Run completed but unreconciled items remain             |
//! | 2    | CLI usage error (emitted by the argument parser)        |
//! | 3    | Invalid configuration (bad TOML, missing column)        |
//! | 4    | Runtime error (unreadable feed, unwritable output)      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - every bank record paired with a sale and no discrepancies.
pub const EXIT_SUCCESS: u8 = 0;

/// The run completed but unmatched records or amount discrepancies remain.
/// Like `diff(1)`, exit 1 means "the sides differ," not that the tool failed.
pub const EXIT_UNRECONCILED: u8 = 1;

/// Configuration rejected: unparseable TOML, blank column mapping, or a
/// mapped column missing from the feed header.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Runtime failure: feed file unreadable, output directory unwritable.
pub const EXIT_RUNTIME: u8 = 4;
