//! `bankrec-recon` — Bank statement / sales ledger reconciliation engine.
//!
//! Pure engine crate: receives cleaned records, returns matched pairs,
//! residual sets, and amount discrepancies. No filesystem or CLI
//! dependencies; the ingest module parses CSV text handed to it.

pub mod config;
pub mod discrepancy;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod matcher;
pub mod model;
pub mod summary;

pub use config::ReconConfig;
pub use engine::reconcile;
pub use error::ReconError;
pub use model::{ReconResult, TxnRecord};
