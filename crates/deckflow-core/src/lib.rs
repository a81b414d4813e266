//! Deckflow Core Library
//!
//! Session-level outline reconciliation on top of `outline-reconcile`, plus
//! the settings, tracing and reporting shared by Deckflow binaries.

pub mod config;
pub mod error;
pub mod obs;
pub mod reporting;
pub mod session;
pub mod telemetry;

pub use config::{DeckflowSettings, LoggingSettings, MergeSettings};
pub use error::{DeckflowError, Result};
pub use reporting::{
    render_reconcile_summary_md, write_reconcile_report_json, write_reconcile_summary_md,
    ChangeSummaryArtifact, ReconcileReportArtifact,
};
pub use session::{ReanalysisReason, ReanalysisTarget, ReconcileOutcome, SessionReconciler};
pub use telemetry::{init_tracing, init_tracing_from};
