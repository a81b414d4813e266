//! Structured observability hooks for reconciliation lifecycle events.
//!
//! - `ReconcileSpan` RAII guard scoping log lines to one session
//! - emitters for start, diff, merge success and merge failure
//!
//! Events are emitted at `info!` (failures at `warn!`); filter with
//! `RUST_LOG` or `DECKFLOW_LOG_LEVEL`.

use outline_reconcile::{DiffReport, MergeResult};
use tracing::{info, warn};

/// RAII guard that enters a session-scoped tracing span.
///
/// ```ignore
/// let _span = ReconcileSpan::enter("session-42");
/// // every event below carries session_id = "session-42"
/// ```
pub struct ReconcileSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReconcileSpan {
    pub fn enter(session_id: &str) -> Self {
        let span = tracing::info_span!("deckflow.reconcile", session_id = %session_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_reconcile_started(session_id: &str, canonical_slides: usize, target_slides: usize) {
    info!(
        event = "reconcile.started",
        session_id = %session_id,
        canonical_slides = canonical_slides,
        target_slides = target_slides,
    );
}

pub fn emit_diff_computed(session_id: &str, diff: &DiffReport) {
    info!(
        event = "reconcile.diff_computed",
        session_id = %session_id,
        has_changes = diff.has_changes,
        change_count = diff.change_count(),
        added = diff.added_slides.len(),
        removed = diff.removed_slide_ids.len(),
        modified = diff.modified_slides.len(),
        reordered = diff.reordered,
        title_changed = diff.title_changed,
    );
}

pub fn emit_merge_finished(session_id: &str, result: &MergeResult) {
    info!(
        event = "reconcile.merge_finished",
        session_id = %session_id,
        strategy = %result.strategy_used,
        updated = result.updated_slide_positions.len(),
        conflicts = result.conflicts.len(),
    );
}

/// Merge failure (warning level), one line per conflict.
pub fn emit_merge_failed(session_id: &str, result: &MergeResult) {
    for conflict in &result.conflicts {
        warn!(
            event = "reconcile.merge_failed",
            session_id = %session_id,
            strategy = %result.strategy_used,
            reason = %conflict.reason,
        );
    }
}
