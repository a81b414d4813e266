//! Session-scoped reconciliation.
//!
//! [`SessionReconciler`] runs diff then merge for a named session. Calls for
//! the same session are serialized through a per-session lock; calls for
//! different sessions proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use outline_reconcile::{
    compute_diff_with, merge, synthetic_slide_key, DiffReport, MatchConfig, MatchKind,
    MergeResult, MergeStrategy, Outline,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::DeckflowSettings;
use crate::error::Result;
use crate::obs::{
    emit_diff_computed, emit_merge_failed, emit_merge_finished, emit_reconcile_started,
    ReconcileSpan,
};

/// Why a slide should be handed back to layout and content assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReanalysisReason {
    Modified,
    Added,
}

/// A slide the caller should re-derive downstream decisions for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReanalysisTarget {
    pub slide_id: String,
    /// 1-based position in the target outline.
    pub position: usize,
    pub reason: ReanalysisReason,
}

/// Result of one session reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub session_id: String,
    pub diff: DiffReport,
    pub merge: MergeResult,
}

impl ReconcileOutcome {
    /// Modified slides whose title or topics changed, then added slides, in
    /// target order within each group.
    pub fn reanalysis_targets(&self) -> Vec<ReanalysisTarget> {
        let mut targets: Vec<ReanalysisTarget> = self
            .diff
            .modified_slides
            .iter()
            .filter(|m| m.needs_reanalysis)
            .map(|m| ReanalysisTarget {
                slide_id: m.slide_id.clone(),
                position: m.position_in_target,
                reason: ReanalysisReason::Modified,
            })
            .collect();

        for pair in self.diff.matches.iter().filter(|p| p.kind == MatchKind::Added) {
            let Some(target_index) = pair.target_index else {
                continue;
            };
            let slide_id = pair
                .target_slide
                .as_ref()
                .and_then(|s| s.identity())
                .map(str::to_string)
                .unwrap_or_else(|| synthetic_slide_key(target_index));
            targets.push(ReanalysisTarget {
                slide_id,
                position: target_index + 1,
                reason: ReanalysisReason::Added,
            });
        }
        targets
    }

    pub fn succeeded(&self) -> bool {
        self.merge.success
    }
}

/// Serializes reconciliations per session.
///
/// Each session id gets a lock entry on its first reconciliation and keeps
/// it until [`forget`](Self::forget) is called. Callers must `forget` a
/// session when it ends, otherwise the registry grows with every session id
/// ever seen.
pub struct SessionReconciler {
    matching: MatchConfig,
    strategy: MergeStrategy,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionReconciler {
    pub fn new(matching: MatchConfig, strategy: MergeStrategy) -> Self {
        Self {
            matching,
            strategy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Build from validated settings.
    pub fn from_settings(settings: &DeckflowSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::new(settings.matching.clone(), settings.merge.strategy))
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    pub fn matching(&self) -> &MatchConfig {
        &self.matching
    }

    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Diff `target` against `canonical` and merge with the configured
    /// strategy. Holds the session's lock for the whole pass.
    pub async fn reconcile(
        &self,
        session_id: &str,
        canonical: &Outline,
        target: &Outline,
    ) -> ReconcileOutcome {
        self.reconcile_with(session_id, canonical, target, self.strategy)
            .await
    }

    /// Like [`reconcile`](Self::reconcile) with an explicit strategy.
    pub async fn reconcile_with(
        &self,
        session_id: &str,
        canonical: &Outline,
        target: &Outline,
        strategy: MergeStrategy,
    ) -> ReconcileOutcome {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;
        let _span = ReconcileSpan::enter(session_id);

        emit_reconcile_started(session_id, canonical.len(), target.len());
        let diff = compute_diff_with(canonical, target, &self.matching);
        emit_diff_computed(session_id, &diff);

        let result = merge(canonical, &diff, strategy);
        if result.success {
            emit_merge_finished(session_id, &result);
        } else {
            emit_merge_failed(session_id, &result);
        }

        ReconcileOutcome {
            session_id: session_id.to_string(),
            diff,
            merge: result,
        }
    }

    /// Drop the lock entry for a finished session. Returns whether one existed.
    ///
    /// A reconciliation already holding the old lock runs to completion; a
    /// later call for the same id starts a fresh entry.
    pub async fn forget(&self, session_id: &str) -> bool {
        let removed = self.locks.lock().await.remove(session_id).is_some();
        debug!(session_id = %session_id, removed, "session lock released");
        removed
    }

    /// Sessions that currently hold a lock entry, sorted.
    pub async fn active_sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.locks.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for SessionReconciler {
    fn default() -> Self {
        Self::new(MatchConfig::default(), MergeStrategy::default())
    }
}
