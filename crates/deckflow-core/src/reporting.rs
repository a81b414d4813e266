use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use outline_reconcile::{DiffReport, MergeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Counts section of the reconciliation report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeSummaryArtifact {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub needs_reanalysis: usize,
    pub reordered: bool,
    pub title_changed: bool,
}

/// Persisted record of one reconciliation, for the caller's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconcileReportArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub session_id: String,
    pub strategy: String,
    pub success: bool,
    pub summary: ChangeSummaryArtifact,
    pub added_slide_titles: Vec<String>,
    pub removed_slide_ids: Vec<String>,
    pub reanalysis_slide_ids: Vec<String>,
    pub new_order: Option<Vec<String>>,
    pub new_title: Option<String>,
    pub updated_slide_positions: Vec<usize>,
    pub conflicts: Vec<String>,
}

impl ReconcileReportArtifact {
    pub fn new(
        session_id: &str,
        diff: &DiffReport,
        merge: &MergeResult,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let reanalysis_slide_ids: Vec<String> = diff
            .reanalysis_slide_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at,
            session_id: session_id.to_string(),
            strategy: merge.strategy_used.clone(),
            success: merge.success,
            summary: ChangeSummaryArtifact {
                added: diff.added_slides.len(),
                removed: diff.removed_slide_ids.len(),
                modified: diff.modified_slides.len(),
                needs_reanalysis: reanalysis_slide_ids.len(),
                reordered: diff.reordered,
                title_changed: diff.title_changed,
            },
            added_slide_titles: diff.added_slides.iter().map(|s| s.title.clone()).collect(),
            removed_slide_ids: diff.removed_slide_ids.clone(),
            reanalysis_slide_ids,
            new_order: diff.new_order.clone(),
            new_title: diff.new_title.clone(),
            updated_slide_positions: merge.updated_slide_positions.clone(),
            conflicts: merge.conflicts.iter().map(|c| c.reason.clone()).collect(),
        }
    }
}

/// Write the report in pretty JSON format.
pub fn write_reconcile_report_json(path: &Path, artifact: &ReconcileReportArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact).context("serialize reconcile report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Render a markdown summary for chat replies and logs.
pub fn render_reconcile_summary_md(artifact: &ReconcileReportArtifact) -> String {
    let mut out = String::new();
    out.push_str("# Outline Reconciliation\n\n");
    out.push_str(&format!(
        "- session: `{}`\n- strategy: {}\n- result: {}\n\n",
        artifact.session_id,
        artifact.strategy,
        if artifact.success { "merged" } else { "failed" }
    ));

    let s = &artifact.summary;
    out.push_str("## Changes\n");
    out.push_str(&format!(
        "- added: {}\n- removed: {}\n- modified: {}\n- needs reanalysis: {}\n- reordered: {}\n- title changed: {}\n",
        s.added, s.removed, s.modified, s.needs_reanalysis, s.reordered, s.title_changed
    ));

    if let Some(order) = &artifact.new_order {
        out.push_str("\n### New Order\n");
        for (index, key) in order.iter().enumerate() {
            out.push_str(&format!("{}. `{}`\n", index + 1, key));
        }
    }

    if !artifact.conflicts.is_empty() {
        out.push_str("\n### Conflicts\n");
        for conflict in &artifact.conflicts {
            out.push_str(&format!("- {}\n", conflict));
        }
    }
    out
}

/// Write the markdown summary.
pub fn write_reconcile_summary_md(path: &Path, artifact: &ReconcileReportArtifact) -> Result<()> {
    let md = render_reconcile_summary_md(artifact);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
