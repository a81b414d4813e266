//! Diff computation between a canonical and a target outline.
//!
//! Turns the matcher's pairings into a [`DiffReport`]: added and removed
//! slides, per-field modifications of matched slides, whole-document
//! reordering and a document title change. Pure and total.

use tracing::debug;

use crate::config::MatchConfig;
use crate::matcher::match_slides;
use crate::model::{
    synthetic_slide_key, DiffReport, FieldChange, MatchKind, MatchPair, ModificationRecord,
    Outline, Slide, SlideField,
};

/// Compare the comparable fields of a matched slide pair.
pub fn field_changes(canonical: &Slide, target: &Slide) -> Vec<FieldChange> {
    SlideField::ALL
        .iter()
        .filter_map(|&field| {
            let old_value = canonical.field_value(field);
            let new_value = target.field_value(field);
            (old_value != new_value).then_some(FieldChange {
                field,
                old_value,
                new_value,
            })
        })
        .collect()
}

/// Diff two outlines with the default matcher parameters.
pub fn compute_diff(canonical: &Outline, target: &Outline) -> DiffReport {
    compute_diff_with(canonical, target, &MatchConfig::default())
}

/// Diff two outlines with explicit matcher parameters.
pub fn compute_diff_with(canonical: &Outline, target: &Outline, config: &MatchConfig) -> DiffReport {
    let matches = match_slides(&canonical.slides, &target.slides, config);

    let mut added_slides = Vec::new();
    let mut removed_slide_ids = Vec::new();
    let mut modified_slides = Vec::new();
    let mut matched_canonical_order = Vec::new();

    for pair in &matches {
        match (pair.kind, pair_sides(pair)) {
            (MatchKind::Added, (_, Some((target_slide, _)))) => {
                added_slides.push(target_slide.clone());
            }
            (MatchKind::Removed, (Some((canonical_slide, ci)), _)) => {
                removed_slide_ids.push(
                    canonical_slide
                        .identity()
                        .map(str::to_string)
                        .unwrap_or_else(|| synthetic_slide_key(ci)),
                );
            }
            (MatchKind::Matched, (Some((canonical_slide, ci)), Some((target_slide, ti)))) => {
                matched_canonical_order.push(ci);
                let changes = field_changes(canonical_slide, target_slide);
                if !changes.is_empty() {
                    let slide_id = target_slide
                        .identity()
                        .or_else(|| canonical_slide.identity())
                        .map(str::to_string)
                        .unwrap_or_else(|| synthetic_slide_key(ci));
                    modified_slides.push(ModificationRecord::new(slide_id, ti + 1, ci, changes));
                }
            }
            // A pair missing the side its kind requires carries nothing to diff.
            _ => {}
        }
    }

    let reordered = matched_canonical_order.windows(2).any(|w| w[0] > w[1]);
    let new_order = reordered.then(|| {
        matches
            .iter()
            .filter(|p| p.target_index.is_some())
            .map(MatchPair::order_key)
            .collect::<Vec<_>>()
    });

    let title_changed = target.title != canonical.title && !target.title.is_empty();
    let new_title = title_changed.then(|| target.title.clone());

    let has_changes = !added_slides.is_empty()
        || !removed_slide_ids.is_empty()
        || !modified_slides.is_empty()
        || reordered
        || title_changed;

    debug!(
        added = added_slides.len(),
        removed = removed_slide_ids.len(),
        modified = modified_slides.len(),
        reordered,
        title_changed,
        "computed outline diff"
    );

    DiffReport {
        has_changes,
        added_slides,
        removed_slide_ids,
        modified_slides,
        reordered,
        new_order,
        title_changed,
        new_title,
        matches,
    }
}

type Side<'a> = Option<(&'a Slide, usize)>;

fn pair_sides(pair: &MatchPair) -> (Side<'_>, Side<'_>) {
    (
        pair.canonical_slide.as_ref().zip(pair.canonical_index),
        pair.target_slide.as_ref().zip(pair.target_index),
    )
}
