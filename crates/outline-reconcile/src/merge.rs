//! Merge engine and conflict strategies.
//!
//! Applies a [`DiffReport`] to the canonical outline it was computed from.
//! Structural edits (add, remove, reorder, title) are always applied; field
//! edits on matched slides go through a [`FieldResolver`], which decides per
//! field whether the target value, the canonical value, or the caller wins.
//!
//! The merge is all-or-nothing. Any inconsistency between the diff and the
//! canonical outline yields `success == false` with a structural conflict,
//! and the caller's outline is never touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ReconcileError, ReconcileResult};
use crate::model::{
    synthetic_slide_key, DiffReport, FieldChange, MatchKind, MergeConflict, MergeResult, Outline,
    Slide, SlideField,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// What to do with one changed field of a matched slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Apply the target value.
    TakeTarget,
    /// Keep the canonical value.
    KeepCanonical,
    /// Keep the canonical value and report the field as a conflict.
    Defer,
}

/// Capability to resolve a field conflict between the two authorities.
pub trait FieldResolver {
    /// Label recorded in [`MergeResult::strategy_used`].
    fn name(&self) -> &str;

    fn resolve(&self, slide_id: &str, change: &FieldChange) -> Resolution;
}

/// Built-in conflict resolution strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Every field edit from the target is applied.
    #[default]
    TargetWins,
    /// Field edits are ignored; only structure follows the target.
    CanonicalWins,
    /// Content fields follow the target, presentation fields stay canonical.
    MergeFields,
    /// Field edits are reported back instead of applied.
    AskCaller,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 4] = [
        MergeStrategy::TargetWins,
        MergeStrategy::CanonicalWins,
        MergeStrategy::MergeFields,
        MergeStrategy::AskCaller,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::TargetWins => "target-wins",
            MergeStrategy::CanonicalWins => "canonical-wins",
            MergeStrategy::MergeFields => "merge-fields",
            MergeStrategy::AskCaller => "ask-caller",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ReconcileError::UnknownStrategy(s.to_string()))
    }
}

impl FieldResolver for MergeStrategy {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn resolve(&self, _slide_id: &str, change: &FieldChange) -> Resolution {
        match self {
            MergeStrategy::TargetWins => Resolution::TakeTarget,
            MergeStrategy::CanonicalWins => Resolution::KeepCanonical,
            MergeStrategy::MergeFields => match change.field {
                SlideField::Title | SlideField::Topics | SlideField::Notes => {
                    Resolution::TakeTarget
                }
                SlideField::Layout | SlideField::VariantId => Resolution::KeepCanonical,
            },
            MergeStrategy::AskCaller => Resolution::Defer,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Merge `diff` into `canonical` under a built-in strategy.
pub fn merge(canonical: &Outline, diff: &DiffReport, strategy: MergeStrategy) -> MergeResult {
    merge_with(canonical, diff, &strategy)
}

/// Merge `diff` into `canonical` under any resolver.
pub fn merge_with<R>(canonical: &Outline, diff: &DiffReport, resolver: &R) -> MergeResult
where
    R: FieldResolver + ?Sized,
{
    let strategy_used = resolver.name().to_string();

    if !diff.has_changes {
        return MergeResult {
            success: true,
            merged_outline: Some(canonical.clone()),
            updated_slide_positions: Vec::new(),
            conflicts: Vec::new(),
            strategy_used,
        };
    }

    match apply_diff(canonical, diff, resolver) {
        Ok(merged) => {
            debug!(
                strategy = %strategy_used,
                slides = merged.outline.slides.len(),
                updated = merged.updated_positions.len(),
                deferred = merged.deferred.len(),
                "merged outline"
            );
            MergeResult {
                success: true,
                merged_outline: Some(merged.outline),
                updated_slide_positions: merged.updated_positions,
                conflicts: merged.deferred,
                strategy_used,
            }
        }
        Err(err) => {
            warn!(strategy = %strategy_used, error = %err, "outline merge failed");
            MergeResult {
                success: false,
                merged_outline: None,
                updated_slide_positions: Vec::new(),
                conflicts: vec![MergeConflict::structural(err.to_string())],
                strategy_used,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Merge steps
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct WorkingSlide {
    key: String,
    slide: Slide,
    target_index: Option<usize>,
    removed: bool,
    added: bool,
    updated: bool,
}

struct MergedOutline {
    outline: Outline,
    updated_positions: Vec<usize>,
    deferred: Vec<MergeConflict>,
}

fn apply_diff<R>(canonical: &Outline, diff: &DiffReport, resolver: &R) -> ReconcileResult<MergedOutline>
where
    R: FieldResolver + ?Sized,
{
    let mut working = key_canonical_slides(canonical, diff)?;
    let mut deferred = Vec::new();

    for record in &diff.modified_slides {
        let len = working.len();
        let entry = working.get_mut(record.canonical_index).ok_or_else(|| {
            ReconcileError::ModificationOutOfRange {
                slide_id: record.slide_id.clone(),
                index: record.canonical_index,
                len,
            }
        })?;
        let same_slide = entry.key == record.slide_id
            || entry.slide.identity() == Some(record.slide_id.as_str())
            || record.slide_id == synthetic_slide_key(record.canonical_index);
        if !same_slide {
            return Err(ReconcileError::ModificationMismatch {
                slide_id: record.slide_id.clone(),
                index: record.canonical_index,
                found: entry.key.clone(),
            });
        }

        for change in &record.changes {
            match resolver.resolve(&record.slide_id, change) {
                Resolution::TakeTarget => {
                    entry.slide.set_field(change.field, &change.new_value)?;
                    entry.updated = true;
                }
                Resolution::KeepCanonical => {}
                Resolution::Defer => deferred.push(MergeConflict {
                    slide_id: Some(record.slide_id.clone()),
                    field: Some(change.field),
                    canonical_value: change.old_value.clone(),
                    target_value: change.new_value.clone(),
                    reason: format!(
                        "{} was edited on the edit surface and needs a caller decision",
                        change.field
                    ),
                }),
            }
        }
    }

    let added_pairs: Vec<_> = diff
        .matches
        .iter()
        .filter(|p| p.kind == MatchKind::Added)
        .collect();
    if added_pairs.len() != diff.added_slides.len() {
        return Err(ReconcileError::AddedSlideMismatch {
            listed: diff.added_slides.len(),
            paired: added_pairs.len(),
        });
    }
    for (slide, pair) in diff.added_slides.iter().zip(added_pairs) {
        working.push(WorkingSlide {
            key: pair.order_key(),
            slide: slide.clone(),
            target_index: pair.target_index,
            removed: false,
            added: true,
            updated: true,
        });
    }

    let before = working.len();
    working.retain(|w| !w.removed);
    debug!(removed = before - working.len(), "dropped removed slides");

    let ordered = if diff.reordered {
        let new_order = diff
            .new_order
            .as_deref()
            .ok_or(ReconcileError::MissingNewOrder)?;
        resequence(working, new_order)?
    } else {
        place_added(working)
    };

    let title = match (&diff.new_title, diff.title_changed) {
        (Some(new_title), true) => new_title.clone(),
        _ => canonical.title.clone(),
    };

    let mut slides = Vec::with_capacity(ordered.len());
    let mut updated_positions = Vec::new();
    for (index, mut entry) in ordered.into_iter().enumerate() {
        let position = index + 1;
        entry.slide.position = Some(position);
        if entry.slide.identity().is_none() {
            entry.slide.id = Some(Uuid::new_v4().to_string());
        }
        if entry.updated {
            updated_positions.push(position);
        }
        slides.push(entry.slide);
    }

    Ok(MergedOutline {
        outline: Outline { title, slides },
        updated_positions,
        deferred,
    })
}

/// Copy the canonical slides, keyed by the pairing the diff recorded for each.
fn key_canonical_slides(canonical: &Outline, diff: &DiffReport) -> ReconcileResult<Vec<WorkingSlide>> {
    let len = canonical.slides.len();
    let mut pairings = vec![None; len];
    for pair in &diff.matches {
        let Some(ci) = pair.canonical_index else {
            continue;
        };
        let slot = pairings
            .get_mut(ci)
            .ok_or(ReconcileError::MatchOutOfRange { index: ci, len })?;
        *slot = Some((pair.order_key(), pair.target_index, pair.kind == MatchKind::Removed));
    }

    canonical
        .slides
        .iter()
        .zip(pairings)
        .enumerate()
        .map(|(index, (slide, pairing))| {
            let (key, target_index, removed) =
                pairing.ok_or(ReconcileError::UncoveredCanonicalSlide { index })?;
            Ok(WorkingSlide {
                key,
                slide: slide.clone(),
                target_index,
                removed,
                added: false,
                updated: false,
            })
        })
        .collect()
}

/// Order slides by `new_order`; slides it does not mention go last.
///
/// Entry `i` of `new_order` names the slide at target index `i`. Slots are
/// filled by target index and the key only confirms the slot, since a real
/// id may look like a positional placeholder.
fn resequence(mut remaining: Vec<WorkingSlide>, new_order: &[String]) -> ReconcileResult<Vec<WorkingSlide>> {
    let mut ordered = Vec::with_capacity(remaining.len());
    for (target_index, key) in new_order.iter().enumerate() {
        let index = remaining
            .iter()
            .position(|w| w.target_index == Some(target_index) && &w.key == key)
            .ok_or_else(|| ReconcileError::MissingOrderEntry { key: key.clone() })?;
        ordered.push(remaining.remove(index));
    }
    if !remaining.is_empty() {
        debug!(count = remaining.len(), "appending slides missing from new order");
    }
    ordered.extend(remaining);
    Ok(ordered)
}

/// Without a reorder the kept canonical slides are already in target order;
/// each added slide goes back to its target position.
fn place_added(working: Vec<WorkingSlide>) -> Vec<WorkingSlide> {
    let (mut ordered, added): (Vec<_>, Vec<_>) = working.into_iter().partition(|w| !w.added);
    for entry in added {
        let at = entry.target_index.unwrap_or(ordered.len()).min(ordered.len());
        ordered.insert(at, entry);
    }
    ordered
}
