//! Slide record model shared by the matcher, diff computer and merge engine.
//!
//! Every type here is a plain value: created fresh per reconciliation,
//! never mutated after construction by the engine, and serializable with the
//! camelCase wire shape used by the outline producer and the edit surface.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReconcileError, ReconcileResult};

/// Placeholder key for a slide that has no usable id.
pub fn synthetic_slide_key(index: usize) -> String {
    format!("slide_{}", index)
}

// ---------------------------------------------------------------------------
// Slides and outlines
// ---------------------------------------------------------------------------

/// One outline entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Stable identity when present; absent ids force content matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub layout: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// 1-based ordinal, rewritten on every merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Fields neither side of the reconciliation understands.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Slide {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// The slide id when it is present and non-empty.
    pub fn identity(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Current value of a comparable field as JSON.
    pub fn field_value(&self, field: SlideField) -> Value {
        match field {
            SlideField::Title => Value::from(self.title.clone()),
            SlideField::Topics => Value::from(self.topics.clone()),
            SlideField::Notes => self.notes.clone().map(Value::from).unwrap_or(Value::Null),
            SlideField::Layout => Value::from(self.layout.clone()),
            SlideField::VariantId => self
                .variant_id
                .clone()
                .map(Value::from)
                .unwrap_or(Value::Null),
        }
    }

    /// Overwrite one comparable field from a JSON value.
    pub fn set_field(&mut self, field: SlideField, value: &Value) -> ReconcileResult<()> {
        let invalid = || ReconcileError::InvalidFieldValue {
            field: field.to_string(),
            value: value.to_string(),
        };
        match field {
            SlideField::Title => {
                self.title = value.as_str().ok_or_else(invalid)?.to_string();
            }
            SlideField::Topics => {
                self.topics = serde_json::from_value(value.clone()).map_err(|_| invalid())?;
            }
            SlideField::Notes => {
                self.notes = optional_string(value).ok_or_else(invalid)?;
            }
            SlideField::Layout => {
                self.layout = value.as_str().ok_or_else(invalid)?.to_string();
            }
            SlideField::VariantId => {
                self.variant_id = optional_string(value).ok_or_else(invalid)?;
            }
        }
        Ok(())
    }
}

fn optional_string(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        _ => None,
    }
}

/// An ordered sequence of slides plus a document title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Outline {
    pub fn new(title: impl Into<String>, slides: Vec<Slide>) -> Self {
        Self {
            title: title.into(),
            slides,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// The attributes of a matched slide pair that the diff compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlideField {
    Title,
    Topics,
    Notes,
    Layout,
    VariantId,
}

impl SlideField {
    /// Every comparable field, in comparison order.
    pub const ALL: [SlideField; 5] = [
        SlideField::Title,
        SlideField::Topics,
        SlideField::Notes,
        SlideField::Layout,
        SlideField::VariantId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SlideField::Title => "title",
            SlideField::Topics => "topics",
            SlideField::Notes => "notes",
            SlideField::Layout => "layout",
            SlideField::VariantId => "variantId",
        }
    }
}

impl fmt::Display for SlideField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a slide pairing was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Matched,
    Added,
    Removed,
}

/// One canonical slide paired with one target slide, or with nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPair {
    pub canonical_slide: Option<Slide>,
    pub target_slide: Option<Slide>,
    pub canonical_index: Option<usize>,
    pub target_index: Option<usize>,
    pub kind: MatchKind,
    /// 0.0–1.0; 1.0 for identity matches.
    pub confidence: f64,
}

impl MatchPair {
    pub fn matched(
        canonical: &Slide,
        canonical_index: usize,
        target: &Slide,
        target_index: usize,
        confidence: f64,
    ) -> Self {
        Self {
            canonical_slide: Some(canonical.clone()),
            target_slide: Some(target.clone()),
            canonical_index: Some(canonical_index),
            target_index: Some(target_index),
            kind: MatchKind::Matched,
            confidence,
        }
    }

    pub fn added(target: &Slide, target_index: usize) -> Self {
        Self {
            canonical_slide: None,
            target_slide: Some(target.clone()),
            canonical_index: None,
            target_index: Some(target_index),
            kind: MatchKind::Added,
            confidence: 0.0,
        }
    }

    pub fn removed(canonical: &Slide, canonical_index: usize) -> Self {
        Self {
            canonical_slide: Some(canonical.clone()),
            target_slide: None,
            canonical_index: Some(canonical_index),
            target_index: None,
            kind: MatchKind::Removed,
            confidence: 0.0,
        }
    }

    /// Key used to place this pair's slide in `new_order` and to locate it
    /// during merge: the target id, then the canonical id, then a positional
    /// placeholder (target index, or canonical index for removed slides).
    pub fn order_key(&self) -> String {
        let target_id = self.target_slide.as_ref().and_then(Slide::identity);
        let canonical_id = self.canonical_slide.as_ref().and_then(Slide::identity);
        match (target_id, canonical_id) {
            (Some(id), _) | (None, Some(id)) => id.to_string(),
            (None, None) => {
                synthetic_slide_key(self.target_index.or(self.canonical_index).unwrap_or(0))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// One changed attribute of a matched slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: SlideField,
    pub old_value: Value,
    pub new_value: Value,
}

/// A matched slide whose comparable fields changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationRecord {
    pub slide_id: String,
    /// 1-based position of the slide in the target outline.
    pub position_in_target: usize,
    /// 0-based index of the slide in the canonical outline.
    pub canonical_index: usize,
    pub changes: Vec<FieldChange>,
    pub title_changed: bool,
    pub topics_changed: bool,
    pub notes_changed: bool,
    pub layout_changed: bool,
    /// Title or topic edits invalidate downstream layout and content decisions.
    pub needs_reanalysis: bool,
}

impl ModificationRecord {
    /// Build a record, deriving the per-field flags from `changes`.
    pub fn new(
        slide_id: impl Into<String>,
        position_in_target: usize,
        canonical_index: usize,
        changes: Vec<FieldChange>,
    ) -> Self {
        let touched = |field: SlideField| changes.iter().any(|c| c.field == field);
        let title_changed = touched(SlideField::Title);
        let topics_changed = touched(SlideField::Topics);
        let notes_changed = touched(SlideField::Notes);
        let layout_changed = touched(SlideField::Layout);
        Self {
            slide_id: slide_id.into(),
            position_in_target,
            canonical_index,
            title_changed,
            topics_changed,
            notes_changed,
            layout_changed,
            needs_reanalysis: title_changed || topics_changed,
            changes,
        }
    }

    pub fn change_for(&self, field: SlideField) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }
}

/// Immutable result of one reconciliation diff pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub has_changes: bool,
    pub added_slides: Vec<Slide>,
    pub removed_slide_ids: Vec<String>,
    pub modified_slides: Vec<ModificationRecord>,
    pub reordered: bool,
    /// Order keys of the target slides; present iff `reordered`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_order: Option<Vec<String>>,
    pub title_changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_title: Option<String>,
    pub matches: Vec<MatchPair>,
}

impl DiffReport {
    /// Number of slide-level changes; reorders and title edits are not counted.
    pub fn change_count(&self) -> usize {
        self.added_slides.len() + self.removed_slide_ids.len() + self.modified_slides.len()
    }

    /// Ids of modified slides whose edits invalidate downstream analysis.
    pub fn reanalysis_slide_ids(&self) -> Vec<&str> {
        self.modified_slides
            .iter()
            .filter(|m| m.needs_reanalysis)
            .map(|m| m.slide_id.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// A diagnostic raised while merging.
///
/// Field conflicts carry both values; structural failures carry only a reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConflict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<SlideField>,
    #[serde(default)]
    pub canonical_value: Value,
    #[serde(default)]
    pub target_value: Value,
    pub reason: String,
}

impl MergeConflict {
    pub fn structural(reason: impl Into<String>) -> Self {
        Self {
            slide_id: None,
            field: None,
            canonical_value: Value::Null,
            target_value: Value::Null,
            reason: reason.into(),
        }
    }
}

/// Outcome of applying a diff to the canonical outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_outline: Option<Outline>,
    /// 1-based positions in the merged outline of modified and added slides.
    pub updated_slide_positions: Vec<usize>,
    pub conflicts: Vec<MergeConflict>,
    pub strategy_used: String,
}
