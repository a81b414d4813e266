//! Error types for outline reconciliation.
//!
//! Diff computation is total and never produces these. They are raised
//! inside the merge engine and by configuration validation; the merge engine
//! converts them into [`crate::merge::MergeConflict`] records instead of
//! returning them to the caller.

use thiserror::Error;

/// Errors produced by the reconciliation engine.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A modification record points outside the canonical outline.
    #[error("modification for slide {slide_id} targets canonical index {index}, but the outline has {len} slides")]
    ModificationOutOfRange {
        slide_id: String,
        index: usize,
        len: usize,
    },

    /// A modification record names a slide that no longer sits at its index.
    #[error("modification for slide {slide_id} does not match the slide keyed {found} at canonical index {index}")]
    ModificationMismatch {
        slide_id: String,
        index: usize,
        found: String,
    },

    /// A canonical slide has no pairing in the diff's match list.
    #[error("canonical slide at index {index} is not covered by the diff")]
    UncoveredCanonicalSlide { index: usize },

    /// A match pair references a canonical index past the end of the outline.
    #[error("match pair references canonical index {index}, but the outline has {len} slides")]
    MatchOutOfRange { index: usize, len: usize },

    /// The diff is flagged as reordered but carries no order.
    #[error("diff is marked reordered but has no new order")]
    MissingNewOrder,

    /// A `new_order` entry does not name the slide at its target index.
    #[error("new order references slide {key}, which is missing from its slot in the working outline")]
    MissingOrderEntry { key: String },

    /// The diff's added-slide list disagrees with its match list.
    #[error("diff lists {listed} added slides but {paired} added pairs")]
    AddedSlideMismatch { listed: usize, paired: usize },

    /// A field change carries a value of the wrong shape for its field.
    #[error("field {field} cannot take value {value}")]
    InvalidFieldValue { field: String, value: String },

    /// A strategy name that no built-in merge strategy answers to.
    #[error("unknown merge strategy: {0}")]
    UnknownStrategy(String),

    /// Matcher parameters are out of range.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
