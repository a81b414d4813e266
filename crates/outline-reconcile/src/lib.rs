//! Outline reconciliation: match, diff and merge two versions of a slide outline.
//!
//! The agent authors a *canonical* outline; a human edits a copy of it on an
//! external preview surface (the *target*). This crate pairs the slides of
//! the two versions, reports what changed, and folds the human's edits back
//! into the canonical outline without losing fields only the agent knows.
//!
//! ## Pipeline
//!
//! - [`model`]: `Slide`, `Outline`, `MatchPair`, `DiffReport`, `MergeResult`
//! - [`matcher`]: identity pass, then weighted fuzzy pass
//! - [`diff`]: `compute_diff` reports added / removed / modified / reordered / title
//! - [`merge`]: `merge` applies a diff under a `MergeStrategy`
//!
//! ```
//! use outline_reconcile::{compute_diff, merge, MergeStrategy, Outline, Slide};
//!
//! let canonical = Outline::new("Intro", vec![Slide::new("Welcome").with_id("1")]);
//! let target = Outline::new("Intro", vec![
//!     Slide::new("Welcome").with_id("1"),
//!     Slide::new("Agenda").with_id("2"),
//! ]);
//!
//! let diff = compute_diff(&canonical, &target);
//! assert_eq!(diff.added_slides.len(), 1);
//!
//! let result = merge(&canonical, &diff, MergeStrategy::TargetWins);
//! assert!(result.success);
//! assert_eq!(result.merged_outline.unwrap().slides.len(), 2);
//! ```
//!
//! Every operation is synchronous and free of shared state; callers decide
//! when to reconcile and serialize reconciliations of the same outline.

pub mod config;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod matcher;
pub mod merge;
pub mod model;

pub use config::MatchConfig;
pub use diff::{compute_diff, compute_diff_with, field_changes};
pub use error::{ReconcileError, ReconcileResult};
pub use fingerprint::content_fingerprint;
pub use matcher::{match_slides, position_proximity, title_similarity};
pub use merge::{merge, merge_with, FieldResolver, MergeStrategy, Resolution};
pub use model::{
    synthetic_slide_key, DiffReport, FieldChange, MatchKind, MatchPair, MergeConflict,
    MergeResult, ModificationRecord, Outline, Slide, SlideField,
};
