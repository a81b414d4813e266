//! Two-phase slide matcher.
//!
//! Pairs canonical slides with target slides:
//! 1. identity: equal non-empty ids, confidence 1.0;
//! 2. fuzzy: weighted content / title / position score, accepted at or
//!    above [`MatchConfig::accept_threshold`];
//! 3. leftovers: unpaired target slides are `added`, unpaired canonical
//!    slides are `removed`.
//!
//! Scan order is fixed (target order outside, canonical order inside, first
//! best wins) so the result is deterministic. The output covers every slide
//! of both outlines exactly once and is sorted by target index with removed
//! pairs last in canonical order.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::config::MatchConfig;
use crate::fingerprint::content_fingerprint;
use crate::model::{MatchPair, Slide};

// ---------------------------------------------------------------------------
// Similarity terms
// ---------------------------------------------------------------------------

/// Title similarity in `[0, 1]` using the default substring score.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    title_similarity_with(a, b, MatchConfig::default().substring_similarity)
}

fn title_similarity_with(a: &str, b: &str, substring_similarity: f64) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    // A blank title carries no evidence, even against another blank one.
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return substring_similarity;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    words_a.intersection(&words_b).count() as f64 / union as f64
}

/// `1 - min(|ti - ci| / max(target_len, 1), 1)`.
pub fn position_proximity(target_index: usize, canonical_index: usize, target_len: usize) -> f64 {
    let distance = target_index.abs_diff(canonical_index) as f64;
    let scale = target_len.max(1) as f64;
    1.0 - (distance / scale).min(1.0)
}

struct Candidate<'a> {
    index: usize,
    slide: &'a Slide,
    fingerprint: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Pair the slides of two outlines.
pub fn match_slides(canonical: &[Slide], target: &[Slide], config: &MatchConfig) -> Vec<MatchPair> {
    let mut pairs = Vec::with_capacity(canonical.len().max(target.len()));
    let mut canonical_used = vec![false; canonical.len()];
    let mut target_used = vec![false; target.len()];

    // Phase 1: identity.
    for (ti, target_slide) in target.iter().enumerate() {
        let Some(id) = target_slide.identity() else {
            continue;
        };
        let hit = canonical
            .iter()
            .enumerate()
            .find(|(ci, c)| !canonical_used[*ci] && c.identity() == Some(id));
        if let Some((ci, canonical_slide)) = hit {
            trace!(slide_id = %id, canonical_index = ci, target_index = ti, "identity match");
            pairs.push(MatchPair::matched(canonical_slide, ci, target_slide, ti, 1.0));
            canonical_used[ci] = true;
            target_used[ti] = true;
        }
    }

    // Phase 2: fuzzy.
    let candidates: Vec<Candidate<'_>> = canonical
        .iter()
        .enumerate()
        .map(|(index, slide)| Candidate {
            index,
            slide,
            fingerprint: content_fingerprint(slide),
        })
        .collect();

    for (ti, target_slide) in target.iter().enumerate() {
        if target_used[ti] {
            continue;
        }
        let target_fingerprint = content_fingerprint(target_slide);

        let mut best: Option<(&Candidate<'_>, f64)> = None;
        for candidate in candidates.iter().filter(|c| !canonical_used[c.index]) {
            let score = fuzzy_score(
                target_slide,
                &target_fingerprint,
                ti,
                candidate,
                target.len(),
                config,
            );
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) if score >= config.accept_threshold => {
                trace!(
                    canonical_index = candidate.index,
                    target_index = ti,
                    score,
                    "fuzzy match"
                );
                pairs.push(MatchPair::matched(
                    candidate.slide,
                    candidate.index,
                    target_slide,
                    ti,
                    score,
                ));
                canonical_used[candidate.index] = true;
            }
            _ => {
                trace!(target_index = ti, "no canonical slide reached threshold");
                pairs.push(MatchPair::added(target_slide, ti));
            }
        }
        target_used[ti] = true;
    }

    // Phase 3: leftovers.
    for (ci, canonical_slide) in canonical.iter().enumerate() {
        if !canonical_used[ci] {
            pairs.push(MatchPair::removed(canonical_slide, ci));
        }
    }

    pairs.sort_by_key(|p| (p.target_index.is_none(), p.target_index, p.canonical_index));

    debug!(
        canonical = canonical.len(),
        target = target.len(),
        pairs = pairs.len(),
        "matched outline slides"
    );
    pairs
}

fn fuzzy_score(
    target_slide: &Slide,
    target_fingerprint: &str,
    target_index: usize,
    candidate: &Candidate<'_>,
    target_len: usize,
    config: &MatchConfig,
) -> f64 {
    let content = if candidate.fingerprint == target_fingerprint {
        1.0
    } else {
        0.0
    };
    let title = title_similarity_with(
        &candidate.slide.title,
        &target_slide.title,
        config.substring_similarity,
    );
    let position = position_proximity(target_index, candidate.index, target_len);

    config.content_weight * content + config.title_weight * title + config.position_weight * position
}
