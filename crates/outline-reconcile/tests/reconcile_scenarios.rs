use outline_reconcile::{
    compute_diff, match_slides, merge, MatchConfig, MatchKind, MergeStrategy, Outline, Slide,
    SlideField,
};
use serde_json::json;

fn slide(id: &str, title: &str, topics: &[&str]) -> Slide {
    Slide::new(title).with_id(id).with_topics(topics.iter().copied())
}

fn anonymous(title: &str, topics: &[&str]) -> Slide {
    Slide::new(title).with_topics(topics.iter().copied())
}

type Comparable = (String, Vec<String>, Option<String>, String, Option<String>);

fn comparable(outline: &Outline) -> Vec<Comparable> {
    outline
        .slides
        .iter()
        .map(|s| {
            (
                s.title.clone(),
                s.topics.clone(),
                s.notes.clone(),
                s.layout.clone(),
                s.variant_id.clone(),
            )
        })
        .collect()
}

/// Canonical/target pairs covering identity, fuzzy, reorder, add and remove.
fn scenarios() -> Vec<(Outline, Outline)> {
    vec![
        (
            Outline::new(
                "Intro",
                vec![slide("1", "Welcome", &["a", "b"]), slide("2", "Details", &["c"])],
            ),
            Outline::new(
                "Intro",
                vec![
                    slide("2", "Details", &["c", "d"]),
                    slide("1", "Welcome", &["a", "b"]),
                    slide("3", "New", &["e"]),
                ],
            ),
        ),
        (
            Outline::new(
                "Quarterly",
                vec![
                    anonymous("Plan", &["a"]),
                    anonymous("Budget", &["b"]),
                    anonymous("Risks", &["c"]),
                ],
            ),
            Outline::new(
                "Quarterly review",
                vec![
                    anonymous("Budget", &["b"]),
                    anonymous("Plan", &["a", "z"]),
                    anonymous("Risks", &["c"]).with_notes("keep short"),
                    anonymous("Hiring", &["h"]),
                ],
            ),
        ),
        (
            Outline::new(
                "Launch",
                vec![slide("x", "Alpha", &["1"]), slide("y", "Beta", &["2"])],
            ),
            Outline::new(
                "Launch",
                vec![slide("q", "Beta", &["2"]), anonymous("Alpha", &["1"])],
            ),
        ),
        (
            Outline::new("Empty", vec![]),
            Outline::new(
                "Empty",
                vec![slide("n", "Now filled", &["k"]), anonymous("Second", &[])],
            ),
        ),
        (
            Outline::new(
                "Shrink",
                vec![slide("a", "A", &[]), slide("b", "B", &[]).with_layout("hero")],
            ),
            Outline::new("Shrink", vec![]),
        ),
        (
            Outline::new(
                "Styles",
                vec![
                    slide("a", "A", &["t"]).with_layout("hero").with_variant("v1"),
                    slide("b", "B", &["u"]),
                    slide("c", "C", &["w"]),
                ],
            ),
            Outline::new(
                "Styles",
                vec![
                    slide("c", "C", &["w"]),
                    slide("a", "A", &["t"]).with_layout("grid"),
                    anonymous("Inserted", &[]),
                ],
            ),
        ),
    ]
}

#[test]
fn end_to_end_reorder_modify_and_add() {
    let (canonical, target) = scenarios().remove(0);
    let diff = compute_diff(&canonical, &target);

    assert!(diff.has_changes);
    assert!(diff.reordered);
    assert_eq!(
        diff.new_order,
        Some(vec!["2".to_string(), "1".to_string(), "3".to_string()])
    );
    assert!(!diff.title_changed);
    assert!(diff.removed_slide_ids.is_empty());

    assert_eq!(diff.added_slides.len(), 1);
    assert_eq!(diff.added_slides[0].id.as_deref(), Some("3"));

    assert_eq!(diff.modified_slides.len(), 1);
    let record = &diff.modified_slides[0];
    assert_eq!(record.slide_id, "2");
    assert_eq!(record.position_in_target, 1);
    assert!(record.needs_reanalysis);
    assert_eq!(record.changes.len(), 1);
    assert_eq!(record.changes[0].field, SlideField::Topics);
    assert_eq!(record.changes[0].new_value, json!(["c", "d"]));

    let result = merge(&canonical, &diff, MergeStrategy::TargetWins);
    assert!(result.success);
    assert!(result.conflicts.is_empty());
    let merged = result.merged_outline.expect("merged outline");

    let order: Vec<&str> = merged.slides.iter().filter_map(|s| s.id.as_deref()).collect();
    assert_eq!(order, vec!["2", "1", "3"]);
    assert_eq!(merged.slides[0].topics, vec!["c".to_string(), "d".to_string()]);
    assert_eq!(result.updated_slide_positions, vec![1, 3]);
    assert_eq!(merged.title, "Intro");
}

#[test]
fn every_slide_lands_in_exactly_one_pair() {
    for (canonical, target) in scenarios() {
        let pairs = match_slides(&canonical.slides, &target.slides, &MatchConfig::default());

        for ci in 0..canonical.slides.len() {
            let hits = pairs.iter().filter(|p| p.canonical_index == Some(ci)).count();
            assert_eq!(hits, 1, "canonical slide {} in {:?}", ci, canonical.title);
        }
        for ti in 0..target.slides.len() {
            let hits = pairs.iter().filter(|p| p.target_index == Some(ti)).count();
            assert_eq!(hits, 1, "target slide {} in {:?}", ti, target.title);
        }
        for pair in &pairs {
            match pair.kind {
                MatchKind::Matched => {
                    assert!(pair.canonical_slide.is_some() && pair.target_slide.is_some())
                }
                MatchKind::Added => assert!(pair.canonical_slide.is_none()),
                MatchKind::Removed => assert!(pair.target_slide.is_none()),
            }
        }
    }
}

#[test]
fn diffing_an_outline_against_itself_is_a_no_op() {
    for (canonical, target) in scenarios() {
        assert!(!compute_diff(&canonical, &canonical).has_changes);
        assert!(!compute_diff(&target, &target).has_changes);
    }
}

#[test]
fn target_wins_merge_reproduces_target() {
    for (canonical, target) in scenarios() {
        let diff = compute_diff(&canonical, &target);
        let result = merge(&canonical, &diff, MergeStrategy::TargetWins);
        assert!(result.success, "merge failed: {:?}", result.conflicts);

        let merged = result.merged_outline.expect("merged outline");
        assert_eq!(comparable(&merged), comparable(&target));
        if !target.title.is_empty() {
            assert_eq!(merged.title, target.title);
        }
        for (index, slide) in merged.slides.iter().enumerate() {
            assert_eq!(slide.position, Some(index + 1));
            assert!(slide.identity().is_some());
        }
    }
}

#[test]
fn merged_outline_reconciles_cleanly_with_target() {
    for (canonical, target) in scenarios() {
        let diff = compute_diff(&canonical, &target);
        let merged = merge(&canonical, &diff, MergeStrategy::TargetWins)
            .merged_outline
            .expect("merged outline");

        let second = compute_diff(&merged, &target);
        assert!(second.modified_slides.is_empty());
        assert!(second.added_slides.is_empty());
        assert!(second.removed_slide_ids.is_empty());
        assert!(!second.reordered);
    }
}

#[test]
fn merge_does_not_touch_canonical_input() {
    let (canonical, target) = scenarios().remove(0);
    let snapshot = canonical.clone();
    let diff = compute_diff(&canonical, &target);
    let _ = merge(&canonical, &diff, MergeStrategy::TargetWins);
    assert_eq!(canonical, snapshot);
}

#[test]
fn diff_report_serializes_with_wire_names() {
    let (canonical, target) = scenarios().remove(0);
    let diff = compute_diff(&canonical, &target);
    let value = serde_json::to_value(&diff).expect("serialize diff");

    assert_eq!(value["hasChanges"], json!(true));
    assert_eq!(value["newOrder"], json!(["2", "1", "3"]));
    assert_eq!(value["modifiedSlides"][0]["slideId"], json!("2"));
    assert_eq!(value["modifiedSlides"][0]["needsReanalysis"], json!(true));
    assert_eq!(value["matches"][0]["kind"], json!("matched"));

    let back: outline_reconcile::DiffReport =
        serde_json::from_value(value).expect("deserialize diff");
    assert_eq!(back, diff);
}
