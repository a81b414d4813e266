use deckflow_core::{
    render_reconcile_summary_md, DeckflowSettings, ReanalysisReason, ReconcileReportArtifact,
    SessionReconciler,
};
use outline_reconcile::{compute_diff, MergeStrategy, Outline, Slide};
use std::sync::Arc;

fn canonical() -> Outline {
    Outline::new(
        "Quarterly Review",
        vec![
            Slide::new("Welcome")
                .with_id("s1")
                .with_topics(["agenda"])
                .with_layout("title")
                .with_variant("title-hero"),
            Slide::new("Revenue")
                .with_id("s2")
                .with_topics(["q3", "growth"])
                .with_layout("chart")
                .with_variant("bar-chart"),
            Slide::new("Next Steps")
                .with_id("s3")
                .with_topics(["roadmap"])
                .with_layout("bullets"),
        ],
    )
}

fn edited() -> Outline {
    Outline::new(
        "Quarterly Review",
        vec![
            Slide::new("Welcome")
                .with_id("s1")
                .with_topics(["agenda"])
                .with_layout("title"),
            Slide::new("Next Steps")
                .with_id("s3")
                .with_topics(["roadmap"])
                .with_layout("bullets"),
            Slide::new("Revenue and Margin")
                .with_id("s2")
                .with_topics(["q3", "growth", "margin"])
                .with_layout("chart"),
            Slide::new("Questions"),
        ],
    )
}

#[tokio::test]
async fn test_session_reconcile_end_to_end() {
    deckflow_core::init_tracing(false, tracing::Level::DEBUG);
    let reconciler = SessionReconciler::default();

    let outcome = reconciler
        .reconcile("session-1", &canonical(), &edited())
        .await;

    assert_eq!(outcome.session_id, "session-1");
    assert!(outcome.diff.has_changes);
    assert!(outcome.diff.reordered);
    assert_eq!(outcome.diff.added_slides.len(), 1);
    assert!(outcome.succeeded());

    let merged = outcome.merge.merged_outline.clone().unwrap();
    let titles: Vec<&str> = merged.slides.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Welcome", "Next Steps", "Revenue and Margin", "Questions"]
    );

    let targets = outcome.reanalysis_targets();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0].slide_id, "s2");
    assert_eq!(targets[0].reason, ReanalysisReason::Modified);
    assert_eq!(targets[1].position, 4);
    assert_eq!(targets[1].reason, ReanalysisReason::Added);

    let report = ReconcileReportArtifact::new(
        &outcome.session_id,
        &outcome.diff,
        &outcome.merge,
        chrono::Utc::now(),
    );
    let md = render_reconcile_summary_md(&report);
    assert!(md.contains("- result: merged"));
    assert!(md.contains("### New Order"));
}

#[tokio::test]
async fn test_strategy_comes_from_settings() {
    let settings = DeckflowSettings::from_toml_str("[merge]\nstrategy = \"ask-caller\"\n").unwrap();
    let reconciler = SessionReconciler::from_settings(&settings).unwrap();

    let outcome = reconciler.reconcile("s", &canonical(), &edited()).await;
    assert!(outcome.succeeded());
    assert_eq!(outcome.merge.strategy_used, "ask-caller");
    // s1 loses its variant, s2 changes title, topics and variant.
    assert_eq!(outcome.merge.conflicts.len(), 4);
    let merged = outcome.merge.merged_outline.unwrap();
    assert_eq!(merged.slides[2].title, "Revenue");
    assert_eq!(merged.slides[0].variant_id.as_deref(), Some("title-hero"));

    let overridden = reconciler
        .reconcile_with("s", &canonical(), &edited(), MergeStrategy::CanonicalWins)
        .await;
    assert!(overridden.succeeded());
    let merged = overridden.merge.merged_outline.unwrap();
    assert_eq!(merged.slides[2].title, "Revenue");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_all_complete() {
    let reconciler = Arc::new(SessionReconciler::default());

    let mut handles = Vec::new();
    for i in 0..8 {
        let reconciler = Arc::clone(&reconciler);
        handles.push(tokio::spawn(async move {
            let session = format!("session-{}", i % 4);
            reconciler.reconcile(&session, &canonical(), &edited()).await
        }));
    }

    let expected = compute_diff(&canonical(), &edited());
    for handle in handles {
        let outcome = handle.await.unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.diff, expected);
    }

    assert_eq!(reconciler.active_sessions().await.len(), 4);
    for i in 0..4 {
        assert!(reconciler.forget(&format!("session-{}", i)).await);
    }
    assert!(reconciler.active_sessions().await.is_empty());
}

#[tokio::test]
async fn test_unchanged_outline_is_a_no_op() {
    let reconciler = SessionReconciler::default();
    let outline = canonical();

    let outcome = reconciler.reconcile("idle", &outline, &outline).await;
    assert!(!outcome.diff.has_changes);
    assert_eq!(outcome.diff.change_count(), 0);
    assert!(outcome.reanalysis_targets().is_empty());
    assert!(outcome.merge.updated_slide_positions.is_empty());
}
