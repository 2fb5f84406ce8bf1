use pfd_stats::labels::{cosine_similarity, format_labels, CauseLabel, CauseLabeler, Embedder, HashingEmbedder};
use pfd_stats::Report;

fn causes() -> Vec<String> {
    ["drowning", "road traffic collision", "overdose"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[test]
fn cosine_similarity_edge_cases() {
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]), Some(1.0));
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]), Some(0.0));
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
}

#[test]
fn hashing_embedder_is_deterministic_and_normalised() {
    let embedder = HashingEmbedder::new(64);
    let a = embedder.embed("Cause of death was Drowning");
    let b = embedder.embed("cause of death was drowning");
    assert_eq!(a.len(), embedder.dim());
    assert_eq!(a, b);

    let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);

    assert!(embedder.embed("  ...  ").iter().all(|x| *x == 0.0));
}

#[test]
fn best_sentence_decides_the_cause() {
    let embedder = HashingEmbedder::default();
    let labeler = CauseLabeler::new(&embedder, causes(), 5, 0.3);

    let labels = labeler.most_likely("He was found in the river. The cause was drowning.");
    assert!(!labels.is_empty());
    assert_eq!(labels[0].cause, "drowning");
    assert!(labels[0].similarity > 0.4);
    assert!(!labels.iter().any(|l| l.cause == "road traffic collision"));

    assert!(labeler.most_likely(" . . ").is_empty());
}

#[test]
fn max_num_limits_labels() {
    let embedder = HashingEmbedder::default();
    let labeler = CauseLabeler::new(&embedder, causes(), 1, -1.0);
    let labels = labeler.most_likely("A road traffic collision followed an overdose");
    assert_eq!(labels.len(), 1);
}

#[test]
fn reports_without_inquest_get_no_labels() {
    let embedder = HashingEmbedder::default();
    let labeler = CauseLabeler::new(&embedder, causes(), 5, 0.1);

    let reports = vec![
        Report {
            inquest: Some("Inquest touching a drowning".into()),
            circumstances: Some("Found in the canal".into()),
            ..Default::default()
        },
        Report {
            circumstances: Some("Drowning".into()),
            ..Default::default()
        },
    ];
    assert_eq!(
        reports[0].cause_section().as_deref(),
        Some("Inquest touching a drowning\n\nFound in the canal")
    );

    let labels = labeler.label_reports(&reports);
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0][0].cause, "drowning");
    assert!(labels[1].is_empty());
}

#[test]
fn labels_are_pipe_delimited() {
    let labels = vec![
        CauseLabel {
            cause: "drowning".into(),
            similarity: 0.5,
        },
        CauseLabel {
            cause: "overdose".into(),
            similarity: 0.25,
        },
    ];
    assert_eq!(format_labels(&labels), "drowning (0.500) | overdose (0.250)");
    assert_eq!(format_labels(&[]), "");
}
