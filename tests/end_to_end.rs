//! End-to-end tests: raw notes through extraction and clustering.

use approx::assert_relative_eq;
use jtbd_insight::core::matrix::MatrixRow;
use jtbd_insight::{JtbdConfig, JtbdEngine, KRange, RawWeight};

const TWO_INTERVIEWS: &str = "Interview 1\nWe wait forever for support and it costs too much.\n\nInterview 2\nThe price is way too high every month.";

fn engine() -> JtbdEngine {
    JtbdEngine::new(JtbdConfig::default()).unwrap()
}

fn weight(row: &MatrixRow, key: &str) -> Option<f64> {
    match row.weights().get(key) {
        Some(RawWeight::Number(w)) => Some(*w),
        _ => None,
    }
}

#[test]
fn two_interviews_share_cost_as_top_dimension() {
    let report = engine().run(TWO_INTERVIEWS, &[], Some(KRange::new(2, 2).unwrap()));

    let rows = report.extraction.matrix.rows();
    assert_eq!(rows.len(), 2);
    assert!(weight(&rows[0], "cost").unwrap() > 0.0);
    assert!(weight(&rows[0], "support").unwrap() > 0.0);
    assert!(weight(&rows[0], "time").unwrap() > 0.0);
    assert!(weight(&rows[1], "cost").unwrap() > 0.0);

    // Two vectors cannot support k = 2 with two spare points
    let clustering = &report.clustering;
    assert!(clustering.fallback);
    assert!(clustering.note.contains("Small-N fallback"));
    for cluster in &clustering.clusters {
        assert_eq!(cluster.top_dims[0].as_str(), "cost");
    }
    assert_eq!(clustering.assignments.len(), 2);
}

#[test]
fn quantized_weights_follow_hit_counts() {
    let text = "The price is steep.\n\n\
                The price is steep. The fees add up.\n\n\
                The price is steep. The fees add up. It is expensive.";
    let output = engine().extract(text);
    let rows = output.matrix.rows();
    assert_eq!(rows.len(), 3);
    assert_relative_eq!(weight(&rows[0], "cost").unwrap(), 0.33);
    assert_relative_eq!(weight(&rows[1], "cost").unwrap(), 0.67);
    assert_relative_eq!(weight(&rows[2], "cost").unwrap(), 1.0);
}

#[test]
fn only_the_three_strongest_themes_survive() {
    // cost x5, time x4, effort x3, quality x2, reliability x1
    let text = "It is expensive. The fees hurt. Pricing is bad. We cannot afford it. The budget is gone. \
                We wait a lot. There are delays. It took too long. Waiting is the norm. \
                The paperwork is tedious. So much hassle. It is cumbersome. \
                The output is shoddy. The result was sloppy. \
                The app crashes.";
    let output = engine().extract(text);
    let row = &output.matrix.rows()[0];

    let mut keys: Vec<&str> = row.weights().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["cost", "effort", "time"]);
    assert!(weight(row, "quality").is_none());
    assert!(weight(row, "reliability").is_none());
}

#[test]
fn soft_risk_language_never_scores_risk() {
    let output = engine().extract("I am worried and not sure what might happen next.");
    let row = &output.matrix.rows()[0];
    assert!(weight(row, "risk").is_none());
    assert!(output.display[0].no_clear_theme);
    assert!(output.warnings.iter().any(|w| w.contains("i1")));
}

#[test]
fn explicit_risk_language_scores_risk() {
    let output = engine().extract("We are locked into a two-year contract with early termination penalties.");
    let row = &output.matrix.rows()[0];
    assert!(weight(row, "risk").unwrap() > 0.0);
}

#[test]
fn extraction_matrix_feeds_cluster_json() {
    let engine = engine();
    let notes = [
        "The price is too high.",
        "It costs a fortune and the fees keep rising.",
        "The subscription is expensive.",
        "Billing is a mess and it is overpriced.",
        "The price went up again.",
        "I do not trust them.",
        "They lied about the terms and it felt like a scam.",
        "The salesman was shady.",
        "Misleading ads everywhere and I distrust them.",
        "Sketchy people, I do not trust them.",
    ]
    .join("\n\n");

    let extraction = engine.extract(&notes);
    assert_eq!(extraction.matrix.len(), 10);

    let payload = serde_json::json!({
        "matrix": extraction.matrix,
        "reference": ["trust"],
    })
    .to_string();
    let output = engine.cluster_json(&payload);

    assert_eq!(output.k_selected, 2);
    assert!(output.validity.silhouette > 0.5);
    let trust_cluster = output
        .clusters
        .iter()
        .find(|c| c.top_dims[0].as_str() == "trust")
        .unwrap();
    assert_relative_eq!(trust_cluster.ps_match, 1.0);
}

#[test]
fn degraded_segmentation_is_reported() {
    let text = "Interview 1\nThe price is too high.\nInterview 2\nWe wait forever.";
    let output = engine().extract(text);
    assert!(!output.warnings.is_empty());
}
