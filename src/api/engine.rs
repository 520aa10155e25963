//! Main engine implementation.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::requests::ClusterRequest;
use crate::clustering::{ClusterInput, ClusteringOutput, ThemeClusterer};
use crate::core::config::{JtbdConfig, KRange};
use crate::core::errors::Result;
use crate::extraction::{ExtractionOutput, ThemeExtractor};

/// Extraction followed by clustering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    /// Extraction stage output
    pub extraction: ExtractionOutput,
    /// Clustering stage output
    pub clustering: ClusteringOutput,
}

/// Main theme extraction and clustering engine
#[derive(Debug)]
pub struct JtbdEngine {
    /// Text -> matrix
    extractor: ThemeExtractor<'static>,

    /// Matrix -> clusters
    clusterer: ThemeClusterer,

    /// Engine configuration
    config: Arc<JtbdConfig>,
}

impl JtbdEngine {
    /// Create a new engine, validating the configuration first
    pub fn new(config: JtbdConfig) -> Result<Self> {
        config.validate()?;
        info!("Initializing JTBD insight engine");

        Ok(Self {
            extractor: ThemeExtractor::new(&config),
            clusterer: ThemeClusterer::new(&config),
            config: Arc::new(config),
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &JtbdConfig {
        &self.config
    }

    /// Extract an interview matrix from raw notes
    pub fn extract(&self, text: &str) -> ExtractionOutput {
        self.extractor.extract(text)
    }

    /// Cluster an interview matrix
    pub fn cluster(&self, input: &ClusterInput<'_>) -> ClusteringOutput {
        self.clusterer.cluster(input)
    }

    /// Cluster a JSON request payload.
    ///
    /// Malformed payloads produce an empty result with a note.
    pub fn cluster_json(&self, payload: &str) -> ClusteringOutput {
        match ClusterRequest::from_json(payload) {
            Ok(request) => self.cluster_request(&request),
            Err(err) => {
                warn!("Rejected cluster payload: {}", err);
                ClusteringOutput::empty(format!(
                    "Could not read the clustering request ({err}); nothing was clustered."
                ))
            }
        }
    }

    /// Cluster a parsed request. An invalid `k_range` falls back to the
    /// configured range with a note.
    pub fn cluster_request(&self, request: &ClusterRequest) -> ClusteringOutput {
        let mut range_note = None;
        let k_range = match request.k_range() {
            Ok(range) => range,
            Err(err) => {
                let fallback = self.config.clustering.k_range();
                range_note = Some(format!(
                    "Ignored invalid k_range ({err}); used [{}, {}] instead.",
                    fallback.min(), fallback.max()
                ));
                None
            }
        };

        let mut input = ClusterInput::new(&request.matrix)
            .with_reference(request.reference.iter().cloned())
            .with_facets(request.facets.clone());
        input.k_range = k_range;

        let mut output = self.clusterer.cluster(&input);
        if let Some(note) = range_note {
            output.note = if output.note.is_empty() {
                note
            } else {
                format!("{note} {}", output.note)
            };
        }
        output
    }

    /// Extract then cluster, forwarding facets to the describer
    pub fn run(&self, text: &str, reference: &[String], k_range: Option<KRange>) -> InsightReport {
        let extraction = self.extract(text);
        let mut input = ClusterInput::new(&extraction.matrix)
            .with_reference(reference.iter().cloned())
            .with_facets(extraction.facets_by_id());
        input.k_range = k_range;
        let clustering = self.clusterer.cluster(&input);

        InsightReport {
            extraction,
            clustering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::themes::CoreTheme;

    const TWO_INTERVIEWS: &str = "Interview 1\nWe wait forever for support and it costs too much.\n\nInterview 2\nThe price is way too high every month.";

    fn engine() -> JtbdEngine {
        JtbdEngine::new(JtbdConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = JtbdConfig::default();
        config.clustering.k_min = 4;
        config.clustering.k_max = 2;
        assert!(JtbdEngine::new(config).is_err());
    }

    #[test]
    fn run_puts_cost_on_top() {
        let report = engine().run(TWO_INTERVIEWS, &[], Some(KRange::new(2, 2).unwrap()));
        assert_eq!(report.extraction.matrix.len(), 2);
        assert_eq!(report.clustering.clusters.len(), 1);
        assert!(report.clustering.fallback);
        assert!(report
            .clustering
            .clusters
            .iter()
            .all(|c| c.top_dims[0] == CoreTheme::Cost));
        assert!(!report.clustering.clusters[0].top_facets.is_empty());
    }

    #[test]
    fn malformed_json_yields_empty_result() {
        let output = engine().cluster_json("{oops");
        assert!(output.clusters.is_empty());
        assert!(output.note.contains("Could not read"));
    }

    #[test]
    fn invalid_k_range_falls_back_with_note() {
        let output = engine().cluster_json(
            r#"{"matrix": [["i1", {"cost": 1}], ["i2", {"cost": 0.67}]], "k_range": [0, 3]}"#,
        );
        assert!(output.note.starts_with("Ignored invalid k_range"));
        assert_eq!(output.validity.alt.len(), 4);
        assert_eq!(output.clusters.len(), 1);
    }

    const FIVE_ROWS: &str = r#"[["i1", {"cost": 1}], ["i2", {"cost": 1}], ["i3", {"trust": 1}], ["i4", {"trust": 1}], ["i5", {"time": 1}]]"#;

    #[test]
    fn k_range_at_usize_max_is_ignored_not_fatal() {
        let payload = format!(
            r#"{{"matrix": {FIVE_ROWS}, "k_range": [18446744073709551615, 18446744073709551615]}}"#
        );
        let output = engine().cluster_json(&payload);
        assert!(output.note.starts_with("Ignored invalid k_range"), "{}", output.note);
        assert_eq!(output.validity.alt.len(), 4);
        assert_eq!(output.assignments.len(), 5);
    }

    #[test]
    fn k_range_above_ceiling_is_ignored() {
        let payload = format!(r#"{{"matrix": {FIVE_ROWS}, "k_range": [2, 20000000]}}"#);
        let output = engine().cluster_json(&payload);
        assert!(output.note.starts_with("Ignored invalid k_range"), "{}", output.note);
        assert!(output.validity.alt.len() <= KRange::MAX_K);
        assert_eq!(output.validity.alt.len(), 4);
    }

    #[test]
    fn k_range_at_ceiling_is_accepted() {
        let payload = format!(r#"{{"matrix": {FIVE_ROWS}, "k_range": [2, 64]}}"#);
        let output = engine().cluster_json(&payload);
        assert!(!output.note.contains("Ignored invalid k_range"));
        assert_eq!(output.validity.alt.len(), KRange::MAX_K - 1);
        // Only k = 2 and k = 3 have k + 2 <= 5 vectors
        let attempted = output
            .validity
            .alt
            .iter()
            .filter(|c| c.silhouette.is_some())
            .count();
        assert_eq!(attempted, 2);
    }
}
