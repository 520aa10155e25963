//! Clustering: interview matrix -> clusters.
//!
//! ```text
//! InterviewMatrix -> sanitize -> VectorSet -> ModelSelector -> ClusterDescriber
//! ```
//!
//! Like extraction, clustering never fails. Empty input, the small-N guard and
//! a missing reference vector are reported through `note`.

pub mod describe;
pub mod kmeans;
pub mod selection;
pub mod vectors;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::core::config::{ClusteringConfig, DescribeConfig, JtbdConfig, KRange};
use crate::core::matrix::{sanitize_matrix, InterviewMatrix};
use crate::core::themes::CoreTheme;
use crate::extraction::FacetCounts;

pub use describe::{Assignment, ClusterDescriber, ClusterSummary, Description};
pub use kmeans::{CosineKMeans, KMeansRun};
pub use selection::{silhouette, KCandidate, ModelSelection, ModelSelector};
pub use vectors::{cosine_distance, cosine_similarity, normalize, VectorSet};

/// Everything one clustering run needs.
#[derive(Debug, Clone)]
pub struct ClusterInput<'a> {
    /// Matrix to cluster
    pub matrix: &'a InterviewMatrix,
    /// Candidate k range; the configured range when `None`
    pub k_range: Option<KRange>,
    /// Reference ("problem statement") theme names
    pub reference: Vec<String>,
    /// Per-interview facet counts for cluster descriptions
    pub facets: IndexMap<String, FacetCounts>,
}

impl<'a> ClusterInput<'a> {
    /// Input with no reference, no facets and the configured k range.
    pub fn new(matrix: &'a InterviewMatrix) -> Self {
        Self {
            matrix,
            k_range: None,
            reference: Vec::new(),
            facets: IndexMap::new(),
        }
    }

    /// Override the k range.
    pub fn with_k_range(mut self, k_range: KRange) -> Self {
        self.k_range = Some(k_range);
        self
    }

    /// Attach reference theme names.
    pub fn with_reference<S: Into<String>>(mut self, themes: impl IntoIterator<Item = S>) -> Self {
        self.reference = themes.into_iter().map(Into::into).collect();
        self
    }

    /// Attach per-interview facet counts.
    pub fn with_facets(mut self, facets: IndexMap<String, FacetCounts>) -> Self {
        self.facets = facets;
        self
    }
}

/// Silhouette of the chosen model plus every explored k.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validity {
    /// Mean silhouette of the selected clustering
    pub silhouette: f64,
    /// `(k, silhouette)` for every k in range; null for skipped k
    pub alt: Vec<KCandidate>,
}

/// Result of one clustering run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusteringOutput {
    /// Selected cluster count (number of clusters returned)
    pub k_selected: usize,
    /// Model selection transparency
    pub validity: Validity,
    /// Clusters, ids contiguous from 0
    pub clusters: Vec<ClusterSummary>,
    /// Cluster per clustered interview, in matrix order
    pub assignments: Vec<Assignment>,
    /// Informational notes, space separated
    pub note: String,
    /// Interviews left out because no positive weight survived sanitization
    pub excluded: Vec<String>,
    /// True when the single-cluster small-N fallback was used
    pub fallback: bool,
}

impl ClusteringOutput {
    /// Structurally valid empty result carrying a note.
    pub fn empty(note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..Self::default()
        }
    }

    /// Compact top dimensions per cluster, for constrained displays.
    pub fn compact_top_dims(&self, n: usize) -> Vec<Vec<CoreTheme>> {
        self.clusters.iter().map(|c| c.top_dims_n(n)).collect()
    }
}

/// Clusters interview matrices with silhouette-based model selection.
#[derive(Debug, Clone)]
pub struct ThemeClusterer {
    clustering: ClusteringConfig,
    describe: DescribeConfig,
}

impl ThemeClusterer {
    /// Create a clusterer from configuration.
    pub fn new(config: &JtbdConfig) -> Self {
        Self {
            clustering: config.clustering.clone(),
            describe: config.describe.clone(),
        }
    }

    /// Cluster one matrix.
    pub fn cluster(&self, input: &ClusterInput<'_>) -> ClusteringOutput {
        let sanitized = sanitize_matrix(input.matrix);
        let mut notes = sanitized.notes();
        let excluded = sanitized.excluded.clone();

        let vectors = VectorSet::from_rows(&sanitized.rows);
        if vectors.is_empty() {
            notes.insert(
                0,
                "No interview has a positive theme weight, so there is nothing to cluster."
                    .to_string(),
            );
            return ClusteringOutput {
                excluded,
                ..ClusteringOutput::empty(notes.join(" "))
            };
        }

        let reference = self.reference_vector(&vectors, &input.reference, &mut notes);
        let describer = ClusterDescriber::new(&self.describe);
        let range = input.k_range.unwrap_or_else(|| self.clustering.k_range());
        let selection = ModelSelector::new(&self.clustering).select(&vectors.vectors, range);

        let (description, silhouette, fallback) = match &selection.best {
            Some((run, score)) => {
                let description =
                    describer.describe(&vectors, &run.assignments, &input.facets, reference.as_deref());
                if description.clusters.is_empty() {
                    (self.fallback(&describer, &vectors, input, reference.as_deref(), &mut notes), 0.0, true)
                } else {
                    (description, *score, false)
                }
            }
            None => {
                let needed = range.min().saturating_add(self.clustering.min_extra_points);
                warn!(
                    "Only {} interview(s) to cluster; k={} needs at least {}",
                    vectors.len(),
                    range.min(),
                    needed
                );
                notes.insert(
                    0,
                    format!(
                        "Small-N fallback: only {} interview(s) have theme weights and at least {} \
                         are needed to compare clusterings, so all interviews form one cluster.",
                        vectors.len(),
                        needed
                    ),
                );
                (self.fallback(&describer, &vectors, input, reference.as_deref(), &mut notes), 0.0, true)
            }
        };

        info!(
            "Clustered {} interview(s) into {} cluster(s)",
            vectors.len(),
            description.clusters.len()
        );

        ClusteringOutput {
            k_selected: description.clusters.len(),
            validity: Validity {
                silhouette,
                alt: selection.explored,
            },
            clusters: description.clusters,
            assignments: description.assignments,
            note: notes.join(" "),
            excluded,
            fallback,
        }
    }

    /// One cluster holding every vector.
    fn fallback(
        &self,
        describer: &ClusterDescriber,
        vectors: &VectorSet,
        input: &ClusterInput<'_>,
        reference: Option<&[f64]>,
        notes: &mut Vec<String>,
    ) -> Description {
        if !notes.iter().any(|n| n.starts_with("Small-N fallback")) {
            notes.insert(
                0,
                "Small-N fallback: no clustering produced a non-empty cluster, so all interviews form one cluster."
                    .to_string(),
            );
        }
        describer.describe(vectors, &vec![0; vectors.len()], &input.facets, reference)
    }

    /// Indicator vector for the reference themes; `None` with a note when it
    /// would be empty or all zero.
    fn reference_vector(
        &self,
        vectors: &VectorSet,
        names: &[String],
        notes: &mut Vec<String>,
    ) -> Option<Vec<f64>> {
        let themes: Vec<CoreTheme> = names.iter().filter_map(|n| CoreTheme::parse_key(n)).collect();
        if themes.is_empty() {
            notes.push("No problem-statement themes supplied; ps_match is 0 for every cluster.".to_string());
            return None;
        }
        let reference = vectors.indicator(&themes);
        if reference.iter().all(|x| *x == 0.0) {
            notes.push(
                "Problem-statement themes do not occur in any clustered interview; ps_match is 0 for every cluster."
                    .to_string(),
            );
            return None;
        }
        Some(reference)
    }
}
