//! Cluster describer: turns a clustering into user-facing summaries.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::clustering::vectors::{cosine_similarity, mean_direction, round_to, VectorSet};
use crate::core::config::DescribeConfig;
use crate::core::themes::CoreTheme;
use crate::extraction::FacetCounts;

/// Summary of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Zero-based cluster id, contiguous after empty clusters are dropped
    pub id: usize,
    /// Member count
    pub size: usize,
    /// Rounded unit centroid over the key universe
    pub centroid: IndexMap<CoreTheme, f64>,
    /// Highest-weighted themes, descending
    pub top_dims: Vec<CoreTheme>,
    /// Most frequent member facets
    pub top_facets: Vec<String>,
    /// Members closest to the centroid
    pub representatives: Vec<String>,
    /// Cosine similarity to the reference vector; 0 when unavailable
    pub ps_match: f64,
    #[serde(skip)]
    ranked_dims: Vec<CoreTheme>,
}

impl ClusterSummary {
    /// The `n` highest-weighted themes with a positive centroid weight.
    pub fn top_dims_n(&self, n: usize) -> Vec<CoreTheme> {
        self.ranked_dims.iter().copied().take(n).collect()
    }
}

/// `{id, cluster}` pair in interview order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Interview id
    pub id: String,
    /// Cluster id
    pub cluster: usize,
}

/// Clusters and assignments ready for output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Description {
    /// Non-empty clusters
    pub clusters: Vec<ClusterSummary>,
    /// One entry per vector
    pub assignments: Vec<Assignment>,
}

/// Builds [`ClusterSummary`] values from a finished clustering.
#[derive(Debug, Clone)]
pub struct ClusterDescriber {
    config: DescribeConfig,
}

impl ClusterDescriber {
    /// Create a describer.
    pub fn new(config: &DescribeConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Describe a clustering of `vectors`.
    ///
    /// Clusters without members are dropped and the remaining ids renumbered
    /// in ascending order of the original cluster index. `reference`, when
    /// present, must be a vector over the same key universe.
    pub fn describe(
        &self,
        vectors: &VectorSet,
        assignments: &[usize],
        facets: &IndexMap<String, FacetCounts>,
        reference: Option<&[f64]>,
    ) -> Description {
        let cluster_count = assignments.iter().copied().max().map_or(0, |m| m + 1);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); cluster_count];
        for (idx, &cluster) in assignments.iter().enumerate() {
            members[cluster].push(idx);
        }

        let mut remap = vec![None; cluster_count];
        let mut clusters = Vec::new();
        for (original, member_idx) in members.iter().enumerate() {
            if member_idx.is_empty() {
                continue;
            }
            let id = clusters.len();
            remap[original] = Some(id);
            clusters.push(self.summarize(id, vectors, member_idx, facets, reference));
        }

        let assignments = assignments
            .iter()
            .zip(&vectors.ids)
            .filter_map(|(&cluster, id)| {
                remap[cluster].map(|cluster| Assignment {
                    id: id.clone(),
                    cluster,
                })
            })
            .collect();

        Description {
            clusters,
            assignments,
        }
    }

    fn summarize(
        &self,
        id: usize,
        vectors: &VectorSet,
        member_idx: &[usize],
        facets: &IndexMap<String, FacetCounts>,
        reference: Option<&[f64]>,
    ) -> ClusterSummary {
        let centroid = mean_direction(
            member_idx.iter().map(|&i| vectors.vectors[i].as_slice()),
            vectors.dimensions(),
        )
        .unwrap_or_else(|| vec![0.0; vectors.dimensions()]);

        let ranked_dims = rank_dimensions(&vectors.keys, &centroid);

        let ps_match = reference
            .map(|r| round_to(cosine_similarity(&centroid, r), self.config.decimals))
            .unwrap_or(0.0);

        let mut by_closeness: Vec<(usize, f64)> = member_idx
            .iter()
            .map(|&i| (i, cosine_similarity(&vectors.vectors[i], &centroid)))
            .collect();
        by_closeness.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let member_ids: Vec<&str> = member_idx.iter().map(|&i| vectors.ids[i].as_str()).collect();

        ClusterSummary {
            id,
            size: member_idx.len(),
            centroid: vectors
                .keys
                .iter()
                .zip(&centroid)
                .map(|(key, value)| (*key, round_to(*value, self.config.decimals)))
                .collect(),
            top_dims: ranked_dims.iter().copied().take(self.config.top_dims).collect(),
            top_facets: rank_facets(&member_ids, facets, self.config.max_facets),
            representatives: by_closeness
                .into_iter()
                .take(self.config.max_representatives)
                .map(|(i, _)| vectors.ids[i].clone())
                .collect(),
            ps_match,
            ranked_dims,
        }
    }
}

/// Themes with a positive centroid weight, heaviest first; ties by priority.
fn rank_dimensions(keys: &[CoreTheme], centroid: &[f64]) -> Vec<CoreTheme> {
    let mut ranked: Vec<(CoreTheme, f64)> = keys
        .iter()
        .copied()
        .zip(centroid.iter().copied())
        .filter(|(_, w)| *w > 0.0)
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.priority().cmp(&b.0.priority()))
    });
    ranked.into_iter().map(|(theme, _)| theme).collect()
}

/// Facets ranked by how many members mention them, then total hits, then label.
fn rank_facets(
    member_ids: &[&str],
    facets: &IndexMap<String, FacetCounts>,
    limit: usize,
) -> Vec<String> {
    let mut tally: BTreeMap<&str, (usize, u32)> = BTreeMap::new();
    for id in member_ids {
        let Some(counts) = facets.get(*id) else { continue };
        for (label, &hits) in counts {
            if hits == 0 {
                continue;
            }
            let entry = tally.entry(label.as_str()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += hits;
        }
    }

    let mut ranked: Vec<(&str, (usize, u32))> = tally.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(label, _)| label.to_string())
        .collect()
}
