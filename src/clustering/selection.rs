//! Model selection: silhouette scoring across a range of k.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clustering::kmeans::{CosineKMeans, KMeansRun};
use crate::clustering::vectors::cosine_distance;
use crate::core::config::{ClusteringConfig, KRange};

/// One explored k. `silhouette` is `None` when the k was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KCandidate {
    /// Cluster count
    pub k: usize,
    /// Mean silhouette, or null when the k was not attempted
    pub silhouette: Option<f64>,
}

/// Best run and the full exploration log.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    /// Highest-scoring run and its silhouette, if any k could be attempted
    pub best: Option<(KMeansRun, f64)>,
    /// Every k in range, ascending, including skipped ones
    pub explored: Vec<KCandidate>,
}

impl ModelSelection {
    /// Whether every k in range was skipped.
    pub fn is_small_n(&self) -> bool {
        self.best.is_none()
    }
}

/// Mean cosine silhouette of a clustering.
///
/// For vector `i`: `a` is the mean distance to the other members of its own
/// cluster (0 for a singleton), `b` the smallest mean distance to any other
/// non-empty cluster. `s = (b - a) / max(a, b)`, or 0 when both are 0. Vectors
/// for which `b` cannot be computed are left out of the mean; with none left
/// the score is 0.
pub fn silhouette(vectors: &[Vec<f64>], assignments: &[usize], k: usize) -> f64 {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (idx, &cluster) in assignments.iter().enumerate() {
        members[cluster].push(idx);
    }

    let mean_distance = |i: usize, cluster: &[usize]| -> Option<f64> {
        let others: Vec<f64> = cluster
            .iter()
            .filter(|&&j| j != i)
            .map(|&j| cosine_distance(&vectors[i], &vectors[j]))
            .collect();
        if others.is_empty() {
            None
        } else {
            Some(others.iter().sum::<f64>() / others.len() as f64)
        }
    };

    let mut total = 0.0;
    let mut counted = 0usize;
    for (i, &own) in assignments.iter().enumerate() {
        let a = mean_distance(i, members[own].as_slice()).unwrap_or(0.0);
        let b = members
            .iter()
            .enumerate()
            .filter(|(cluster, m)| *cluster != own && !m.is_empty())
            .filter_map(|(_, m)| mean_distance(i, m.as_slice()))
            .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))));

        let Some(b) = b else { continue };
        let denom = a.max(b);
        let s = if denom == 0.0 { 0.0 } else { (b - a) / denom };
        if s.is_finite() {
            total += s;
            counted += 1;
        }
    }

    if counted == 0 {
        0.0
    } else {
        total / counted as f64
    }
}

/// Runs k-means for every k in range and keeps the best silhouette.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    max_iterations: usize,
    min_extra_points: usize,
}

impl ModelSelector {
    /// Create a selector from clustering settings.
    pub fn new(config: &ClusteringConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            min_extra_points: config.min_extra_points,
        }
    }

    /// Smallest vector count at which `k` may be attempted.
    pub fn required_points(&self, k: usize) -> usize {
        k.saturating_add(self.min_extra_points)
    }

    /// Scan `range` in ascending order. Ties keep the lowest k.
    pub fn select(&self, vectors: &[Vec<f64>], range: KRange) -> ModelSelection {
        let n = vectors.len();
        let mut best: Option<(KMeansRun, f64)> = None;
        let mut explored = Vec::new();

        for k in range.iter() {
            if n < self.required_points(k) {
                debug!(k, n, "Skipping k: needs at least {} vectors", self.required_points(k));
                explored.push(KCandidate { k, silhouette: None });
                continue;
            }

            let run = match CosineKMeans::new(k, self.max_iterations).run(vectors) {
                Ok(run) => run,
                Err(err) => {
                    debug!(k, "Skipping k: {}", err);
                    explored.push(KCandidate { k, silhouette: None });
                    continue;
                }
            };

            let score = silhouette(vectors, &run.assignments, k);
            debug!(k, score, iterations = run.iterations, "Scored k");
            explored.push(KCandidate {
                k,
                silhouette: Some(score),
            });

            if best.as_ref().map_or(true, |(_, top)| score > *top) {
                best = Some((run, score));
            }
        }

        if let Some((run, score)) = &best {
            info!("Selected k={} with silhouette {:.3}", run.k, score);
        }

        ModelSelection { best, explored }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn separated(per_group: usize) -> Vec<Vec<f64>> {
        let mut vectors = vec![vec![1.0, 0.0]; per_group];
        vectors.extend(vec![vec![0.0, 1.0]; per_group]);
        vectors
    }

    #[test]
    fn perfect_split_scores_one() {
        let vectors = separated(3);
        assert_relative_eq!(silhouette(&vectors, &[0, 0, 0, 1, 1, 1], 2), 1.0);
    }

    #[test]
    fn single_cluster_scores_zero() {
        let vectors = separated(2);
        assert_eq!(silhouette(&vectors, &[0, 0, 0, 0], 1), 0.0);
    }

    #[test]
    fn bad_split_scores_negative() {
        let vectors = separated(2);
        assert!(silhouette(&vectors, &[0, 1, 0, 1], 2) < 0.0);
    }

    #[test]
    fn empty_cluster_is_ignored_for_b() {
        let vectors = separated(2);
        assert_relative_eq!(silhouette(&vectors, &[0, 0, 2, 2], 3), 1.0);
    }

    #[test]
    fn separated_groups_select_k2() {
        let selection = ModelSelector::new(&ClusteringConfig::default())
            .select(&separated(5), KRange::default());
        let (run, score) = selection.best.expect("some k attempted");
        assert_eq!(run.k, 2);
        assert!(score > 0.5);
        let ks: Vec<usize> = selection.explored.iter().map(|c| c.k).collect();
        assert_eq!(ks, vec![2, 3, 4, 5]);
    }

    #[test]
    fn too_few_vectors_skips_every_k() {
        let selection = ModelSelector::new(&ClusteringConfig::default())
            .select(&separated(1), KRange::default());
        assert!(selection.is_small_n());
        assert!(selection.explored.iter().all(|c| c.silhouette.is_none()));
        assert_eq!(selection.explored.len(), 4);
    }

    #[test]
    fn required_points_saturates() {
        let config = ClusteringConfig {
            min_extra_points: usize::MAX,
            ..ClusteringConfig::default()
        };
        let selector = ModelSelector::new(&config);
        assert_eq!(selector.required_points(3), usize::MAX);
        assert!(selector.select(&separated(5), KRange::default()).is_small_n());
    }

    #[test]
    fn skipped_candidate_serializes_null() {
        let json = serde_json::to_string(&KCandidate { k: 4, silhouette: None }).unwrap();
        assert_eq!(json, r#"{"k":4,"silhouette":null}"#);
    }
}
