//! Cosine k-means with deterministic seeding.
//!
//! ```text
//! Init -> Assign -> ReseedEmpty -> (stable? Terminate : Recompute -> Assign)
//! ```
//!
//! Vectors must already be L2-normalized, so cosine distance is `1 - a·b`.
//! Seeding is positional, never random: two runs over the same input produce
//! identical assignments and centroids.

use serde::Serialize;
use tracing::debug;

use crate::clustering::vectors::{cosine_distance, mean_direction, normalize};
use crate::core::errors::{JtbdError, Result};

/// Marker for a vector not yet assigned to any cluster.
const UNASSIGNED: usize = usize::MAX;

/// Outcome of one k-means run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KMeansRun {
    /// Requested cluster count
    pub k: usize,
    /// Cluster index per input vector
    pub assignments: Vec<usize>,
    /// Unit centroids, one per cluster
    pub centroids: Vec<Vec<f64>>,
    /// Assign passes executed
    pub iterations: usize,
    /// Total empty clusters reseeded
    pub reseeds: usize,
    /// False when the iteration ceiling was hit first
    pub converged: bool,
}

impl KMeansRun {
    /// Member count per cluster, including empty clusters.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &cluster in &self.assignments {
            sizes[cluster] += 1;
        }
        sizes
    }
}

/// Cosine-distance k-means.
#[derive(Debug, Clone, Copy)]
pub struct CosineKMeans {
    k: usize,
    max_iterations: usize,
}

impl CosineKMeans {
    /// Create a clusterer for `k` clusters with a hard iteration ceiling.
    pub fn new(k: usize, max_iterations: usize) -> Self {
        Self { k, max_iterations }
    }

    /// Partition `vectors` into `k` clusters.
    pub fn run(&self, vectors: &[Vec<f64>]) -> Result<KMeansRun> {
        let n = vectors.len();
        if self.k == 0 {
            return Err(JtbdError::clustering("k must be at least 1", Some(self.k)));
        }
        if n < self.k {
            return Err(JtbdError::clustering(
                format!("cannot form {} clusters from {n} vector(s)", self.k),
                Some(self.k),
            ));
        }
        let dimensions = vectors[0].len();
        if vectors.iter().any(|v| v.len() != dimensions) {
            return Err(JtbdError::clustering(
                "vectors have inconsistent dimensionality",
                Some(self.k),
            ));
        }

        let mut centroids = seed(vectors, self.k);
        let mut assignments = vec![UNASSIGNED; n];
        let mut iterations = 0;
        let mut reseeds = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            let changed = assign(vectors, &centroids, &mut assignments);
            let reseeded = reseed_empty_clusters(vectors, &assignments, &mut centroids, iterations);
            iterations += 1;
            reseeds += reseeded.len();

            if !changed && reseeded.is_empty() {
                converged = true;
                break;
            }
            recompute(vectors, &assignments, &mut centroids, &reseeded, dimensions);
        }

        debug!(
            k = self.k,
            iterations, reseeds, converged, "k-means finished"
        );

        Ok(KMeansRun {
            k: self.k,
            assignments,
            centroids,
            iterations,
            reseeds,
            converged,
        })
    }
}

/// Init: centroid `i` is a renormalized copy of vector `i mod n`.
pub fn seed(vectors: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    (0..k).map(|i| normalize(&vectors[i % vectors.len()])).collect()
}

/// Assign: each vector joins its nearest centroid. Ties go to the lowest
/// cluster index. Returns whether any assignment changed.
pub fn assign(vectors: &[Vec<f64>], centroids: &[Vec<f64>], assignments: &mut [usize]) -> bool {
    let mut changed = false;
    for (vector, slot) in vectors.iter().zip(assignments.iter_mut()) {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (cluster, centroid) in centroids.iter().enumerate() {
            let distance = cosine_distance(vector, centroid);
            if distance < best_distance {
                best = cluster;
                best_distance = distance;
            }
        }
        if *slot != best {
            *slot = best;
            changed = true;
        }
    }
    changed
}

/// ReseedEmpty: every cluster without members gets a new centroid copied from
/// vector `(cluster + iteration) mod n`. Returns the reseeded clusters; a
/// non-empty result forces another iteration.
pub fn reseed_empty_clusters(
    vectors: &[Vec<f64>],
    assignments: &[usize],
    centroids: &mut [Vec<f64>],
    iteration: usize,
) -> Vec<usize> {
    let mut occupied = vec![false; centroids.len()];
    for &cluster in assignments {
        if cluster != UNASSIGNED {
            occupied[cluster] = true;
        }
    }

    let mut reseeded = Vec::new();
    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        if occupied[cluster] {
            continue;
        }
        let source = (cluster + iteration) % vectors.len();
        *centroid = normalize(&vectors[source]);
        debug!(cluster, source, iteration, "Reseeded empty cluster");
        reseeded.push(cluster);
    }
    reseeded
}

/// Recompute: each occupied centroid becomes the normalized mean of its
/// members. Freshly reseeded centroids are left alone.
pub fn recompute(
    vectors: &[Vec<f64>],
    assignments: &[usize],
    centroids: &mut [Vec<f64>],
    reseeded: &[usize],
    dimensions: usize,
) {
    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        if reseeded.contains(&cluster) {
            continue;
        }
        let members = vectors
            .iter()
            .zip(assignments)
            .filter(|(_, a)| **a == cluster)
            .map(|(v, _)| v.as_slice());
        if let Some(mean) = mean_direction(members, dimensions) {
            *centroid = mean;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn two_groups() -> Vec<Vec<f64>> {
        let mut vectors = vec![vec![1.0, 0.0]; 3];
        vectors.extend(vec![vec![0.0, 1.0]; 3]);
        vectors
    }

    #[test]
    fn separates_orthogonal_groups() {
        let run = CosineKMeans::new(2, 20).run(&two_groups()).unwrap();
        assert_eq!(run.assignments, vec![1, 1, 1, 0, 0, 0]);
        assert!(run.converged);
        assert_eq!(run.iterations, 3);
        assert_relative_eq!(run.centroids[0][1], 1.0);
        assert_relative_eq!(run.centroids[1][0], 1.0);
    }

    #[test]
    fn identical_runs_are_identical() {
        let vectors = vec![
            normalize(&[1.0, 0.2, 0.0]),
            normalize(&[0.9, 0.1, 0.3]),
            normalize(&[0.0, 1.0, 0.1]),
            normalize(&[0.1, 0.8, 0.6]),
            normalize(&[0.0, 0.0, 1.0]),
        ];
        let a = CosineKMeans::new(3, 20).run(&vectors).unwrap();
        let b = CosineKMeans::new(3, 20).run(&vectors).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seeding_is_positional() {
        let vectors = two_groups();
        let seeds = seed(&vectors, 2);
        assert_eq!(seeds, vec![vec![1.0, 0.0], vec![1.0, 0.0]]);
    }

    #[test]
    fn duplicate_seeds_trigger_reseed() {
        // Seeds 0 and 1 are the same point, so cluster 1 starts empty.
        let run = CosineKMeans::new(2, 20).run(&two_groups()).unwrap();
        assert_eq!(run.reseeds, 1);
        assert_eq!(run.cluster_sizes(), vec![3, 3]);
    }

    #[test]
    fn reseed_step_in_isolation() {
        let vectors = two_groups();
        let mut centroids = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]];
        let assignments = vec![0; 6];
        let reseeded = reseed_empty_clusters(&vectors, &assignments, &mut centroids, 2);
        assert_eq!(reseeded, vec![1, 2]);
        // (1 + 2) % 6 = 3 and (2 + 2) % 6 = 4
        assert_eq!(centroids[1], vec![0.0, 1.0]);
        assert_eq!(centroids[2], vec![0.0, 1.0]);
        assert_eq!(centroids[0], vec![1.0, 0.0]);
    }

    #[test]
    fn assign_breaks_ties_toward_lowest_index() {
        let vectors = vec![normalize(&[1.0, 1.0])];
        let centroids = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let mut assignments = vec![UNASSIGNED];
        assert!(assign(&vectors, &centroids, &mut assignments));
        assert_eq!(assignments, vec![0]);
        assert!(!assign(&vectors, &centroids, &mut assignments));
    }

    #[test]
    fn iteration_ceiling_is_respected() {
        let run = CosineKMeans::new(2, 1).run(&two_groups()).unwrap();
        assert_eq!(run.iterations, 1);
        assert!(!run.converged);
    }

    #[test]
    fn invalid_k_is_an_error() {
        assert!(CosineKMeans::new(0, 20).run(&two_groups()).is_err());
        let err = CosineKMeans::new(7, 20).run(&two_groups()).unwrap_err();
        assert!(matches!(err, JtbdError::Clustering { k: Some(7), .. }));
    }
}
