//! Vector builder: sanitized weight maps -> dense L2-normalized vectors.

use serde::Serialize;

use crate::core::matrix::SanitizedRow;
use crate::core::themes::CoreTheme;

/// Norms below this are treated as zero.
pub const NORM_EPSILON: f64 = 1e-10;

/// Dense vectors over the key universe of one matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VectorSet {
    /// Key universe: every theme with a positive weight somewhere, sorted by name
    pub keys: Vec<CoreTheme>,
    /// Interview ids, aligned with `vectors`
    pub ids: Vec<String>,
    /// L2-normalized vectors over `keys`
    pub vectors: Vec<Vec<f64>>,
}

impl VectorSet {
    /// Build vectors from sanitized rows, preserving row order.
    pub fn from_rows(rows: &[SanitizedRow]) -> Self {
        let mut keys: Vec<CoreTheme> = rows
            .iter()
            .flat_map(|row| row.weights.iter())
            .filter(|(_, weight)| **weight > 0.0)
            .map(|(theme, _)| *theme)
            .collect();
        keys.sort_by_key(|theme| theme.as_str());
        keys.dedup();

        let vectors = rows
            .iter()
            .map(|row| {
                let dense: Vec<f64> = keys
                    .iter()
                    .map(|key| row.weights.get(key).copied().unwrap_or(0.0))
                    .collect();
                normalize(&dense)
            })
            .collect();

        Self {
            keys,
            ids: rows.iter().map(|row| row.id.clone()).collect(),
            vectors,
        }
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the set holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimensionality (size of the key universe).
    pub fn dimensions(&self) -> usize {
        self.keys.len()
    }

    /// Unit vector over the key universe with 1.0 on every listed theme.
    ///
    /// Themes outside the universe contribute nothing; if none of them is in
    /// the universe the result is all zeros.
    pub fn indicator(&self, themes: &[CoreTheme]) -> Vec<f64> {
        let dense: Vec<f64> = self
            .keys
            .iter()
            .map(|key| if themes.contains(key) { 1.0 } else { 0.0 })
            .collect();
        normalize(&dense)
    }
}

/// Scale a vector to unit length; near-zero vectors are returned unchanged.
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let norm = l2_norm(v);
    if norm < NORM_EPSILON {
        v.to_vec()
    } else {
        v.iter().map(|x| x / norm).collect()
    }
}

/// Euclidean length.
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Dot product over the shorter of the two slices.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity between arbitrary vectors; 0 when either is zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        0.0
    } else {
        (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

/// Cosine distance between unit vectors: `1 - a·b`.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    1.0 - dot(a, b)
}

/// Normalized mean of a set of vectors; `None` when the set is empty.
pub fn mean_direction<'a>(
    members: impl IntoIterator<Item = &'a [f64]>,
    dimensions: usize,
) -> Option<Vec<f64>> {
    let mut sum = vec![0.0; dimensions];
    let mut count = 0usize;
    for member in members {
        for (acc, x) in sum.iter_mut().zip(member) {
            *acc += x;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let mean: Vec<f64> = sum.iter().map(|x| x / count as f64).collect();
    Some(normalize(&mean))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
