//! The interview matrix: the contract shared by extraction and clustering.
//!
//! A matrix is an ordered list of `[id, {theme: weight}]` pairs. Extraction
//! emits quantized [`Magnitude`] weights; callers may also hand in matrices
//! built elsewhere, so incoming weights are kept as [`RawWeight`] and run
//! through [`sanitize_matrix`] before any vector is built.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::errors::{JtbdError, Result};
use crate::core::themes::{CoreTheme, Magnitude};

/// A weight as it arrives from a caller, before sanitization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawWeight {
    /// Numeric weight, clamped to `[0, 1]` during sanitization.
    Number(f64),
    /// String synonym such as `"low"` or `"high"`.
    Text(String),
    /// Anything else (booleans, nulls, nested values); always discarded.
    Other(serde_json::Value),
}

impl From<f64> for RawWeight {
    fn from(value: f64) -> Self {
        RawWeight::Number(value)
    }
}

impl From<Magnitude> for RawWeight {
    fn from(value: Magnitude) -> Self {
        RawWeight::Number(value.weight())
    }
}

/// Theme key -> raw weight, in insertion order.
pub type WeightMap = IndexMap<String, RawWeight>;

/// One `[id, {theme: weight}]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow(pub String, pub WeightMap);

impl MatrixRow {
    /// Interview identifier.
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Raw weights keyed by theme name.
    pub fn weights(&self) -> &WeightMap {
        &self.1
    }
}

/// Ordered `(interview id, weights)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterviewMatrix {
    rows: Vec<MatrixRow>,
}

impl InterviewMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row; ids must be unique within a matrix.
    pub fn push(&mut self, id: impl Into<String>, weights: WeightMap) -> Result<()> {
        let id = id.into();
        if self.rows.iter().any(|row| row.0 == id) {
            return Err(JtbdError::validation_field(
                format!("duplicate interview id '{id}'"),
                "matrix",
            ));
        }
        self.rows.push(MatrixRow(id, weights));
        Ok(())
    }

    /// Append a quantized row produced by extraction.
    pub fn push_theme_weights(&mut self, id: impl Into<String>, weights: &ThemeWeightMap) -> Result<()> {
        self.push(id, weights.to_weight_map())
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Interview ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(MatrixRow::id)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<MatrixRow> for InterviewMatrix {
    fn from_iter<T: IntoIterator<Item = MatrixRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Per-interview quantized weights for at most the top three themes.
///
/// Themes that were not retained are absent; zero is never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThemeWeightMap(IndexMap<CoreTheme, Magnitude>);

impl ThemeWeightMap {
    /// Build from ranked `(theme, magnitude)` pairs.
    pub fn from_ranked(ranked: impl IntoIterator<Item = (CoreTheme, Magnitude)>) -> Self {
        Self(ranked.into_iter().collect())
    }

    /// Magnitude for a theme, if retained.
    pub fn get(&self, theme: CoreTheme) -> Option<Magnitude> {
        self.0.get(&theme).copied()
    }

    /// Retained themes in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (CoreTheme, Magnitude)> + '_ {
        self.0.iter().map(|(theme, magnitude)| (*theme, *magnitude))
    }

    /// Number of retained themes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no theme cleared the bar ("no clear theme").
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into the string-keyed matrix representation.
    pub fn to_weight_map(&self) -> WeightMap {
        self.0
            .iter()
            .map(|(theme, magnitude)| (theme.as_str().to_string(), RawWeight::from(*magnitude)))
            .collect()
    }
}

/// A row that survived sanitization: only positive weights on known themes.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedRow {
    /// Interview identifier
    pub id: String,
    /// Positive weights in `(0, 1]`
    pub weights: BTreeMap<CoreTheme, f64>,
}

/// Outcome of sanitizing an incoming matrix.
#[derive(Debug, Clone, Default)]
pub struct SanitizedMatrix {
    /// Rows eligible for clustering, in original order
    pub rows: Vec<SanitizedRow>,
    /// Ids of rows with no positive weight after sanitization
    pub excluded: Vec<String>,
    /// `(id, key)` pairs dropped because the key is not a core theme
    pub dropped_keys: Vec<(String, String)>,
    /// Ids that appeared more than once; later occurrences were ignored
    pub duplicate_ids: Vec<String>,
}

impl SanitizedMatrix {
    /// Human-readable notes describing anything sanitization discarded.
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.dropped_keys.is_empty() {
            let mut keys: Vec<&str> = self.dropped_keys.iter().map(|(_, k)| k.as_str()).collect();
            keys.sort_unstable();
            keys.dedup();
            notes.push(format!(
                "Ignored {} weight(s) on unrecognized theme keys: {}.",
                self.dropped_keys.len(),
                keys.join(", ")
            ));
        }
        if !self.duplicate_ids.is_empty() {
            notes.push(format!(
                "Duplicate interview ids ignored after first occurrence: {}.",
                self.duplicate_ids.join(", ")
            ));
        }
        if !self.excluded.is_empty() {
            notes.push(format!(
                "Excluded {} interview(s) with no positive theme weight: {}.",
                self.excluded.len(),
                self.excluded.join(", ")
            ));
        }
        notes
    }
}

/// Sanitize one incoming weight.
///
/// Numbers are clamped to `[0, 1]`, recognized synonyms map onto the three
/// magnitudes, and everything else (including NaN) is discarded.
pub fn sanitize_weight(raw: &RawWeight) -> Option<f64> {
    match raw {
        RawWeight::Number(value) if value.is_finite() => Some(value.clamp(0.0, 1.0)),
        RawWeight::Number(_) => None,
        RawWeight::Text(text) => Magnitude::from_synonym(text).map(Magnitude::weight),
        RawWeight::Other(_) => None,
    }
}

/// Sanitize a whole matrix, preserving row order.
pub fn sanitize_matrix(matrix: &InterviewMatrix) -> SanitizedMatrix {
    let mut report = SanitizedMatrix::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for row in matrix.rows() {
        if !seen.insert(row.id()) {
            report.duplicate_ids.push(row.id().to_string());
            continue;
        }

        let mut weights = BTreeMap::new();
        for (key, raw) in row.weights() {
            let Some(theme) = CoreTheme::parse_key(key) else {
                report.dropped_keys.push((row.id().to_string(), key.clone()));
                continue;
            };
            if let Some(weight) = sanitize_weight(raw) {
                if weight > 0.0 {
                    weights.insert(theme, weight);
                }
            }
        }

        if weights.is_empty() {
            report.excluded.push(row.id().to_string());
        } else {
            report.rows.push(SanitizedRow {
                id: row.id().to_string(),
                weights,
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, weights: &[(&str, RawWeight)]) -> MatrixRow {
        MatrixRow(
            id.to_string(),
            weights
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn matrix_deserializes_from_pair_arrays() {
        let json = r#"[["i1", {"cost": 0.67, "time": "low"}], ["i2", {}]]"#;
        let matrix: InterviewMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.ids().collect::<Vec<_>>(), vec!["i1", "i2"]);
        assert_eq!(
            matrix.rows()[0].weights().get("time"),
            Some(&RawWeight::Text("low".into()))
        );
    }

    #[test]
    fn push_rejects_duplicate_ids() {
        let mut matrix = InterviewMatrix::new();
        matrix.push("i1", WeightMap::new()).unwrap();
        assert!(matrix.push("i1", WeightMap::new()).is_err());
    }

    #[test]
    fn sanitize_weight_clamps_and_maps_synonyms() {
        assert_eq!(sanitize_weight(&RawWeight::Number(1.7)), Some(1.0));
        assert_eq!(sanitize_weight(&RawWeight::Number(-0.2)), Some(0.0));
        assert_eq!(sanitize_weight(&RawWeight::Number(f64::NAN)), None);
        assert_eq!(sanitize_weight(&RawWeight::Text("Medium".into())), Some(0.67));
        assert_eq!(sanitize_weight(&RawWeight::Text("lots".into())), None);
        assert_eq!(
            sanitize_weight(&RawWeight::Other(serde_json::Value::Bool(true))),
            None
        );
    }

    #[test]
    fn sanitize_matrix_drops_unknown_keys_and_excludes_empty_rows() {
        let matrix: InterviewMatrix = vec![
            row("i1", &[("cost", 0.5.into()), ("luck", 1.0.into())]),
            row("i2", &[("time", 0.0.into()), ("mood", "high".into())]),
            row("i1", &[("trust", 1.0.into())]),
        ]
        .into_iter()
        .collect();

        let report = sanitize_matrix(&matrix);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].id, "i1");
        assert_eq!(report.rows[0].weights.get(&CoreTheme::Cost), Some(&0.5));
        assert_eq!(report.excluded, vec!["i2".to_string()]);
        assert_eq!(report.duplicate_ids, vec!["i1".to_string()]);
        assert_eq!(report.dropped_keys.len(), 2);
        assert_eq!(report.notes().len(), 3);
    }

    #[test]
    fn theme_weight_map_serializes_as_plain_object() {
        let map = ThemeWeightMap::from_ranked([
            (CoreTheme::Cost, Magnitude::High),
            (CoreTheme::Support, Magnitude::Low),
        ]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"cost":1.0,"support":0.33}"#);
    }

    impl From<&str> for RawWeight {
        fn from(value: &str) -> Self {
            RawWeight::Text(value.to_string())
        }
    }
}
