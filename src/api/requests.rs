//! JSON request types accepted by the engine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::config::KRange;
use crate::core::errors::{JtbdError, Result};
use crate::core::matrix::InterviewMatrix;
use crate::extraction::FacetCounts;

/// A clustering request as sent by an external caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRequest {
    /// `[[id, {theme: weight}], ...]`
    pub matrix: InterviewMatrix,
    /// Reference theme names for `ps_match`
    #[serde(default)]
    pub reference: Vec<String>,
    /// Inclusive `[k_min, k_max]`
    #[serde(default)]
    pub k_range: Option<(usize, usize)>,
    /// Per-interview facet counts
    #[serde(default)]
    pub facets: IndexMap<String, FacetCounts>,
}

/// Either a full request object or a bare matrix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ClusterPayload {
    Request(ClusterRequest),
    Matrix(InterviewMatrix),
}

impl ClusterRequest {
    /// Parse a JSON payload. A bare matrix array is accepted as well.
    pub fn from_json(payload: &str) -> Result<Self> {
        if payload.trim().is_empty() {
            return Err(JtbdError::validation("cluster payload is empty"));
        }
        let parsed: ClusterPayload = serde_json::from_str(payload)?;
        Ok(match parsed {
            ClusterPayload::Request(request) => request,
            ClusterPayload::Matrix(matrix) => Self {
                matrix,
                ..Self::default()
            },
        })
    }

    /// The requested k range, validated. `Ok(None)` when none was requested.
    pub fn k_range(&self) -> Result<Option<KRange>> {
        self.k_range
            .map(|(min, max)| KRange::new(min, max))
            .transpose()
    }
}
