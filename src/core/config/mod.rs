//! Configuration types and management for jtbd-insight.
//!
//! Every tunable constant of the extraction rules and the clustering run lives
//! here so it can be revisited without touching pipeline logic. All sections
//! deserialize with defaults, so a partial YAML file is a valid configuration.

pub mod validation;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{JtbdError, Result};
use crate::core::themes::{CoreTheme, CORE_THEME_COUNT};

pub use validation::{validate_bounded_usize, validate_ordered_range, validate_positive_usize};

/// Main configuration for the extraction and clustering engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JtbdConfig {
    /// Segmentation and quantization limits
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Gate, suppression and demotion rules applied after scoring
    #[serde(default)]
    pub rules: RuleConfig,

    /// K-means and model selection settings
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Cluster description settings
    #[serde(default)]
    pub describe: DescribeConfig,
}

impl JtbdConfig {
    /// Load configuration from a file. `.json` files are read as JSON,
    /// anything else as YAML. The result is not validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            JtbdError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(Into::into),
            _ => serde_yaml::from_str(&content).map_err(Into::into),
        }
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| {
            JtbdError::io(format!("Failed to write config file: {}", path.display()), e)
        })
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.extraction.validate()?;
        self.rules.validate()?;
        self.clustering.validate()?;
        self.describe.validate()?;
        Ok(())
    }
}

/// Segmentation and quantization limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum interviews processed per run; extra blocks are truncated
    pub max_interviews: usize,
    /// Maximum sentences kept per interview
    pub max_sentences: usize,
    /// Fragments shorter than this many characters are discarded
    pub min_fragment_chars: usize,
    /// Number of highest-count themes retained per interview
    pub top_themes: usize,
    /// Evidence sentences reported per retained theme
    pub evidence_per_theme: usize,
    /// Length of the display excerpt, in characters
    pub excerpt_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_interviews: 15,
            max_sentences: 60,
            min_fragment_chars: 4,
            top_themes: 3,
            evidence_per_theme: 1,
            excerpt_chars: 120,
        }
    }
}

impl ExtractionConfig {
    /// Validate extraction limits
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.max_interviews, "extraction.max_interviews")?;
        validate_positive_usize(self.max_sentences, "extraction.max_sentences")?;
        validate_positive_usize(self.min_fragment_chars, "extraction.min_fragment_chars")?;
        validate_bounded_usize(self.top_themes, 1, CORE_THEME_COUNT, "extraction.top_themes")?;
        Ok(())
    }
}

/// Post-scoring rules: explicit gates, information suppression, demotions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Themes that only count hits from explicit high-precision cues
    pub gated_themes: Vec<CoreTheme>,
    /// Cap applied to one theme when scheduling or flexibility language is present
    pub suppression: SuppressionRule,
    /// Pairwise demotions applied last
    pub demotions: Vec<DemotionRule>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            gated_themes: vec![
                CoreTheme::Risk,
                CoreTheme::Value,
                CoreTheme::Information,
                CoreTheme::Support,
            ],
            suppression: SuppressionRule::default(),
            demotions: vec![
                DemotionRule {
                    demoted: CoreTheme::Access,
                    dominant: CoreTheme::Flexibility,
                },
                DemotionRule {
                    demoted: CoreTheme::Choice,
                    dominant: CoreTheme::Flexibility,
                },
            ],
        }
    }
}

impl RuleConfig {
    /// Validate rule consistency
    pub fn validate(&self) -> Result<()> {
        self.suppression.validate()?;
        for rule in &self.demotions {
            if rule.demoted == rule.dominant {
                return Err(JtbdError::validation_field(
                    format!("demotion rule cannot demote '{}' under itself", rule.demoted),
                    "rules.demotions",
                ));
            }
        }
        Ok(())
    }
}

/// Caps `target` when scheduling cues or any trigger theme are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressionRule {
    /// Enable the rule
    pub enabled: bool,
    /// Theme whose count gets capped
    pub target: CoreTheme,
    /// Themes whose presence triggers the cap
    pub trigger_themes: Vec<CoreTheme>,
    /// Whether scheduling cues from the lexicon also trigger the cap
    pub trigger_on_scheduling_cues: bool,
    /// Maximum count the target keeps once triggered
    pub cap: u32,
}

impl Default for SuppressionRule {
    fn default() -> Self {
        Self {
            enabled: true,
            target: CoreTheme::Information,
            trigger_themes: vec![CoreTheme::Flexibility],
            trigger_on_scheduling_cues: true,
            cap: 1,
        }
    }
}

impl SuppressionRule {
    /// Validate the suppression rule
    pub fn validate(&self) -> Result<()> {
        if self.trigger_themes.contains(&self.target) {
            return Err(JtbdError::validation_field(
                format!("suppression target '{}' cannot also be a trigger", self.target),
                "rules.suppression.trigger_themes",
            ));
        }
        Ok(())
    }
}

/// When both themes are present, `demoted` is pushed below `dominant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemotionRule {
    /// Theme that must rank below the dominant one
    pub demoted: CoreTheme,
    /// Theme that keeps precedence
    pub dominant: CoreTheme,
}

/// K-means and model selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Smallest k attempted
    pub k_min: usize,
    /// Largest k attempted (inclusive)
    pub k_max: usize,
    /// Hard iteration ceiling per k-means run
    pub max_iterations: usize,
    /// A k is only attempted with at least `k + min_extra_points` vectors
    pub min_extra_points: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k_min: 2,
            k_max: 5,
            max_iterations: 20,
            min_extra_points: 2,
        }
    }
}

impl ClusteringConfig {
    /// Validate clustering settings
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.k_min, "clustering.k_min")?;
        validate_ordered_range(self.k_min, self.k_max, "clustering.k_range")?;
        validate_bounded_usize(self.k_max, 1, KRange::MAX_K, "clustering.k_max")?;
        validate_positive_usize(self.max_iterations, "clustering.max_iterations")?;
        Ok(())
    }

    /// Inclusive k range
    pub fn k_range(&self) -> KRange {
        KRange {
            min: self.k_min,
            max: self.k_max,
        }
    }
}

/// Inclusive range of candidate cluster counts.
///
/// Only constructible through [`KRange::new`], so every range is non-empty,
/// starts at 1 or above and stays at or below [`KRange::MAX_K`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KRange {
    min: usize,
    max: usize,
}

impl KRange {
    /// Largest k any range may reach.
    pub const MAX_K: usize = 64;

    /// Create a range, rejecting `min == 0`, inverted bounds and `max > MAX_K`.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        validate_positive_usize(min, "k_range.min")?;
        validate_ordered_range(min, max, "k_range")?;
        validate_bounded_usize(max, 1, Self::MAX_K, "k_range.max")?;
        Ok(Self { min, max })
    }

    /// Smallest k
    pub fn min(&self) -> usize {
        self.min
    }

    /// Largest k (inclusive)
    pub fn max(&self) -> usize {
        self.max
    }

    /// Candidate ks in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.min..=self.max
    }
}

impl Default for KRange {
    fn default() -> Self {
        ClusteringConfig::default().k_range()
    }
}

/// Cluster description settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeConfig {
    /// Theme keys reported per cluster
    pub top_dims: usize,
    /// Theme keys shown where display space is constrained
    pub compact_top_dims: usize,
    /// Facets reported per cluster
    pub max_facets: usize,
    /// Representative members reported per cluster
    pub max_representatives: usize,
    /// Decimal places for centroid weights and match scores
    pub decimals: u32,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            top_dims: 3,
            compact_top_dims: 2,
            max_facets: 5,
            max_representatives: 2,
            decimals: 2,
        }
    }
}

impl DescribeConfig {
    /// Validate description settings
    pub fn validate(&self) -> Result<()> {
        validate_bounded_usize(self.top_dims, 1, CORE_THEME_COUNT, "describe.top_dims")?;
        validate_bounded_usize(
            self.compact_top_dims,
            1,
            self.top_dims,
            "describe.compact_top_dims",
        )?;
        validate_bounded_usize(self.decimals as usize, 0, 6, "describe.decimals")?;
        Ok(())
    }
}
