//! Theme extraction: raw interview notes -> interview matrix.
//!
//! ```text
//! text -> Segmenter -> ThemeScorer -> Quantizer -> InterviewMatrix
//! ```
//!
//! Extraction never fails. Segmentation ambiguity and interviews without a
//! clear theme surface as warnings on [`ExtractionOutput`].

pub mod lexicon;
pub mod quantizer;
pub mod scorer;
pub mod segmenter;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::{ExtractionConfig, JtbdConfig};
use crate::core::matrix::{InterviewMatrix, ThemeWeightMap};
use crate::core::themes::CoreTheme;

pub use lexicon::{CueLexicon, CuePrecision};
pub use quantizer::{rank_themes, Quantizer, ThemeCounts};
pub use scorer::{RuleStage, ScoreRecord, SentenceScore, ThemeScorer};
pub use segmenter::{InterviewBlock, Segmentation, SegmentationConfidence, Segmenter};

/// Facet label -> hit count.
pub type FacetCounts = BTreeMap<String, u32>;

/// A retained theme as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeBadge {
    /// Core theme
    pub theme: CoreTheme,
    /// Quantized weight
    pub weight: f64,
    /// Low / Med / High
    pub level: &'static str,
    /// Raw hit count after rule stages
    pub hits: u32,
}

/// Per-interview descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewDisplay {
    /// Interview id
    pub id: String,
    /// Number of sentences analysed
    pub sentence_count: usize,
    /// Leading excerpt of the interview text
    pub excerpt: String,
    /// Retained themes in rank order
    pub themes: Vec<ThemeBadge>,
    /// Facet hit counts
    pub facets: FacetCounts,
    /// Evidence sentences per retained theme
    pub evidence: IndexMap<CoreTheme, Vec<String>>,
    /// True when no theme had a single hit
    pub no_clear_theme: bool,
}

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutput {
    /// `[[id, {theme: weight}], ...]`
    pub matrix: InterviewMatrix,
    /// Display metadata, one entry per interview in matrix order
    pub display: Vec<InterviewDisplay>,
    /// User-facing warnings
    pub warnings: Vec<String>,
    /// Confidence in the interview split
    pub confidence: SegmentationConfidence,
}

impl ExtractionOutput {
    /// Facet counts keyed by interview id, for the cluster describer.
    pub fn facets_by_id(&self) -> IndexMap<String, FacetCounts> {
        self.display
            .iter()
            .map(|d| (d.id.clone(), d.facets.clone()))
            .collect()
    }

    /// Ids of interviews flagged with no clear theme.
    pub fn no_signal_ids(&self) -> impl Iterator<Item = &str> {
        self.display
            .iter()
            .filter(|d| d.no_clear_theme)
            .map(|d| d.id.as_str())
    }
}

/// Runs segmentation, scoring and quantization over raw text.
#[derive(Debug)]
pub struct ThemeExtractor<'a> {
    config: ExtractionConfig,
    segmenter: Segmenter,
    scorer: ThemeScorer<'a>,
    quantizer: Quantizer,
}

impl ThemeExtractor<'static> {
    /// Extractor over the built-in lexicon.
    pub fn new(config: &JtbdConfig) -> Self {
        Self::with_lexicon(CueLexicon::builtin(), config)
    }
}

impl<'a> ThemeExtractor<'a> {
    /// Extractor over a custom lexicon.
    pub fn with_lexicon(lexicon: &'a CueLexicon, config: &JtbdConfig) -> Self {
        Self {
            config: config.extraction.clone(),
            segmenter: Segmenter::new(&config.extraction),
            scorer: ThemeScorer::with_lexicon(lexicon, &config.rules),
            quantizer: Quantizer::new(config.extraction.top_themes),
        }
    }

    /// Access the underlying scorer.
    pub fn scorer(&self) -> &ThemeScorer<'a> {
        &self.scorer
    }

    /// Extract the interview matrix from raw notes.
    pub fn extract(&self, text: &str) -> ExtractionOutput {
        let segmentation = self.segmenter.segment(text);
        let mut warnings = segmentation.warnings;

        if segmentation.blocks.is_empty() {
            warnings.push(
                "No interviews found. Paste your notes with an empty line between interviews."
                    .to_string(),
            );
        }

        let mut matrix = InterviewMatrix::new();
        let mut display = Vec::with_capacity(segmentation.blocks.len());

        for block in &segmentation.blocks {
            let record = self.scorer.score_interview(&block.sentences);
            let weights = self.quantizer.quantize(&record.counts());
            debug!(
                id = %block.id,
                sentences = block.sentences.len(),
                counts = ?record.counts(),
                "Scored interview"
            );

            if weights.is_empty() {
                warnings.push(no_signal_warning(&block.id));
            }

            // Segmenter ids are sequence-assigned and unique
            if let Err(err) = matrix.push_theme_weights(block.id.clone(), &weights) {
                warnings.push(err.to_string());
                continue;
            }
            display.push(self.describe_interview(block, &record, &weights));
        }

        let unclear = display.iter().filter(|d| d.no_clear_theme).count();
        info!(
            "Extracted {} interview(s), {} without a clear theme",
            matrix.len(),
            unclear
        );

        ExtractionOutput {
            matrix,
            display,
            warnings,
            confidence: segmentation.confidence,
        }
    }

    fn describe_interview(
        &self,
        block: &InterviewBlock,
        record: &ScoreRecord,
        weights: &ThemeWeightMap,
    ) -> InterviewDisplay {
        let themes = weights
            .iter()
            .map(|(theme, magnitude)| ThemeBadge {
                theme,
                weight: magnitude.weight(),
                level: magnitude.label(),
                hits: record.count(theme),
            })
            .collect();

        let evidence = weights
            .iter()
            .map(|(theme, _)| {
                let sentences = record
                    .evidence(theme)
                    .take(self.config.evidence_per_theme)
                    .filter_map(|idx| block.sentences.get(idx).cloned())
                    .collect();
                (theme, sentences)
            })
            .collect();

        InterviewDisplay {
            id: block.id.clone(),
            sentence_count: block.sentences.len(),
            excerpt: excerpt(&block.text, self.config.excerpt_chars),
            themes,
            facets: record
                .facets()
                .iter()
                .map(|(label, count)| ((*label).to_string(), *count))
                .collect(),
            evidence,
            no_clear_theme: weights.is_empty(),
        }
    }
}

fn no_signal_warning(id: &str) -> String {
    format!(
        "Interview {id} has no clear theme. Add sentences that name a concrete pain, \
         for example \"it costs too much every month\" or \"we wait hours for support\"."
    )
}

/// First `max_chars` characters on one line, with an ellipsis when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_INTERVIEWS: &str = "Interview 1\nWe wait forever for support and it costs too much.\n\nInterview 2\nThe price is way too high every month.";

    fn extractor() -> ThemeExtractor<'static> {
        ThemeExtractor::new(&JtbdConfig::default())
    }

    #[test]
    fn extracts_both_interviews_with_cost() {
        let output = extractor().extract(TWO_INTERVIEWS);
        assert_eq!(output.matrix.len(), 2);
        assert_eq!(output.confidence, SegmentationConfidence::High);
        assert!(output.warnings.is_empty());

        let ids: Vec<&str> = output.matrix.ids().collect();
        assert_eq!(ids, vec!["i1", "i2"]);

        let first = &output.display[0];
        let themes: Vec<CoreTheme> = first.themes.iter().map(|b| b.theme).collect();
        assert_eq!(themes, vec![CoreTheme::Cost, CoreTheme::Time, CoreTheme::Support]);
        assert!(first.themes.iter().all(|b| b.weight == 0.33 && b.level == "Low"));

        let second = &output.display[1];
        assert_eq!(second.themes[0].theme, CoreTheme::Cost);
        assert_eq!(second.facets.get("subscription_fees"), Some(&1));
    }

    #[test]
    fn evidence_points_at_hitting_sentence() {
        let output = extractor().extract("Booking is easy. The price is way too high.");
        let evidence = &output.display[0].evidence[&CoreTheme::Cost];
        assert_eq!(evidence, &vec!["The price is way too high.".to_string()]);
    }

    #[test]
    fn no_signal_interview_warns_with_id() {
        let output = extractor().extract("The weather was lovely today.\n\nThe price is too high.");
        assert_eq!(output.matrix.len(), 2);
        assert!(output.display[0].no_clear_theme);
        assert_eq!(output.no_signal_ids().collect::<Vec<_>>(), vec!["i1"]);
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("i1"));
        assert!(output.matrix.rows()[0].weights().is_empty());
    }

    #[test]
    fn summary_log_counts_unclear_interviews() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        let output = tracing::subscriber::with_default(subscriber, || {
            extractor().extract("The weather was lovely today.\n\nThe price is too high.")
        });
        assert_eq!(output.no_signal_ids().count(), 1);
        assert_eq!(output.display.len(), 2);
    }

    #[test]
    fn empty_text_warns() {
        let output = extractor().extract("");
        assert!(output.matrix.is_empty());
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("short text", 120), "short text");
        assert_eq!(excerpt("héllo wörld again", 11), "héllo wörld…");
        assert_eq!(excerpt("line one\nline two", 120), "line one line two");
    }

    #[test]
    fn matrix_serializes_as_pairs() {
        let output = extractor().extract("The price is way too high.");
        let json = serde_json::to_value(&output.matrix).unwrap();
        assert_eq!(json, serde_json::json!([["i1", {"cost": 0.33}]]));
    }
}
