//! Theme scorer: an ordered pipeline of named rule stages.
//!
//! ```text
//! sentences -> Score -> Gate -> Suppress -> Demote -> ScoreRecord
//! ```
//!
//! `Score` applies the cue lexicon to every sentence and accumulates one hit
//! per theme per sentence. The remaining stages are [`RuleStage`]s that each
//! mutate the same [`ScoreRecord`] and can be exercised in isolation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::config::{DemotionRule, RuleConfig, SuppressionRule};
use crate::core::themes::{CoreTheme, CORE_THEME_COUNT};
use crate::extraction::lexicon::{CueLexicon, CuePrecision};
use crate::extraction::quantizer::ThemeCounts;

/// Mutable per-interview score record shared by all stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreRecord {
    explicit: [u32; CORE_THEME_COUNT],
    soft: [u32; CORE_THEME_COUNT],
    evidence: [Vec<(usize, CuePrecision)>; CORE_THEME_COUNT],
    scheduling_hits: u32,
    facets: BTreeMap<&'static str, u32>,
    adjustments: Vec<String>,
}

impl ScoreRecord {
    /// Record one sentence's hit for a theme.
    pub fn add_hit(&mut self, theme: CoreTheme, precision: CuePrecision, sentence: usize) {
        match precision {
            CuePrecision::Explicit => self.explicit[theme.index()] += 1,
            CuePrecision::Soft => self.soft[theme.index()] += 1,
        }
        self.evidence[theme.index()].push((sentence, precision));
    }

    /// Total hits (explicit + soft) for a theme.
    pub fn count(&self, theme: CoreTheme) -> u32 {
        self.explicit[theme.index()] + self.soft[theme.index()]
    }

    /// Hits from explicit cues only.
    pub fn explicit_count(&self, theme: CoreTheme) -> u32 {
        self.explicit[theme.index()]
    }

    /// Hits from soft cues only.
    pub fn soft_count(&self, theme: CoreTheme) -> u32 {
        self.soft[theme.index()]
    }

    /// Snapshot of all theme counts.
    pub fn counts(&self) -> ThemeCounts {
        ThemeCounts::from_pairs(CoreTheme::ALL.into_iter().map(|t| (t, self.count(t))))
    }

    /// Sentence indices that support a theme, in reading order.
    pub fn evidence(&self, theme: CoreTheme) -> impl Iterator<Item = usize> + '_ {
        self.evidence[theme.index()].iter().map(|(idx, _)| *idx)
    }

    /// Number of sentences containing a scheduling cue.
    pub fn scheduling_hits(&self) -> u32 {
        self.scheduling_hits
    }

    /// Facet hit counts.
    pub fn facets(&self) -> &BTreeMap<&'static str, u32> {
        &self.facets
    }

    /// Descriptions of every rule adjustment applied.
    pub fn adjustments(&self) -> &[String] {
        &self.adjustments
    }

    fn drop_soft(&mut self, theme: CoreTheme) -> u32 {
        let removed = std::mem::take(&mut self.soft[theme.index()]);
        self.evidence[theme.index()].retain(|(_, p)| *p == CuePrecision::Explicit);
        removed
    }

    /// Reduce a theme's total count to `limit`, dropping soft hits first.
    fn cap(&mut self, theme: CoreTheme, limit: u32) {
        let i = theme.index();
        self.explicit[i] = self.explicit[i].min(limit);
        self.soft[i] = self.soft[i].min(limit - self.explicit[i]);

        let mut keep_explicit = self.explicit[i];
        let mut keep_soft = self.soft[i];
        self.evidence[i].retain(|(_, precision)| {
            let slot = match precision {
                CuePrecision::Explicit => &mut keep_explicit,
                CuePrecision::Soft => &mut keep_soft,
            };
            if *slot > 0 {
                *slot -= 1;
                true
            } else {
                false
            }
        });
    }
}

/// A post-scoring rule stage.
pub trait RuleStage: Send + Sync + std::fmt::Debug {
    /// Stable stage name used in logs.
    fn name(&self) -> &'static str;

    /// Mutate the record in place.
    fn apply(&self, record: &mut ScoreRecord);
}

/// Zeroes soft hits for themes that require explicit cues.
#[derive(Debug, Clone)]
pub struct GateStage {
    gated: Vec<CoreTheme>,
}

impl GateStage {
    /// Create a gate over the given themes.
    pub fn new(gated: Vec<CoreTheme>) -> Self {
        Self { gated }
    }
}

impl RuleStage for GateStage {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn apply(&self, record: &mut ScoreRecord) {
        for &theme in &self.gated {
            let removed = record.drop_soft(theme);
            if removed > 0 {
                record
                    .adjustments
                    .push(format!("gate: dropped {removed} soft {theme} hit(s)"));
            }
        }
    }
}

/// Caps the target theme when scheduling or trigger-theme language is present.
#[derive(Debug, Clone)]
pub struct SuppressStage {
    rule: SuppressionRule,
}

impl SuppressStage {
    /// Create the stage from its rule.
    pub fn new(rule: SuppressionRule) -> Self {
        Self { rule }
    }

    fn triggered(&self, record: &ScoreRecord) -> bool {
        (self.rule.trigger_on_scheduling_cues && record.scheduling_hits > 0)
            || self.rule.trigger_themes.iter().any(|&t| record.count(t) > 0)
    }
}

impl RuleStage for SuppressStage {
    fn name(&self) -> &'static str {
        "suppress"
    }

    fn apply(&self, record: &mut ScoreRecord) {
        let target = self.rule.target;
        let before = record.count(target);
        if !self.rule.enabled || before <= self.rule.cap || !self.triggered(record) {
            return;
        }
        record.cap(target, self.rule.cap);
        record.adjustments.push(format!(
            "suppress: capped {target} from {before} to {}",
            self.rule.cap
        ));
    }
}

/// Pushes each demoted theme strictly below its dominant theme when both are
/// present. A demoted theme keeps at least one hit and is never removed.
#[derive(Debug, Clone)]
pub struct DemoteStage {
    rules: Vec<DemotionRule>,
}

impl DemoteStage {
    /// Create the stage from its rules.
    pub fn new(rules: Vec<DemotionRule>) -> Self {
        Self { rules }
    }
}

impl RuleStage for DemoteStage {
    fn name(&self) -> &'static str {
        "demote"
    }

    fn apply(&self, record: &mut ScoreRecord) {
        for rule in &self.rules {
            let demoted = record.count(rule.demoted);
            let dominant = record.count(rule.dominant);
            if demoted == 0 || dominant == 0 || demoted < dominant {
                continue;
            }
            let limit = dominant.saturating_sub(1).max(1);
            if limit < demoted {
                record.cap(rule.demoted, limit);
                record.adjustments.push(format!(
                    "demote: {} from {demoted} to {limit} below {}",
                    rule.demoted, rule.dominant
                ));
            }
        }
    }
}

/// Scores of a single sentence after all rule stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceScore {
    /// Theme hit increments (0 or 1 per theme)
    pub themes: BTreeMap<CoreTheme, u32>,
    /// Facet hit increments
    pub facets: BTreeMap<&'static str, u32>,
}

/// Applies the cue lexicon and the rule stages.
#[derive(Debug)]
pub struct ThemeScorer<'a> {
    lexicon: &'a CueLexicon,
    stages: Vec<Box<dyn RuleStage>>,
}

impl ThemeScorer<'static> {
    /// Scorer over the built-in lexicon.
    pub fn new(rules: &RuleConfig) -> Self {
        Self::with_lexicon(CueLexicon::builtin(), rules)
    }
}

impl<'a> ThemeScorer<'a> {
    /// Scorer over a custom lexicon.
    pub fn with_lexicon(lexicon: &'a CueLexicon, rules: &RuleConfig) -> Self {
        let stages: Vec<Box<dyn RuleStage>> = vec![
            Box::new(GateStage::new(rules.gated_themes.clone())),
            Box::new(SuppressStage::new(rules.suppression.clone())),
            Box::new(DemoteStage::new(rules.demotions.clone())),
        ];
        Self { lexicon, stages }
    }

    /// Stage names in execution order, including the leading score stage.
    pub fn stage_names(&self) -> Vec<&'static str> {
        std::iter::once("score")
            .chain(self.stages.iter().map(|s| s.name()))
            .collect()
    }

    /// Score stage: accumulate lexicon hits for every sentence.
    pub fn score(&self, sentences: &[String]) -> ScoreRecord {
        let mut record = ScoreRecord::default();
        for (idx, sentence) in sentences.iter().enumerate() {
            let hit = self.lexicon.match_sentence(sentence);
            for theme in CoreTheme::ALL {
                if let Some(precision) = hit.precision(theme) {
                    record.add_hit(theme, precision, idx);
                }
            }
            for label in hit.facets {
                *record.facets.entry(label).or_insert(0) += 1;
            }
            if hit.scheduling {
                record.scheduling_hits += 1;
            }
        }
        record
    }

    /// Run the rule stages over an existing record.
    pub fn apply_rules(&self, record: &mut ScoreRecord) {
        for stage in &self.stages {
            let before = record.adjustments.len();
            stage.apply(record);
            for note in &record.adjustments[before..] {
                debug!(stage = stage.name(), "{}", note);
            }
        }
    }

    /// Full pipeline for one interview.
    pub fn score_interview(&self, sentences: &[String]) -> ScoreRecord {
        let mut record = self.score(sentences);
        self.apply_rules(&mut record);
        record
    }

    /// Full pipeline for one sentence.
    pub fn score_sentence(&self, sentence: &str) -> SentenceScore {
        let record = self.score_interview(&[sentence.to_string()]);
        SentenceScore {
            themes: record.counts().nonzero().collect(),
            facets: record.facets.clone(),
        }
    }
}
