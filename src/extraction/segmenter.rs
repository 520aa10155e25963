//! Sentence segmenter: raw notes -> interview blocks -> candidate sentences.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::config::ExtractionConfig;

/// Leading "Interview 3:" style heading, stripped from the first line only.
static HEADING_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*interview\b[ \t]*#?[ \t]*\d*[ \t]*[:.)\-–—]?[ \t]*")
        .expect("heading prefix pattern must compile")
});

/// A numbered heading line, used to detect missing blank-line separation.
static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*interview\b[ \t]*#?[ \t]*\d+").expect("numbered heading pattern must compile")
});

const OPENING_QUOTES: &[char] = &['"', '\'', '“', '‘', '«'];

/// How much the caller can rely on the interview split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationConfidence {
    /// Blocks were separated by blank lines as expected
    High,
    /// Headings suggest more interviews than blank lines separate
    Degraded,
}

/// One interview block and its sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewBlock {
    /// Sequence-assigned id (`i1`, `i2`, ...)
    pub id: String,
    /// Block text with the heading removed
    pub text: String,
    /// Candidate sentences in reading order
    pub sentences: Vec<String>,
}

/// Segmenter output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// Interview blocks, capped and order-preserving
    pub blocks: Vec<InterviewBlock>,
    /// Confidence in the block split
    pub confidence: SegmentationConfidence,
    /// User-facing warnings raised while segmenting
    pub warnings: Vec<String>,
}

/// Splits pasted interview notes into interviews and sentences.
#[derive(Debug, Clone)]
pub struct Segmenter {
    max_interviews: usize,
    max_sentences: usize,
    min_fragment_chars: usize,
}

impl Segmenter {
    /// Create a segmenter from extraction limits.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            max_interviews: config.max_interviews,
            max_sentences: config.max_sentences,
            min_fragment_chars: config.min_fragment_chars,
        }
    }

    /// Segment raw text. Never fails; degraded input yields warnings.
    pub fn segment(&self, text: &str) -> Segmentation {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let raw_blocks = split_blocks(&normalized);
        let heading_count = normalized
            .lines()
            .filter(|line| NUMBERED_HEADING.is_match(line))
            .count();

        let mut warnings = Vec::new();
        let mut confidence = SegmentationConfidence::High;
        if heading_count >= 2 && heading_count > raw_blocks.len() {
            confidence = SegmentationConfidence::Degraded;
            warn!(
                "Found {} interview headings but only {} blank-line separated block(s)",
                heading_count,
                raw_blocks.len()
            );
            warnings.push(format!(
                "Found {heading_count} interview headings but only {} block(s) separated by blank lines. \
                 Put an empty line between interviews so each one is analysed separately.",
                raw_blocks.len()
            ));
        }

        let bodies: Vec<String> = raw_blocks
            .iter()
            .map(|block| strip_heading(block))
            .filter(|body| !body.is_empty())
            .collect();

        if bodies.len() > self.max_interviews {
            debug!(
                "Truncating {} interviews to the configured cap of {}",
                bodies.len(),
                self.max_interviews
            );
        }

        let blocks = bodies
            .into_iter()
            .take(self.max_interviews)
            .enumerate()
            .map(|(index, body)| InterviewBlock {
                id: format!("i{}", index + 1),
                sentences: self.split_sentences(&body),
                text: body,
            })
            .collect();

        Segmentation {
            blocks,
            confidence,
            warnings,
        }
    }

    /// Split one block into filtered, capped sentences.
    pub fn split_sentences(&self, block: &str) -> Vec<String> {
        block
            .lines()
            .flat_map(split_line)
            .map(str::trim)
            .filter(|fragment| self.keep_fragment(fragment))
            .take(self.max_sentences)
            .map(str::to_string)
            .collect()
    }

    fn keep_fragment(&self, fragment: &str) -> bool {
        fragment.chars().count() >= self.min_fragment_chars
            && fragment.chars().any(char::is_alphabetic)
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

/// Group consecutive non-blank lines; one or more blank lines separate blocks.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

/// Remove a leading interview heading, keeping trailing content on that line.
fn strip_heading(block: &str) -> String {
    HEADING_PREFIX.replace(block, "").trim().to_string()
}

/// Split a line after `.`, `!` or `?` when whitespace and then a capital
/// letter or opening quote follow.
fn split_line(line: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        if j == i + 1 || j >= chars.len() {
            continue;
        }
        let next = chars[j].1;
        if next.is_uppercase() || OPENING_QUOTES.contains(&next) {
            pieces.push(&line[start..pos + c.len_utf8()]);
            start = chars[j].0;
        }
    }
    pieces.push(&line[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> Segmenter {
        Segmenter::default()
    }

    #[test]
    fn splits_on_blank_lines_and_strips_headings() {
        let text = "Interview 1\nWe wait forever for support and it costs too much.\n\nInterview 2\nThe price is way too high every month.";
        let seg = segmenter().segment(text);
        assert_eq!(seg.blocks.len(), 2);
        assert_eq!(seg.confidence, SegmentationConfidence::High);
        assert_eq!(seg.blocks[0].id, "i1");
        assert_eq!(seg.blocks[1].id, "i2");
        assert_eq!(
            seg.blocks[0].sentences,
            vec!["We wait forever for support and it costs too much.".to_string()]
        );
        assert!(seg.warnings.is_empty());
    }

    #[test]
    fn heading_strip_keeps_trailing_content() {
        let seg = segmenter().segment("Interview #3: Booking is a nightmare. Nobody answers.");
        assert_eq!(seg.blocks.len(), 1);
        assert_eq!(
            seg.blocks[0].sentences,
            vec!["Booking is a nightmare.".to_string(), "Nobody answers.".to_string()]
        );
    }

    #[test]
    fn heading_word_inside_other_word_is_kept() {
        let seg = segmenter().segment("Interviewing staff takes hours.");
        assert_eq!(seg.blocks[0].text, "Interviewing staff takes hours.");
    }

    #[test]
    fn multiple_blank_lines_are_one_separator() {
        let seg = segmenter().segment("First block here.\n\n\n  \nSecond block here.");
        assert_eq!(seg.blocks.len(), 2);
    }

    #[test]
    fn headings_without_blank_lines_degrade_confidence() {
        let text = "Interview 1\nPrices are crazy.\nInterview 2\nThe app crashes daily.";
        let seg = segmenter().segment(text);
        assert_eq!(seg.blocks.len(), 1);
        assert_eq!(seg.confidence, SegmentationConfidence::Degraded);
        assert_eq!(seg.warnings.len(), 1);
    }

    #[test]
    fn interview_cap_truncates_in_order() {
        let text = (1..=20)
            .map(|i| format!("Note number {i} about waiting."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let seg = segmenter().segment(&text);
        assert_eq!(seg.blocks.len(), 15);
        assert_eq!(seg.blocks[14].text, "Note number 15 about waiting.");
    }

    #[test]
    fn sentence_cap_and_fragment_filter() {
        let config = ExtractionConfig {
            max_sentences: 2,
            ..ExtractionConfig::default()
        };
        let seg = Segmenter::new(&config);
        let sentences = seg.split_sentences("Ok\n12345\nFirst real one. Second real one. Third one.");
        assert_eq!(
            sentences,
            vec!["First real one.".to_string(), "Second real one.".to_string()]
        );
    }

    #[test]
    fn splits_before_opening_quote_but_not_lowercase() {
        let pieces = split_line("He said no. \"Call back later,\" she wrote. then e.g. nothing");
        assert_eq!(
            pieces,
            vec!["He said no.", "\"Call back later,\" she wrote. then e.g. nothing"]
        );
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        let seg = segmenter().segment("   \n\n  ");
        assert!(seg.blocks.is_empty());
        assert_eq!(seg.confidence, SegmentationConfidence::High);
    }

    #[test]
    fn heading_only_block_is_dropped() {
        let seg = segmenter().segment("Interview 1\n\nWe pay too much.");
        assert_eq!(seg.blocks.len(), 1);
        assert_eq!(seg.blocks[0].id, "i1");
        assert_eq!(seg.blocks[0].text, "We pay too much.");
    }
}
