//! Cue lexicon: pattern tables that detect thematic language in a sentence.
//!
//! Each core theme owns one or more cues. A cue is either `Explicit` (a
//! curated high-specificity phrase) or `Soft` (generic wording that hints at a
//! theme). Gated themes only ever count explicit cues; see
//! [`crate::extraction::scorer`]. Facets are display-only labels bound to a
//! single core theme, and scheduling cues feed the information suppression
//! rule. The built-in lexicon is compiled once and shared read-only.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::core::errors::{JtbdError, Result};
use crate::core::themes::{is_blocked_facet, CoreTheme, CORE_THEME_COUNT};

/// How specific a cue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CuePrecision {
    /// Generic wording; ignored for gated themes.
    Soft,
    /// Curated high-precision phrase.
    Explicit,
}

/// Uncompiled theme cue.
#[derive(Debug, Clone, Copy)]
pub struct CueDef {
    /// Theme the cue votes for
    pub theme: CoreTheme,
    /// Cue precision
    pub precision: CuePrecision,
    /// Case-insensitive regular expression
    pub pattern: &'static str,
}

/// Uncompiled facet matcher.
#[derive(Debug, Clone, Copy)]
pub struct FacetDef {
    /// Display label
    pub label: &'static str,
    /// Core theme the facet belongs to
    pub theme: CoreTheme,
    /// Case-insensitive regular expression
    pub pattern: &'static str,
}

const fn explicit(theme: CoreTheme, pattern: &'static str) -> CueDef {
    CueDef {
        theme,
        precision: CuePrecision::Explicit,
        pattern,
    }
}

const fn soft(theme: CoreTheme, pattern: &'static str) -> CueDef {
    CueDef {
        theme,
        precision: CuePrecision::Soft,
        pattern,
    }
}

const fn facet(label: &'static str, theme: CoreTheme, pattern: &'static str) -> FacetDef {
    FacetDef {
        label,
        theme,
        pattern,
    }
}

/// Built-in theme cues.
pub const THEME_CUES: &[CueDef] = &[
    // cost
    explicit(
        CoreTheme::Cost,
        r"\b(costs?|costly|prices?|priced|pricing|pricey|expensive|overpriced|fees?|charges?|charged|afford|affordable|unaffordable|bills?|billing|budget|subscription)\b",
    ),
    soft(CoreTheme::Cost, r"\b(pay|paying|paid|money|spend|spent|cheap(er)?)\b"),
    // time
    explicit(
        CoreTheme::Time,
        r"\b(wait|waits|waited|waiting|forever|delays?|delayed|time[- ]consuming|takes? (too )?long|took (too )?long|waste(s|d)? (of )?(my |our )?time)\b",
    ),
    soft(CoreTheme::Time, r"\b(slow|slowly|slower|ages|hours|weeks|late|quick(er|ly)?)\b"),
    // effort
    explicit(
        CoreTheme::Effort,
        r"\b(hassle|tedious|manual(ly)?|paperwork|cumbersome|too many steps|jump(ing)? through hoops|back and forth|repeat(ing)? myself|difficult to (use|set up|do))\b",
    ),
    soft(CoreTheme::Effort, r"\b(complicated|annoying|effort|struggle|struggling|exhausting)\b"),
    // quality
    explicit(
        CoreTheme::Quality,
        r"\b(poor quality|low quality|bad quality|sloppy|defects?|defective|subpar|mediocre|shoddy)\b",
    ),
    soft(CoreTheme::Quality, r"\b(quality|mistakes?|errors?|wrong)\b"),
    // reliability
    explicit(
        CoreTheme::Reliability,
        r"\b(unreliable|crash(es|ed|ing)?|outages?|downtime|breaks? down|broke down|(goes|went) down|glitch(es|y)?|no[- ]shows?|cancel(l)?ed on (me|us))\b",
    ),
    soft(CoreTheme::Reliability, r"\b(reliab\w*|fails?|failed|failing|inconsistent|broken)\b"),
    // trust
    explicit(
        CoreTheme::Trust,
        r"\b(trust|distrust|mistrust|dishonest|scam(med)?|shady|sketchy|lied|lying|misleading|broken promises?)\b",
    ),
    soft(CoreTheme::Trust, r"\b(honest|transparen\w*|promised|credib\w*|believe)\b"),
    // flexibility
    explicit(
        CoreTheme::Flexibility,
        r"\b(flexib\w*|inflexib\w*|rigid|reschedul\w*|fixed (times?|hours|schedule)|(my|our) own schedule|around my (work|schedule|kids|shifts?)|change (my|the|our) (plan|booking|appointment|order))\b",
    ),
    soft(CoreTheme::Flexibility, r"\b(adjust|adapt|last[- ]minute)\b"),
    // choice
    explicit(
        CoreTheme::Choice,
        r"\b(no (other )?(choice|options?|alternatives?)|only one (option|provider|choice|company)|limited (options|choices?|selection)|stuck with)\b",
    ),
    soft(CoreTheme::Choice, r"\b(choices?|options?|alternatives?|selection|variety)\b"),
    // information
    explicit(
        CoreTheme::Information,
        r"\b(can'?t|cannot|couldn'?t|could not|hard to|difficult to|impossible to) (find|understand|figure out|get) (any |the |clear )?(info|information|details|answers?|instructions|pricing|terms)\b",
    ),
    explicit(
        CoreTheme::Information,
        r"\b(no|unclear|confusing|missing|outdated|incomplete) (info|information|documentation|instructions|details|explanation)\b",
    ),
    explicit(
        CoreTheme::Information,
        r"\b(not (clearly )?explained|fine print|nobody (tells|told|explains|explained)|no one (tells|told|explains|explained))\b",
    ),
    soft(CoreTheme::Information, r"\b(info|information|details|know|knew|learn|research)\b"),
    // access
    explicit(
        CoreTheme::Access,
        r"\b(inaccessible|far away|too far|no (car|transport|transportation)|rural|wheelchair|can'?t get (to|there|in)|wait ?list|sold out|out of reach)\b",
    ),
    soft(CoreTheme::Access, r"\b(access|accessible|distance|location|nearby|closest|unavailable)\b"),
    // support
    explicit(
        CoreTheme::Support,
        r"\b(customer|tech|technical|no|for|get|contact|call|phone|email) support\b",
    ),
    explicit(
        CoreTheme::Support,
        r"\b(support (team|staff|agents?|line|tickets?|desk)|help ?desk|call cent(er|re)|customer service|service reps?|live chat|an agent|a human|real person|someone to help)\b",
    ),
    explicit(
        CoreTheme::Support,
        r"\b((no one|nobody) (answers|responds|helps|picks up|gets back)|never (answers?|responds?|replies|reply|calls? back))\b",
    ),
    soft(CoreTheme::Support, r"\b(help|helpful|support|assist\w*|guidance)\b"),
    // risk
    explicit(
        CoreTheme::Risk,
        r"\b(lock[- ]?in|locked in(to)?|penalt(y|ies)|cancellation fees?|early termination|termination fees?|(long|annual|binding|multi-year|\d+[- ]year) contracts?|can'?t (cancel|get out)|hard to cancel|data (breach|leak)|lose (my|our|all) (data|money|deposit)|non[- ]refundable|liabilit(y|ies))\b",
    ),
    soft(
        CoreTheme::Risk,
        r"\b(risk|risks|risky|uncertain|uncertainty|unsure|not sure|worry|worried|worries|worrying|nervous|afraid|scared|gamble|what if|might)\b",
    ),
    // value
    explicit(
        CoreTheme::Value,
        r"\b(not worth|worth (it|the (money|price|cost))|waste of money|value for (money|the price)|money'?s worth|bang for (the|my|our) buck|return on investment|roi|paying for nothing|overpaying|rip[- ]?off)\b",
    ),
    soft(CoreTheme::Value, r"\b(value|valuable|benefit|benefits|useful|worth)\b"),
];

/// Built-in scheduling cues (feed the suppression rule, never a theme).
pub const SCHEDULING_CUES: &[&str] = &[
    r"\b(schedul\w*|reschedul\w*|appointments?|bookings?|time ?slots?|opening hours|office hours|calendar|availability)\b",
    r"\bbook (a|an|the) (slot|time|appointment|session)\b",
    r"\bavailable (times|slots|dates)\b",
];

/// Built-in display facets.
pub const FACETS: &[FacetDef] = &[
    facet(
        "subscription_fees",
        CoreTheme::Cost,
        r"\b((subscription|monthly|annual|yearly) (fees?|costs?|prices?|charges?)|every month|per month)\b",
    ),
    facet(
        "hidden_charges",
        CoreTheme::Cost,
        r"\b(hidden|surprise|unexpected) (fees?|charges?|costs?|bills?)\b",
    ),
    facet(
        "price_too_high",
        CoreTheme::Cost,
        r"\b(too (expensive|pricey|high|much)|overpriced)\b",
    ),
    facet(
        "waiting_time",
        CoreTheme::Time,
        r"\b(wait|waits|waited|waiting|forever|queue)\b",
    ),
    facet(
        "slow_process",
        CoreTheme::Time,
        r"\b(slow|takes? (too )?long|took (too )?long|delays?|delayed)\b",
    ),
    facet(
        "manual_work",
        CoreTheme::Effort,
        r"\b(manual(ly)?|paperwork|forms|spreadsheets?)\b",
    ),
    facet(
        "repeated_steps",
        CoreTheme::Effort,
        r"\b(back and forth|repeat\w* (myself|the same)|again and again|too many steps)\b",
    ),
    facet(
        "errors_and_mistakes",
        CoreTheme::Quality,
        r"\b(mistakes?|errors?|wrong (order|item|information|amount))\b",
    ),
    facet(
        "outages",
        CoreTheme::Reliability,
        r"\b(outages?|crash\w*|(goes|went) down|downtime)\b",
    ),
    facet(
        "no_shows",
        CoreTheme::Reliability,
        r"\b(no[- ]shows?|cancel(l)?ed on (me|us)|didn'?t show up|never showed)\b",
    ),
    facet(
        "broken_promises",
        CoreTheme::Trust,
        r"\b(promised|broken promises?|lied|misleading)\b",
    ),
    facet(
        "scheduling_rigidity",
        CoreTheme::Flexibility,
        r"\b(reschedul\w*|fixed (times?|hours|schedule)|appointments?|time ?slots?|opening hours)\b",
    ),
    facet(
        "limited_options",
        CoreTheme::Choice,
        r"\b(no (other )?(choice|options?|alternatives?)|only one (option|provider|choice|company)|stuck with)\b",
    ),
    facet(
        "unclear_pricing",
        CoreTheme::Information,
        r"\b((unclear|confusing|hidden) (pricing|prices|costs|terms)|fine print)\b",
    ),
    facet(
        "missing_documentation",
        CoreTheme::Information,
        r"\b(no|missing|outdated|incomplete) (documentation|instructions|manual)\b",
    ),
    facet(
        "location_distance",
        CoreTheme::Access,
        r"\b(far away|too far|distance|no (car|transport|transportation)|rural)\b",
    ),
    facet(
        "unresponsive_support",
        CoreTheme::Support,
        r"\b((no one|nobody) (answers|responds|helps|picks up|gets back)|never (answers?|responds?|replies|calls? back)|wait\w* (\w+ )?for support)\b",
    ),
    facet(
        "contract_lock_in",
        CoreTheme::Risk,
        r"\b(lock[- ]?in|locked in(to)?|(long|annual|binding|multi-year|\d+[- ]year) contracts?|can'?t (cancel|get out))\b",
    ),
    facet(
        "cancellation_penalties",
        CoreTheme::Risk,
        r"\b((cancellation|termination) (fees?|penalt(y|ies))|penalt(y|ies)|non[- ]refundable)\b",
    ),
    facet(
        "poor_value",
        CoreTheme::Value,
        r"\b(not worth|waste of money|rip[- ]?off|overpaying)\b",
    ),
];

static BUILTIN: Lazy<CueLexicon> = Lazy::new(|| {
    CueLexicon::compile(THEME_CUES, FACETS, SCHEDULING_CUES)
        .expect("built-in cue lexicon must compile")
});

#[derive(Debug)]
struct CompiledCue {
    theme: CoreTheme,
    precision: CuePrecision,
    regex: Regex,
}

#[derive(Debug)]
struct CompiledFacet {
    label: &'static str,
    theme: CoreTheme,
    regex: Regex,
}

/// What the lexicon found in one sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceMatch {
    /// Strongest cue precision seen per theme, indexed by [`CoreTheme::index`]
    pub themes: [Option<CuePrecision>; CORE_THEME_COUNT],
    /// Facet labels present in the sentence
    pub facets: Vec<&'static str>,
    /// Whether any scheduling cue matched
    pub scheduling: bool,
}

impl SentenceMatch {
    /// Strongest precision seen for a theme.
    pub fn precision(&self, theme: CoreTheme) -> Option<CuePrecision> {
        self.themes[theme.index()]
    }

    /// Whether nothing at all matched.
    pub fn is_empty(&self) -> bool {
        self.themes.iter().all(Option::is_none) && self.facets.is_empty() && !self.scheduling
    }
}

/// Compiled, immutable cue lexicon.
#[derive(Debug)]
pub struct CueLexicon {
    cues: Vec<CompiledCue>,
    facets: Vec<CompiledFacet>,
    scheduling: Vec<Regex>,
}

impl CueLexicon {
    /// Shared built-in lexicon.
    pub fn builtin() -> &'static CueLexicon {
        &BUILTIN
    }

    /// Compile cue, facet and scheduling tables.
    ///
    /// Every core theme must own at least one cue, facet labels must be unique
    /// and must not appear on the facet blocklist.
    pub fn compile(cues: &[CueDef], facets: &[FacetDef], scheduling: &[&str]) -> Result<Self> {
        for theme in CoreTheme::ALL {
            if !cues.iter().any(|cue| cue.theme == theme) {
                return Err(JtbdError::lexicon(theme.as_str(), "theme has no cues"));
            }
        }

        let compiled_cues = cues
            .iter()
            .map(|cue| {
                Ok(CompiledCue {
                    theme: cue.theme,
                    precision: cue.precision,
                    regex: build_regex(cue.theme.as_str(), cue.pattern)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut compiled_facets: Vec<CompiledFacet> = Vec::with_capacity(facets.len());
        for def in facets {
            if is_blocked_facet(def.label) {
                return Err(JtbdError::lexicon(def.label, "facet label is on the blocklist"));
            }
            if compiled_facets.iter().any(|f| f.label == def.label) {
                return Err(JtbdError::lexicon(def.label, "facet label defined twice"));
            }
            compiled_facets.push(CompiledFacet {
                label: def.label,
                theme: def.theme,
                regex: build_regex(def.label, def.pattern)?,
            });
        }

        let scheduling = scheduling
            .iter()
            .map(|pattern| build_regex("scheduling", pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            cues: compiled_cues,
            facets: compiled_facets,
            scheduling,
        })
    }

    /// Match every table against one sentence.
    pub fn match_sentence(&self, sentence: &str) -> SentenceMatch {
        let mut result = SentenceMatch::default();

        for cue in &self.cues {
            let slot = &mut result.themes[cue.theme.index()];
            // Skip cues that cannot raise the precision already recorded
            if slot.map_or(false, |seen| seen >= cue.precision) {
                continue;
            }
            if cue.regex.is_match(sentence) {
                *slot = Some(cue.precision);
            }
        }

        result.facets = self
            .facets
            .iter()
            .filter(|f| f.regex.is_match(sentence))
            .map(|f| f.label)
            .collect();

        result.scheduling = self.scheduling.iter().any(|r| r.is_match(sentence));
        result
    }

    /// Core theme a facet label is bound to.
    pub fn facet_theme(&self, label: &str) -> Option<CoreTheme> {
        self.facets
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.theme)
    }

    /// Number of compiled theme cues.
    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }

    /// Number of compiled facets.
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }
}

fn build_regex(label: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| JtbdError::lexicon(label, e.to_string()))
}
