//! The closed set of core themes and their quantized magnitudes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::core::errors::JtbdError;

/// Number of core themes. The set never grows at runtime.
pub const CORE_THEME_COUNT: usize = 13;

/// Facet labels that carry no information and may never be defined.
pub const FACET_BLOCKLIST: &[&str] = &[
    "misc",
    "miscellaneous",
    "unknown",
    "other",
    "general",
    "none",
    "n/a",
    "na",
];

/// One of the 13 cross-domain pain dimensions used as clustering axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoreTheme {
    Cost,
    Time,
    Effort,
    Quality,
    Reliability,
    Trust,
    Flexibility,
    Choice,
    Information,
    Access,
    Support,
    Risk,
    Value,
}

impl CoreTheme {
    /// All themes in tie-break priority order (earlier wins ties).
    pub const ALL: [CoreTheme; CORE_THEME_COUNT] = [
        CoreTheme::Cost,
        CoreTheme::Time,
        CoreTheme::Effort,
        CoreTheme::Quality,
        CoreTheme::Reliability,
        CoreTheme::Trust,
        CoreTheme::Flexibility,
        CoreTheme::Choice,
        CoreTheme::Information,
        CoreTheme::Access,
        CoreTheme::Support,
        CoreTheme::Risk,
        CoreTheme::Value,
    ];

    /// Stable key used in matrices and JSON output.
    pub const fn as_str(self) -> &'static str {
        match self {
            CoreTheme::Cost => "cost",
            CoreTheme::Time => "time",
            CoreTheme::Effort => "effort",
            CoreTheme::Quality => "quality",
            CoreTheme::Reliability => "reliability",
            CoreTheme::Trust => "trust",
            CoreTheme::Flexibility => "flexibility",
            CoreTheme::Choice => "choice",
            CoreTheme::Information => "information",
            CoreTheme::Access => "access",
            CoreTheme::Support => "support",
            CoreTheme::Risk => "risk",
            CoreTheme::Value => "value",
        }
    }

    /// Position in [`CoreTheme::ALL`]; lower ranks win count ties.
    pub const fn priority(self) -> usize {
        self as usize
    }

    /// Index into per-theme count arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lenient lookup used by sanitization: trims and ignores case.
    pub fn parse_key(key: &str) -> Option<CoreTheme> {
        let key = key.trim().to_ascii_lowercase();
        CoreTheme::ALL.into_iter().find(|theme| theme.as_str() == key)
    }
}

impl fmt::Display for CoreTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreTheme {
    type Err = JtbdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoreTheme::parse_key(s).ok_or_else(|| {
            JtbdError::validation_field(format!("'{s}' is not one of the 13 core themes"), "theme")
        })
    }
}

/// Discrete theme magnitude derived from a raw hit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Magnitude {
    /// One hit.
    Low,
    /// Two hits.
    Med,
    /// Three or more hits.
    High,
}

impl Magnitude {
    /// Map a raw hit count onto a magnitude; zero hits map to nothing.
    pub const fn from_count(count: u32) -> Option<Magnitude> {
        match count {
            0 => None,
            1 => Some(Magnitude::Low),
            2 => Some(Magnitude::Med),
            _ => Some(Magnitude::High),
        }
    }

    /// Numeric weight emitted in the interview matrix.
    pub const fn weight(self) -> f64 {
        match self {
            Magnitude::Low => 0.33,
            Magnitude::Med => 0.67,
            Magnitude::High => 1.0,
        }
    }

    /// Human-readable label for display.
    pub const fn label(self) -> &'static str {
        match self {
            Magnitude::Low => "Low",
            Magnitude::Med => "Med",
            Magnitude::High => "High",
        }
    }

    /// Parse the string synonyms accepted in incoming matrices.
    pub fn from_synonym(text: &str) -> Option<Magnitude> {
        match text.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Magnitude::Low),
            "med" | "medium" => Some(Magnitude::Med),
            "high" => Some(Magnitude::High),
            _ => None,
        }
    }
}

impl Serialize for Magnitude {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.weight())
    }
}

/// Check a facet label against [`FACET_BLOCKLIST`].
pub fn is_blocked_facet(label: &str) -> bool {
    let normalized = label.trim().to_ascii_lowercase();
    normalized.is_empty() || FACET_BLOCKLIST.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_themes_round_trip_through_keys() {
        for theme in CoreTheme::ALL {
            assert_eq!(CoreTheme::parse_key(theme.as_str()), Some(theme));
        }
        assert_eq!(CoreTheme::parse_key("  COST "), Some(CoreTheme::Cost));
        assert_eq!(CoreTheme::parse_key("price"), None);
    }

    #[test]
    fn priority_follows_declaration_order() {
        let priorities: Vec<usize> = CoreTheme::ALL.iter().map(|t| t.priority()).collect();
        assert_eq!(priorities, (0..CORE_THEME_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn magnitude_thresholds() {
        assert_eq!(Magnitude::from_count(0), None);
        assert_eq!(Magnitude::from_count(1).map(Magnitude::weight), Some(0.33));
        assert_eq!(Magnitude::from_count(2).map(Magnitude::weight), Some(0.67));
        assert_eq!(Magnitude::from_count(3).map(Magnitude::weight), Some(1.0));
        assert_eq!(Magnitude::from_count(40), Some(Magnitude::High));
    }

    #[test]
    fn magnitude_synonyms() {
        assert_eq!(Magnitude::from_synonym("Medium"), Some(Magnitude::Med));
        assert_eq!(Magnitude::from_synonym("med"), Some(Magnitude::Med));
        assert_eq!(Magnitude::from_synonym("HIGH"), Some(Magnitude::High));
        assert_eq!(Magnitude::from_synonym("very high"), None);
    }

    #[test]
    fn blocklisted_facets_are_rejected() {
        assert!(is_blocked_facet("Misc"));
        assert!(is_blocked_facet("unknown"));
        assert!(is_blocked_facet(" "));
        assert!(!is_blocked_facet("waiting_time"));
    }

    #[test]
    fn theme_from_str_reports_validation_error() {
        let err = "luck".parse::<CoreTheme>().unwrap_err();
        assert!(matches!(err, JtbdError::Validation { .. }));
    }
}
