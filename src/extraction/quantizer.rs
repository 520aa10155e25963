//! Weight quantizer: raw per-theme hit counts -> Low/Med/High weights.

use std::fmt;

use crate::core::matrix::ThemeWeightMap;
use crate::core::themes::{CoreTheme, Magnitude, CORE_THEME_COUNT};

/// Raw hit counts for every core theme.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeCounts([u32; CORE_THEME_COUNT]);

impl ThemeCounts {
    /// Build from `(theme, count)` pairs; repeated themes accumulate.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (CoreTheme, u32)>) -> Self {
        let mut counts = Self::default();
        for (theme, count) in pairs {
            counts.0[theme.index()] += count;
        }
        counts
    }

    /// Count for one theme.
    pub fn get(&self, theme: CoreTheme) -> u32 {
        self.0[theme.index()]
    }

    /// Overwrite the count for one theme.
    pub fn set(&mut self, theme: CoreTheme, count: u32) {
        self.0[theme.index()] = count;
    }

    /// Themes with a positive count, in priority order.
    pub fn nonzero(&self) -> impl Iterator<Item = (CoreTheme, u32)> + '_ {
        CoreTheme::ALL
            .into_iter()
            .map(|theme| (theme, self.get(theme)))
            .filter(|(_, count)| *count > 0)
    }

    /// Whether every count is zero.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }
}

impl fmt::Debug for ThemeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.nonzero()).finish()
    }
}

/// Rank themes by count descending, ties broken by theme priority.
pub fn rank_themes(counts: &ThemeCounts) -> Vec<(CoreTheme, u32)> {
    let mut ranked: Vec<(CoreTheme, u32)> = counts.nonzero().collect();
    // Stable sort keeps priority order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Keeps the top-N themes of an interview and maps counts onto magnitudes.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    top_n: usize,
}

impl Quantizer {
    /// Create a quantizer retaining `top_n` themes.
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Quantize one interview's counts. An empty map means "no clear theme".
    pub fn quantize(&self, counts: &ThemeCounts) -> ThemeWeightMap {
        ThemeWeightMap::from_ranked(
            rank_themes(counts)
                .into_iter()
                .take(self.top_n)
                .filter_map(|(theme, count)| Magnitude::from_count(count).map(|m| (theme, m))),
        )
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new(3)
    }
}
