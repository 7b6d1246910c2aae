//! Lexical sentiment source interface.
//!
//! The pipeline itself consumes speech-level averages that were computed
//! upstream. This module covers that upstream step for callers that hold a
//! sentiment dictionary: look up every token, average the non-zero values per
//! dimension, and mark dimensions without any signal with the sentinel.

use crate::dimension::{Axis, PerDimension, SentimentDimension, NO_SIGNAL};
use crate::stats::{mean, round_to};
use std::collections::HashMap;

/// Per-dimension values for one token; a dimension may be missing.
pub type DimensionScores = PerDimension<Option<f64>>;

/// A sentiment dictionary keyed by lowercase token.
pub trait SentimentLexicon {
    /// Look up a lowercase token. `None` means the token is unknown.
    fn lookup(&self, token: &str) -> Option<DimensionScores>;
}

/// In-memory lexicon.
#[derive(Debug, Clone, Default)]
pub struct MapLexicon {
    entries: HashMap<String, DimensionScores>,
}

impl MapLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry. The key is lowercased.
    pub fn insert(&mut self, token: &str, scores: DimensionScores) {
        self.entries.insert(token.to_lowercase(), scores);
    }

    /// Builder-style [`MapLexicon::insert`] taking values in dimension order.
    pub fn with_entry(mut self, token: &str, values: [Option<f64>; 5]) -> Self {
        let scores = PerDimension::from_fn(|d: SentimentDimension| values[d.index()]);
        self.insert(token, scores);
        self
    }
}

impl SentimentLexicon for MapLexicon {
    fn lookup(&self, token: &str) -> Option<DimensionScores> {
        self.entries.get(token).copied()
    }
}

/// Speech-level averages for a token sequence.
///
/// Tokens are lowercased before lookup. Zero values count as "no signal",
/// matching how sentiment dictionaries encode neutral entries. Averages are
/// rounded to 5 decimals; a dimension that never received a value yields
/// [`NO_SIGNAL`].
pub fn speech_dimensions<L, S>(tokens: &[S], lexicon: &L) -> PerDimension<f64>
where
    L: SentimentLexicon + ?Sized,
    S: AsRef<str>,
{
    let mut collected: PerDimension<Vec<f64>> = PerDimension::default();
    for token in tokens {
        let Some(scores) = lexicon.lookup(&token.as_ref().to_lowercase()) else {
            continue;
        };
        for (dimension, value) in scores.iter() {
            if let Some(v) = value.filter(|v| *v != 0.0 && v.is_finite()) {
                collected[dimension].push(v);
            }
        }
    }
    collected.map(|_, values| mean(values).map_or(NO_SIGNAL, |m| round_to(m, 5)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> MapLexicon {
        MapLexicon::new()
            .with_entry("love", [Some(0.8), None, Some(0.6), Some(0.0), Some(0.9)])
            .with_entry("hate", [Some(-0.7), None, Some(-0.2), None, Some(-0.8)])
    }

    #[test]
    fn test_unknown_tokens_yield_sentinel() {
        let dims = speech_dimensions(&["wherefore", "art"], &lexicon());
        for (_, value) in dims.iter() {
            assert_eq!(*value, NO_SIGNAL);
        }
    }

    #[test]
    fn test_averages_per_dimension() {
        let dims = speech_dimensions(&["Love", "hate", "love"], &lexicon());
        assert_eq!(dims[SentimentDimension::Attitude], 0.3);
        assert_eq!(dims[SentimentDimension::Polarity], 0.33333);
        // Missing everywhere
        assert_eq!(dims[SentimentDimension::Introspection], NO_SIGNAL);
        // Only zero values
        assert_eq!(dims[SentimentDimension::Temper], NO_SIGNAL);
    }
}
