//! Corpus-wide baseline per sentiment dimension.

use crate::aggregator::RawObservations;
use crate::dimension::{PerDimension, SentimentDimension};
use crate::pipeline::PipelineError;
use crate::stats::{mean, round_to};

/// Decimal places kept for baseline values.
const BASELINE_PRECISION: i32 = 5;

/// Mean of every speech-level value on each dimension, pooled across all
/// characters. Computed once, read-only afterwards.
///
/// A dimension that no speech in the corpus carries has no baseline. That is
/// only fatal once a defined value has to be adjusted against it, see
/// [`CorpusBaseline::require`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusBaseline {
    means: PerDimension<Option<f64>>,
}

impl CorpusBaseline {
    /// Pool every observation of every character and average per dimension.
    ///
    /// This is the mean of the union of observations, not a mean of
    /// per-character means.
    pub fn compute<'a, I>(observations: I) -> Self
    where
        I: IntoIterator<Item = &'a RawObservations>,
    {
        let mut pooled: PerDimension<Vec<f64>> = PerDimension::default();
        for character in observations {
            for (dimension, values) in pooled.iter_mut() {
                values.extend_from_slice(character.on(dimension));
            }
        }
        let means = pooled.map(|_, values| {
            mean(values).map(|m| round_to(m, BASELINE_PRECISION))
        });
        Self { means }
    }

    /// Build a baseline from known values.
    pub fn from_means(means: PerDimension<Option<f64>>) -> Self {
        Self { means }
    }

    pub fn get(&self, dimension: SentimentDimension) -> Option<f64> {
        self.means[dimension]
    }

    /// The baseline of a dimension that a defined value is adjusted against.
    pub fn require(&self, dimension: SentimentDimension) -> Result<f64, PipelineError> {
        self.means[dimension].ok_or(PipelineError::BaselineUndefined(dimension))
    }

    /// Dimensions without a single observation in the corpus.
    pub fn undefined(&self) -> Vec<SentimentDimension> {
        self.means
            .iter()
            .filter(|(_, m)| m.is_none())
            .map(|(d, _)| d)
            .collect()
    }

    pub fn means(&self) -> &PerDimension<Option<f64>> {
        &self.means
    }
}
