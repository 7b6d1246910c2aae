//! Character profiles: baseline-adjusted sentiment and derived OCEAN scores.
//!
//! A profile is produced once per character by [`ProfileBuilder::build`], a
//! pure function of the character's [`RawObservations`], the
//! [`CorpusBaseline`] and the [`CorrelationTable`]:
//!
//! 1. raw mean per dimension (4 decimals), undefined without observations;
//! 2. adjusted = raw mean - baseline (4 decimals);
//! 3. dimensions ranked by |adjusted| descending, undefined counting as 0.0,
//!    ties kept in declaration order; the top K are selected;
//! 4. every selected dimension with a non-zero adjusted value contributes
//!    `adjusted * coefficient * weight` (3 decimals) to each trait;
//! 5. trait score = sum of contributions / K (5 decimals).
//!
//! The denominator in step 5 is always K, also when fewer dimensions
//! contributed, so sparse characters are pulled towards zero.

use crate::aggregator::RawObservations;
use crate::baseline::CorpusBaseline;
use crate::correlation::CorrelationTable;
use crate::dimension::{Axis, PerDimension, PerTrait, SentimentDimension, Trait};
use crate::graph::{CharacterId, EntityGraph, Predicate, Resource};
use crate::pipeline::PipelineError;
use crate::stats::{mean, round_to};

const RAW_MEAN_PRECISION: i32 = 4;
const ADJUSTED_PRECISION: i32 = 4;
const CONTRIBUTION_PRECISION: i32 = 3;
const TRAIT_PRECISION: i32 = 5;

/// Number of dimensions considered per character unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Baseline-adjusted value of one dimension.
///
/// Zero is kept apart from the other values: it is a defined value (and is
/// written to the graph) but projects nothing onto the traits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjusted {
    /// The character has no observation on this dimension.
    Undefined,
    /// Exactly at the corpus baseline.
    Zero,
    /// Off the baseline by this (non-zero) amount.
    Value(f64),
}

impl Adjusted {
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            None => Adjusted::Undefined,
            Some(v) if v == 0.0 => Adjusted::Zero,
            Some(v) => Adjusted::Value(v),
        }
    }

    /// The value, if defined (zero included).
    pub fn defined(&self) -> Option<f64> {
        match self {
            Adjusted::Undefined => None,
            Adjusted::Zero => Some(0.0),
            Adjusted::Value(v) => Some(*v),
        }
    }

    /// The value, if it takes part in trait projection.
    pub fn projectable(&self) -> Option<f64> {
        match self {
            Adjusted::Value(v) => Some(*v),
            Adjusted::Undefined | Adjusted::Zero => None,
        }
    }

    /// Ranking key: absolute value, undefined counting as 0.0.
    pub fn magnitude(&self) -> f64 {
        self.defined().map_or(0.0, f64::abs)
    }
}

/// Immutable profile of one character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterProfile {
    pub character: CharacterId,
    /// Mean of the character's speech-level values per dimension.
    pub raw_means: PerDimension<Option<f64>>,
    pub adjusted: PerDimension<Adjusted>,
    /// All five dimensions, most distinctive first.
    pub ranking: Vec<SentimentDimension>,
    /// How many leading entries of `ranking` were used.
    pub top_k: usize,
    pub contributions: PerTrait<Vec<f64>>,
    pub traits: PerTrait<f64>,
}

impl CharacterProfile {
    /// The dimensions that took part in projection.
    pub fn selected(&self) -> &[SentimentDimension] {
        &self.ranking[..self.top_k]
    }

    pub fn trait_score(&self, trait_name: Trait) -> f64 {
        self.traits[trait_name]
    }

    /// Whether the character carried no signal on any dimension.
    pub fn is_empty(&self) -> bool {
        self.adjusted.iter().all(|(_, a)| *a == Adjusted::Undefined)
    }

    /// Append the profile's statements to the graph: every defined adjusted
    /// value, then every trait score.
    pub fn write_to(&self, graph: &mut EntityGraph) {
        let subject = Resource::Character(self.character.clone());
        for (dimension, adjusted) in self.adjusted.iter() {
            if let Some(value) = adjusted.defined() {
                graph.add(subject.clone(), Predicate::HasDimension(dimension), value);
            }
        }
        for (trait_name, score) in self.traits.iter() {
            graph.add(subject.clone(), Predicate::HasTraitValue(trait_name), *score);
        }
    }
}

/// Builds profiles against a fixed baseline and correlation table.
#[derive(Debug, Clone, Copy)]
pub struct ProfileBuilder<'a> {
    baseline: &'a CorpusBaseline,
    table: &'a CorrelationTable,
    top_k: usize,
}

impl<'a> ProfileBuilder<'a> {
    /// `top_k` must be between 1 and the number of dimensions.
    pub fn new(
        baseline: &'a CorpusBaseline,
        table: &'a CorrelationTable,
        top_k: usize,
    ) -> Result<Self, PipelineError> {
        validate_top_k(top_k)?;
        Ok(Self {
            baseline,
            table,
            top_k,
        })
    }

    /// Build the profile of one character.
    ///
    /// Fails only if a dimension the character has values on has no
    /// baseline, which cannot happen with a baseline computed from the same
    /// observations.
    pub fn build(
        &self,
        character: &CharacterId,
        observations: &RawObservations,
    ) -> Result<CharacterProfile, PipelineError> {
        let raw_means = PerDimension::from_fn(|d: SentimentDimension| {
            mean(observations.on(d)).map(|m| round_to(m, RAW_MEAN_PRECISION))
        });

        let mut adjusted = PerDimension::from_fn(|_: SentimentDimension| Adjusted::Undefined);
        for (dimension, raw) in raw_means.iter() {
            if let Some(raw) = raw {
                let baseline = self.baseline.require(dimension)?;
                adjusted[dimension] =
                    Adjusted::from_option(Some(round_to(raw - baseline, ADJUSTED_PRECISION)));
            }
        }

        let ranking = rank(&adjusted);

        let mut contributions: PerTrait<Vec<f64>> = PerTrait::default();
        for &dimension in &ranking[..self.top_k] {
            let Some(value) = adjusted[dimension].projectable() else {
                continue;
            };
            for (trait_name, entry) in self.table.row(dimension).iter() {
                let term = value * entry.coefficient * entry.weight();
                contributions[trait_name].push(round_to(term, CONTRIBUTION_PRECISION));
            }
        }

        let k = self.top_k as f64;
        // Fold from +0.0; an empty float sum is -0.0
        let traits = contributions.map(|_, terms| {
            round_to(terms.iter().fold(0.0, |acc, t| acc + t) / k, TRAIT_PRECISION)
        });

        Ok(CharacterProfile {
            character: character.clone(),
            raw_means,
            adjusted,
            ranking,
            top_k: self.top_k,
            contributions,
            traits,
        })
    }
}

/// Check a configured K.
pub fn validate_top_k(top_k: usize) -> Result<(), PipelineError> {
    if (1..=SentimentDimension::ALL.len()).contains(&top_k) {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!(
            "top_k must be between 1 and {}, got {top_k}",
            SentimentDimension::ALL.len()
        )))
    }
}

/// Order dimensions by magnitude, largest first. The sort is stable, so equal
/// magnitudes keep declaration order.
fn rank(adjusted: &PerDimension<Adjusted>) -> Vec<SentimentDimension> {
    let mut order = SentimentDimension::ALL.to_vec();
    order.sort_by(|a, b| adjusted[*b].magnitude().total_cmp(&adjusted[*a].magnitude()));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::Significance;
    use crate::testing::{ladder_table, uniform_table};
    use SentimentDimension::*;

    fn baseline(values: [f64; 5]) -> CorpusBaseline {
        CorpusBaseline::from_means(PerDimension::from_fn(|d: SentimentDimension| {
            Some(values[d.index()])
        }))
    }

    fn observations(values: &[(SentimentDimension, f64)]) -> RawObservations {
        let mut obs = RawObservations::new();
        for (d, v) in values {
            obs.record(*d, *v);
        }
        obs
    }

    fn id() -> CharacterId {
        CharacterId::from_name("Mercutio")
    }

    #[test]
    fn test_adjusted_tri_state() {
        assert_eq!(Adjusted::from_option(None), Adjusted::Undefined);
        assert_eq!(Adjusted::from_option(Some(0.0)), Adjusted::Zero);
        assert_eq!(Adjusted::from_option(Some(-0.0)), Adjusted::Zero);
        assert_eq!(Adjusted::from_option(Some(0.2)), Adjusted::Value(0.2));

        assert_eq!(Adjusted::Zero.defined(), Some(0.0));
        assert_eq!(Adjusted::Zero.projectable(), None);
        assert_eq!(Adjusted::Undefined.magnitude(), 0.0);
        assert_eq!(Adjusted::Value(-0.3).magnitude(), 0.3);
    }

    #[test]
    fn test_raw_and_adjusted_means() {
        let base = baseline([0.1, 0.2, 0.3, 0.4, 0.5]);
        let table = CorrelationTable::default();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();
        let obs = observations(&[(Attitude, 0.3), (Attitude, 0.4), (Temper, 0.4)]);

        let profile = builder.build(&id(), &obs).unwrap();

        assert_eq!(profile.raw_means[Attitude], Some(0.35));
        assert_eq!(profile.adjusted[Attitude], Adjusted::Value(0.25));
        assert_eq!(profile.adjusted[Temper], Adjusted::Zero);
        assert_eq!(profile.adjusted[Polarity], Adjusted::Undefined);
    }

    #[test]
    fn test_ranking_orders_by_magnitude() {
        let base = baseline([0.0; 5]);
        let table = CorrelationTable::default();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();
        let obs = observations(&[(Attitude, 0.1), (Sensitivity, -0.6), (Polarity, 0.3)]);

        let profile = builder.build(&id(), &obs).unwrap();
        assert_eq!(
            profile.ranking,
            vec![Sensitivity, Polarity, Attitude, Introspection, Temper]
        );
    }

    #[test]
    fn test_ranking_ties_keep_declaration_order() {
        let base = baseline([0.0; 5]);
        let table = CorrelationTable::default();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();
        let obs = observations(&[(Polarity, 0.4), (Introspection, -0.4)]);

        let profile = builder.build(&id(), &obs).unwrap();
        // Equal magnitude: introspection is declared before polarity.
        // Undefined dimensions trail, again in declaration order.
        assert_eq!(
            profile.ranking,
            vec![Introspection, Polarity, Attitude, Sensitivity, Temper]
        );
    }

    #[test]
    fn test_weight_ladder() {
        let base = baseline([0.0; 5]);
        let table = ladder_table();
        let builder = ProfileBuilder::new(&base, &table, 1).unwrap();
        let obs = observations(&[(Attitude, 0.5)]);

        let profile = builder.build(&id(), &obs).unwrap();
        assert_eq!(profile.trait_score(Trait::Openness), 0.165);
        assert_eq!(profile.trait_score(Trait::Conscientiousness), 0.215);
        assert_eq!(profile.trait_score(Trait::Extraversion), 0.25);
        assert_eq!(profile.trait_score(Trait::Agreeableness), 0.5);
        assert_eq!(profile.trait_score(Trait::Neuroticism), 0.0);
    }

    #[test]
    fn test_denominator_is_always_k() {
        let base = baseline([0.0; 5]);
        let table = ladder_table();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();
        let obs = observations(&[(Attitude, 0.5)]);

        let profile = builder.build(&id(), &obs).unwrap();
        // Only attitude contributed, but the sum is still divided by 5
        assert_eq!(profile.contributions[Trait::Agreeableness], vec![0.5]);
        assert_eq!(profile.trait_score(Trait::Openness), 0.033);
        assert_eq!(profile.trait_score(Trait::Conscientiousness), 0.043);
        assert_eq!(profile.trait_score(Trait::Extraversion), 0.05);
        assert_eq!(profile.trait_score(Trait::Agreeableness), 0.1);
    }

    #[test]
    fn test_top_k_limits_projection_to_most_distinctive() {
        let base = baseline([0.0; 5]);
        // Every cell strong with coefficient 1.0
        let table = uniform_table(1.0, Significance::Strong);
        let builder = ProfileBuilder::new(&base, &table, 2).unwrap();
        let obs = observations(&[(Attitude, 0.1), (Temper, 0.3), (Polarity, -0.2)]);

        let profile = builder.build(&id(), &obs).unwrap();
        assert_eq!(profile.selected(), &[Temper, Polarity]);
        // (0.3 + -0.2) / 2
        for t in Trait::ALL {
            assert_eq!(profile.trait_score(t), 0.05);
        }
    }

    #[test]
    fn test_zero_adjusted_projects_nothing() {
        let base = baseline([0.4, 0.0, 0.0, 0.0, 0.0]);
        let table = ladder_table();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();
        let obs = observations(&[(Attitude, 0.4)]);

        let profile = builder.build(&id(), &obs).unwrap();
        assert_eq!(profile.adjusted[Attitude], Adjusted::Zero);
        assert!(profile.contributions.iter().all(|(_, c)| c.is_empty()));
        assert!(profile.traits.iter().all(|(_, s)| *s == 0.0));
    }

    #[test]
    fn test_empty_character_scores_zero() {
        let base = baseline([0.3; 5]);
        let table = CorrelationTable::default();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();

        let profile = builder.build(&id(), &RawObservations::new()).unwrap();
        assert!(profile.is_empty());
        assert_eq!(profile.ranking, SentimentDimension::ALL.to_vec());
        for t in Trait::ALL {
            assert_eq!(profile.trait_score(t), 0.0);
            assert!(profile.trait_score(t).is_sign_positive(), "{t:?} is -0.0");
        }
    }

    #[test]
    fn test_write_to_graph() {
        let base = baseline([0.4, 0.0, 0.0, 0.0, 0.0]);
        let table = CorrelationTable::default();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();
        let obs = observations(&[(Attitude, 0.4), (Temper, -0.2)]);
        let profile = builder.build(&id(), &obs).unwrap();

        let mut graph = EntityGraph::new();
        profile.write_to(&mut graph);

        let subject = Resource::Character(id());
        // Zero is still a defined value
        assert_eq!(graph.number(&subject, &Predicate::HasDimension(Attitude)), Some(0.0));
        assert_eq!(graph.number(&subject, &Predicate::HasDimension(Temper)), Some(-0.2));
        assert_eq!(graph.number(&subject, &Predicate::HasDimension(Polarity)), None);
        for t in Trait::ALL {
            assert_eq!(
                graph.number(&subject, &Predicate::HasTraitValue(t)),
                Some(profile.trait_score(t))
            );
        }
        assert_eq!(graph.len(), 2 + 5);
    }

    #[test]
    fn test_defined_value_without_baseline_is_fatal() {
        let base = CorpusBaseline::from_means(PerDimension::from_fn(|d: SentimentDimension| {
            (d != Temper).then_some(0.0)
        }));
        let table = CorrelationTable::default();
        let builder = ProfileBuilder::new(&base, &table, 5).unwrap();

        // Undefined on both sides is fine
        assert!(builder.build(&id(), &observations(&[(Attitude, 0.2)])).is_ok());

        let err = builder
            .build(&id(), &observations(&[(Temper, 0.3)]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::BaselineUndefined(Temper)));
    }

    #[test]
    fn test_invalid_top_k() {
        let base = baseline([0.0; 5]);
        let table = CorrelationTable::default();
        assert!(ProfileBuilder::new(&base, &table, 0).is_err());
        assert!(ProfileBuilder::new(&base, &table, 6).is_err());
        assert!(ProfileBuilder::new(&base, &table, 3).is_ok());
    }
}
