//! Sentiment dimensions and personality traits.
//!
//! Both axes have exactly five members and a fixed declaration order. The
//! order matters: ties during ranking are broken by it, and the console
//! summary prints traits in it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use thiserror::Error;

/// Dimension values at or below this mark "no signal" for a speech.
pub const NO_SIGNAL: f64 = -2.0;

/// Whether a speech-level value carries signal (i.e. is above the sentinel).
///
/// NaN never carries signal.
pub fn has_signal(value: f64) -> bool {
    value > NO_SIGNAL
}

/// Error for an unrecognized dimension or trait name.
#[derive(Debug, Error)]
#[error("Unknown {axis} name: {name}")]
pub struct UnknownName {
    pub axis: &'static str,
    pub name: String,
}

/// A closed axis with five members in declaration order.
pub trait Axis: Copy + Eq + fmt::Debug + 'static {
    /// All members, in declaration order.
    const ALL: [Self; 5];

    /// Position of this member in [`Axis::ALL`].
    fn index(self) -> usize;
}

/// One of the five lexicon-derived sentiment axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentDimension {
    Attitude,
    Introspection,
    Sensitivity,
    Temper,
    Polarity,
}

impl SentimentDimension {
    /// Lowercase name, e.g. `"attitude"`.
    pub fn name(&self) -> &'static str {
        match self {
            SentimentDimension::Attitude => "attitude",
            SentimentDimension::Introspection => "introspection",
            SentimentDimension::Sensitivity => "sensitivity",
            SentimentDimension::Temper => "temper",
            SentimentDimension::Polarity => "polarity",
        }
    }

    /// Three-letter abbreviation used by the calibration tables.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            SentimentDimension::Attitude => "att",
            SentimentDimension::Introspection => "int",
            SentimentDimension::Sensitivity => "sen",
            SentimentDimension::Temper => "tem",
            SentimentDimension::Polarity => "pol",
        }
    }

    /// Capitalized name, used to build `has{Label}` predicates.
    pub fn label(&self) -> &'static str {
        match self {
            SentimentDimension::Attitude => "Attitude",
            SentimentDimension::Introspection => "Introspection",
            SentimentDimension::Sensitivity => "Sensitivity",
            SentimentDimension::Temper => "Temper",
            SentimentDimension::Polarity => "Polarity",
        }
    }

    /// Column holding the speech-level average in the input table.
    pub fn column(&self) -> &'static str {
        match self {
            SentimentDimension::Attitude => "avg_attitude",
            SentimentDimension::Introspection => "avg_introspection",
            SentimentDimension::Sensitivity => "avg_sensitivity",
            SentimentDimension::Temper => "avg_temper",
            SentimentDimension::Polarity => "avg_polarity",
        }
    }
}

impl Axis for SentimentDimension {
    const ALL: [Self; 5] = [
        SentimentDimension::Attitude,
        SentimentDimension::Introspection,
        SentimentDimension::Sensitivity,
        SentimentDimension::Temper,
        SentimentDimension::Polarity,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SentimentDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SentimentDimension {
    type Err = UnknownName;

    /// Accepts the full name or the three-letter abbreviation, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        SentimentDimension::ALL
            .into_iter()
            .find(|d| d.name() == lower || d.abbreviation() == lower)
            .ok_or_else(|| UnknownName {
                axis: "sentiment dimension",
                name: s.to_string(),
            })
    }
}

/// One of the Big Five (OCEAN) personality traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Trait {
    pub fn name(&self) -> &'static str {
        match self {
            Trait::Openness => "openness",
            Trait::Conscientiousness => "conscientiousness",
            Trait::Extraversion => "extraversion",
            Trait::Agreeableness => "agreeableness",
            Trait::Neuroticism => "neuroticism",
        }
    }

    /// Single-letter OCEAN initial, as used in the summary header.
    pub fn initial(&self) -> char {
        match self {
            Trait::Openness => 'O',
            Trait::Conscientiousness => 'C',
            Trait::Extraversion => 'E',
            Trait::Agreeableness => 'A',
            Trait::Neuroticism => 'N',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trait::Openness => "Openness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Extraversion => "Extraversion",
            Trait::Agreeableness => "Agreeableness",
            Trait::Neuroticism => "Neuroticism",
        }
    }
}

impl Axis for Trait {
    const ALL: [Self; 5] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Trait {
    type Err = UnknownName;

    /// Accepts the full name or the OCEAN initial, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Trait::ALL
            .into_iter()
            .find(|t| {
                t.name() == lower || t.initial().to_ascii_lowercase().to_string() == lower
            })
            .ok_or_else(|| UnknownName {
                axis: "trait",
                name: s.to_string(),
            })
    }
}

/// A fixed-size map from every member of an axis to a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerAxis<A: Axis, T> {
    values: [T; 5],
    axis: PhantomData<A>,
}

/// Values keyed by [`SentimentDimension`].
pub type PerDimension<T> = PerAxis<SentimentDimension, T>;

/// Values keyed by [`Trait`].
pub type PerTrait<T> = PerAxis<Trait, T>;

impl<A: Axis, T> PerAxis<A, T> {
    /// Build a map by evaluating `f` for every member in declaration order.
    pub fn from_fn(mut f: impl FnMut(A) -> T) -> Self {
        Self {
            values: A::ALL.map(&mut f),
            axis: PhantomData,
        }
    }

    /// Iterate `(member, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (A, &T)> + '_ {
        A::ALL.into_iter().zip(self.values.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (A, &mut T)> + '_ {
        A::ALL.into_iter().zip(self.values.iter_mut())
    }

    /// Transform every value, keeping the keys.
    pub fn map<U>(&self, mut f: impl FnMut(A, &T) -> U) -> PerAxis<A, U> {
        PerAxis::from_fn(|member| f(member, &self.values[member.index()]))
    }

    pub fn values(&self) -> &[T; 5] {
        &self.values
    }
}

impl<A: Axis, T: Default> Default for PerAxis<A, T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<A: Axis, T> Index<A> for PerAxis<A, T> {
    type Output = T;

    fn index(&self, member: A) -> &T {
        &self.values[member.index()]
    }
}

impl<A: Axis, T> IndexMut<A> for PerAxis<A, T> {
    fn index_mut(&mut self, member: A) -> &mut T {
        &mut self.values[member.index()]
    }
}
