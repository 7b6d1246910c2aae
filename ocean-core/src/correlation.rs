//! Correlation table between sentiment dimensions and OCEAN traits.
//!
//! Each cell holds a point-biserial coefficient and the significance of that
//! coefficient. Calibration studies publish cells in star notation, e.g.
//! `-0.057**`, where the number of stars encodes the p-value bucket:
//!
//! | notation | p-value   | significance | weight |
//! |----------|-----------|--------------|--------|
//! | (none)   | p > .05   | none         | 0.33   |
//! | `*`      | p < .05   | weak         | 0.43   |
//! | `**`     | p < .01   | moderate     | 0.5    |
//! | `***`    | p < .001  | strong       | 1.0    |
//!
//! The table is immutable once built and is handed to the profile builder by
//! reference, so a run can swap it for a synthetic or re-calibrated one.

use crate::dimension::{Axis, PerDimension, PerTrait, SentimentDimension, Trait, UnknownName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;

/// Errors from building or loading a correlation table.
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("Invalid correlation notation: {0:?}")]
    InvalidNotation(String),

    #[error("Too many significance stars in {0:?} (at most 3)")]
    TooManyStars(String),

    #[error("Correlation table has no entry for {dimension} x {trait_name}")]
    MissingEntry {
        dimension: SentimentDimension,
        trait_name: Trait,
    },

    #[error(transparent)]
    UnknownName(#[from] UnknownName),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Statistical significance bucket of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    /// p > .05
    None,
    /// p < .05
    Weak,
    /// p < .01
    Moderate,
    /// p < .001
    Strong,
}

impl Significance {
    /// Damping weight applied to a coefficient of this significance.
    pub fn weight(&self) -> f64 {
        match self {
            Significance::None => 0.33,
            Significance::Weak => 0.43,
            Significance::Moderate => 0.5,
            Significance::Strong => 1.0,
        }
    }

    /// Number of stars in the published notation.
    pub fn stars(&self) -> usize {
        match self {
            Significance::None => 0,
            Significance::Weak => 1,
            Significance::Moderate => 2,
            Significance::Strong => 3,
        }
    }

    pub fn from_stars(stars: usize) -> Option<Self> {
        match stars {
            0 => Some(Significance::None),
            1 => Some(Significance::Weak),
            2 => Some(Significance::Moderate),
            3 => Some(Significance::Strong),
            _ => None,
        }
    }
}

/// One cell of the correlation table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    /// Signed point-biserial coefficient.
    pub coefficient: f64,
    /// Significance of the coefficient.
    pub significance: Significance,
}

impl CorrelationEntry {
    pub const fn new(coefficient: f64, significance: Significance) -> Self {
        Self {
            coefficient,
            significance,
        }
    }

    /// The significance weight of this cell.
    pub fn weight(&self) -> f64 {
        self.significance.weight()
    }
}

impl FromStr for CorrelationEntry {
    type Err = CorrelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.trim_end_matches('*');
        let stars = trimmed.len() - number.len();

        let significance = Significance::from_stars(stars)
            .ok_or_else(|| CorrelationError::TooManyStars(s.to_string()))?;
        let coefficient: f64 = number
            .trim()
            .parse()
            .map_err(|_| CorrelationError::InvalidNotation(s.to_string()))?;
        if !coefficient.is_finite() {
            return Err(CorrelationError::InvalidNotation(s.to_string()));
        }

        Ok(Self::new(coefficient, significance))
    }
}

impl fmt::Display for CorrelationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.coefficient,
            "*".repeat(self.significance.stars())
        )
    }
}

use Significance::{Moderate, None as Ns, Strong, Weak};

/// SenticNet (2020) x OCEAN point-biserial correlations, rows in dimension
/// order, columns in trait order.
pub const SENTICNET_OCEAN_2020: [[CorrelationEntry; 5]; 5] = [
    // attitude
    [
        CorrelationEntry::new(-0.057, Moderate),
        CorrelationEntry::new(0.058, Moderate),
        CorrelationEntry::new(0.056, Moderate),
        CorrelationEntry::new(0.124, Ns),
        CorrelationEntry::new(-0.035, Ns),
    ],
    // introspection
    [
        CorrelationEntry::new(-0.061, Moderate),
        CorrelationEntry::new(0.069, Strong),
        CorrelationEntry::new(0.047, Weak),
        CorrelationEntry::new(0.099, Ns),
        CorrelationEntry::new(-0.081, Ns),
    ],
    // sensitivity
    [
        CorrelationEntry::new(0.015, Ns),
        CorrelationEntry::new(0.048, Weak),
        CorrelationEntry::new(-0.013, Ns),
        CorrelationEntry::new(0.03, Ns),
        CorrelationEntry::new(-0.063, Moderate),
    ],
    // temper
    [
        CorrelationEntry::new(-0.044, Weak),
        CorrelationEntry::new(0.095, Ns),
        CorrelationEntry::new(0.047, Weak),
        CorrelationEntry::new(0.105, Ns),
        CorrelationEntry::new(-0.058, Moderate),
    ],
    // polarity
    [
        CorrelationEntry::new(-0.058, Ns),
        CorrelationEntry::new(0.093, Ns),
        CorrelationEntry::new(0.056, Moderate),
        CorrelationEntry::new(0.125, Ns),
        CorrelationEntry::new(-0.083, Ns),
    ],
];

lazy_static::lazy_static! {
    /// The calibrated table used when a run does not supply its own.
    pub static ref DEFAULT_TABLE: CorrelationTable =
        CorrelationTable::from_rows(&SENTICNET_OCEAN_2020);
}

/// Total mapping (dimension x trait) -> correlation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationTable {
    cells: PerDimension<PerTrait<CorrelationEntry>>,
}

impl CorrelationTable {
    /// Build a table by evaluating `f` for every cell.
    pub fn from_fn(mut f: impl FnMut(SentimentDimension, Trait) -> CorrelationEntry) -> Self {
        Self {
            cells: PerDimension::from_fn(|dim| PerTrait::from_fn(|t| f(dim, t))),
        }
    }

    /// Build a table from rows in dimension order, columns in trait order.
    pub fn from_rows(rows: &[[CorrelationEntry; 5]; 5]) -> Self {
        Self::from_fn(|dim, t| rows[dim.index()][t.index()])
    }

    /// Parse a table from star-notation strings, rows in dimension order.
    pub fn from_notation(rows: &[[&str; 5]; 5]) -> Result<Self, CorrelationError> {
        let mut parsed = [[CorrelationEntry::new(0.0, Significance::None); 5]; 5];
        for (row, cells) in parsed.iter_mut().zip(rows) {
            for (cell, text) in row.iter_mut().zip(cells) {
                *cell = text.parse()?;
            }
        }
        Ok(Self::from_rows(&parsed))
    }

    /// Parse a JSON document of the form
    /// `{"attitude": {"openness": "-0.057**", ...}, ...}`.
    ///
    /// Keys may be full names or abbreviations (`att`, `o`). Every cell must
    /// be present.
    pub fn from_json_str(json: &str) -> Result<Self, CorrelationError> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;

        let mut cells: PerDimension<PerTrait<Option<CorrelationEntry>>> = PerDimension::default();
        for (dim_key, row) in &raw {
            let dimension: SentimentDimension = dim_key.parse()?;
            for (trait_key, notation) in row {
                let trait_name: Trait = trait_key.parse()?;
                cells[dimension][trait_name] = Some(notation.parse()?);
            }
        }

        let mut rows = [[CorrelationEntry::new(0.0, Significance::None); 5]; 5];
        for dimension in SentimentDimension::ALL {
            for trait_name in Trait::ALL {
                rows[dimension.index()][trait_name.index()] = cells[dimension][trait_name]
                    .ok_or(CorrelationError::MissingEntry {
                        dimension,
                        trait_name,
                    })?;
            }
        }
        Ok(Self::from_rows(&rows))
    }

    /// Load a table from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, CorrelationError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    /// Look up a single cell.
    pub fn entry(&self, dimension: SentimentDimension, trait_name: Trait) -> CorrelationEntry {
        self.cells[dimension][trait_name]
    }

    /// All cells of one dimension, in trait order.
    pub fn row(&self, dimension: SentimentDimension) -> &PerTrait<CorrelationEntry> {
        &self.cells[dimension]
    }

    /// Render the table back to star notation, keyed by full names.
    pub fn to_notation(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.cells
            .iter()
            .map(|(dim, row)| {
                let cells = row
                    .iter()
                    .map(|(t, entry)| (t.name().to_string(), entry.to_string()))
                    .collect();
                (dim.name().to_string(), cells)
            })
            .collect()
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}
