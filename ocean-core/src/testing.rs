//! Testing utilities for the profiling pipeline.
//!
//! This module provides tools for unit and integration testing:
//! - `RowBuilder` for speech rows without going through a table file
//! - synthetic correlation tables with easy-to-check arithmetic
//! - `speech_table` for rendering rows back into the tab-separated format
//! - assertion helpers for graph contents

use crate::correlation::{CorrelationEntry, CorrelationTable, Significance};
use crate::dimension::{Axis, PerDimension, SentimentDimension, Trait, NO_SIGNAL};
use crate::graph::{EntityGraph, Object, Predicate, Resource};
use crate::input::{SpeechRow, REQUIRED_COLUMNS};

/// Builder for a single [`SpeechRow`].
///
/// Defaults: row 0, scene `I.1`, no tokens, no signal on any dimension.
#[derive(Debug, Clone)]
pub struct RowBuilder {
    row: SpeechRow,
}

impl RowBuilder {
    pub fn new(speaker: impl Into<String>) -> Self {
        Self {
            row: SpeechRow {
                row: 0,
                speaker: speaker.into(),
                tokens: Vec::new(),
                emotions: Vec::new(),
                dimensions: PerDimension::from_fn(|_: SentimentDimension| NO_SIGNAL),
                scene: "I.1".to_string(),
            },
        }
    }

    /// Append a token with its primary emotion.
    pub fn token(mut self, text: impl Into<String>, emotion: impl Into<String>) -> Self {
        self.row.tokens.push(text.into());
        self.row.emotions.push(emotion.into());
        self
    }

    /// Set the 0-based row index.
    pub fn row(mut self, row: usize) -> Self {
        self.row.row = row;
        self
    }

    pub fn scene(mut self, scene: impl Into<String>) -> Self {
        self.row.scene = scene.into();
        self
    }

    /// Set all five speech-level values, in dimension order.
    pub fn dimensions(mut self, values: [f64; 5]) -> Self {
        self.row.dimensions = PerDimension::from_fn(|d: SentimentDimension| values[d.index()]);
        self
    }

    /// Set one speech-level value.
    pub fn dimension(mut self, dimension: SentimentDimension, value: f64) -> Self {
        self.row.dimensions[dimension] = value;
        self
    }

    pub fn build(self) -> SpeechRow {
        self.row
    }
}

// ============================================================================
// Synthetic correlation tables
// ============================================================================

/// Every cell the same.
pub fn uniform_table(coefficient: f64, significance: Significance) -> CorrelationTable {
    CorrelationTable::from_fn(|_, _| CorrelationEntry::new(coefficient, significance))
}

/// Attitude maps onto the traits with coefficient 1.0 and one significance
/// level per trait: O none, C weak, E moderate, A strong. Neuroticism and all
/// other dimensions have coefficient 0.0.
///
/// A character whose only off-baseline dimension is attitude then scores
/// exactly `adjusted * weight` on each trait (for K = 1).
pub fn ladder_table() -> CorrelationTable {
    CorrelationTable::from_fn(|dimension, trait_name| {
        if dimension != SentimentDimension::Attitude {
            return CorrelationEntry::new(0.0, Significance::None);
        }
        match trait_name {
            Trait::Openness => CorrelationEntry::new(1.0, Significance::None),
            Trait::Conscientiousness => CorrelationEntry::new(1.0, Significance::Weak),
            Trait::Extraversion => CorrelationEntry::new(1.0, Significance::Moderate),
            Trait::Agreeableness => CorrelationEntry::new(1.0, Significance::Strong),
            Trait::Neuroticism => CorrelationEntry::new(0.0, Significance::Strong),
        }
    })
}

// ============================================================================
// Table rendering
// ============================================================================

/// Render rows as a tab-separated speech table with a leading index column.
///
/// Sequences are written as JSON. Values at the sentinel are written as-is,
/// so the output parses back to the same rows.
pub fn speech_table(rows: &[SpeechRow]) -> String {
    let mut out = String::new();
    for column in REQUIRED_COLUMNS {
        out.push('\t');
        out.push_str(column);
    }
    out.push('\n');

    for (index, row) in rows.iter().enumerate() {
        let emotions: Vec<serde_json::Value> = row
            .emotions
            .iter()
            .map(|e| serde_json::json!({ "primary_emotion": e }))
            .collect();
        let mut fields = vec![
            index.to_string(),
            row.speaker.clone(),
            serde_json::Value::from(row.tokens.clone()).to_string(),
            serde_json::Value::from(emotions).to_string(),
        ];
        fields.extend(row.dimensions.values().iter().map(|v| v.to_string()));
        fields.push(row.scene.clone());
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
    out
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that the graph contains the statement exactly `count` times.
#[track_caller]
pub fn assert_statement_count(
    graph: &EntityGraph,
    subject: &Resource,
    predicate: &Predicate,
    object: &Object,
    count: usize,
) {
    let actual = graph
        .objects(subject, predicate)
        .filter(|o| *o == object)
        .count();
    assert_eq!(
        actual, count,
        "Expected {count} statement(s) {subject:?} {predicate:?} {object:?}, found {actual}"
    );
}

/// Assert a numeric statement's value.
#[track_caller]
pub fn assert_number(
    graph: &EntityGraph,
    subject: &Resource,
    predicate: &Predicate,
    expected: f64,
) {
    let actual = graph.number(subject, predicate);
    assert_eq!(
        actual,
        Some(expected),
        "Expected {subject:?} {predicate:?} = {expected}, got {actual:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_speech_table;

    #[test]
    fn test_row_builder_defaults() {
        let row = RowBuilder::new("Romeo").build();
        assert_eq!(row.row, 0);
        assert_eq!(row.scene, "I.1");
        assert!(row.tokens.is_empty());
        assert!(row.dimensions.iter().all(|(_, v)| *v == NO_SIGNAL));
    }

    #[test]
    fn test_ladder_table_weights() {
        let table = ladder_table();
        let row = table.row(SentimentDimension::Attitude);
        assert_eq!(row[Trait::Openness].weight(), 0.33);
        assert_eq!(row[Trait::Agreeableness].weight(), 1.0);
        assert_eq!(
            table.entry(SentimentDimension::Polarity, Trait::Agreeableness).coefficient,
            0.0
        );
    }

    #[test]
    fn test_speech_table_parses_back() {
        let rows = vec![
            RowBuilder::new("Romeo")
                .token("love", "joy")
                .token("it's", "fear")
                .dimensions([0.6, -2.0, 0.1, 0.0, 0.2])
                .scene("II.2")
                .build(),
            RowBuilder::new("Juliet")
                .row(1)
                .dimension(SentimentDimension::Temper, 0.3)
                .build(),
        ];
        let parsed = parse_speech_table(speech_table(&rows).as_bytes()).unwrap();
        assert_eq!(parsed, rows);
    }
}
