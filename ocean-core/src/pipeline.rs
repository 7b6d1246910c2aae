//! Pipeline orchestration.
//!
//! A run goes through four strictly ordered phases over fully materialized
//! input:
//!
//! 1. register every speaker, in first-appearance order;
//! 2. aggregate every speech into the graph and the raw observations;
//! 3. compute the corpus baseline from all observations;
//! 4. build, and write to the graph, one profile per character.
//!
//! [`Pipeline::run`] is the synchronous core. [`run`] wraps it with the file
//! handling described by a [`PipelineConfig`]. The graph is persisted only
//! after all four phases succeeded.

use crate::aggregator::{SpeechAggregator, TokenCounter};
use crate::baseline::CorpusBaseline;
use crate::correlation::{CorrelationError, CorrelationTable};
use crate::dimension::{Axis, PerTrait, SentimentDimension, Trait};
use crate::graph::{CharacterId, EntityGraph};
use crate::input::{load_speech_table, InputError, SpeechRow};
use crate::persist::{load_graph, save_graph, PersistError};
use crate::profile::{validate_top_k, CharacterProfile, ProfileBuilder, DEFAULT_TOP_K};
use crate::stats::format_score;
use crate::text::TokenFilter;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Malformed input at row {row}: {reason}")]
    MalformedInput { row: usize, reason: String },

    #[error("Baseline undefined: no speech carries a value for {0}")]
    BaselineUndefined(SentimentDimension),

    #[error("No observations for character {0}")]
    MissingProfile(CharacterId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Correlation table error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tab-separated speech table.
    pub input: PathBuf,

    /// Graph document to extend; an empty graph if unset.
    pub starting_graph: Option<PathBuf>,

    /// Where to write the final graph; nothing is written if unset.
    pub output: Option<PathBuf>,

    /// Number of most distinctive dimensions projected per character.
    pub top_k: usize,

    /// JSON correlation table replacing the built-in one.
    pub correlation_table: Option<PathBuf>,
}

impl PipelineConfig {
    /// Create a config reading speeches from `input`.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            starting_graph: None,
            output: None,
            top_k: DEFAULT_TOP_K,
            correlation_table: None,
        }
    }

    /// Extend an existing graph document.
    pub fn with_starting_graph(mut self, path: impl Into<PathBuf>) -> Self {
        self.starting_graph = Some(path.into());
        self
    }

    /// Write the final graph; `.nt` selects N-Triples, anything else JSON.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Load the correlation table from a JSON document.
    pub fn with_correlation_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.correlation_table = Some(path.into());
        self
    }

    /// Reject configurations that cannot run.
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_top_k(self.top_k)?;
        if self.output.is_some() && self.output == self.starting_graph {
            return Err(PipelineError::InvalidConfig(
                "output must not overwrite the starting graph".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Run
// ============================================================================

/// The profiling pipeline over in-memory rows.
#[derive(Debug, Clone)]
pub struct Pipeline {
    table: CorrelationTable,
    top_k: usize,
    filter: TokenFilter,
}

impl Pipeline {
    pub fn new(table: CorrelationTable, top_k: usize) -> Result<Self, PipelineError> {
        validate_top_k(top_k)?;
        Ok(Self {
            table,
            top_k,
            filter: TokenFilter::english(),
        })
    }

    /// Replace the token filter.
    pub fn with_filter(mut self, filter: TokenFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Run all phases over `rows`, appending to `graph`.
    pub fn run(
        &self,
        rows: &[SpeechRow],
        mut graph: EntityGraph,
    ) -> Result<RunOutput, PipelineError> {
        let starting_triples = graph.len();
        let mut aggregator = SpeechAggregator::new(self.filter.clone());
        let mut counter = TokenCounter::new();

        let mut characters: Vec<CharacterId> = Vec::new();
        for row in rows {
            if row.speaker.trim().is_empty() {
                return Err(PipelineError::MalformedInput {
                    row: row.row,
                    reason: "empty speaker name".to_string(),
                });
            }
            let id = graph.register_character(&row.speaker);
            if !characters.contains(&id) {
                aggregator.track(id.clone());
                characters.push(id);
            }
        }
        info!(
            rows = rows.len(),
            characters = characters.len(),
            "registered speakers"
        );

        for row in rows {
            let id = CharacterId::from_name(&row.speaker);
            aggregator.aggregate(&mut graph, &mut counter, &id, row, rows.len())?;
        }
        info!(
            tokens = counter.issued(),
            triples = graph.len() - starting_triples,
            "aggregated speeches"
        );

        let observations = aggregator.into_observations();
        let per_character = characters
            .iter()
            .map(|id| {
                observations
                    .get(id)
                    .ok_or_else(|| PipelineError::MissingProfile(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let baseline = CorpusBaseline::compute(per_character.iter().copied());
        info!(baseline = ?baseline.means().values(), "computed corpus baseline");
        for dimension in baseline.undefined() {
            warn!(%dimension, "no speech carries this dimension, it stays undefined");
        }

        let builder = ProfileBuilder::new(&baseline, &self.table, self.top_k)?;
        let mut profiles = Vec::with_capacity(characters.len());
        for (id, obs) in characters.iter().zip(per_character) {
            let profile = builder.build(id, obs)?;
            if profile.is_empty() {
                warn!(character = %id, "no sentiment signal, all traits default to 0.0");
            }
            debug!(
                character = %id,
                observations = obs.total(),
                selected = ?profile.selected(),
                traits = %format_row(profile.traits.values()),
                "built profile"
            );
            profile.write_to(&mut graph);
            profiles.push(profile);
        }
        info!(profiles = profiles.len(), triples = graph.len(), "run complete");

        Ok(RunOutput {
            graph,
            profiles,
            baseline,
            tokens_seen: counter.issued(),
        })
    }
}

/// Load everything named by `config`, run, and persist the graph.
pub async fn run(config: &PipelineConfig) -> Result<RunOutput, PipelineError> {
    config.validate()?;

    let table = match &config.correlation_table {
        Some(path) => {
            info!(path = %path.display(), "loading correlation table");
            CorrelationTable::load_json(path).await?
        }
        None => CorrelationTable::default(),
    };

    let graph = match &config.starting_graph {
        Some(path) => {
            let graph = load_graph(path).await?;
            info!(path = %path.display(), triples = graph.len(), "loaded starting graph");
            graph
        }
        None => EntityGraph::new(),
    };

    let rows = load_speech_table(&config.input).await?;
    info!(path = %config.input.display(), rows = rows.len(), "read speech table");

    let output = Pipeline::new(table, config.top_k)?.run(&rows, graph)?;

    if let Some(path) = &config.output {
        let format = save_graph(&output.graph, path).await?;
        info!(path = %path.display(), ?format, "saved graph");
    }

    Ok(output)
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub graph: EntityGraph,
    /// One profile per character, in first-appearance order.
    pub profiles: Vec<CharacterProfile>,
    pub baseline: CorpusBaseline,
    /// Input tokens processed, retained or not.
    pub tokens_seen: u64,
}

impl RunOutput {
    /// Look up a profile by speaker name, in any spelling.
    pub fn profile(&self, name: &str) -> Option<&CharacterProfile> {
        let id = CharacterId::from_name(name);
        self.profiles.iter().find(|p| p.character == id)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rows: self
                .profiles
                .iter()
                .map(|p| (p.character.clone(), p.traits))
                .collect(),
        }
    }
}

// ============================================================================
// Console summary
// ============================================================================

/// Trait scores per character, printable as a tab-separated table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rows: Vec<(CharacterId, PerTrait<f64>)>,
}

impl RunSummary {
    pub fn header() -> String {
        let mut line = String::from("character");
        for t in Trait::ALL {
            line.push('\t');
            line.push(t.initial());
        }
        line
    }

    pub fn render_table(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::header())?;
        for (id, traits) in &self.rows {
            writeln!(f, "{id}\t{}", format_row(traits.values()))?;
        }
        Ok(())
    }
}

fn format_row(values: &[f64; 5]) -> String {
    values
        .iter()
        .map(|v| format_score(*v))
        .collect::<Vec<_>>()
        .join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EntityClass, Predicate, Resource};
    use crate::profile::Adjusted;
    use crate::testing::RowBuilder;

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new("speeches.tsv")
            .with_starting_graph("schema.json")
            .with_output("out.nt")
            .with_top_k(3)
            .with_correlation_table("rpb.json");

        assert_eq!(config.input, PathBuf::from("speeches.tsv"));
        assert_eq!(config.starting_graph, Some(PathBuf::from("schema.json")));
        assert_eq!(config.top_k, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_k() {
        let config = PipelineConfig::new("in.tsv").with_top_k(0);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(PipelineConfig::new("in.tsv").with_top_k(6).validate().is_err());
    }

    #[test]
    fn test_config_rejects_overwriting_starting_graph() {
        let config = PipelineConfig::new("in.tsv")
            .with_starting_graph("g.json")
            .with_output("g.json");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registration_precedes_aggregation() {
        let rows = vec![
            RowBuilder::new("Juliet").dimensions([0.5; 5]).build(),
            RowBuilder::new("Romeo").row(1).dimensions([0.1; 5]).build(),
            RowBuilder::new("JULIET").row(2).dimensions([0.3; 5]).build(),
        ];
        let pipeline = Pipeline::new(CorrelationTable::default(), 5).unwrap();
        let out = pipeline.run(&rows, EntityGraph::new()).unwrap();

        let names: Vec<_> = out.profiles.iter().map(|p| p.character.as_str()).collect();
        assert_eq!(names, vec!["juliet", "romeo"]);
        assert_eq!(out.graph.instances_of(EntityClass::Person).len(), 2);
        assert_eq!(out.graph.speech_count(&CharacterId::from_name("Juliet")), 2);
    }

    #[test]
    fn test_profiles_are_written_after_speeches() {
        let rows = vec![RowBuilder::new("Nurse")
            .token("hark", "surprise")
            .dimensions([0.2; 5])
            .build()];
        let pipeline = Pipeline::new(CorrelationTable::default(), 5).unwrap();
        let out = pipeline.run(&rows, EntityGraph::new()).unwrap();

        let last = out.graph.triples().last().unwrap();
        assert_eq!(last.subject, Resource::Character(CharacterId::from_name("Nurse")));
        assert_eq!(last.predicate, Predicate::HasTraitValue(Trait::Neuroticism));
    }

    #[test]
    fn test_custom_token_filter() {
        let rows = vec![RowBuilder::new("Nurse")
            .token("hark", "surprise")
            .token("thou", "neutral")
            .dimensions([0.2; 5])
            .build()];
        let pipeline = Pipeline::new(CorrelationTable::default(), 5)
            .unwrap()
            .with_filter(TokenFilter::with_stopwords(["hark"]));
        let out = pipeline.run(&rows, EntityGraph::new()).unwrap();

        // The filtered token still consumes its number
        assert_eq!(
            out.graph.instances_of(EntityClass::Word),
            vec![&Resource::Token(crate::graph::TokenId(2))]
        );
    }

    #[test]
    fn test_empty_speaker_fails_before_any_statement() {
        let rows = vec![
            RowBuilder::new("Nurse").dimensions([0.2; 5]).build(),
            RowBuilder::new("").row(1).dimensions([0.2; 5]).build(),
        ];
        let pipeline = Pipeline::new(CorrelationTable::default(), 5).unwrap();
        let err = pipeline.run(&rows, EntityGraph::new()).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput { row: 1, .. }));
    }

    #[test]
    fn test_dimension_without_signal_stays_undefined() {
        let rows = vec![RowBuilder::new("Nurse")
            .dimensions([0.2, -2.0, 0.2, 0.2, 0.2])
            .build()];
        let pipeline = Pipeline::new(CorrelationTable::default(), 5).unwrap();
        let out = pipeline.run(&rows, EntityGraph::new()).unwrap();

        assert_eq!(out.baseline.undefined(), vec![SentimentDimension::Introspection]);
        let nurse = out.profile("Nurse").unwrap();
        assert_eq!(nurse.adjusted[SentimentDimension::Introspection], Adjusted::Undefined);
    }

    #[test]
    fn test_summary_table() {
        let rows = vec![
            RowBuilder::new("Romeo").dimensions([0.6, 0.1, 0.1, 0.1, 0.2]).build(),
            RowBuilder::new("Tybalt")
                .row(1)
                .dimensions([-0.4, 0.1, 0.1, 0.1, -0.6])
                .build(),
        ];
        let pipeline = Pipeline::new(CorrelationTable::default(), 5).unwrap();
        let out = pipeline.run(&rows, EntityGraph::new()).unwrap();

        let table = out.summary().render_table();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "character\tO\tC\tE\tA\tN");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("romeo\t"));
        assert!(lines[2].starts_with("tybalt\t"));
        assert_eq!(lines[1].split('\t').count(), 6);
    }

    #[test]
    fn test_profile_lookup_by_name() {
        let rows = vec![RowBuilder::new("Friar Laurence").dimensions([0.2; 5]).build()];
        let pipeline = Pipeline::new(CorrelationTable::default(), 5).unwrap();
        let out = pipeline.run(&rows, EntityGraph::new()).unwrap();
        assert!(out.profile("FRIAR LAURENCE").is_some());
        assert!(out.profile("Romeo").is_none());
    }
}
