//! Speech aggregation: one input row becomes a speech, its tokens, and the
//! statements linking them to their speaker.

use crate::dimension::{has_signal, PerDimension, SentimentDimension};
use crate::graph::{
    CharacterId, EntityClass, EntityGraph, Literal, Predicate, Resource, SpeechId, TokenId,
};
use crate::input::SpeechRow;
use crate::pipeline::PipelineError;
use crate::text::TokenFilter;
use std::collections::HashMap;
use tracing::trace;

/// Run-wide token numbering.
///
/// Advances once for every input token, retained or not, and is never reset
/// between speeches or characters. Token identifiers are therefore sparse.
#[derive(Debug, Clone)]
pub struct TokenCounter {
    next: u64,
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next identifier.
    pub fn advance(&mut self) -> TokenId {
        let id = TokenId(self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

/// Append-only speech-level observations of one character.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservations {
    values: PerDimension<Vec<f64>>,
}

impl RawObservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a speech-level value. Values at or below the sentinel are
    /// ignored; returns whether the value was kept.
    pub fn record(&mut self, dimension: SentimentDimension, value: f64) -> bool {
        if has_signal(value) {
            self.values[dimension].push(value);
            true
        } else {
            false
        }
    }

    /// Observations on one dimension, in speech order.
    pub fn on(&self, dimension: SentimentDimension) -> &[f64] {
        &self.values[dimension]
    }

    /// Total number of observations across all dimensions.
    pub fn total(&self) -> usize {
        self.values.iter().map(|(_, v)| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// What one call to [`SpeechAggregator::aggregate`] produced.
#[derive(Debug, Clone)]
pub struct SpeechSummary {
    pub speech: SpeechId,
    /// Identifiers of the tokens that became entities.
    pub retained: Vec<TokenId>,
    /// Number of input tokens, retained or not.
    pub tokens_seen: usize,
    /// Dimensions that carried signal for this speech.
    pub signal: Vec<SentimentDimension>,
}

/// Turns speech rows into graph statements and per-character observations.
#[derive(Debug, Clone, Default)]
pub struct SpeechAggregator {
    filter: TokenFilter,
    observations: HashMap<CharacterId, RawObservations>,
}

impl SpeechAggregator {
    pub fn new(filter: TokenFilter) -> Self {
        Self {
            filter,
            observations: HashMap::new(),
        }
    }

    /// Open an (empty) accumulator for a character.
    pub fn track(&mut self, character: CharacterId) {
        self.observations.entry(character).or_default();
    }

    /// Aggregate one speech of `character`.
    ///
    /// `total_rows` is the size of the input table, used in the speech's
    /// location comment. Fails without touching the graph if the token and
    /// emotion sequences differ in length or the character is unknown.
    pub fn aggregate(
        &mut self,
        graph: &mut EntityGraph,
        counter: &mut TokenCounter,
        character: &CharacterId,
        speech: &SpeechRow,
        total_rows: usize,
    ) -> Result<SpeechSummary, PipelineError> {
        if speech.tokens.len() != speech.emotions.len() {
            return Err(PipelineError::MalformedInput {
                row: speech.row,
                reason: format!(
                    "{} tokens but {} emotion tags for speaker {:?}",
                    speech.tokens.len(),
                    speech.emotions.len(),
                    speech.speaker
                ),
            });
        }
        let Some(observations) = self.observations.get_mut(character) else {
            return Err(PipelineError::MissingProfile(character.clone()));
        };
        let speech_id = graph
            .next_speech(character)
            .ok_or_else(|| PipelineError::MissingProfile(character.clone()))?;

        let speaker = Resource::Character(character.clone());
        let mut retained = Vec::new();

        for (position, (raw, emotion)) in speech.tokens.iter().zip(&speech.emotions).enumerate() {
            let token_id = counter.advance();
            let Some(form) = self.filter.retain(raw) else {
                continue;
            };

            let token = Resource::Token(token_id);
            graph.add(token.clone(), Predicate::Type, EntityClass::Word);
            graph.add(token.clone(), Predicate::SurfaceForm, Literal::english(form));
            graph.add(token.clone(), Predicate::HasEmotion, Resource::emotion(emotion));
            graph.add(speaker.clone(), Predicate::SaidToken, token.clone());
            graph.add(
                token,
                Predicate::Comment,
                Literal::text(format!("Token index in original Speech was {position}")),
            );
            retained.push(token_id);
        }

        let speech_node = Resource::Speech(speech_id.clone());
        graph.add(speech_node.clone(), Predicate::Type, EntityClass::Speech);
        graph.add(speaker, Predicate::SaidSpeech, speech_node.clone());
        for token_id in &retained {
            graph.add(Resource::Token(*token_id), Predicate::PartOf, speech_node.clone());
        }

        let mut signal = Vec::new();
        for (dimension, value) in speech.dimensions.iter() {
            if observations.record(dimension, *value) {
                graph.add(speech_node.clone(), Predicate::HasDimension(dimension), *value);
                signal.push(dimension);
            }
        }

        graph.add(
            speech_node,
            Predicate::Comment,
            Literal::text(format!(
                "Speech was found in scene/act {}, with speech position {}/{}",
                speech.scene, speech.row, total_rows
            )),
        );

        trace!(
            speech = ?speech_id,
            retained = retained.len(),
            seen = speech.tokens.len(),
            "aggregated speech"
        );

        Ok(SpeechSummary {
            speech: speech_id,
            retained,
            tokens_seen: speech.tokens.len(),
            signal,
        })
    }

    pub fn observations(&self, character: &CharacterId) -> Option<&RawObservations> {
        self.observations.get(character)
    }

    /// Hand over every accumulator, ending aggregation.
    pub fn into_observations(self) -> HashMap<CharacterId, RawObservations> {
        self.observations
    }
}
