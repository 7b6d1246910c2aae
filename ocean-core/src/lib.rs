//! Sentiment-to-OCEAN personality profiling for dramatic texts.
//!
//! This crate provides:
//! - Ingestion of per-speech sentiment tables (five SenticNet dimensions)
//! - An append-only entity graph of characters, speeches and tokens
//! - A corpus baseline and per-character baseline-adjusted profiles
//! - Projection onto the Big Five traits through a weighted correlation table
//! - Graph persistence as JSON documents or N-Triples
//!
//! # Quick Start
//!
//! ```ignore
//! use ocean_core::{run, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::new("romeo_and_juliet.tsv")
//!         .with_output("romeo_and_juliet.nt")
//!         .with_top_k(3);
//!
//!     let output = run(&config).await?;
//!     print!("{}", output.summary());
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod baseline;
pub mod correlation;
pub mod dimension;
pub mod graph;
pub mod input;
pub mod lexicon;
pub mod persist;
pub mod pipeline;
pub mod profile;
pub mod stats;
pub mod testing;
pub mod text;

// Primary public API
pub use correlation::{CorrelationEntry, CorrelationError, CorrelationTable, Significance};
pub use dimension::{Axis, PerDimension, PerTrait, SentimentDimension, Trait, NO_SIGNAL};
pub use graph::{CharacterId, EntityGraph};
pub use input::{load_speech_table, parse_speech_table, InputError, SpeechRow};
pub use lexicon::{speech_dimensions, MapLexicon, SentimentLexicon};
pub use persist::{load_graph, save_graph, GraphFormat, PersistError};
pub use pipeline::{run, Pipeline, PipelineConfig, PipelineError, RunOutput, RunSummary};
pub use profile::{Adjusted, CharacterProfile, ProfileBuilder, DEFAULT_TOP_K};
pub use testing::RowBuilder;
