//! Graph persistence.
//!
//! Graphs are stored either as a versioned JSON document (loadable as the
//! starting graph of a later run) or as N-Triples for RDF tooling. The format
//! is chosen from the file extension.

use crate::graph::{EntityClass, EntityGraph, Predicate, Triple};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot load {0}: only JSON graph documents can be loaded")]
    InvalidFormat(PathBuf),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current graph document version.
const GRAPH_VERSION: u32 = 1;

/// On-disk graph format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Json,
    NTriples,
}

impl GraphFormat {
    /// `.nt` selects N-Triples, anything else JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("nt") => GraphFormat::NTriples,
            _ => GraphFormat::Json,
        }
    }
}

/// A saved graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Document format version for compatibility checking.
    pub version: u32,

    /// Counts for quick inspection.
    pub metadata: GraphMetadata,

    /// All statements, in insertion order.
    pub triples: Vec<Triple>,
}

/// Summary counts of a saved graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub characters: usize,
    pub speeches: usize,
    pub words: usize,
    pub triples: usize,
    /// Statements carrying a trait score.
    #[serde(default)]
    pub trait_values: usize,
}

impl GraphMetadata {
    pub fn of(graph: &EntityGraph) -> Self {
        let trait_values = graph
            .triples()
            .iter()
            .filter(|t| matches!(t.predicate, Predicate::HasTraitValue(_)))
            .count();
        Self {
            characters: graph.instances_of(EntityClass::Person).len(),
            speeches: graph.instances_of(EntityClass::Speech).len(),
            words: graph.instances_of(EntityClass::Word).len(),
            triples: graph.len(),
            trait_values,
        }
    }
}

impl GraphDocument {
    pub fn from_graph(graph: &EntityGraph) -> Self {
        Self {
            version: GRAPH_VERSION,
            metadata: GraphMetadata::of(graph),
            triples: graph.triples().to_vec(),
        }
    }

    pub fn into_graph(self) -> EntityGraph {
        EntityGraph::from_triples(self.triples)
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path.as_ref(), content).await
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let doc: Self = serde_json::from_str(&content)?;

        if doc.version != GRAPH_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: GRAPH_VERSION,
                found: doc.version,
            });
        }

        Ok(doc)
    }

    /// Read only the metadata of a saved graph.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<GraphMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: GraphMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != GRAPH_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: GRAPH_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// Render a graph as N-Triples, one statement per line in insertion order.
pub fn to_ntriples(graph: &EntityGraph) -> String {
    let mut out = String::new();
    for triple in graph.triples() {
        out.push_str(&triple.to_ntriples());
        out.push('\n');
    }
    out
}

/// Save a graph in the format implied by the path.
pub async fn save_graph(
    graph: &EntityGraph,
    path: impl AsRef<Path>,
) -> Result<GraphFormat, PersistError> {
    let path = path.as_ref();
    let format = GraphFormat::from_path(path);
    match format {
        GraphFormat::Json => GraphDocument::from_graph(graph).save_json(path).await?,
        GraphFormat::NTriples => write_atomic(path, to_ntriples(graph)).await?,
    }
    Ok(format)
}

/// Load a graph saved as a JSON document.
pub async fn load_graph(path: impl AsRef<Path>) -> Result<EntityGraph, PersistError> {
    let path = path.as_ref();
    if GraphFormat::from_path(path) != GraphFormat::Json {
        return Err(PersistError::InvalidFormat(path.to_path_buf()));
    }
    Ok(GraphDocument::load_json(path).await?.into_graph())
}

/// Write to a sibling temporary file, then rename over the target, so a
/// reader never sees a half-written graph.
async fn write_atomic(path: &Path, content: String) -> Result<(), PersistError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
