//! Append-only triple store with identity assignment.

use super::node::{CharacterId, EntityClass, Object, Predicate, Resource, SpeechId, Triple};
use std::collections::HashMap;

/// The entity graph populated by a run.
///
/// Triples are only ever appended; duplicates are kept. Alongside the
/// triples the store keeps the character registry, so the same name always
/// resolves to the same [`CharacterId`] and speech numbering stays
/// per-character.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    /// All statements, in insertion order.
    triples: Vec<Triple>,
    /// Registered characters, in first-seen order.
    characters: Vec<CharacterId>,
    /// Number of speeches minted so far, per character.
    speech_counts: HashMap<CharacterId, u32>,
}

impl EntityGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of triples (e.g. a schema document).
    pub fn from_triples(triples: Vec<Triple>) -> Self {
        Self {
            triples,
            ..Self::default()
        }
    }

    // =========================================================================
    // Appending
    // =========================================================================

    /// Append one statement.
    pub fn add(&mut self, subject: Resource, predicate: Predicate, object: impl Into<Object>) {
        self.triples.push(Triple::new(subject, predicate, object));
    }

    pub fn add_triple(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    // =========================================================================
    // Identity assignment
    // =========================================================================

    /// Register a speaker by name, returning its identity.
    ///
    /// The first registration adds the `Person` type triple; later calls with
    /// any spelling that normalizes to the same identity are no-ops.
    pub fn register_character(&mut self, name: &str) -> CharacterId {
        let id = CharacterId::from_name(name);
        if !self.speech_counts.contains_key(&id) {
            self.speech_counts.insert(id.clone(), 0);
            self.characters.push(id.clone());
            self.add(
                Resource::Character(id.clone()),
                Predicate::Type,
                EntityClass::Person,
            );
        }
        id
    }

    /// Registered characters, in first-seen order.
    pub fn characters(&self) -> &[CharacterId] {
        &self.characters
    }

    /// Mint the next speech identity for a registered character.
    ///
    /// Returns `None` if the character is unknown.
    pub fn next_speech(&mut self, character: &CharacterId) -> Option<SpeechId> {
        let count = self.speech_counts.get_mut(character)?;
        *count += 1;
        Some(SpeechId {
            character: character.clone(),
            sequence: *count,
        })
    }

    /// Number of speeches minted for a character.
    pub fn speech_count(&self, character: &CharacterId) -> u32 {
        self.speech_counts.get(character).copied().unwrap_or(0)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// All objects for a subject/predicate pair.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Resource,
        predicate: &'a Predicate,
    ) -> impl Iterator<Item = &'a Object> + 'a {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && &t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// All subjects typed with the given class.
    pub fn instances_of(&self, class: EntityClass) -> Vec<&Resource> {
        let target = Object::Resource(Resource::Class(class));
        self.triples
            .iter()
            .filter(|t| t.predicate == Predicate::Type && t.object == target)
            .map(|t| &t.subject)
            .collect()
    }

    /// Number of statements using a predicate.
    pub fn count_predicate(&self, predicate: &Predicate) -> usize {
        self.triples
            .iter()
            .filter(|t| &t.predicate == predicate)
            .count()
    }

    /// Single numeric literal for a subject/predicate pair, if present.
    pub fn number(&self, subject: &Resource, predicate: &Predicate) -> Option<f64> {
        self.objects(subject, predicate).find_map(|o| match o {
            Object::Literal(lit) => lit.as_number(),
            Object::Resource(_) => None,
        })
    }

    /// N-Triples lines, sorted. Two graphs holding the same multiset of
    /// statements produce identical output regardless of insertion order.
    pub fn canonical_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.triples.iter().map(Triple::to_ntriples).collect();
        lines.sort();
        lines
    }
}
