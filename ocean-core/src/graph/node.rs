//! Typed identities, predicates and literals of the entity graph.

use crate::dimension::{SentimentDimension, Trait};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base namespace for every entity minted by the pipeline.
pub const BASE_NS: &str = "http://stcnet2ocean.com/";

/// Namespace for pipeline-specific properties.
pub const PROPERTY_NS: &str = "http://stcnet2ocean.com/property#";

const PSY_PROFILES_NS: &str =
    "http://github.com/dpicca/ontologies/literary_characters_psychologica_profiles.owl#";
const EMOTION_NS: &str = "http://arsemotica.di.unito.it/ontology#";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
const DC_SUBJECT: &str = "http://purl.org/dc/terms/subject";
const HAS_EMOTION: &str = "http://arsemotica.di.unito.it/artifacts/#hasEmotion";

/// Normalize a name or token: lowercase, and every character outside
/// `[a-zA-Z0-9]` becomes `_`.
pub fn normalize_identifier(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Identity of a character: its normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(String);

impl CharacterId {
    /// Derive the identity from a speaker name as it appears in the corpus.
    pub fn from_name(name: &str) -> Self {
        Self(normalize_identifier(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a speech: its speaker plus a 1-based position in that
/// speaker's sequence of speeches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeechId {
    pub character: CharacterId,
    pub sequence: u32,
}

/// Identity of a token, drawn from the run-wide token counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u64);

/// Ontology classes the pipeline instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityClass {
    /// A speaking character (W3C media ontology `Person`).
    Person,
    /// A retained token (lemon `Word`).
    Word,
    /// A speech of a character.
    Speech,
}

impl EntityClass {
    pub fn iri(&self) -> &'static str {
        match self {
            EntityClass::Person => "http://www.w3.org/ns/ma-ont#Person",
            EntityClass::Word => "http://lemon-model.net/lemon#Word",
            EntityClass::Speech => {
                "http://github.com/dpicca/ontologies/literary_characters_psychologica_profiles.owl#Speech"
            }
        }
    }
}

/// Anything that can stand in subject position (or object position as a
/// reference).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Character(CharacterId),
    Speech(SpeechId),
    Token(TokenId),
    Class(EntityClass),
    /// A basic emotion, stored capitalized (`Joy`).
    Emotion(String),
    /// Any other IRI, typically from a starting schema graph.
    Iri(String),
}

impl Resource {
    /// Emotion resource for a raw label: `joy` and `JOY` both become `Joy`.
    pub fn emotion(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        let mut chars = lower.chars();
        let name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Resource::Emotion(name)
    }

    pub fn iri(&self) -> String {
        match self {
            Resource::Character(id) => format!("{BASE_NS}{id}"),
            Resource::Speech(id) => format!("{BASE_NS}{}_speech_{}", id.character, id.sequence),
            Resource::Token(id) => format!("{BASE_NS}token_{}", id.0),
            Resource::Class(class) => class.iri().to_string(),
            Resource::Emotion(name) => format!("{EMOTION_NS}{name}"),
            Resource::Iri(iri) => iri.clone(),
        }
    }
}

/// Typed predicates; anything unknown is carried as a raw IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// `rdf:type`
    Type,
    /// Normalized written form of a token (`dc:subject`).
    SurfaceForm,
    HasEmotion,
    /// Character -> token it uttered.
    SaidToken,
    /// Character -> speech it uttered.
    SaidSpeech,
    /// Token -> speech it belongs to.
    PartOf,
    /// `rdfs:comment`
    Comment,
    /// `has{Dimension}`, on speeches (raw averages) and characters
    /// (baseline-adjusted means).
    HasDimension(SentimentDimension),
    /// `has{Trait}Value` on characters.
    HasTraitValue(Trait),
    Iri(String),
}

impl Predicate {
    pub fn iri(&self) -> String {
        match self {
            Predicate::Type => RDF_TYPE.to_string(),
            Predicate::SurfaceForm => DC_SUBJECT.to_string(),
            Predicate::HasEmotion => HAS_EMOTION.to_string(),
            Predicate::SaidToken => format!("{PROPERTY_NS}saidWord"),
            Predicate::SaidSpeech => format!("{PSY_PROFILES_NS}said"),
            Predicate::PartOf => format!("{PROPERTY_NS}tokenOf"),
            Predicate::Comment => RDFS_COMMENT.to_string(),
            Predicate::HasDimension(dim) => format!("{PROPERTY_NS}has{}", dim.label()),
            Predicate::HasTraitValue(t) => format!("{PROPERTY_NS}has{}Value", t.label()),
            Predicate::Iri(iri) => iri.clone(),
        }
    }
}

/// Literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Text(String),
    /// Language-tagged text, e.g. a token surface form in English.
    Tagged { value: String, lang: String },
    Number(f64),
}

impl Literal {
    pub fn text(value: impl Into<String>) -> Self {
        Literal::Text(value.into())
    }

    pub fn english(value: impl Into<String>) -> Self {
        Literal::Tagged {
            value: value.into(),
            lang: "en".to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Object position: a reference or a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    Resource(Resource),
    Literal(Literal),
}

impl From<Resource> for Object {
    fn from(resource: Resource) -> Self {
        Object::Resource(resource)
    }
}

impl From<Literal> for Object {
    fn from(literal: Literal) -> Self {
        Object::Literal(literal)
    }
}

impl From<EntityClass> for Object {
    fn from(class: EntityClass) -> Self {
        Object::Resource(Resource::Class(class))
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Literal(Literal::Number(value))
    }
}

/// A single (subject, predicate, object) statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Resource,
    pub predicate: Predicate,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: Resource, predicate: Predicate, object: impl Into<Object>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }

    /// Render as one N-Triples line (without the trailing newline).
    pub fn to_ntriples(&self) -> String {
        let object = match &self.object {
            Object::Resource(r) => format!("<{}>", r.iri()),
            Object::Literal(Literal::Text(s)) => format!("\"{}\"", escape_literal(s)),
            Object::Literal(Literal::Tagged { value, lang }) => {
                format!("\"{}\"@{lang}", escape_literal(value))
            }
            Object::Literal(Literal::Number(n)) => format!(
                "\"{n}\"^^<http://www.w3.org/2001/XMLSchema#double>"
            ),
        };
        format!("<{}> <{}> {object} .", self.subject.iri(), self.predicate.iri())
    }
}

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_identity_normalization() {
        assert_eq!(CharacterId::from_name("Lady Capulet").as_str(), "lady_capulet");
        assert_eq!(CharacterId::from_name("FRIAR-LAURENCE").as_str(), "friar_laurence");
        assert_eq!(
            CharacterId::from_name("Romeo"),
            CharacterId::from_name("ROMEO")
        );
    }

    #[test]
    fn test_resource_iris() {
        let romeo = CharacterId::from_name("Romeo");
        let speech = SpeechId {
            character: romeo.clone(),
            sequence: 3,
        };
        assert_eq!(Resource::Character(romeo).iri(), "http://stcnet2ocean.com/romeo");
        assert_eq!(
            Resource::Speech(speech).iri(),
            "http://stcnet2ocean.com/romeo_speech_3"
        );
        assert_eq!(
            Resource::Token(TokenId(42)).iri(),
            "http://stcnet2ocean.com/token_42"
        );
        assert_eq!(
            Resource::emotion("JOY").iri(),
            "http://arsemotica.di.unito.it/ontology#Joy"
        );
    }

    #[test]
    fn test_predicate_iris() {
        assert_eq!(
            Predicate::HasDimension(SentimentDimension::Temper).iri(),
            "http://stcnet2ocean.com/property#hasTemper"
        );
        assert_eq!(
            Predicate::HasTraitValue(Trait::Openness).iri(),
            "http://stcnet2ocean.com/property#hasOpennessValue"
        );
    }

    #[test]
    fn test_ntriples_rendering() {
        let triple = Triple::new(
            Resource::Token(TokenId(1)),
            Predicate::SurfaceForm,
            Literal::english("love"),
        );
        assert_eq!(
            triple.to_ntriples(),
            "<http://stcnet2ocean.com/token_1> <http://purl.org/dc/terms/subject> \"love\"@en ."
        );

        let comment = Triple::new(
            Resource::Token(TokenId(1)),
            Predicate::Comment,
            Literal::text("say \"hi\""),
        );
        assert!(comment.to_ntriples().contains(r#""say \"hi\"""#));
    }
}
