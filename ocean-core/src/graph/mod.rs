//! Entity graph linking characters, speeches, tokens and emotions.
//!
//! ```text
//!   Character ──saidSpeech──▶ Speech ◀──tokenOf── Token ──hasEmotion──▶ Emotion
//!       │                        │                  ▲
//!       │                        └─has{Dimension}   │
//!       └───────────────────saidWord────────────────┘
//!       └─has{Dimension} (adjusted), has{Trait}Value
//! ```
//!
//! The graph is a typed, append-only triple set. Serialization lives in
//! [`crate::persist`].

mod node;
mod store;

pub use node::{
    normalize_identifier, CharacterId, EntityClass, Literal, Object, Predicate, Resource,
    SpeechId, TokenId, Triple, BASE_NS, PROPERTY_NS,
};
pub use store::EntityGraph;
