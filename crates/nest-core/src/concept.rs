//! Canonical concepts minted from the standard category tables.
//!
//! Minting happens outside this crate; here a concept is the typed result
//! of one 7-byte standard line plus its canonical vector, and
//! [`ConceptLookup`] is the `(name) -> Vector` seam fusion resolves
//! through.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// Attribute bytes per standard line.
pub const ATTRIBUTE_BYTES: usize = 7;

/// Thought group whose lines are sensor (soma) concepts.
pub const SOMA_GROUP: u8 = 9;

/// Thought group whose lines are validator (pneuma) concepts.
pub const PNEUMA_GROUP: u8 = 10;

/// The standard table a line came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Reflex,
    Emotion,
    Thought,
}

/// Closed set of concept kinds, each with its own attribute set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConceptKind {
    /// Hardware reaction.
    Reflex { target_hardware: u8, force_intensity: u8 },
    /// Chemical state.
    Emotion { focus: u8, valence: u8 },
    /// Superposition primitive.
    Thought { class: u8, op_code: u8 },
    /// Sensor wrapper over an input stream.
    Soma,
    /// Truth validator.
    Pneuma,
}

impl ConceptKind {
    /// Decode the kind from a category and its attribute bytes.
    /// A thought in group 9 is soma, group 10 is pneuma.
    fn from_attributes(category: Category, bytes: &[u8; ATTRIBUTE_BYTES]) -> Self {
        match category {
            Category::Reflex => ConceptKind::Reflex {
                target_hardware: bytes[1],
                force_intensity: bytes[2],
            },
            Category::Emotion => ConceptKind::Emotion {
                focus: bytes[1],
                valence: bytes[2],
            },
            Category::Thought => match bytes[1] {
                SOMA_GROUP => ConceptKind::Soma,
                PNEUMA_GROUP => ConceptKind::Pneuma,
                class => ConceptKind::Thought {
                    class,
                    op_code: bytes[2],
                },
            },
        }
    }

    /// One-letter label prefix.
    pub fn prefix(&self) -> char {
        match self {
            ConceptKind::Reflex { .. } => 'R',
            ConceptKind::Emotion { .. } => 'E',
            ConceptKind::Thought { .. } => 'T',
            ConceptKind::Soma => 'S',
            ConceptKind::Pneuma => 'P',
        }
    }

    /// Salt distinguishing kinds when vectors are minted.
    pub fn salt(&self) -> u8 {
        match self {
            ConceptKind::Reflex { .. } => 1,
            ConceptKind::Emotion { .. } => 2,
            ConceptKind::Thought { .. } => 3,
            ConceptKind::Soma => 4,
            ConceptKind::Pneuma => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConceptKind::Reflex { .. } => "REFLEX",
            ConceptKind::Emotion { .. } => "EMOTION",
            ConceptKind::Thought { .. } => "THOUGHT",
            ConceptKind::Soma => "SOMA",
            ConceptKind::Pneuma => "PNEUMA",
        }
    }
}

/// Canonical (kind, id, vector) triple. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Concept {
    id: u8,
    kind: ConceptKind,
    flow: [u8; 3],
    description: String,
    vector: Vector,
}

impl Concept {
    /// Build a concept from one standard line's attribute bytes.
    pub fn from_attributes(
        category: Category,
        bytes: &[u8],
        description: impl Into<String>,
        vector: Vector,
    ) -> Result<Self, ConceptError> {
        let bytes: &[u8; ATTRIBUTE_BYTES] = bytes
            .try_into()
            .map_err(|_| ConceptError::AttributeCount(bytes.len()))?;

        Ok(Self {
            id: bytes[0],
            kind: ConceptKind::from_attributes(category, bytes),
            flow: [bytes[4], bytes[5], bytes[6]],
            description: description.into(),
            vector,
        })
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn kind(&self) -> ConceptKind {
        self.kind
    }

    pub fn flow(&self) -> [u8; 3] {
        self.flow
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// Prefix + zero-padded id, e.g. `E010`.
    pub fn label(&self) -> String {
        format!("{}{:03}", self.kind.prefix(), self.id)
    }
}

/// Name → vector resolution used by fusion. `None` means unresolved.
pub trait ConceptLookup {
    fn resolve(&self, name: &str) -> Option<Cow<'_, Vector>>;
}

/// Word → concept map with case-insensitive keys.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    words: HashMap<String, Concept>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a word to a concept, replacing any previous binding.
    pub fn insert(&mut self, word: &str, concept: Concept) -> Option<Concept> {
        self.words.insert(word.to_lowercase(), concept)
    }

    pub fn get(&self, word: &str) -> Option<&Concept> {
        self.words.get(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl ConceptLookup for Lexicon {
    fn resolve(&self, name: &str) -> Option<Cow<'_, Vector>> {
        self.get(name).map(|c| Cow::Borrowed(c.vector()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConceptError {
    /// Standard lines carry exactly seven attribute bytes.
    AttributeCount(usize),
}

impl fmt::Display for ConceptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConceptError::AttributeCount(n) => {
                write!(f, "expected {ATTRIBUTE_BYTES} attribute bytes, got {n}")
            }
        }
    }
}

impl std::error::Error for ConceptError {}
