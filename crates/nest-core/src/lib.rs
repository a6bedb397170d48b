//! Nest holographic memory engine.
//!
//! Symbols and text become fixed-dimension vectors through a pinned,
//! reproducible codec; several component vectors fuse into one composite
//! per memory by weighted superposition; recall scores a query against
//! stored composites by the normalized magnitude of their complex inner
//! product.
//!
//! Zero I/O; persistence lives in `nest-store`.

pub mod alphabet;
pub mod codec;
pub mod concept;
pub mod constants;
pub mod fusion;
pub mod record;
pub mod resonance;
pub mod time;
pub mod tokenizer;
pub mod vector;

pub use alphabet::AlphabetTable;
pub use codec::{VectorCodec, fnv1a, seed_of};
pub use concept::{Category, Concept, ConceptError, ConceptKind, ConceptLookup, Lexicon};
pub use constants::{CORRUPTED, DENSITY, DIMENSIONS, RECALL_THRESHOLD};
pub use fusion::{CompositeFusion, Fused, FusionWeights};
pub use record::{Integrity, MemoryRecord, Provenance, RecordDraft, RecordMeta, StateSnapshot};
pub use resonance::{Scored, rank, resonance};
pub use time::{now_unix_nanos, now_unix_secs, today, unix_to_date};
pub use tokenizer::{token_bag, tokenize};
pub use vector::{DecodeError, Vector};
