//! Memory records and their `.meta` schema.
//!
//! Every field of [`RecordMeta`] has a documented placeholder so a sidecar
//! with missing fields still loads; a sidecar that cannot be read at all is
//! replaced by [`RecordMeta::placeholder`].

use serde::{Deserialize, Serialize};

use crate::constants::{
    CORRUPTED, DEFAULT_CHANNEL, IDLE_REFLEX, NEUTRAL_EMOTION, UNKNOWN, UNKNOWN_CLOCK,
};
use crate::time::unix_to_clock;
use crate::vector::Vector;

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn neutral() -> String {
    NEUTRAL_EMOTION.to_string()
}

fn idle() -> String {
    IDLE_REFLEX.to_string()
}

fn unknown_clock() -> String {
    UNKNOWN_CLOCK.to_string()
}

/// The triad state captured at crystallization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub content_summary: String,
    #[serde(default = "neutral")]
    pub active_emotion: String,
    #[serde(default = "idle")]
    pub active_reflex: String,
    #[serde(default = "unknown")]
    pub user_intent: String,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            content_summary: String::new(),
            active_emotion: neutral(),
            active_reflex: idle(),
            user_intent: unknown(),
        }
    }
}

/// Contents of a `.meta` sidecar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    #[serde(default)]
    pub id: String,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default = "unknown_clock")]
    pub readable_time: String,
    /// Unix nanoseconds at insertion; orders records for tie-breaking.
    #[serde(default)]
    pub inserted_at_ns: u64,
    #[serde(default = "unknown")]
    pub channel: String,
    #[serde(default)]
    pub snapshot: StateSnapshot,
    #[serde(default)]
    pub signature: Option<u64>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl RecordMeta {
    pub fn new(id: String, timestamp: u64, inserted_at_ns: u64, provenance: Provenance) -> Self {
        Self {
            id,
            timestamp,
            readable_time: unix_to_clock(timestamp),
            inserted_at_ns,
            channel: provenance.channel,
            snapshot: StateSnapshot {
                content_summary: provenance.content,
                active_emotion: provenance.emotion,
                active_reflex: provenance.reflex,
                user_intent: provenance.intent,
            },
            signature: provenance.signature,
            reference: provenance.reference,
        }
    }

    /// Stand-in for a sidecar that is missing or unparsable.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            timestamp: 0,
            readable_time: unknown_clock(),
            inserted_at_ns: 0,
            channel: unknown(),
            snapshot: StateSnapshot {
                content_summary: CORRUPTED.to_string(),
                ..StateSnapshot::default()
            },
            signature: None,
            reference: None,
        }
    }
}

/// Where a memory came from, as supplied by the writer.
#[derive(Clone, Debug, PartialEq)]
pub struct Provenance {
    pub content: String,
    pub emotion: String,
    pub reflex: String,
    pub channel: String,
    pub intent: String,
    pub signature: Option<u64>,
    pub reference: Option<String>,
}

impl Provenance {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            content: String::new(),
            emotion: neutral(),
            reflex: idle(),
            channel: DEFAULT_CHANNEL.to_string(),
            intent: unknown(),
            signature: None,
            reference: None,
        }
    }
}

/// A composite waiting to be written. The store assigns id (unless given),
/// timestamp (unless given) and insertion stamp.
#[derive(Clone, Debug)]
pub struct RecordDraft {
    pub id: Option<String>,
    pub timestamp: Option<u64>,
    pub vector: Vector,
    pub provenance: Provenance,
}

impl RecordDraft {
    pub fn new(vector: Vector, provenance: Provenance) -> Self {
        Self {
            id: None,
            timestamp: None,
            vector,
            provenance,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, secs: u64) -> Self {
        self.timestamp = Some(secs);
        self
    }
}

/// How much of a record survived loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Integrity {
    Intact,
    MetadataMissing,
    MetadataCorrupt,
}

/// A crystallized memory as loaded from a partition.
#[derive(Clone, Debug)]
pub struct MemoryRecord {
    pub id: String,
    pub partition: String,
    pub vector: Vector,
    pub meta: RecordMeta,
    pub integrity: Integrity,
}

impl MemoryRecord {
    pub fn content(&self) -> &str {
        &self.meta.snapshot.content_summary
    }

    pub fn emotion(&self) -> &str {
        &self.meta.snapshot.active_emotion
    }

    pub fn reflex(&self) -> &str {
        &self.meta.snapshot.active_reflex
    }

    pub fn is_intact(&self) -> bool {
        self.integrity == Integrity::Intact
    }

    /// Global insertion order key: stamp, then partition, then id.
    pub fn insertion_key(&self) -> (u64, &str, &str) {
        (self.meta.inserted_at_ns, &self.partition, &self.id)
    }
}
