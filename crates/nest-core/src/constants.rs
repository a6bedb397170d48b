/// Default vector dimension D (width of the holographic plate).
pub const DIMENSIONS: usize = 1024;

/// Fraction of set entries in binary-mode vectors.
pub const DENSITY: f64 = 0.1;

/// Accumulated weight above which a sequence-encoded position is set.
pub const BINARIZE_THRESHOLD: f64 = 0.5;

/// First printable ASCII symbol covered by the alphabet table (space).
pub const ALPHABET_FIRST: u8 = 0x20;

/// Last printable ASCII symbol covered by the alphabet table (`~`).
pub const ALPHABET_LAST: u8 = 0x7e;

/// Default resonance threshold for recall.
pub const RECALL_THRESHOLD: f64 = 0.1;

// Placeholder provenance values, used when metadata is absent or damaged.

/// Content of a record whose metadata file is missing or unparsable.
pub const CORRUPTED: &str = "CORRUPTED";
pub const NEUTRAL_EMOTION: &str = "NEUTRAL";
pub const IDLE_REFLEX: &str = "IDLE";
pub const UNKNOWN: &str = "UNKNOWN";
pub const DEFAULT_CHANNEL: &str = "DATA";
pub const UNKNOWN_CLOCK: &str = "--:--:--";
