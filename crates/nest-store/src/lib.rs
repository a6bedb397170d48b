//! Filesystem persistence and recall for nest-core.
//!
//! Records live as `<root>/<partition>/<id>.vec` + `<id>.meta` pairs. The
//! [`Journal`] crystallizes experiences into the [`VectorStore`]; the
//! [`ResonanceEngine`] scores queries against it.

pub mod config;
pub mod error;
pub mod journal;
pub mod recall;
pub mod store;

pub use config::{
    CONFIG_FILE, DATA_DIR_ENV, MEMORY_BANK_DIR, NestConfig, RecallConfig, default_base_dir,
    resolve_data_dir,
};
pub use error::{Result, StoreError};
pub use journal::{Crystallized, Experience, Journal};
pub use recall::{QueryMode, Resonance, ResonanceEngine, SearchRequest};
pub use store::{VectorStore, validate_key};
