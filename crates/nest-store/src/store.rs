use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use nest_core::{
    Integrity, MemoryRecord, RecordDraft, RecordMeta, Vector, now_unix_nanos, now_unix_secs,
};

use crate::error::{Result, StoreError};

pub const VECTOR_EXT: &str = "vec";
pub const META_EXT: &str = "meta";
const TMP_SUFFIX: &str = "tmp";

/// Partitioned vector store.
///
/// Layout:
/// ```text
/// <root>/
/// ├── 2025-01-01/
/// │   ├── MEM_1735689600.vec
/// │   └── MEM_1735689600.meta
/// └── origin/
///     └── ...
/// ```
///
/// No record cache: every read reflects the disk. Concurrent writers to the
/// same id race, and same-second time-derived ids overwrite each other.
#[derive(Debug)]
pub struct VectorStore {
    root: PathBuf,
    dimension: usize,
    last_stamp: u64,
}

impl VectorStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub fn load(root: &Path, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(StoreError::InvalidData("vector dimension must be positive".into()));
        }
        fs::create_dir_all(root).map_err(StoreError::io(root))?;

        let store = Self {
            root: root.to_path_buf(),
            dimension,
            last_stamp: 0,
        };
        let partitions = store.list_partitions()?;
        tracing::info!(
            "loaded vector store at {} ({} partitions, D={dimension})",
            root.display(),
            partitions.len()
        );
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    // --- Write ---

    /// Persist a draft under `partition` and return its id.
    ///
    /// The vector file is written before the metadata file; each goes to a
    /// temporary sibling and is renamed into place. Any previous sidecar for
    /// the id is removed first, so a failed metadata write leaves the vector
    /// behind with no metadata and it later loads as a placeholder.
    pub fn put(&mut self, partition: &str, draft: RecordDraft) -> Result<String> {
        validate_key(partition)?;
        if draft.vector.dimension() != self.dimension {
            return Err(StoreError::InvalidData(format!(
                "vector has dimension {}, store expects {}",
                draft.vector.dimension(),
                self.dimension
            )));
        }

        let timestamp = draft.timestamp.unwrap_or_else(now_unix_secs);
        let id = match draft.id {
            Some(id) => {
                validate_key(&id)?;
                id
            }
            None => format!("MEM_{timestamp}"),
        };

        let dir = self.root.join(partition);
        fs::create_dir_all(&dir).map_err(StoreError::io(&dir))?;

        let vec_path = record_path(&dir, &id, VECTOR_EXT);
        let meta_path = record_path(&dir, &id, META_EXT);
        if vec_path.exists() {
            tracing::warn!("record {partition}/{id} already exists, overwriting");
        }

        let stamp = self.next_stamp();
        let meta = RecordMeta::new(id.clone(), timestamp, stamp, draft.provenance);

        // A stale sidecar must not pair with the new vector if the metadata
        // write below fails.
        remove_if_exists(&meta_path)?;
        write_atomic(&vec_path, &draft.vector.to_bytes())?;
        let json = serde_json::to_vec_pretty(&meta)?;
        write_atomic(&meta_path, &json)?;

        tracing::debug!("put {partition}/{id} (stamp {stamp})");
        Ok(id)
    }

    /// Strictly increasing insertion stamp for this handle.
    fn next_stamp(&mut self) -> u64 {
        let stamp = now_unix_nanos().max(self.last_stamp.saturating_add(1));
        self.last_stamp = stamp;
        stamp
    }

    // --- Read ---

    /// Partition keys that exist on disk.
    pub fn list_partitions(&self) -> Result<BTreeSet<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(StoreError::io(&self.root)(e)),
        };

        let mut partitions = BTreeSet::new();
        for entry in entries.flatten() {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && validate_key(name).is_ok()
            {
                partitions.insert(name.to_string());
            }
        }
        Ok(partitions)
    }

    /// All records in a partition, in insertion order.
    ///
    /// A missing partition is empty. Missing or unparsable metadata yields a
    /// placeholder record; a missing, undecodable or wrong-sized vector
    /// excludes the pair.
    pub fn get_partition(&self, key: &str) -> Result<Vec<MemoryRecord>> {
        if validate_key(key).is_err() {
            tracing::debug!("ignoring unsafe partition key {key:?}");
            return Ok(Vec::new());
        }

        let dir = self.root.join(key);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir)(e)),
        };

        let mut vector_stems = BTreeSet::new();
        let mut meta_stems = BTreeSet::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|e| e.to_str()),
            ) else {
                continue;
            };
            match ext {
                VECTOR_EXT => {
                    vector_stems.insert(stem.to_string());
                }
                META_EXT => {
                    meta_stems.insert(stem.to_string());
                }
                _ => {}
            }
        }

        for orphan in meta_stems.difference(&vector_stems) {
            tracing::warn!("excluding {key}/{orphan}: metadata without vector");
        }

        let mut records: Vec<MemoryRecord> = vector_stems
            .iter()
            .filter_map(|stem| self.load_record(&dir, key, stem))
            .collect();
        records.sort_by(|a, b| a.insertion_key().cmp(&b.insertion_key()));

        tracing::debug!("scanned partition {key}: {} records", records.len());
        Ok(records)
    }

    /// Total loadable records across all partitions.
    pub fn record_count(&self) -> Result<usize> {
        let mut total = 0;
        for partition in self.list_partitions()? {
            total += self.get_partition(&partition)?.len();
        }
        Ok(total)
    }

    fn load_record(&self, dir: &Path, partition: &str, stem: &str) -> Option<MemoryRecord> {
        let vec_path = record_path(dir, stem, VECTOR_EXT);
        let vector = match read_vector(&vec_path) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("excluding {partition}/{stem}: {e}");
                return None;
            }
        };
        if vector.dimension() != self.dimension {
            tracing::warn!(
                "excluding {partition}/{stem}: dimension {} does not match store D={}",
                vector.dimension(),
                self.dimension
            );
            return None;
        }

        let meta_path = record_path(dir, stem, META_EXT);
        let (mut meta, integrity) = match fs::read(&meta_path) {
            Ok(raw) => match serde_json::from_slice::<RecordMeta>(&raw) {
                Ok(meta) => (meta, Integrity::Intact),
                Err(e) => {
                    tracing::warn!("placeholder metadata for {partition}/{stem}: {e}");
                    (RecordMeta::placeholder(stem), Integrity::MetadataCorrupt)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("placeholder metadata for {partition}/{stem}: sidecar missing");
                (RecordMeta::placeholder(stem), Integrity::MetadataMissing)
            }
            Err(e) => {
                tracing::warn!("placeholder metadata for {partition}/{stem}: {e}");
                (RecordMeta::placeholder(stem), Integrity::MetadataCorrupt)
            }
        };

        if meta.id.is_empty() {
            meta.id = stem.to_string();
        } else if meta.id != stem {
            tracing::warn!("{partition}/{stem}: metadata names id {}, using file name", meta.id);
        }
        if meta.inserted_at_ns == 0 {
            meta.inserted_at_ns = modified_nanos(&vec_path);
        }

        Some(MemoryRecord {
            id: stem.to_string(),
            partition: partition.to_string(),
            vector,
            meta,
            integrity,
        })
    }
}

/// Partition keys and ids become path components: non-empty ASCII
/// alphanumerics, `-`, `_` and `.`, never `.` or `..`.
pub fn validate_key(key: &str) -> Result<()> {
    let safe = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if safe {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

fn record_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    dir.join(format!("{stem}.{ext}"))
}

fn read_vector(path: &Path) -> Result<Vector> {
    let bytes = fs::read(path).map_err(StoreError::io(path))?;
    Ok(Vector::from_bytes(&bytes)?)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".");
    tmp.push(TMP_SUFFIX);
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(StoreError::io(&tmp))?;
    fs::rename(&tmp, path).map_err(StoreError::io(path))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(path)(e)),
    }
}

fn modified_nanos(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| u64::try_from(d.as_nanos()).ok())
        .unwrap_or(0)
}
