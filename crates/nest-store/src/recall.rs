use std::collections::HashSet;

use nest_core::{MemoryRecord, RECALL_THRESHOLD, VectorCodec, rank, resonance};

use crate::error::Result;
use crate::store::VectorStore;

/// How the query text becomes a vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryMode {
    /// Token-bag phasor encoding, matching how content is crystallized.
    #[default]
    Text,
    /// Position-bound binary encoding over the alphabet table.
    Sequence,
}

#[derive(Clone, Debug)]
pub struct SearchRequest {
    pub query: String,
    /// `None` scans every partition.
    pub partitions: Option<Vec<String>>,
    pub threshold: f64,
    pub top_k: Option<usize>,
    pub mode: QueryMode,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            partitions: None,
            threshold: RECALL_THRESHOLD,
            top_k: None,
            mode: QueryMode::Text,
        }
    }

    pub fn partitions<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partitions = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One recalled memory.
#[derive(Clone, Debug)]
pub struct Resonance {
    pub score: f64,
    pub record: MemoryRecord,
}

/// Scores a query against every stored composite in scope.
pub struct ResonanceEngine<'a> {
    codec: &'a VectorCodec,
    store: &'a VectorStore,
    scan_limit: Option<usize>,
}

impl<'a> ResonanceEngine<'a> {
    pub fn new(codec: &'a VectorCodec, store: &'a VectorStore) -> Self {
        if codec.dimension() != store.dimension() {
            tracing::warn!(
                "codec D={} differs from store D={}; every record will score 0",
                codec.dimension(),
                store.dimension()
            );
        }
        Self {
            codec,
            store,
            scan_limit: None,
        }
    }

    /// Stop scoring after `limit` records.
    pub fn with_scan_limit(mut self, limit: Option<usize>) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Ranked records with `score > threshold`, best first. Equal scores
    /// keep global insertion order.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<Resonance>> {
        let query = match request.mode {
            QueryMode::Text => self.codec.encode_text(&request.query),
            QueryMode::Sequence => self.codec.encode_sequence(&request.query),
        };

        let keys: Vec<String> = match &request.partitions {
            Some(keys) => {
                let mut seen = HashSet::new();
                keys.iter()
                    .filter(|k| seen.insert(*k))
                    .cloned()
                    .collect()
            }
            None => self.store.list_partitions()?.into_iter().collect(),
        };

        let mut records = Vec::new();
        'scan: for key in &keys {
            for record in self.store.get_partition(key)? {
                if let Some(limit) = self.scan_limit
                    && records.len() >= limit
                {
                    tracing::warn!("scan limit {limit} reached; remaining records not scored");
                    break 'scan;
                }
                records.push(record);
            }
        }

        let scored = records.into_iter().map(|record| {
            let score = resonance(&query, &record.vector);
            let key = (
                record.meta.inserted_at_ns,
                record.partition.clone(),
                record.id.clone(),
            );
            (score, key, record)
        });
        let ranked = rank(scored, request.threshold, request.top_k);

        tracing::debug!(
            "search {:?}: {} partitions, {} hits above {}",
            request.query,
            keys.len(),
            ranked.len(),
            request.threshold
        );
        Ok(ranked
            .into_iter()
            .map(|s| Resonance {
                score: s.score,
                record: s.item,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nest_core::{Provenance, RecordDraft};
    use tempfile::TempDir;

    const DIM: usize = 1024;

    fn setup() -> (TempDir, VectorStore, VectorCodec) {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::load(dir.path(), DIM).unwrap();
        (dir, store, VectorCodec::new(DIM, 0.1))
    }

    fn remember(store: &mut VectorStore, codec: &VectorCodec, partition: &str, id: &str, text: &str) {
        let draft = RecordDraft::new(codec.encode_text(text), Provenance::new(text)).with_id(id);
        store.put(partition, draft).unwrap();
    }

    #[test]
    fn test_empty_store_returns_nothing() {
        let (_dir, store, codec) = setup();
        let engine = ResonanceEngine::new(&codec, &store);
        let hits = engine.search(&SearchRequest::new("sky").threshold(0.0)).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_scoped_search_skips_other_partitions() {
        let (_dir, mut store, codec) = setup();
        remember(&mut store, &codec, "a", "1", "sky");
        remember(&mut store, &codec, "b", "2", "sky");

        let engine = ResonanceEngine::new(&codec, &store);
        let hits = engine
            .search(&SearchRequest::new("sky").partitions(["b", "missing"]))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.partition, "b");
    }

    #[test]
    fn test_repeated_partition_scanned_once() {
        let (_dir, mut store, codec) = setup();
        remember(&mut store, &codec, "p", "a", "sky");

        let engine = ResonanceEngine::new(&codec, &store);
        let hits = engine
            .search(&SearchRequest::new("sky").partitions(["p", "p"]))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.id, "a");
    }

    #[test]
    fn test_equal_scores_keep_insertion_order() {
        let (_dir, mut store, codec) = setup();
        remember(&mut store, &codec, "z", "late_name_first", "sky");
        remember(&mut store, &codec, "a", "early_name_second", "sky");
        remember(&mut store, &codec, "m", "third", "sky");

        let engine = ResonanceEngine::new(&codec, &store);
        let ids: Vec<String> = engine
            .search(&SearchRequest::new("sky"))
            .unwrap()
            .into_iter()
            .map(|r| r.record.id)
            .collect();
        assert_eq!(ids, vec!["late_name_first", "early_name_second", "third"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let (_dir, mut store, codec) = setup();
        for i in 0..5 {
            remember(&mut store, &codec, "p", &format!("m{i}"), "sky");
        }
        let engine = ResonanceEngine::new(&codec, &store);
        let hits = engine.search(&SearchRequest::new("sky").top_k(2)).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.id, "m0");
    }

    #[test]
    fn test_scan_limit_caps_scored_records() {
        let (_dir, mut store, codec) = setup();
        for i in 0..4 {
            remember(&mut store, &codec, "p", &format!("m{i}"), "sky");
        }
        let engine = ResonanceEngine::new(&codec, &store).with_scan_limit(Some(3));
        let hits = engine.search(&SearchRequest::new("sky")).unwrap();
        assert_eq!(hits.len(), 3);

        let unbounded = ResonanceEngine::new(&codec, &store).with_scan_limit(None);
        assert_eq!(unbounded.search(&SearchRequest::new("sky")).unwrap().len(), 4);
    }

    #[test]
    fn test_sequence_mode_matches_sequence_records() {
        let (_dir, mut store, codec) = setup();
        let draft = RecordDraft::new(codec.encode_sequence("ACGT"), Provenance::new("ACGT"))
            .with_id("seq");
        store.put("p", draft).unwrap();

        let engine = ResonanceEngine::new(&codec, &store);
        let hits = engine
            .search(
                &SearchRequest::new("ACGT")
                    .mode(QueryMode::Sequence)
                    .threshold(0.0),
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score > 0.0);
    }
}
