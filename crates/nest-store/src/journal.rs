//! Crystallization: fuse one experience into a composite and persist it.

use nest_core::constants::{DEFAULT_CHANNEL, IDLE_REFLEX, NEUTRAL_EMOTION, UNKNOWN};
use nest_core::{
    CompositeFusion, ConceptLookup, FusionWeights, Provenance, RecordDraft, VectorCodec, fnv1a,
    now_unix_secs, unix_to_date,
};

use crate::error::Result;
use crate::store::VectorStore;

pub const DEFAULT_LOCATION: &str = "VOID";
pub const DEFAULT_SIGNATURE_SEED: &str = "NULL";
const PNEUMA_MARKER: &str = "PNEUMA";
const SOMA_MARKER: &str = "SOMA";

/// One moment to remember. Everything except `content` is optional.
#[derive(Clone, Debug, Default)]
pub struct Experience {
    pub content: String,
    pub emotion: Option<String>,
    pub reflex: Option<String>,
    /// Channel, e.g. `DATA`, `SOMA:SIGHT`, `PNEUMA:VERIFY`.
    pub mode: Option<String>,
    pub user: Option<String>,
    pub location: Option<String>,
    pub intent: Option<String>,
    pub signature_seed: Option<String>,
    pub reference: Option<String>,
    pub partition: Option<String>,
    pub id: Option<String>,
    pub timestamp: Option<u64>,
}

impl Experience {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    pub fn reflex(mut self, reflex: impl Into<String>) -> Self {
        self.reflex = Some(reflex.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn signature_seed(mut self, seed: impl Into<String>) -> Self {
        self.signature_seed = Some(seed.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn timestamp(mut self, secs: u64) -> Self {
        self.timestamp = Some(secs);
        self
    }

    /// `<user>_<location>` context symbol.
    fn context(&self) -> String {
        format!(
            "{}_{}",
            self.user.as_deref().unwrap_or(UNKNOWN),
            self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
        )
    }
}

/// Where a crystallized memory landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Crystallized {
    pub id: String,
    pub partition: String,
}

/// Writes experiences into a [`VectorStore`].
///
/// Content is encoded with [`VectorCodec::encode_text`]; emotion, reflex and
/// context are tag names resolved through `lookup`. An unresolved tag adds
/// nothing to the composite.
pub struct Journal<'a, L: ConceptLookup + ?Sized> {
    codec: &'a VectorCodec,
    lookup: &'a L,
    fusion: CompositeFusion,
    weights: FusionWeights,
}

impl<'a, L: ConceptLookup + ?Sized> Journal<'a, L> {
    pub fn new(codec: &'a VectorCodec, lookup: &'a L, weights: FusionWeights) -> Self {
        if !weights.content_dominant() {
            tracing::warn!("journal weights let a tag outweigh content: {weights:?}");
        }
        Self {
            codec,
            lookup,
            fusion: CompositeFusion::new(codec.dimension()),
            weights,
        }
    }

    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }

    pub fn crystallize(
        &self,
        store: &mut VectorStore,
        experience: &Experience,
    ) -> Result<Crystallized> {
        let timestamp = experience.timestamp.unwrap_or_else(now_unix_secs);
        let partition = experience
            .partition
            .clone()
            .unwrap_or_else(|| unix_to_date(timestamp));

        let emotion = experience.emotion.as_deref().unwrap_or(NEUTRAL_EMOTION);
        let reflex = experience.reflex.as_deref().unwrap_or(IDLE_REFLEX);
        let context = experience.context();

        let content = self.codec.encode_text(&experience.content);
        let tags = self.fusion.combine_named(
            self.lookup,
            &[
                (emotion, self.weights.emotion),
                (reflex, self.weights.reflex),
                (context.as_str(), self.weights.context),
            ],
        );
        if !tags.unresolved.is_empty() {
            tracing::debug!("unresolved tags contribute nothing: {:?}", tags.unresolved);
        }
        let composite = self
            .fusion
            .combine([(&content, self.weights.content), (&tags.vector, 1.0)]);

        let provenance = self.provenance(experience, emotion, reflex);
        let mut draft = RecordDraft::new(composite, provenance).with_timestamp(timestamp);
        if let Some(id) = &experience.id {
            draft = draft.with_id(id.clone());
        }

        let id = store.put(&partition, draft)?;
        tracing::info!("crystallized {partition}/{id}");
        Ok(Crystallized { id, partition })
    }

    fn provenance(&self, experience: &Experience, emotion: &str, reflex: &str) -> Provenance {
        let channel = experience
            .mode
            .clone()
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

        let mut provenance = Provenance {
            content: experience.content.clone(),
            emotion: emotion.to_string(),
            reflex: reflex.to_string(),
            intent: experience
                .intent
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            channel,
            signature: None,
            reference: None,
        };

        if provenance.channel.contains(PNEUMA_MARKER) {
            let seed = experience
                .signature_seed
                .as_deref()
                .unwrap_or(DEFAULT_SIGNATURE_SEED);
            provenance.signature = Some(fnv1a(seed));
        }
        if provenance.channel.contains(SOMA_MARKER) {
            provenance.reference = experience.reference.clone();
        }
        provenance
    }
}
