//! Encode → fuse → score, across the public API, without touching disk.

use nest_core::{
    Category, CompositeFusion, Concept, FusionWeights, Lexicon, VectorCodec, rank, resonance,
};

fn composite(codec: &VectorCodec, content: &str, emotion: &str, weight: f64) -> nest_core::Vector {
    let fusion = CompositeFusion::new(codec.dimension());
    let content = codec.encode_text(content);
    let emotion = codec.encode(emotion);
    fusion.combine([(&content, 1.0), (&emotion, weight)])
}

#[test]
fn shared_token_resonates_above_noise() {
    let codec = VectorCodec::default();
    let stored = composite(&codec, "the sky is blue", "CURIOSITY", 0.5);

    let hit = resonance(&codec.encode_text("sky"), &stored);
    let miss = resonance(&codec.encode_text("completely unrelated token"), &stored);

    // "sky" is one of four content tokens: coherent share is 1/4
    assert!(hit > 0.10, "expected resonance, got {hit}");
    assert!((hit - 0.25).abs() < 0.1, "hit far from 1/4: {hit}");
    assert!(miss < 0.30, "unrelated query resonated: {miss}");
    assert!(hit > miss);
}

#[test]
fn louder_tag_dominates_recall() {
    let codec = VectorCodec::default();
    let stored = composite(&codec, "the sky is blue", "CURIOSITY", 2.0);

    let by_tag = resonance(&codec.encode("CURIOSITY"), &stored);
    let by_content = resonance(&codec.encode_text("sky"), &stored);
    assert!(by_tag > by_content);
    assert!(!FusionWeights { emotion: 2.0, ..FusionWeights::default() }.content_dominant());
}

#[test]
fn ranking_prefers_closer_memories() {
    let codec = VectorCodec::default();
    let memories = [
        composite(&codec, "red apple on the table", "JOY", 0.5),
        composite(&codec, "the sky is blue", "CURIOSITY", 0.5),
        composite(&codec, "blue sky blue sea", "CALM", 0.5),
    ];

    let query = codec.encode_text("blue sky");
    let ranked = rank(
        memories
            .iter()
            .enumerate()
            .map(|(i, m)| (resonance(&query, m), i, i)),
        0.1,
        None,
    );

    let order: Vec<usize> = ranked.iter().map(|s| s.item).collect();
    assert_eq!(order, vec![2, 1]);
}

#[test]
fn lexicon_concepts_fuse_like_any_vector() {
    let codec = VectorCodec::default();
    let fusion = CompositeFusion::new(codec.dimension());

    let mut lexicon = Lexicon::new();
    let curiosity = Concept::from_attributes(
        Category::Emotion,
        &[10, 2, 200, 0, 1, 1, 0],
        "Curiosity",
        codec.encode("E010"),
    )
    .unwrap();
    lexicon.insert("curiosity", curiosity);

    let fused = fusion.combine_named(&lexicon, &[("CURIOSITY", 0.5), ("unlisted", 0.5)]);
    assert_eq!(fused.unresolved, vec!["unlisted".to_string()]);

    let score = resonance(&codec.encode("E010"), &fused.vector);
    assert!((score - 0.5).abs() < 1e-12);
}

#[test]
fn sequence_mode_resonates_with_itself() {
    let codec = VectorCodec::default();
    let stored = codec.encode_sequence("the sky is blue");
    let same = resonance(&codec.encode_sequence("the sky is blue"), &stored);
    let other = resonance(&codec.encode_sequence("eulb si yks eht"), &stored);
    assert!(same > other);
}
