use crate::vector::Vector;

/// Resonance between a query and a stored composite:
/// `|Σ conj(query_i) · stored_i| / D`.
///
/// Composites are unnormalized, so the score is bounded by the stored
/// vector's per-entry magnitude rather than by 1. Mismatched or zero
/// dimensions score 0.
pub fn resonance(query: &Vector, stored: &Vector) -> f64 {
    let dim = query.dimension();
    if dim == 0 || dim != stored.dimension() {
        return 0.0;
    }
    query.inner_product(stored).norm() / dim as f64
}

/// A candidate that survived the threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct Scored<T> {
    pub score: f64,
    pub item: T,
}

/// Filter, order and truncate scored candidates.
///
/// Keeps `score > threshold` (strict), sorts by score descending and breaks
/// ties by ascending `key` (insertion order), then keeps at most `top_k`.
pub fn rank<T, K, I>(candidates: I, threshold: f64, top_k: Option<usize>) -> Vec<Scored<T>>
where
    K: Ord,
    I: IntoIterator<Item = (f64, K, T)>,
{
    let mut kept: Vec<(f64, K, T)> = candidates
        .into_iter()
        .filter(|(score, _, _)| *score > threshold)
        .collect();

    kept.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    if let Some(k) = top_k {
        kept.truncate(k);
    }

    kept.into_iter()
        .map(|(score, _, item)| Scored { score, item })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::VectorCodec;
    use crate::fusion::CompositeFusion;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_self_resonance_is_one() {
        let codec = VectorCodec::default();
        let v = codec.encode("sky");
        assert_relative_eq!(resonance(&v, &v), 1.0);
    }

    #[test]
    fn test_phase_rotation_invariant() {
        let codec = VectorCodec::default();
        let fusion = CompositeFusion::new(codec.dimension());
        let v = codec.encode("sky");
        // -v has every phase rotated by π; magnitude ignores it
        let flipped = fusion.combine([(&v, -1.0)]);
        assert_relative_eq!(resonance(&v, &flipped), 1.0);
    }

    #[test]
    fn test_scales_with_component_weight() {
        let codec = VectorCodec::default();
        let fusion = CompositeFusion::new(codec.dimension());
        let sky = codec.encode("sky");
        let composite = fusion.combine([(&sky, 0.25)]);
        assert_relative_eq!(resonance(&sky, &composite), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch_scores_zero() {
        let a = VectorCodec::new(8, 0.5).encode("x");
        let b = VectorCodec::new(16, 0.5).encode("x");
        assert_eq!(resonance(&a, &b), 0.0);
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let codec = VectorCodec::default();
        assert_eq!(resonance(&codec.encode(""), &codec.encode("sky")), 0.0);
    }

    #[test]
    fn test_rank_strict_threshold() {
        let ranked = rank(vec![(0.5, 0, "at"), (0.6, 1, "above")], 0.5, None);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item, "above");
    }

    #[test]
    fn test_rank_ties_by_insertion() {
        let ranked = rank(
            vec![(0.4, 3, "late"), (0.9, 2, "best"), (0.4, 1, "early")],
            0.0,
            None,
        );
        let order: Vec<_> = ranked.iter().map(|s| s.item).collect();
        assert_eq!(order, vec!["best", "early", "late"]);
    }

    #[test]
    fn test_rank_top_k() {
        let ranked = rank((0..10).map(|i| (i as f64 / 10.0, i, i)), 0.05, Some(3));
        let items: Vec<_> = ranked.iter().map(|s| s.item).collect();
        assert_eq!(items, vec![9, 8, 7]);
    }

    #[test]
    fn test_rank_empty() {
        let ranked = rank(Vec::<(f64, u8, ())>::new(), 0.0, Some(5));
        assert!(ranked.is_empty());
    }

    proptest! {
        #[test]
        fn prop_threshold_monotone(
            scores in proptest::collection::vec(0.0f64..1.5, 0..64),
            t1 in 0.0f64..1.5,
            t2 in 0.0f64..1.5,
        ) {
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            let candidates = || scores.iter().enumerate().map(|(i, s)| (*s, i, i));
            let loose = rank(candidates(), lo, None);
            let strict = rank(candidates(), hi, None);
            prop_assert!(strict.len() <= loose.len());
        }

        #[test]
        fn prop_sorted_and_bounded(
            scores in proptest::collection::vec(0.0f64..1.0, 0..64),
            k in 0usize..10,
        ) {
            let ranked = rank(scores.iter().enumerate().map(|(i, s)| (*s, i, i)), 0.2, Some(k));
            prop_assert!(ranked.len() <= k);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].item < pair[1].item);
                }
            }
            for s in &ranked {
                prop_assert!(s.score > 0.2);
            }
        }
    }
}
