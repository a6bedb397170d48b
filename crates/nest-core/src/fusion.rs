use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::concept::ConceptLookup;
use crate::vector::Vector;

/// Weighted superposition of component vectors.
///
/// `combine` computes `Σ weight_i · vector_i` in the complex domain with no
/// normalization, so magnitude grows with the number and weight of
/// components. Zero weights and wrong-length components contribute nothing.
#[derive(Clone, Copy, Debug)]
pub struct CompositeFusion {
    dim: usize,
}

/// Result of fusing named components.
#[derive(Clone, Debug)]
pub struct Fused {
    pub vector: Vector,
    /// Names the lookup could not resolve; each contributed zero.
    pub unresolved: Vec<String>,
}

impl CompositeFusion {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn combine<'a, I>(&self, components: I) -> Vector
    where
        I: IntoIterator<Item = (&'a Vector, f64)>,
    {
        let mut acc = vec![Complex64::new(0.0, 0.0); self.dim];
        for (vector, weight) in components {
            if weight == 0.0 || vector.dimension() != self.dim {
                continue;
            }
            vector.accumulate_into(&mut acc, weight);
        }
        Vector::Complex(acc)
    }

    /// Resolve each name through `lookup` and combine. Unknown names are a
    /// soft fallback: zero contribution, reported in `unresolved`.
    pub fn combine_named<L>(&self, lookup: &L, components: &[(&str, f64)]) -> Fused
    where
        L: ConceptLookup + ?Sized,
    {
        let mut unresolved = Vec::new();
        let resolved: Vec<_> = components
            .iter()
            .filter_map(|(name, weight)| match lookup.resolve(name) {
                Some(v) => Some((v, *weight)),
                None => {
                    unresolved.push(name.to_string());
                    None
                }
            })
            .collect();

        let vector = self.combine(resolved.iter().map(|(v, w)| (v.as_ref(), *w)));
        Fused { vector, unresolved }
    }
}

/// Per-component weights used when a memory is crystallized.
///
/// Content should weigh at least as much as any single auxiliary tag, or
/// the tag will dominate recall.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub content: f64,
    pub emotion: f64,
    pub reflex: f64,
    pub context: f64,
}

impl FusionWeights {
    /// True when content is weighted at least as heavily as every tag.
    pub fn content_dominant(&self) -> bool {
        self.content >= self.emotion && self.content >= self.reflex && self.content >= self.context
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            content: 1.0,
            emotion: 0.5,
            reflex: 0.5,
            context: 0.3,
        }
    }
}
