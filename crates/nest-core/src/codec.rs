//! Deterministic symbol → vector codec.
//!
//! Every vector derives from a pinned pipeline so encodings are reproducible
//! across runs and across implementations:
//!
//! 1. 64-bit FNV-1a over the UTF-8 bytes (`fnv::FnvHasher::write`, no length
//!    suffix).
//! 2. Fold to a 32-bit seed: `(h ^ (h >> 32)) as u32`.
//! 3. ChaCha8 keyed with the seed as little-endian bytes 0..4, zeros after.
//! 4. Base-4 digits read two bits at a time, low bits first, from successive
//!    `next_u64` words.
//! 5. Digit k → `e^{ikπ/2}`, i.e. exactly one of `1, i, -1, -i`.

use std::borrow::Cow;
use std::hash::Hasher;

use fnv::FnvHasher;
use num_complex::Complex64;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::alphabet::AlphabetTable;
use crate::concept::ConceptLookup;
use crate::constants::{BINARIZE_THRESHOLD, DENSITY, DIMENSIONS};
use crate::tokenizer::token_bag;
use crate::vector::Vector;

/// `e^{ikπ/2}` for k = 0..4.
const PHASES: [Complex64; 4] = [
    Complex64::new(1.0, 0.0),
    Complex64::new(0.0, 1.0),
    Complex64::new(-1.0, 0.0),
    Complex64::new(0.0, -1.0),
];

/// 64-bit FNV-1a of the symbol's UTF-8 bytes.
pub fn fnv1a(symbol: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(symbol.as_bytes());
    hasher.finish()
}

/// 32-bit codec seed for a symbol.
pub fn seed_of(symbol: &str) -> u32 {
    let h = fnv1a(symbol);
    (h ^ (h >> 32)) as u32
}

fn stream(seed: u32) -> ChaCha8Rng {
    let mut key = [0u8; 32];
    key[..4].copy_from_slice(&seed.to_le_bytes());
    ChaCha8Rng::from_seed(key)
}

/// Base-4 digits for `symbol`, `dim` of them.
fn base4_digits(symbol: &str, dim: usize) -> Vec<u8> {
    let mut rng = stream(seed_of(symbol));
    let mut digits = Vec::with_capacity(dim);
    let mut word = 0u64;
    for i in 0..dim {
        if i % 32 == 0 {
            word = rng.next_u64();
        }
        digits.push((word & 0b11) as u8);
        word >>= 2;
    }
    digits
}

/// Exactly `round(density · dim)` set positions, chosen by a partial
/// Fisher–Yates shuffle over the symbol's ChaCha8 stream.
pub(crate) fn sparse_bits(symbol: &str, dim: usize, density: f64) -> Vec<u8> {
    let ones = ((density * dim as f64).round() as usize).min(dim);
    let mut rng = stream(seed_of(symbol));
    let mut positions: Vec<usize> = (0..dim).collect();
    for i in 0..ones {
        let remaining = (dim - i) as u64;
        let j = i + (rng.next_u64() % remaining) as usize;
        positions.swap(i, j);
    }

    let mut bits = vec![0u8; dim];
    for &p in &positions[..ones] {
        bits[p] = 1;
    }
    bits
}

/// Text and symbol encoder. Owns the alphabet table for sequence encoding,
/// built once at construction.
#[derive(Clone, Debug)]
pub struct VectorCodec {
    dim: usize,
    density: f64,
    alphabet: AlphabetTable,
}

impl VectorCodec {
    /// # Panics
    /// Panics if `dim` is 0 or `density` is outside (0, 1].
    pub fn new(dim: usize, density: f64) -> Self {
        assert!(dim > 0, "vector dimension must be positive");
        assert!(
            density > 0.0 && density <= 1.0,
            "density must be in (0, 1], got {density}"
        );
        Self {
            dim,
            density,
            alphabet: AlphabetTable::new(dim, density),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn alphabet(&self) -> &AlphabetTable {
        &self.alphabet
    }

    /// Continuous-phase encoding of a single symbol. Empty input → zero vector.
    pub fn encode(&self, symbol: &str) -> Vector {
        if symbol.is_empty() {
            return Vector::zeros(self.dim);
        }
        let values = base4_digits(symbol, self.dim)
            .into_iter()
            .map(|k| PHASES[k as usize])
            .collect();
        Vector::Complex(values)
    }

    /// Sparse binary encoding of a single symbol at the codec density.
    pub fn encode_binary(&self, symbol: &str) -> Vector {
        if symbol.is_empty() {
            return Vector::binary_zeros(self.dim);
        }
        Vector::Binary(sparse_bits(symbol, self.dim, self.density))
    }

    /// Bag-of-tokens encoding: mean of `encode(token)` over all tokens,
    /// duplicates counted. One token encodes exactly like `encode(token)`.
    pub fn encode_text(&self, text: &str) -> Vector {
        let (bag, total) = token_bag(text);
        if total == 0 {
            return Vector::zeros(self.dim);
        }

        let mut acc = vec![Complex64::new(0.0, 0.0); self.dim];
        for (token, count) in &bag {
            self.encode(token).accumulate_into(&mut acc, *count as f64);
        }
        let scale = 1.0 / total as f64;
        for slot in &mut acc {
            *slot *= scale;
        }
        Vector::Complex(acc)
    }

    /// Order-sensitive encoding. Each printable symbol's alphabet vector is
    /// cyclically shifted right by its position, the shifted vectors are
    /// summed, and the sum is binarized at 0.5. Unknown symbols are skipped
    /// but still advance the position.
    pub fn encode_sequence(&self, text: &str) -> Vector {
        let mut acc = vec![0.0f64; self.dim];
        for (index, ch) in text.chars().enumerate() {
            let Some(bits) = self.alphabet.get(ch) else {
                continue;
            };
            let shift = index % self.dim;
            for (i, &b) in bits.iter().enumerate() {
                if b != 0 {
                    acc[(i + shift) % self.dim] += 1.0;
                }
            }
        }

        Vector::Binary(
            acc.into_iter()
                .map(|w| u8::from(w > BINARIZE_THRESHOLD))
                .collect(),
        )
    }
}

impl Default for VectorCodec {
    fn default() -> Self {
        Self::new(DIMENSIONS, DENSITY)
    }
}

/// Every name resolves to its own hash-derived vector.
impl ConceptLookup for VectorCodec {
    fn resolve(&self, name: &str) -> Option<Cow<'_, Vector>> {
        Some(Cow::Owned(self.encode(name)))
    }
}
