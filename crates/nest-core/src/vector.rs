//! Fixed-dimension holographic vectors and their `.vec` wire format.
//!
//! A vector is either a sequence of complex values (unit phasors straight
//! out of the codec, or arbitrary sums after fusion) or a sparse binary
//! sequence from the alphabet codec. Values are only produced by
//! [`crate::VectorCodec`], [`crate::CompositeFusion`], or decoded from bytes
//! this module wrote.
//!
//! Wire format (little-endian):
//!
//! ```text
//! "NVEC" | version u8 = 1 | kind u8 (0 complex, 1 binary) | 0u8 0u8 | dim u32
//! complex payload: dim × (re f64, im f64)
//! binary payload:  dim × u8 (0 or 1)
//! ```

use std::fmt;

use num_complex::Complex64;

const MAGIC: &[u8; 4] = b"NVEC";
const VERSION: u8 = 1;
const KIND_COMPLEX: u8 = 0;
const KIND_BINARY: u8 = 1;
const HEADER_LEN: usize = 12;

#[derive(Clone, Debug, PartialEq)]
pub enum Vector {
    /// Continuous-phase entries. Every fused composite lives here.
    Complex(Vec<Complex64>),
    /// Sparse 0/1 entries.
    Binary(Vec<u8>),
}

impl Vector {
    /// The zero vector of dimension `dim` (complex domain).
    pub fn zeros(dim: usize) -> Self {
        Vector::Complex(vec![Complex64::new(0.0, 0.0); dim])
    }

    pub(crate) fn binary_zeros(dim: usize) -> Self {
        Vector::Binary(vec![0; dim])
    }

    pub fn dimension(&self) -> usize {
        match self {
            Vector::Complex(v) => v.len(),
            Vector::Binary(v) => v.len(),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Vector::Binary(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Vector::Complex(v) => v.iter().all(|c| c.re == 0.0 && c.im == 0.0),
            Vector::Binary(v) => v.iter().all(|&b| b == 0),
        }
    }

    /// Entry `i` lifted into the complex domain.
    pub fn get(&self, i: usize) -> Option<Complex64> {
        match self {
            Vector::Complex(v) => v.get(i).copied(),
            Vector::Binary(v) => v.get(i).map(|&b| Complex64::new(f64::from(b), 0.0)),
        }
    }

    pub fn as_complex(&self) -> Option<&[Complex64]> {
        match self {
            Vector::Complex(v) => Some(v),
            Vector::Binary(_) => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Vector::Binary(v) => Some(v),
            Vector::Complex(_) => None,
        }
    }

    /// Number of set entries of a binary vector; `None` for complex ones.
    pub fn popcount(&self) -> Option<usize> {
        self.as_binary()
            .map(|bits| bits.iter().filter(|&&b| b != 0).count())
    }

    /// Complex inner product `Σ conj(self_i) · other_i`.
    /// Binary entries act as real 0/1 values. Extra entries on the longer
    /// side are ignored; callers check dimensions.
    pub fn inner_product(&self, other: &Vector) -> Complex64 {
        let zero = Complex64::new(0.0, 0.0);
        match (self, other) {
            (Vector::Complex(a), Vector::Complex(b)) => a
                .iter()
                .zip(b)
                .fold(zero, |acc, (x, y)| acc + x.conj() * *y),
            (Vector::Complex(a), Vector::Binary(b)) => a
                .iter()
                .zip(b)
                .filter(|(_, bit)| **bit != 0)
                .fold(zero, |acc, (x, _)| acc + x.conj()),
            (Vector::Binary(a), Vector::Complex(b)) => a
                .iter()
                .zip(b)
                .filter(|(bit, _)| **bit != 0)
                .fold(zero, |acc, (_, y)| acc + *y),
            (Vector::Binary(a), Vector::Binary(b)) => {
                let shared = a.iter().zip(b).filter(|(x, y)| **x != 0 && **y != 0).count();
                Complex64::new(shared as f64, 0.0)
            }
        }
    }

    /// `acc += weight * self`, lifting binary entries to reals.
    pub(crate) fn accumulate_into(&self, acc: &mut [Complex64], weight: f64) {
        match self {
            Vector::Complex(v) => {
                for (slot, x) in acc.iter_mut().zip(v) {
                    *slot += *x * weight;
                }
            }
            Vector::Binary(v) => {
                for (slot, &b) in acc.iter_mut().zip(v) {
                    if b != 0 {
                        slot.re += weight;
                    }
                }
            }
        }
    }

    // --- Wire format ---

    pub fn to_bytes(&self) -> Vec<u8> {
        let dim = self.dimension();
        let (kind, payload_len) = match self {
            Vector::Complex(_) => (KIND_COMPLEX, dim * 16),
            Vector::Binary(_) => (KIND_BINARY, dim),
        };

        let mut out = Vec::with_capacity(HEADER_LEN + payload_len);
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.push(kind);
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&(dim as u32).to_le_bytes());

        match self {
            Vector::Complex(v) => {
                for c in v {
                    out.extend_from_slice(&c.re.to_le_bytes());
                    out.extend_from_slice(&c.im.to_le_bytes());
                }
            }
            Vector::Binary(v) => out.extend_from_slice(v),
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(DecodeError::Truncated {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if &bytes[0..4] != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        if bytes[4] != VERSION {
            return Err(DecodeError::UnsupportedVersion(bytes[4]));
        }

        let kind = bytes[5];
        let mut dim_bytes = [0u8; 4];
        dim_bytes.copy_from_slice(&bytes[8..12]);
        let dim = u32::from_le_bytes(dim_bytes) as usize;
        let payload = &bytes[HEADER_LEN..];

        match kind {
            KIND_COMPLEX => {
                check_len(payload, dim * 16)?;
                let values = payload
                    .chunks_exact(16)
                    .map(|chunk| Complex64::new(read_f64(&chunk[..8]), read_f64(&chunk[8..])))
                    .collect();
                Ok(Vector::Complex(values))
            }
            KIND_BINARY => {
                check_len(payload, dim)?;
                if let Some(&bad) = payload.iter().find(|&&b| b > 1) {
                    return Err(DecodeError::InvalidBinaryEntry(bad));
                }
                Ok(Vector::Binary(payload.to_vec()))
            }
            other => Err(DecodeError::UnknownKind(other)),
        }
    }
}

fn check_len(payload: &[u8], expected: usize) -> Result<(), DecodeError> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::Truncated {
            expected: HEADER_LEN + expected,
            actual: HEADER_LEN + payload.len(),
        })
    }
}

fn read_f64(bytes: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    f64::from_le_bytes(buf)
}

/// Failure to decode a `.vec` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Truncated { expected: usize, actual: usize },
    BadMagic,
    UnsupportedVersion(u8),
    UnknownKind(u8),
    InvalidBinaryEntry(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated { expected, actual } => {
                write!(f, "vector payload is {actual} bytes, expected {expected}")
            }
            DecodeError::BadMagic => write!(f, "missing NVEC magic"),
            DecodeError::UnsupportedVersion(v) => write!(f, "unsupported vector format version {v}"),
            DecodeError::UnknownKind(k) => write!(f, "unknown vector kind {k}"),
            DecodeError::InvalidBinaryEntry(b) => write!(f, "binary vector entry {b} is not 0 or 1"),
        }
    }
}

impl std::error::Error for DecodeError {}
