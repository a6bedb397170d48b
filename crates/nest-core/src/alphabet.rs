use crate::codec::sparse_bits;
use crate::constants::{ALPHABET_FIRST, ALPHABET_LAST};

/// One fixed sparse binary vector per printable ASCII symbol.
///
/// Generated once from the pinned codec pipeline, so a symbol maps to the
/// same vector for as long as dimension and density stay the same.
#[derive(Clone, Debug)]
pub struct AlphabetTable {
    dim: usize,
    symbols: Vec<Vec<u8>>,
}

impl AlphabetTable {
    pub fn new(dim: usize, density: f64) -> Self {
        let symbols = (ALPHABET_FIRST..=ALPHABET_LAST)
            .map(|b| sparse_bits(&char::from(b).to_string(), dim, density))
            .collect();
        Self { dim, symbols }
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Vector for a printable ASCII symbol, `None` for anything else.
    pub fn get(&self, ch: char) -> Option<&[u8]> {
        let code = u32::from(ch);
        if code < u32::from(ALPHABET_FIRST) || code > u32::from(ALPHABET_LAST) {
            return None;
        }
        self.symbols
            .get((code - u32::from(ALPHABET_FIRST)) as usize)
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DENSITY, DIMENSIONS};

    #[test]
    fn test_covers_printable_ascii() {
        let table = AlphabetTable::new(DIMENSIONS, DENSITY);
        assert_eq!(table.len(), 95);
        assert!(table.get(' ').is_some());
        assert!(table.get('~').is_some());
        assert!(table.get('\n').is_none());
        assert!(table.get('\u{7f}').is_none());
        assert!(table.get('é').is_none());
    }

    #[test]
    fn test_same_symbol_same_vector_across_tables() {
        let a = AlphabetTable::new(DIMENSIONS, DENSITY);
        let b = AlphabetTable::new(DIMENSIONS, DENSITY);
        for ch in ['A', 'z', '0', '#'] {
            assert_eq!(a.get(ch), b.get(ch));
        }
    }

    #[test]
    fn test_symbols_distinct_and_sparse() {
        let table = AlphabetTable::new(DIMENSIONS, DENSITY);
        let a = table.get('a').unwrap();
        let b = table.get('b').unwrap();
        assert_ne!(a, b);
        let ones = a.iter().filter(|&&x| x == 1).count();
        assert_eq!(ones, 102);
        assert_eq!(a.len(), table.dimension());
    }
}
