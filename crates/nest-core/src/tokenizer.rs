use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s']").unwrap());
static APOSTROPHE_TRIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'+|'+$").unwrap());

/// Tokenize text into lowercase words.
/// Preserves apostrophes within words (e.g., "don't").
/// No stemming, no stop-word removal.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned = NON_WORD.replace_all(text, " ");
    cleaned
        .to_lowercase()
        .split_whitespace()
        .map(|t| APOSTROPHE_TRIM.replace_all(t, "").to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Tokens with their multiplicities, in order of first appearance.
/// Returns the bag and the total token count.
pub fn token_bag(text: &str) -> (Vec<(String, usize)>, usize) {
    let tokens = tokenize(text);
    let total = tokens.len();

    let mut position: HashMap<String, usize> = HashMap::new();
    let mut bag: Vec<(String, usize)> = Vec::new();
    for token in tokens {
        match position.get(&token) {
            Some(&idx) => bag[idx].1 += 1,
            None => {
                position.insert(token.clone(), bag.len());
                bag.push((token, 1));
            }
        }
    }

    (bag, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenize() {
        let tokens = tokenize("The sky is blue!");
        assert_eq!(tokens, vec!["the", "sky", "is", "blue"]);
    }

    #[test]
    fn test_apostrophe_preserved() {
        let tokens = tokenize("Don't forget.");
        assert_eq!(tokens, vec!["don't", "forget"]);
    }

    #[test]
    fn test_leading_trailing_apostrophes_stripped() {
        let tokens = tokenize("'sky' 'blue'");
        assert_eq!(tokens, vec!["sky", "blue"]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n  ").is_empty());
        assert!(tokenize("?!.,").is_empty());
    }

    #[test]
    fn test_underscores_and_digits_kept() {
        let tokens = tokenize("TRUST_FEEL 42 times");
        assert_eq!(tokens, vec!["trust_feel", "42", "times"]);
    }

    #[test]
    fn test_token_bag_counts_in_first_seen_order() {
        let (bag, total) = token_bag("blue sky, blue sea. Sky!");
        assert_eq!(total, 5);
        assert_eq!(
            bag,
            vec![
                ("blue".to_string(), 2),
                ("sky".to_string(), 2),
                ("sea".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_token_bag_empty() {
        let (bag, total) = token_bag("...");
        assert!(bag.is_empty());
        assert_eq!(total, 0);
    }
}
