//! Tokenization shared by the lexical embedding tier and the topic labeler.
//!
//! Rules: lowercase, every character that is not an ASCII word character,
//! a hyphen or whitespace becomes a space, split on whitespace, then drop
//! tokens of two characters or fewer and stop words.

/// English stop words removed before weighting terms.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during",
    "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "new", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "use", "used", "using", "very", "via", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

pub fn is_stop_word(token: &str) -> bool { STOP_WORDS.binary_search(&token).is_ok() }

fn keep_char(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() }

/// Split `text` into normalized content tokens, in reading order.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if keep_char(c) { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| t.len() > 2 && !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Contiguous `n`-word phrases of `tokens`, joined with a single space.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n { return Vec::new(); }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_are_sorted_for_binary_search() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn tokenize_drops_short_tokens_punctuation_and_stop_words() {
        let tokens = tokenize("The Quick-brown fox, an OX, jumped over 42 lazy dogs!");
        assert_eq!(tokens, vec!["quick-brown", "fox", "jumped", "lazy", "dogs"]);
    }

    #[test]
    fn tokenize_replaces_non_ascii_with_spaces() {
        assert_eq!(tokenize("café société"), vec!["caf", "soci"]);
    }

    #[test]
    fn ngrams_slide_over_tokens() {
        let tokens: Vec<String> = ["red", "apple", "fruit"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ngrams(&tokens, 2), vec!["red apple", "apple fruit"]);
        assert_eq!(ngrams(&tokens, 3), vec!["red apple fruit"]);
        assert!(ngrams(&tokens, 4).is_empty());
    }
}
