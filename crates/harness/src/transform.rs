//! MR1 emphasis transformation
//!
//! Metamorphic Relation 1: inserting an intensifying word into a sentence
//! must not change the predicted sentiment label. The insertion rule is a
//! fixed, deterministic single insertion, not a paraphraser.

/// Emphasis words known not to flip sentiment on their own.
pub const EMPHASIS_WORDS: &[&str] = &["really", "very", "absolutely", "definitely", "totally"];

/// Default token used when the caller does not pick one.
pub const DEFAULT_EMPHASIS: &str = "really";

/// Insert `word` into `text` after the first word.
///
/// Single-word (or empty) inputs get the token appended instead, so the
/// result is always a change. Whitespace is normalized to single spaces.
/// Pure: the same `(text, word)` pair always yields the same output.
pub fn add_emphasis(text: &str, word: &str) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= 1 {
        return format!("{} {}", text.trim(), word).trim().to_string();
    }
    // insert after the subject position (index 1)
    words.insert(1, word);
    words.join(" ")
}

/// True if `word` is one of the known safe emphasizers.
pub fn is_known_emphasizer(word: &str) -> bool {
    EMPHASIS_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("I love this movie", "I really love this movie"; "simple positive")]
    #[test_case("This movie is okay", "This really movie is okay"; "insert after first word")]
    #[test_case("I do not like this restaurant", "I really do not like this restaurant"; "negative")]
    fn inserts_after_first_word(input: &str, expected: &str) {
        assert_eq!(add_emphasis(input, "really"), expected);
    }

    #[test]
    fn single_word_appends() {
        assert_eq!(add_emphasis("Great", "very"), "Great very");
    }

    #[test]
    fn empty_input_yields_bare_token() {
        assert_eq!(add_emphasis("", "really"), "really");
    }

    #[test]
    fn deterministic() {
        let a = add_emphasis("The service was okay but the food was great", "totally");
        let b = add_emphasis("The service was okay but the food was great", "totally");
        assert_eq!(a, b);
    }

    #[test]
    fn normalizes_interior_whitespace() {
        assert_eq!(add_emphasis("I  love   this", "very"), "I very love this");
    }

    #[test]
    fn known_emphasizers() {
        for w in EMPHASIS_WORDS {
            assert!(is_known_emphasizer(w));
        }
        assert!(!is_known_emphasizer("hardly"));
    }
}
