//! Topic extraction from a user question.
//!
//! The topic feeds photo search queries and image generation prompts. It is a
//! best-effort noun phrase: the question is lower-cased, trailing punctuation
//! is dropped and the first known question prefix is stripped.

/// Question prefixes stripped from the front of a question, checked in order.
const QUESTION_PREFIXES: &[&str] = &[
    "what is a ",
    "what is an ",
    "what is the ",
    "what is ",
    "what are ",
    "who is ",
    "who was ",
    "who are ",
    "how does ",
    "how do ",
    "how is ",
    "how are ",
    "why is ",
    "why do ",
    "why are ",
    "explain ",
    "describe ",
    "tell me about ",
    "define ",
    "show me ",
    "teach me about ",
];

/// Extract the main topic phrase from a question.
///
/// # Examples
/// ```
/// use eduvid_models::extract_topic;
/// assert_eq!(extract_topic("What is a black hole?"), "black hole");
/// assert_eq!(extract_topic("Photosynthesis"), "photosynthesis");
/// ```
pub fn extract_topic(question: &str) -> String {
    let q = question.trim().to_lowercase();
    let q = q.trim_end_matches(&['?', '!', '.'][..]);

    for prefix in QUESTION_PREFIXES {
        if let Some(rest) = q.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }

    q.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_prefixes() {
        assert_eq!(extract_topic("How does photosynthesis work?"), "photosynthesis work");
        assert_eq!(extract_topic("Tell me about the Roman Empire"), "the roman empire");
        assert_eq!(extract_topic("Who was Ada Lovelace?!"), "ada lovelace");
    }

    #[test]
    fn test_article_prefix_wins_over_bare_prefix() {
        assert_eq!(extract_topic("what is an atom"), "atom");
        assert_eq!(extract_topic("what is the moon."), "moon");
        assert_eq!(extract_topic("what is gravity"), "gravity");
    }

    #[test]
    fn test_no_prefix_passthrough() {
        assert_eq!(extract_topic("  Volcanoes!  "), "volcanoes");
    }

    #[test]
    fn test_prefix_requires_word_boundary() {
        // "whatever" is not "what is "
        assert_eq!(extract_topic("whatever happened"), "whatever happened");
    }
}
