//! Script segmentation.

/// Sentences of this many characters or fewer are dropped.
pub const MIN_SENTENCE_CHARS: usize = 10;
/// A segment grows while its length plus the next sentence stays below this.
pub const MAX_SEGMENT_CHARS: usize = 200;

/// Split a narration script into slide-sized segments.
///
/// Sentences end at `.`, `!` or `?`. Short fragments are discarded, then whole
/// sentences are packed greedily into chunks. A script with no qualifying
/// sentence becomes a single segment.
pub fn segment_script(script: &str) -> Vec<String> {
    let sentences = script
        .split_inclusive(|c| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS);

    let mut segments = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if current.chars().count() + sentence.chars().count() < MAX_SEGMENT_CHARS {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
        } else {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current.push_str(sentence);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    if segments.is_empty() {
        vec![script.to_string()]
    } else {
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_script_single_segment() {
        let segments = segment_script("The sun is a star. It provides light and heat.");
        assert_eq!(segments, vec!["The sun is a star. It provides light and heat."]);
    }

    #[test]
    fn test_short_fragments_dropped() {
        let segments = segment_script("Yes. Photosynthesis feeds plants! Ok? Light becomes sugar.");
        assert_eq!(segments, vec!["Photosynthesis feeds plants! Light becomes sugar."]);
    }

    #[test]
    fn test_no_qualifying_sentence_keeps_script() {
        assert_eq!(segment_script("Hi. Ok."), vec!["Hi. Ok."]);
        assert_eq!(segment_script(""), vec![""]);
    }

    #[test]
    fn test_packing_respects_cap_and_sentence_boundaries() {
        let sentence = "Mitochondria convert nutrients into usable cellular energy.";
        let script = std::iter::repeat(sentence).take(10).collect::<Vec<_>>().join(" ");
        let segments = segment_script(&script);

        assert!(segments.len() > 1);
        for segment in &segments {
            assert!(segment.chars().count() < MAX_SEGMENT_CHARS + sentence.len());
            assert!(segment.ends_with('.'));
            assert!(segment.starts_with("Mitochondria"));
        }
        let rejoined = segments.join(" ");
        assert_eq!(rejoined, script);
    }

    #[test]
    fn test_overlong_sentence_is_not_split() {
        let long = format!("{}.", "word ".repeat(60).trim_end());
        let segments = segment_script(&long);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], long);
    }

    #[test]
    fn test_trailing_text_without_terminator() {
        let segments = segment_script("Gravity pulls objects together. Mass bends spacetime");
        assert_eq!(segments, vec!["Gravity pulls objects together. Mass bends spacetime"]);
    }
}
