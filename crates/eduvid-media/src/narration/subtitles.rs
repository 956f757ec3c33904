//! Caption cue generation and SRT serialization.

use eduvid_models::timestamp::format_srt_timestamp;
use eduvid_models::SubtitleCue;

/// Words shown per caption cue.
pub const WORDS_PER_CUE: usize = 6;

fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// Spread the script's words uniformly over `total_duration` in fixed windows.
///
/// Cue times are rounded to hundredths; the final cue always ends exactly at
/// `total_duration`.
pub fn build_cues(script: &str, total_duration: f64) -> Vec<SubtitleCue> {
    let words: Vec<&str> = script.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let total = total_duration.max(0.0);
    let per_word = total / words.len() as f64;
    let chunks = words.chunks(WORDS_PER_CUE);
    let last = chunks.len() - 1;

    chunks
        .enumerate()
        .map(|(n, chunk)| {
            let first_word = n * WORDS_PER_CUE;
            let start = round_centis(first_word as f64 * per_word);
            let end = if n == last {
                total
            } else {
                round_centis(((first_word + WORDS_PER_CUE) as f64 * per_word).min(total))
            };
            SubtitleCue::new(chunk.join(" "), start, end)
        })
        .collect()
}

/// Serialize cues as SubRip text.
pub fn to_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n",
            i + 1,
            format_srt_timestamp(cue.start),
            format_srt_timestamp(cue.end),
            cue.text
        ));
    }
    out
}
