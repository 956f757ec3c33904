//! Timestamp formatting for subtitle files.

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Negative and non-finite inputs format as zero. Milliseconds are rounded,
/// so `7.4999` and `7.5` both print `00:00:07,500`.
///
/// # Examples
/// ```
/// use eduvid_models::timestamp::format_srt_timestamp;
/// assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
/// assert_eq!(format_srt_timestamp(3723.25), "01:02:03,250");
/// ```
pub fn format_srt_timestamp(secs: f64) -> String {
    let total_ms = if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_padding() {
        assert_eq!(format_srt_timestamp(7.5), "00:00:07,500");
        assert_eq!(format_srt_timestamp(61.0), "00:01:01,000");
    }

    #[test]
    fn test_rounds_float_noise() {
        // 2.3 * 1000 = 2299.9999...
        assert_eq!(format_srt_timestamp(2.3), "00:00:02,300");
    }

    #[test]
    fn test_invalid_inputs_clamp_to_zero() {
        assert_eq!(format_srt_timestamp(-1.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(f64::NAN), "00:00:00,000");
    }

    #[test]
    fn test_hours() {
        assert_eq!(format_srt_timestamp(36000.001), "10:00:00,001");
    }
}
