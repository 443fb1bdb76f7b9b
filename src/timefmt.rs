// Timestamp formatting and parsing for transcript segments
//
// The transcription model emits timestamps as free text and does not
// always honor the requested "MM:SS" shape ("03.15", "1:02:45", stray
// whitespace). Parsing is therefore total: any input maps to a number of
// seconds, with unparseable fields counting as zero.

/// Format a duration in seconds as "MM:SS", truncating fractional parts.
///
/// Non-finite input (NaN, infinity) renders as "00:00".
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "00:00".to_string();
    }

    let total = seconds.max(0.0) as u64;
    let mins = total / 60;
    let secs = total % 60;

    format!("{:02}:{:02}", mins, secs)
}

/// Parse a "MM:SS" or "HH:MM:SS" timestamp into seconds.
///
/// Dots and embedded whitespace are normalized to ':' before splitting.
/// Fields that fail to parse as integers count as 0, and any shape other
/// than 2 or 3 fields yields 0. Never fails.
pub fn parse_timestamp(timestamp: &str) -> u64 {
    let cleaned: String = timestamp
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '.' { ':' } else { c })
        .collect();

    if cleaned.is_empty() {
        return 0;
    }

    let fields: Vec<u64> = cleaned
        .split(':')
        .map(|part| part.parse::<u64>().unwrap_or(0))
        .collect();

    match fields.as_slice() {
        [mins, secs] => mins * 60 + secs,
        [hours, mins, secs] => hours * 3600 + mins * 60 + secs,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_basic() {
        assert_eq!(format_seconds(0.0), "00:00");
        assert_eq!(format_seconds(65.0), "01:05");
        assert_eq!(format_seconds(600.0), "10:00");
    }

    #[test]
    fn test_format_truncates() {
        assert_eq!(format_seconds(59.9), "00:59");
        assert_eq!(format_seconds(61.999), "01:01");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_seconds(f64::NAN), "00:00");
        assert_eq!(format_seconds(f64::INFINITY), "00:00");
        assert_eq!(format_seconds(f64::NEG_INFINITY), "00:00");
    }

    #[test]
    fn test_parse_mm_ss() {
        assert_eq!(parse_timestamp("03:15"), 195);
        assert_eq!(parse_timestamp("00:00"), 0);
    }

    #[test]
    fn test_parse_hh_mm_ss() {
        assert_eq!(parse_timestamp("1:02:45"), 3765);
    }

    #[test]
    fn test_parse_normalizes_dots_and_spaces() {
        assert_eq!(parse_timestamp("03.15"), 195);
        assert_eq!(parse_timestamp(" 03 : 15 "), 195);
    }

    #[test]
    fn test_parse_is_total() {
        assert_eq!(parse_timestamp(""), 0);
        assert_eq!(parse_timestamp("garbage"), 0);
        assert_eq!(parse_timestamp("ab:cd"), 0);
        assert_eq!(parse_timestamp("1:2:3:4"), 0);
        assert_eq!(parse_timestamp("xx:30"), 30);
    }

    #[test]
    fn test_round_trip_under_one_hour() {
        for s in 0..3600u64 {
            assert_eq!(parse_timestamp(&format_seconds(s as f64)), s);
        }
    }
}
