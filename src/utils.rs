//! Utility functions for string truncation and display formatting.
//!
//! This module provides small helpers used throughout the client:
//! - String truncation for logging response bodies
//! - Ellipsizing long descriptions for card rendering
//! - Human-readable publication dates

use chrono::{DateTime, Utc};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to the
/// nearest character boundary) with an ellipsis and byte count indicator
/// appended. News payloads are full of multi-byte text, so the cut never
/// lands inside a character.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Shorten display text to at most `max_chars` characters.
///
/// Unlike [`truncate_for_log`] this counts characters, not bytes, and does
/// not report how much was dropped. Used for card descriptions.
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Format a publication timestamp for display.
///
/// Produces the short form readers expect on a news card, e.g.
/// `"Jan 15, 2024"`. Missing or unparseable timestamps render as `"N/A"`.
pub fn format_date(published_at: Option<DateTime<Utc>>) -> String {
    match published_at {
        Some(ts) => ts.format("%b %-d, %Y").to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // "é" is two bytes; a cut at byte 1 must back off to 0
        let result = truncate_for_log("némesis", 2);
        assert!(result.starts_with("n…"));
    }

    #[test]
    fn test_ellipsize_keeps_short_text() {
        assert_eq!(ellipsize("brief", 10), "brief");
    }

    #[test]
    fn test_ellipsize_cuts_long_text() {
        let result = ellipsize("a rather long description of events", 14);
        assert_eq!(result.chars().count(), 14);
        assert!(result.ends_with('…'));
    }

    #[test]
    fn test_format_date_short_form() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_date(Some(ts)), "Jan 15, 2024");

        let single_digit_day = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(format_date(Some(single_digit_day)), "Mar 5, 2024");
    }

    #[test]
    fn test_format_date_missing() {
        assert_eq!(format_date(None), "N/A");
    }
}
