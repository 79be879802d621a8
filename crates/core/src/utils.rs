use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::domain::{PLACEHOLDER, SNIPPET_ELLIPSIS, SNIPPET_MAX_CHARS};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Parses a timestamp string and renders it in the local timezone
/// Supports various formats: RFC 3339, naive ISO 8601 (as written by the history), date only,
/// and whatever `dateparser` recognises
pub fn format_timestamp_to_local(timestamp_str: &str) -> String {
    if timestamp_str.is_empty() {
        return String::new();
    }

    // Offset-aware (e.g., "2025-12-16T10:30:00Z" or "2025-12-16T10:30:00+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp_str) {
        return dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
    }

    // Naive timestamps are local wall time (e.g., "2025-12-16T10:30:00.123456")
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive_dt) = NaiveDateTime::parse_from_str(timestamp_str, pattern) {
            if let Some(formatted) = format_naive_local(naive_dt) {
                return formatted;
            }
        }
    }

    // Date only (e.g., "2025-12-16") - local midnight
    if let Ok(date) = NaiveDate::parse_from_str(timestamp_str, "%Y-%m-%d") {
        if let Some(formatted) = date.and_hms_opt(0, 0, 0).and_then(format_naive_local) {
            return formatted;
        }
    }

    // dateparser fills in today's date for a bare time, so those are left as written
    if !is_time_only(timestamp_str) {
        if let Ok(utc_dt) = dateparser::parse(timestamp_str) {
            return utc_dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
        }
    }

    // If parsing fails, return the original string
    timestamp_str.to_string()
}

/// True for strings that open with a clock time and carry no date, e.g. "10:30" or "10:30pm UTC"
fn is_time_only(timestamp_str: &str) -> bool {
    let first = timestamp_str.split_whitespace().next().unwrap_or("");
    first.contains(':')
        && first
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_alphabetic() || c == ':' || c == '.')
}

fn format_naive_local(naive_dt: NaiveDateTime) -> Option<String> {
    // `earliest` picks the first instant when a DST fold makes the wall time ambiguous
    Local
        .from_local_datetime(&naive_dt)
        .earliest()
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
}

/// Returns what follows the last `/` of a url, or the whole string when there is none.
/// Falls back to the placeholder when that leaves nothing to show.
pub fn extract_display_name(url: &str) -> String {
    let name = match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    };
    if name.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        name.to_string()
    }
}

/// Escapes text for insertion into HTML, element content or attribute values.
/// `&` goes first so the entities produced by the other replacements stay intact.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Cuts scanned text down to the snippet stored with a hit
pub fn truncate_snippet(text: &str) -> String {
    let mut snippet: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    snippet.push_str(SNIPPET_ELLIPSIS);
    snippet
}
