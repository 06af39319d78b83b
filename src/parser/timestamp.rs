//! Timestamp parsing for stamped benchmark output

use chrono::NaiveDateTime;

/// Format used by the line stamper and by vmstat `-t`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a log timestamp, truncating to whole seconds
///
/// Accepts `2019-03-01 12:00:00` and the Kafka consumer detailed-stat form
/// `2019-03-01 12:00:00:123`, whose trailing millisecond field is dropped.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
        return Some(ts);
    }

    let (head, millis) = text.rsplit_once(':')?;
    if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(head, TIMESTAMP_FORMAT).ok()
}

/// Render a timestamp the way the stamper writes it
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
