//! Date and time utilities

use chrono::{DateTime, Utc};

/// Current Unix timestamp in seconds
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Format a timestamp as "YYYY-MM-DD HH:MM:SS"
pub fn format_datetime(timestamp: i64) -> String {
    let dt = DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Convert timestamp to relative time string (e.g., "2 hours ago")
pub fn timestamp_to_relative(timestamp: i64) -> String {
    let dt = DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    chrono_humanize::HumanTime::from(dt).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime() {
        assert_eq!(format_datetime(0), "1970-01-01 00:00:00");
        assert_eq!(format_datetime(1_700_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_relative_is_past() {
        let rel = timestamp_to_relative(now_timestamp() - 2 * 3600);
        assert!(rel.contains("ago"), "{}", rel);
    }
}
