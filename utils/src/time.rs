//! Time formatting helpers.

use chrono::{DateTime, Utc};
use wardpass_types::Timestamp;

/// Format a timestamp for display to checkpoint operators.
///
/// Out-of-range values (far past `i64::MAX` seconds) fall back to the raw
/// second count rather than failing.
pub fn format_timestamp(ts: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp(ts.as_secs() as i64, 0) {
        Some(dt) if ts.as_secs() <= i64::MAX as u64 => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        _ => format!("{}", ts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_instant() {
        // 2024-01-01T00:00:00Z
        assert_eq!(
            format_timestamp(Timestamp::new(1_704_067_200)),
            "2024-01-01 00:00 UTC"
        );
    }

    #[test]
    fn epoch_formats() {
        assert_eq!(format_timestamp(Timestamp::EPOCH), "1970-01-01 00:00 UTC");
    }
}
