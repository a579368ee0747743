//! UTC timestamp storage and display helpers.
//!
//! Timestamps are persisted as epoch milliseconds so SQLite can order them
//! as plain integers.

use chrono::{DateTime, Utc};

/// Display format used for note list entries, e.g. `05 Mar 2026 02:07 PM`.
pub const DISPLAY_FORMAT: &str = "%d %b %Y %I:%M %p";

/// Converts a UTC timestamp into its persisted epoch-millisecond form.
pub fn to_epoch_ms(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

/// Parses a persisted epoch-millisecond value.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn from_epoch_ms(value: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
}

/// Formats a timestamp for human-readable list display.
pub fn format_display_timestamp(value: &DateTime<Utc>) -> String {
    value.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_display_timestamp, from_epoch_ms, to_epoch_ms};
    use chrono::{TimeZone, Utc};

    #[test]
    fn epoch_ms_conversion_keeps_millisecond_precision() {
        let value = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(to_epoch_ms(value), 1_700_000_000_123);
        assert_eq!(from_epoch_ms(1_700_000_000_123), Some(value));
    }

    #[test]
    fn display_uses_day_month_year_and_twelve_hour_clock() {
        let value = Utc.with_ymd_and_hms(2026, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(format_display_timestamp(&value), "05 Mar 2026 02:07 PM");
    }

    #[test]
    fn out_of_range_epoch_is_rejected() {
        assert!(from_epoch_ms(i64::MAX).is_none());
    }
}
