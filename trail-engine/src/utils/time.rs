//! Time helpers for tenant-timezone day bounds and dwell formatting
//!
//! The trail stores `i64` Unix millis; date math happens here, in the
//! tenant's operating timezone.

use chrono::NaiveDate;
use chrono_tz::Tz;
use std::time::Duration;

/// Calendar date of a timestamp in the given timezone
pub fn local_date(millis: i64, tz: Tz) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        // Out-of-range timestamp; 1970-01-01 matches no real event day
        .unwrap_or_default()
}

/// Start of a calendar day in Unix millis
///
/// DST gap fallback: when local midnight does not exist the UTC reading is
/// used instead.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(0, 0, 0).unwrap();
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Half-open `[start, end)` bounds of a calendar day in Unix millis
///
/// `end` is the next day's start; callers use `< end` semantics.
pub fn day_bounds_millis(date: NaiveDate, tz: Tz) -> (i64, i64) {
    let next_day = date.succ_opt().unwrap_or(date);
    (day_start_millis(date, tz), day_start_millis(next_day, tz))
}

/// Render a dwell as a compact human-readable duration ("2d 3h 10m")
///
/// Sub-minute dwells render in seconds so a freshly advanced order still
/// shows something meaningful.
pub fn format_dwell(dwell: Duration) -> String {
    let total_secs = dwell.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }

    if parts.is_empty() {
        return format!("{}s", total_secs);
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_dwell_compacts_units() {
        let two_days = Duration::from_secs(2 * 86_400 + 3 * 3_600 + 10 * 60);
        assert_eq!(format_dwell(two_days), "2d 3h 10m");
        assert_eq!(format_dwell(Duration::from_secs(30 * 60)), "30m");
        assert_eq!(format_dwell(Duration::from_secs(3_600)), "1h");
        assert_eq!(format_dwell(Duration::from_secs(45)), "45s");
        assert_eq!(format_dwell(Duration::ZERO), "0s");
    }

    #[test]
    fn day_bounds_are_half_open_in_local_time() {
        let tz = chrono_tz::America::Sao_Paulo;
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let (start, end) = day_bounds_millis(date, tz);

        // São Paulo is UTC-3 in June: local midnight = 03:00 UTC
        assert_eq!(start, 1_718_420_400_000);
        assert_eq!(end - start, 24 * 3_600_000);
        assert_eq!(local_date(start, tz), date);
        assert_eq!(local_date(end, tz), date.succ_opt().unwrap());
        assert_eq!(local_date(end - 1, tz), date);
    }
}
