use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Renders a byte count with base-1024 scaling and one decimal place.
///
/// The unit is the largest one whose scaled value is at least 1, capped at TB.
/// Zero is the literal `"0 B"`.
pub fn format_byte_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0usize;
    let mut divisor = 1u64;
    while unit + 1 < BYTE_UNITS.len() && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    format!("{:.1} {}", bytes as f64 / divisor as f64, BYTE_UNITS[unit])
}

/// Buckets the time elapsed between `timestamp` and `now` into a coarse
/// human phrase. Every bucket floor-truncates.
pub fn format_relative_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let hours = elapsed.num_hours();
    if hours < 1 {
        return "Less than 1 hour ago".to_string();
    }
    if hours < 24 {
        return format!("{hours} hours ago");
    }

    let days = elapsed.num_days();
    match days {
        1 => "1 day ago".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=29 => format!("{} weeks ago", days / 7),
        30..=364 => format!("{} months ago", days / 30),
        _ => format!("{} years ago", days / 365),
    }
}

/// Parses a wire timestamp and renders its age, or `-` when it is missing or malformed.
pub fn format_timestamp_age(raw: &str, now: DateTime<Utc>) -> String {
    parse_timestamp(raw)
        .map(|timestamp| format_relative_age(timestamp, now))
        .unwrap_or_else(|| "-".to_string())
}

/// Accepts RFC 3339 and the offset-less ISO-8601 form the backend emits via
/// `isoformat()`; the latter is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .map(|naive| naive.and_utc())
}

pub fn is_within(raw: &str, window: TimeDelta, as_of: DateTime<Utc>) -> bool {
    parse_timestamp(raw)
        .map(|timestamp| as_of.signed_duration_since(timestamp) < window)
        .unwrap_or(false)
}

pub fn format_duration_ms(millis: f64) -> String {
    if !millis.is_finite() || millis <= 0.0 {
        return "-".to_string();
    }
    if millis < 1_000.0 {
        return format!("{}ms", millis.round() as u64);
    }

    let seconds = millis / 1_000.0;
    if seconds < 60.0 {
        return format!("{seconds:.1}s");
    }
    let whole = seconds as u64;
    format!("{}m{:02}s", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::{
        format_byte_size, format_duration_ms, format_relative_age, format_timestamp_age,
        is_within, parse_timestamp,
    };
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn zero_bytes_is_special_cased() {
        assert_eq!(format_byte_size(0), "0 B");
    }

    #[test]
    fn byte_sizes_scale_by_1024() {
        assert_eq!(format_byte_size(512), "512.0 B");
        assert_eq!(format_byte_size(1024), "1.0 KB");
        assert_eq!(format_byte_size(1536), "1.5 KB");
        assert_eq!(format_byte_size(450_000_000), "429.2 MB");
        assert_eq!(format_byte_size(1_500_000_000), "1.4 GB");
    }

    #[test]
    fn byte_sizes_clamp_to_terabytes() {
        let five_pib = 5 * 1024u64.pow(5);
        assert_eq!(format_byte_size(five_pib), "5120.0 TB");
    }

    #[test]
    fn relative_age_hour_day_seam() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let day = now - TimeDelta::hours(24);
        let almost = now - (TimeDelta::hours(23) + TimeDelta::minutes(59));
        assert_eq!(format_relative_age(day, now), "1 day ago");
        assert_eq!(format_relative_age(almost, now), "23 hours ago");
    }

    #[test]
    fn relative_age_buckets_floor_truncate() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let cases = [
            (TimeDelta::minutes(59), "Less than 1 hour ago"),
            (TimeDelta::hours(5), "5 hours ago"),
            (TimeDelta::days(3), "3 days ago"),
            (TimeDelta::days(13), "1 weeks ago"),
            (TimeDelta::hours(29 * 24 + 21), "4 weeks ago"),
            (TimeDelta::days(65), "2 months ago"),
            (TimeDelta::days(800), "2 years ago"),
        ];
        for (elapsed, expected) in cases {
            assert_eq!(format_relative_age(now - elapsed, now), expected);
        }
    }

    #[test]
    fn future_timestamps_read_as_recent() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(
            format_relative_age(now + TimeDelta::hours(3), now),
            "Less than 1 hour ago"
        );
    }

    #[test]
    fn parses_offsetless_backend_timestamps_as_utc() {
        let parsed = parse_timestamp("2024-05-01T10:30:00.123456").unwrap();
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
                + TimeDelta::microseconds(123_456)
        );
        assert!(parse_timestamp("2024-05-01T10:30:00Z").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn unparseable_age_renders_dash() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp_age("", now), "-");
        assert_eq!(
            format_timestamp_age("2024-05-31T12:00:00Z", now),
            "1 day ago"
        );
    }

    #[test]
    fn within_window_requires_parseable_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(is_within("2024-06-01T04:00:00Z", TimeDelta::days(1), now));
        assert!(!is_within("2024-05-30T04:00:00Z", TimeDelta::days(1), now));
        assert!(!is_within("not-a-date", TimeDelta::days(1), now));
    }

    #[test]
    fn scan_durations_render_compactly() {
        assert_eq!(format_duration_ms(12_500.0), "12.5s");
        assert_eq!(format_duration_ms(450.0), "450ms");
        assert_eq!(format_duration_ms(125_000.0), "2m05s");
        assert_eq!(format_duration_ms(0.0), "-");
    }
}
