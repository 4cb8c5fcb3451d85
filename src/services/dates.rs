//! Timestamp parsing and the date labels shown next to sessions, feedback
//! and reminders.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Accepts RFC 3339, MySQL `YYYY-MM-DD HH:MM:SS` and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// "Today", "Yesterday" or "May 3". Unparseable input is returned as is.
pub fn session_date_label(raw: &str, today: NaiveDate) -> String {
    let Some(timestamp) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let date = timestamp.date();

    if date == today {
        "Today".to_string()
    } else if Some(date) == today.pred_opt() {
        "Yesterday".to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}

/// "May 3, 2025", used for registration dates.
pub fn long_date(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%B %-d, %Y").to_string())
}

/// "May 3, 2025" with an abbreviated month, used in feedback lists.
pub fn short_date(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%b %-d, %Y").to_string())
}

pub fn reminder_time(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_server_formats() {
        assert!(parse_timestamp("2025-05-03 14:22:01").is_some());
        assert!(parse_timestamp("2025-05-03T14:22:01Z").is_some());
        assert!(parse_timestamp("2025-05-03").is_some());
        assert!(parse_timestamp("yesterday-ish").is_none());
    }

    #[test]
    fn session_labels() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        assert_eq!(session_date_label("2025-05-03 09:00:00", today), "Today");
        assert_eq!(session_date_label("2025-05-02 23:59:59", today), "Yesterday");
        assert_eq!(session_date_label("2025-04-28 10:00:00", today), "Apr 28");
        assert_eq!(session_date_label("garbage", today), "garbage");
    }

    #[test]
    fn long_and_short_dates() {
        assert_eq!(long_date("2024-09-01 08:00:00").as_deref(), Some("September 1, 2024"));
        assert_eq!(short_date("2024-09-01").as_deref(), Some("Sep 1, 2024"));
    }

    #[test]
    fn reminder_time_format() {
        let at = Utc.with_ymd_and_hms(2025, 1, 7, 15, 4, 0).unwrap();
        assert_eq!(reminder_time(&at), "Jan 7, 03:04 PM");
    }
}
